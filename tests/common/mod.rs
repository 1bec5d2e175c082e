use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use chrono::NaiveTime;
use http_body_util::BodyExt;
use sams::config::cors::CorsConfig;
use sams::config::email::EmailConfig;
use sams::config::jwt::JwtConfig;
use sams::config::otp::OtpConfig;
use sams::middleware::auth::SESSION_COOKIE;
use sams::modules::classes::service::ClassService;
use sams::modules::students::service::StudentService;
use sams::modules::users::service::UserService;
use sams::router::init_router;
use sams::state::AppState;
use sams::utils::email::RecordingMailer;
use sams::utils::flash::{FLASH_COOKIE, FlashMessage};
use sams::utils::render::JsonPageRenderer;
use sams_auth::create_access_token;
use sams_cache::MemoryStore;
use sams_core::Role;
use sams_models::{
    Class, CreateClassDto, CreateStudentDto, CreateTimeSlotDto, CreateUserDto, Student, TimeSlot,
    User, UserId,
};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "testpass123";

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    pub store: Arc<MemoryStore>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new(pool: PgPool) -> Self {
        Self::with_mailer(pool, RecordingMailer::new()).await
    }

    pub async fn with_mailer(pool: PgPool, mailer: RecordingMailer) -> Self {
        dotenvy::dotenv().ok();
        let mailer = Arc::new(mailer);
        let store = Arc::new(MemoryStore::new());

        let state = AppState {
            db: pool,
            jwt_config: JwtConfig::from_env(),
            email_config: EmailConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            otp_config: OtpConfig::default(),
            cache_prefix: "test".to_string(),
            store: store.clone(),
            mailer: mailer.clone(),
            renderer: Arc::new(JsonPageRenderer),
        };

        Self {
            router: init_router(state.clone(), None),
            state,
            mailer,
            store,
        }
    }

    pub fn session_cookie(&self, user: &User) -> String {
        let token = create_access_token(
            user.id.into_inner(),
            user.email.as_str(),
            user.role,
            &self.state.jwt_config,
        )
        .unwrap();
        format!("{}={}", SESSION_COOKIE, token)
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_form(&self, uri: &str, cookie: Option<&str>, body: &str) -> Response<Body> {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

pub async fn create_test_user(pool: &PgPool, role: Role) -> User {
    create_named_user(pool, role, "Test User").await
}

pub async fn create_named_user(pool: &PgPool, role: Role, full_name: &str) -> User {
    UserService::create_user(
        pool,
        CreateUserDto {
            email: generate_unique_email().parse().unwrap(),
            full_name: full_name.to_string(),
            password: TEST_PASSWORD.to_string(),
            role,
            phone: None,
            address: None,
            department: None,
        },
    )
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_time_slot(pool: &PgPool, start_hour: u32) -> TimeSlot {
    ClassService::create_time_slot(
        pool,
        CreateTimeSlotDto {
            start_time: NaiveTime::from_hms_opt(start_hour, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(start_hour + 1, 0, 0).unwrap(),
        },
    )
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_class(pool: &PgPool, code: &str, slot: &TimeSlot, teacher: &User) -> Class {
    ClassService::create_class(
        pool,
        CreateClassDto {
            code: code.to_string(),
            title: format!("{} Title", code),
            semester: "Fall".to_string(),
            year: Some(2024),
            time_slot_id: slot.id,
            teacher_id: Some(teacher.id),
        },
    )
    .await
    .unwrap()
}

/// A STUDENT account with its profile, enrolled in `classes`.
#[allow(dead_code)]
pub async fn create_student(
    pool: &PgPool,
    full_name: &str,
    parent: Option<UserId>,
    classes: &[&Class],
) -> (User, Student) {
    let user = create_named_user(pool, Role::Student, full_name).await;
    let student = StudentService::create_student(
        pool,
        CreateStudentDto {
            user_id: user.id,
            roll_no: format!("R-{}", &Uuid::new_v4().simple().to_string()[..6]),
            semester: Some("Fall".to_string()),
            year: Some(2024),
            parent_id: parent,
        },
    )
    .await
    .unwrap();

    for class in classes {
        ClassService::enroll(pool, student.id, class.id).await.unwrap();
    }

    (user, student)
}

#[allow(dead_code)]
pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Value of a cookie set on `response`, if any.
#[allow(dead_code)]
pub fn set_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// Flash messages queued by `response`, as `(level, text)`.
#[allow(dead_code)]
pub fn flash_messages(response: &Response<Body>) -> Vec<(String, String)> {
    set_cookie(response, FLASH_COOKIE)
        .and_then(|value| hex::decode(value).ok())
        .and_then(|bytes| serde_json::from_slice::<Vec<FlashMessage>>(&bytes).ok())
        .unwrap_or_default()
        .into_iter()
        .map(|m| {
            let level = serde_json::to_value(m.level)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            (level, m.text)
        })
        .collect()
}

#[allow(dead_code)]
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[allow(dead_code)]
pub async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}
