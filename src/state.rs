use std::sync::Arc;

use sams_cache::{CacheConfig, SharedStore};
use sqlx::PgPool;

use crate::config::cors::CorsConfig;
use crate::config::email::EmailConfig;
use crate::config::jwt::JwtConfig;
use crate::config::otp::OtpConfig;
use crate::utils::email::{EmailService, Mailer};
use crate::utils::render::{JsonPageRenderer, PageRenderer};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub email_config: EmailConfig,
    pub cors_config: CorsConfig,
    pub otp_config: OtpConfig,
    /// Prefix for every key written to `store`.
    pub cache_prefix: String,
    pub store: SharedStore,
    pub mailer: Arc<dyn Mailer>,
    pub renderer: Arc<dyn PageRenderer>,
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let db = sams_db::init_db_pool().await?;
    sams_db::run_migrations(&db).await?;

    let cache_config = CacheConfig::from_env();
    let store = sams_cache::connect(&cache_config).await?;

    let email_config = EmailConfig::from_env();

    Ok(AppState {
        db,
        jwt_config: JwtConfig::from_env(),
        mailer: Arc::new(EmailService::new(email_config.clone())),
        email_config,
        cors_config: CorsConfig::from_env(),
        otp_config: OtpConfig::from_env(),
        cache_prefix: cache_config.key_prefix,
        store,
        renderer: Arc::new(JsonPageRenderer),
    })
}
