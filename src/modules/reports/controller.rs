use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use sams_models::{ClassId, StudentId};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::policy::AccessPolicy;
use crate::modules::attendance::aggregator;
use crate::modules::attendance::service::AttendanceService;
use crate::modules::classes::service::ClassService;
use crate::modules::reports::service;
use crate::state::AppState;
use crate::utils::errors::{OrRedirect, PageError};

fn pdf_response(filename: &str, body: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', ""));
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/parent-dashboard/{student_id}/class/{class_id}/pdf",
    params(
        ("student_id" = Uuid, Path, description = "Student ID"),
        ("class_id" = Uuid, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Single-class attendance report", content_type = "application/pdf"),
        (status = 303, description = "Not the student or their parent; redirected with a message")
    ),
    tag = "Reports"
)]
#[instrument(skip(state, viewer))]
pub async fn class_report(
    State(state): State<AppState>,
    viewer: AuthUser,
    Path((student_id, class_id)): Path<(StudentId, ClassId)>,
) -> Result<Response, PageError> {
    let home = viewer.role().home_path();
    let student = AccessPolicy::student_for_viewer(&state.db, &viewer, student_id)
        .await
        .or_redirect(home)?;
    let class = ClassService::get_class(&state.db, class_id)
        .await
        .or_redirect(home)?
        .to_ref();
    let summary = AttendanceService::summary_for(&state.db, student.id, class.id).await?;

    let body = service::render_class_report(&student, &class, &summary);
    tracing::info!(bytes = body.len(), "Class report generated");

    Ok(pdf_response(
        &service::class_report_filename(&student, &class),
        body,
    ))
}

#[utoipa::path(
    get,
    path = "/parent-dashboard/{student_id}/all-classes/pdf",
    params(
        ("student_id" = Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Report with one block per class the student has attendance in", content_type = "application/pdf"),
        (status = 303, description = "Not the student or their parent; redirected with a message")
    ),
    tag = "Reports"
)]
#[instrument(skip(state, viewer))]
pub async fn combined_report(
    State(state): State<AppState>,
    viewer: AuthUser,
    Path(student_id): Path<StudentId>,
) -> Result<Response, PageError> {
    let student = AccessPolicy::student_for_viewer(&state.db, &viewer, student_id)
        .await
        .or_redirect(viewer.role().home_path())?;
    let records = AttendanceService::records_for_student(&state.db, student.id).await?;
    let classes = aggregator::summarize_by_class(&records);

    let body = service::render_combined_report(&student, &classes);
    tracing::info!(classes = classes.len(), bytes = body.len(), "Combined report generated");

    Ok(pdf_response(&service::combined_report_filename(&student), body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_response_headers() {
        let response = pdf_response("Ada \"A\"_MTH.pdf", b"%PDF-1.4".to_vec());
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Ada A_MTH.pdf\""
        );
    }
}
