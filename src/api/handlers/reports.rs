use crate::{
    api::{ApiError, error::ErrorBody},
    auth::{Principal, ownership::require_owner},
    store::{Report, Store},
};
use axum::{Json, extract::Extension, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReportSubmit {
    #[serde(default)]
    report_details: String,
    /// Optional author; when present it must be the caller.
    #[serde(default)]
    user_id: Option<i64>,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct ReportCreated {
    pub message: String,
    pub report: Report,
}

#[utoipa::path(
    post,
    path= "/reports",
    request_body = ReportSubmit,
    responses (
        (status = 201, description = "Report submitted", body = ReportCreated, content_type = "application/json"),
        (status = 400, description = "Report details are required", body = ErrorBody),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
        (status = 403, description = "Report attributed to another user", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag= "reports"
)]
// axum handler for reports
#[instrument(skip_all, fields(user_id = principal.user_id))]
pub async fn submit_report(
    store: Extension<Arc<dyn Store>>,
    Extension(principal): Extension<Principal>,
    payload: Option<Json<ReportSubmit>>,
) -> Result<(StatusCode, Json<ReportCreated>), ApiError> {
    let Some(Json(submission)) = payload else {
        return Err(ApiError::validation("Report details are required"));
    };

    if let Some(author) = submission.user_id {
        require_owner(&principal, author)?;
    }

    let details = submission.report_details.trim();
    if details.is_empty() {
        return Err(ApiError::validation("Report details are required"));
    }

    let report = store.insert_report(principal.user_id, details).await?;

    info!(report_id = report.report_id, "report submitted");

    Ok((
        StatusCode::CREATED,
        Json(ReportCreated {
            message: "Report submitted successfully".to_string(),
            report,
        }),
    ))
}
