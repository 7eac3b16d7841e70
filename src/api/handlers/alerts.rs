use crate::{
    api::{ApiError, error::ErrorBody},
    auth::{Principal, ownership::require_owner_segment},
    store::{Alert, Store},
};
use axum::{
    Json,
    extract::{Extension, Path},
};
use std::sync::Arc;
use tracing::{debug, instrument};

#[utoipa::path(
    get,
    path= "/alerts/{user_id}",
    params(
        ("user_id" = i64, Path, description = "Owner of the alerts; must be the caller")
    ),
    responses (
        (status = 200, description = "Alerts addressed to the caller", body = [Alert]),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
        (status = 403, description = "Alerts belong to another user", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag= "alerts"
)]
// axum handler for alerts
#[instrument(skip_all, fields(user_id = principal.user_id))]
pub async fn alerts(
    store: Extension<Arc<dyn Store>>,
    Extension(principal): Extension<Principal>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<Alert>>, ApiError> {
    let owner_id = require_owner_segment(&principal, &owner)?;

    let alerts = store.find_alerts_by_user(owner_id).await?;

    debug!(count = alerts.len(), "alerts fetched");

    Ok(Json(alerts))
}
