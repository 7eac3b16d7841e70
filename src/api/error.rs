//! Error responses shared by every handler.
//!
//! Clients get a short JSON message (`{"error": "..."}`); internal detail is only
//! logged. Authentication failures (`401`) and ownership failures (`403`) are
//! kept distinct.

use crate::store::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input; nothing was persisted.
    #[error("{0}")]
    Validation(String),
    /// Missing, malformed, forged or expired bearer token.
    #[error("Token is invalid or expired")]
    Unauthenticated,
    /// Unknown email or wrong password; the two are not told apart.
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// Valid identity, resource owned by someone else.
    #[error("Unauthorized access")]
    Forbidden,
    #[error("User already exists")]
    Conflict,
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body of every error response.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => Self::Conflict,
            other => {
                error!("Store error: {other}");
                Self::Internal
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: ApiError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn authentication_and_authorization_are_distinct() {
        let (status, body) = body_of(ApiError::Unauthenticated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error, "Token is invalid or expired");

        let (status, body) = body_of(ApiError::Forbidden).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.error, "Unauthorized access");
    }

    #[tokio::test]
    async fn store_failures_do_not_leak_detail() {
        let err = ApiError::from(StoreError::InvalidData("role column = 'root'".to_string()));
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
    }

    #[test]
    fn duplicate_email_maps_to_conflict() {
        let err = ApiError::from(StoreError::DuplicateEmail);
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
