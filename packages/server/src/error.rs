use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::store::StoreError;

/// Error type for HTTP handlers.
///
/// Every error body carries `ok: false` so the editor's save handling can
/// treat it like a rejected save.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Body missing, malformed or over the size limit
    #[error(transparent)]
    Body(#[from] JsonRejection),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Store(StoreError::KeyMismatch) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string())
            }
            AppError::Store(err) => {
                tracing::error!(error = %err, "site store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Body(rejection) => (rejection.status(), "INVALID_BODY", rejection.body_text()),
        };

        let body = json!({
            "ok": false,
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
