use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use sea_orm::DbErr;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("database error: {0}")]
    Persistence(DbErr),
    #[error("database unavailable: {0}")]
    ServiceUnavailable(DbErr),
    #[error("storage error: {0}")]
    Storage(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Persistence(_) | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::Persistence(e) => {
                tracing::error!(error = %e, "database error");
                "Failed to save changes".to_string()
            }
            AppError::ServiceUnavailable(e) => {
                tracing::error!(error = %e, "database unreachable");
                "Database unavailable".to_string()
            }
            AppError::Storage(e) => {
                tracing::error!(error = %e, "storage error");
                "Failed to store file".to_string()
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => AppError::ServiceUnavailable(err),
            other => AppError::Persistence(other),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}
