use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Errors surfaced to HTTP clients as a fixed machine-readable code string.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("USERNAME_OR_EMAIL_ALREADY_EXISTS")]
    UsernameOrEmailExists,
    #[error("USERNAME_ALREADY_EXISTS")]
    UsernameExists,
    #[error("EMAIL_ALREADY_EXISTS")]
    EmailExists,
    #[error("USER_NOT_FOUND")]
    UserNotFound,
    #[error("INVALID_CREDENTIALS")]
    InvalidCredentials,
    #[error("UNAUTHORIZED")]
    Unauthorized,
    #[error("SESSION_NOT_CREATED")]
    SessionNotCreated,
    #[error("{0}")]
    Validation(String),
    #[error("INTERNAL_SERVER_ERROR")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UsernameOrEmailExists
            | ApiError::UsernameExists
            | ApiError::EmailExists => StatusCode::CONFLICT,
            ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::SessionNotCreated | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            if let ApiError::Internal(e) = &self {
                error!(error = %e, "internal error");
            }
        }
        let body = Json(json!({
            "statusCode": status.as_u16(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
