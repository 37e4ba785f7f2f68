//! `AppError` to HTTP response mapping.
//!
//! Every body carries a `message`; structured flags (`limitReached`,
//! `alreadySubmitted`, ...) let the SPA branch without string-matching.
//! Internal detail goes to the logs, the client gets a generic 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use domains::AppError;
use services::OtpVerifyError;

pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            AppError::NotFound(..) => (StatusCode::NOT_FOUND, json!({ "message": self.0.to_string() })),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, json!({ "message": self.0.to_string() })),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, json!({ "message": self.0.to_string() })),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, json!({ "message": self.0.to_string() })),
            AppError::Conflict(_) => (StatusCode::CONFLICT, json!({ "message": self.0.to_string() })),
            AppError::RateLimited {
                limit,
                window_hours,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "message": self.0.to_string(),
                    "limitReached": true,
                    "limit": limit,
                    "windowHours": window_hours,
                }),
            ),
            AppError::Internal(detail) => {
                error!(%detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<OtpVerifyError> for ApiError {
    fn from(err: OtpVerifyError) -> Self {
        match err {
            OtpVerifyError::NotFound => {
                Self(AppError::NotFound("Verification code", "this number".into()))
            }
            OtpVerifyError::AlreadyUsed => Self(AppError::Conflict(err.to_string())),
            OtpVerifyError::AttemptsExhausted => Self(AppError::Forbidden(err.to_string())),
            OtpVerifyError::Store(inner) => Self(inner),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
