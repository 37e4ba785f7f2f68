//! Centralized error taxonomy for all SellBUY operations.
//!
//! Handlers map each variant to a status code; internal detail stays in the
//! logs, never in the response body.

use thiserror::Error;

/// The primary error type for domain and service operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Referenced entity absent (e.g. Product, User, Message).
    #[error("{0} not found with id {1}")]
    NotFound(&'static str, String),

    /// Missing or malformed input; user-fixable.
    #[error("validation error: {0}")]
    Validation(String),

    /// No usable credentials for this request.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Ownership or admin check failed.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource already exists (e.g. duplicate signup email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Listing quota exhausted. Distinct from `Validation` so the client can
    /// render a dedicated "come back later" state.
    #[error("listing limit reached: {limit} per {window_hours}h rolling window")]
    RateLimited { limit: u32, window_hours: i64 },

    /// Infrastructure failure (store down, image host unreachable).
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wraps any store/infra failure without leaking its type upward.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A specialized Result type for SellBUY logic.
pub type Result<T> = std::result::Result<T, AppError>;
