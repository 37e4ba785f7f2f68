//! HTTP adapter for SellBUY (feature `web-axum`).
//!
//! Thin layer only: handlers deserialize, call one service method, and
//! serialize. Authorization lives in the extractors; every listing and
//! moderation rule stays in `services`.

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod router;
#[cfg(feature = "web-axum")]
pub mod state;

#[cfg(feature = "web-axum")]
pub use error::ApiError;
#[cfg(feature = "web-axum")]
pub use router::router;
#[cfg(feature = "web-axum")]
pub use state::AppState;
