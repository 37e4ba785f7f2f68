//! The central domain layer for SellBUY: entities, the error taxonomy,
//! and the port traits every adapter plugs into.

pub mod error;
pub mod models;
pub mod ports;

pub use error::{AppError, Result};
pub use models::*;
pub use ports::*;
