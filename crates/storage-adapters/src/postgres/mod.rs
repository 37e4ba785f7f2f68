//! Postgres implementations of the persistence ports.
//!
//! Mapping is manual (`sqlx::query` + `Row::get`) so the crate compiles
//! without a live database; schema lives in `migrations/`.

pub mod feedback;
pub mod messages;
pub mod otps;
pub mod products;
pub mod users;

pub use feedback::PgFeedbackRepo;
pub use messages::PgMessageRepo;
pub use otps::PgOtpRepo;
pub use products::PgProductRepo;
pub use users::PgUserRepo;

use sqlx::postgres::{PgPool, PgPoolOptions};

use domains::AppError;

/// Connects and applies pending migrations.
pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

/// Store failure that is nobody's fault but the infrastructure's.
pub(crate) fn internal(err: sqlx::Error) -> AppError {
    AppError::internal(err)
}

/// Insert failure mapping: a unique violation surfaces as `Conflict`,
/// anything else as `Internal`.
pub(crate) fn map_insert(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            return AppError::Conflict("a record with this key already exists".into());
        }
    }
    internal(err)
}
