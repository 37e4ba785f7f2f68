use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use domains::{AppError, OtpRecord, OtpRepo, Result};

use super::{internal, map_insert};

/// Postgres has no TTL collections, so expiry is enforced at the edges:
/// live lookups filter on `expires_at` and reap dead rows in the same call.
/// A vanished record reads exactly like one that was never issued.
pub struct PgOtpRepo {
    pool: PgPool,
}

impl PgOtpRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: &PgRow) -> Result<OtpRecord> {
    Ok(OtpRecord {
        mobile: row.try_get("mobile").map_err(AppError::internal)?,
        user_id: row.try_get("user_id").map_err(AppError::internal)?,
        code: row.try_get("code").map_err(AppError::internal)?,
        attempts: row.try_get("attempts").map_err(AppError::internal)?,
        verified: row.try_get("verified").map_err(AppError::internal)?,
        expires_at: row.try_get("expires_at").map_err(AppError::internal)?,
        created_at: row.try_get("created_at").map_err(AppError::internal)?,
    })
}

#[async_trait]
impl OtpRepo for PgOtpRepo {
    async fn insert(&self, record: &OtpRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO otps (mobile, user_id, code, attempts, verified, expires_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&record.mobile)
        .bind(record.user_id)
        .bind(&record.code)
        .bind(record.attempts)
        .bind(record.verified)
        .bind(record.expires_at)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert)?;
        Ok(())
    }

    async fn find_live(&self, mobile: &str, user: Uuid) -> Result<Option<OtpRecord>> {
        sqlx::query("DELETE FROM otps WHERE expires_at <= now()")
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        sqlx::query(
            "SELECT * FROM otps WHERE mobile = $1 AND user_id = $2 AND expires_at > now()",
        )
        .bind(mobile)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?
        .map(|row| row_to_record(&row))
        .transpose()
    }

    async fn bump_attempts(&self, mobile: &str, user: Uuid) -> Result<i32> {
        // Single conditional update: parallel wrong guesses each consume an
        // attempt instead of sharing one.
        let row = sqlx::query(
            "UPDATE otps SET attempts = attempts + 1 \
             WHERE mobile = $1 AND user_id = $2 AND expires_at > now() \
             RETURNING attempts",
        )
        .bind(mobile)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;
        match row {
            Some(row) => row.try_get("attempts").map_err(AppError::internal),
            // expired between lookup and bump
            None => Err(AppError::NotFound("Otp", format!("{mobile}/{user}"))),
        }
    }

    async fn mark_verified(&self, mobile: &str, user: Uuid) -> Result<()> {
        sqlx::query("UPDATE otps SET verified = TRUE WHERE mobile = $1 AND user_id = $2")
            .bind(mobile)
            .bind(user)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn delete_pair(&self, mobile: &str, user: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM otps WHERE mobile = $1 AND user_id = $2")
            .bind(mobile)
            .bind(user)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(())
    }
}
