use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

use domains::{AppError, ExitFeedback, FeedbackRepo, Result};

use super::internal;

/// Session dedup rides on the primary key: `ON CONFLICT DO NOTHING` makes the
/// duplicate submit benign without any application-side locking.
pub struct PgFeedbackRepo {
    pool: PgPool,
}

impl PgFeedbackRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackRepo for PgFeedbackRepo {
    async fn insert_if_absent(&self, feedback: &ExitFeedback) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO exit_feedback (session_id, reason, comment, completion_percent, \
             completed_fields, exit_trigger, device, wanted_help, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (session_id) DO NOTHING",
        )
        .bind(&feedback.session_id)
        .bind(feedback.reason.as_str())
        .bind(&feedback.comment)
        .bind(feedback.completion_percent)
        .bind(&feedback.completed_fields)
        .bind(feedback.exit_trigger.as_str())
        .bind(feedback.device.as_str())
        .bind(feedback.wanted_help)
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await
        .map_err(internal)?;
        Ok(result.rows_affected() == 1)
    }

    async fn exists(&self, session_id: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM exit_feedback WHERE session_id = $1")
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
            .map_err(internal)?;
        let n: i64 = row.try_get("n").map_err(AppError::internal)?;
        Ok(n > 0)
    }
}
