use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use domains::{AppError, Message, MessageRepo, MessageStatus, Result};

use super::{internal, map_insert};

pub struct PgMessageRepo {
    pool: PgPool,
}

impl PgMessageRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_message(row: &PgRow) -> Result<Message> {
    Ok(Message {
        id: row.try_get("id").map_err(AppError::internal)?,
        user_id: row.try_get("user_id").map_err(AppError::internal)?,
        subject: row.try_get("subject").map_err(AppError::internal)?,
        body: row.try_get("body").map_err(AppError::internal)?,
        status: row
            .try_get::<String, _>("status")
            .map_err(AppError::internal)?
            .parse()
            .map_err(AppError::internal)?,
        admin_reply: row.try_get("admin_reply").map_err(AppError::internal)?,
        read_at: row.try_get("read_at").map_err(AppError::internal)?,
        resolved_at: row.try_get("resolved_at").map_err(AppError::internal)?,
        created_at: row.try_get("created_at").map_err(AppError::internal)?,
    })
}

#[async_trait]
impl MessageRepo for PgMessageRepo {
    async fn insert(&self, message: &Message) -> Result<()> {
        sqlx::query(
            "INSERT INTO messages (id, user_id, subject, body, status, admin_reply, read_at, \
             resolved_at, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(message.id)
        .bind(message.user_id)
        .bind(&message.subject)
        .bind(&message.body)
        .bind(message.status.as_str())
        .bind(&message.admin_reply)
        .bind(message.read_at)
        .bind(message.resolved_at)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>> {
        sqlx::query("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .map(|row| row_to_message(&row))
            .transpose()
    }

    async fn list_by_user(&self, user: Uuid) -> Result<Vec<Message>> {
        let rows =
            sqlx::query("SELECT * FROM messages WHERE user_id = $1 ORDER BY created_at DESC")
                .bind(user)
                .fetch_all(&self.pool)
                .await
                .map_err(internal)?;
        rows.iter().map(row_to_message).collect()
    }

    async fn list_all(&self) -> Result<Vec<Message>> {
        let rows = sqlx::query("SELECT * FROM messages ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;
        rows.iter().map(row_to_message).collect()
    }

    async fn mark_read(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE messages SET status = $2, read_at = $3 WHERE id = $1")
            .bind(id)
            .bind(MessageStatus::Read.as_str())
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn resolve<'a>(&self, id: Uuid, reply: Option<&'a str>, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "UPDATE messages SET status = $2, admin_reply = $3, resolved_at = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(MessageStatus::Resolved.as_str())
        .bind(reply)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(internal)?;
        Ok(())
    }

    async fn count_unread(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS unread FROM messages WHERE status = $1")
            .bind(MessageStatus::Unread.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(internal)?;
        row.try_get("unread").map_err(AppError::internal)
    }
}
