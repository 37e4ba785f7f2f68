use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use domains::{AppError, Result, User, UserCounts, UserRepo};

use super::{internal, map_insert};

pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &PgRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id").map_err(AppError::internal)?,
        email: row.try_get("email").map_err(AppError::internal)?,
        username: row.try_get("username").map_err(AppError::internal)?,
        password_hash: row.try_get("password_hash").map_err(AppError::internal)?,
        mobile: row.try_get("mobile").map_err(AppError::internal)?,
        mobile_verified: row.try_get("mobile_verified").map_err(AppError::internal)?,
        google_id: row.try_get("google_id").map_err(AppError::internal)?,
        liked_products: row.try_get("liked_products").map_err(AppError::internal)?,
        is_blocked: row.try_get("is_blocked").map_err(AppError::internal)?,
        blocked_reason: row.try_get("blocked_reason").map_err(AppError::internal)?,
        blocked_at: row.try_get("blocked_at").map_err(AppError::internal)?,
        created_at: row.try_get("created_at").map_err(AppError::internal)?,
    })
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, email, username, password_hash, mobile, mobile_verified, \
             google_id, liked_products, is_blocked, blocked_reason, blocked_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.mobile)
        .bind(user.mobile_verified)
        .bind(&user.google_id)
        .bind(&user.liked_products)
        .bind(user.is_blocked)
        .bind(&user.blocked_reason)
        .bind(user.blocked_at)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .map(|row| row_to_user(&row))
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .map(|row| row_to_user(&row))
            .transpose()
    }

    async fn update_mobile(&self, id: Uuid, mobile: &str) -> Result<()> {
        sqlx::query("UPDATE users SET mobile = $2 WHERE id = $1")
            .bind(id)
            .bind(mobile)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn set_mobile_verified(&self, id: Uuid, verified: bool) -> Result<()> {
        sqlx::query("UPDATE users SET mobile_verified = $2 WHERE id = $1")
            .bind(id)
            .bind(verified)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn attach_google_id(&self, id: Uuid, google_id: &str) -> Result<()> {
        sqlx::query("UPDATE users SET google_id = $2 WHERE id = $1")
            .bind(id)
            .bind(google_id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn set_like(&self, id: Uuid, product: Uuid, liked: bool) -> Result<()> {
        let sql = if liked {
            // guarded append keeps the array a set
            "UPDATE users SET liked_products = array_append(liked_products, $2) \
             WHERE id = $1 AND NOT ($2 = ANY(liked_products))"
        } else {
            "UPDATE users SET liked_products = array_remove(liked_products, $2) WHERE id = $1"
        };
        sqlx::query(sql)
            .bind(id)
            .bind(product)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn blocked_ids(&self) -> Result<Vec<Uuid>> {
        let rows = sqlx::query("SELECT id FROM users WHERE is_blocked")
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;
        rows.iter()
            .map(|row| row.try_get("id").map_err(AppError::internal))
            .collect()
    }

    async fn set_blocked<'a>(&self, id: Uuid, reason: Option<&'a str>) -> Result<()> {
        let sql = match reason {
            Some(_) => {
                "UPDATE users SET is_blocked = TRUE, blocked_reason = $2, blocked_at = now() \
                 WHERE id = $1"
            }
            None => {
                "UPDATE users SET is_blocked = FALSE, blocked_reason = NULL, blocked_at = NULL \
                 WHERE id = $1"
            }
        };
        let mut query = sqlx::query(sql).bind(id);
        if let Some(reason) = reason {
            query = query.bind(reason);
        }
        query.execute(&self.pool).await.map_err(internal)?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;
        rows.iter().map(row_to_user).collect()
    }

    async fn counts(&self) -> Result<UserCounts> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE is_blocked) AS blocked FROM users",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(internal)?;
        Ok(UserCounts {
            total: row.try_get("total").map_err(AppError::internal)?,
            blocked: row.try_get("blocked").map_err(AppError::internal)?,
        })
    }
}
