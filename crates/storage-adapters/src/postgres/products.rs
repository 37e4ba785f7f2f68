use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{QueryBuilder, Row};
use uuid::Uuid;

use domains::{
    AppError, ApprovalStatus, Product, ProductCounts, ProductPatch, ProductQuery, ProductRepo,
    ProductStatus, Result,
};

use super::{internal, map_insert};

pub struct PgProductRepo {
    pool: PgPool,
}

impl PgProductRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_product(row: &PgRow) -> Result<Product> {
    let parse = AppError::internal; // enum text in the store is ours; a mismatch is corruption
    Ok(Product {
        id: row.try_get("id").map_err(parse)?,
        name: row.try_get("name").map_err(parse)?,
        description: row.try_get("description").map_err(parse)?,
        price: row.try_get("price").map_err(parse)?,
        negotiable: row.try_get("negotiable").map_err(parse)?,
        category: row.try_get("category").map_err(parse)?,
        images: row.try_get("images").map_err(parse)?,
        location: row
            .try_get::<String, _>("location")
            .map_err(parse)?
            .parse()
            .map_err(AppError::internal)?,
        condition: row
            .try_get::<String, _>("condition")
            .map_err(parse)?
            .parse()
            .map_err(AppError::internal)?,
        age: row
            .try_get::<String, _>("age")
            .map_err(parse)?
            .parse()
            .map_err(AppError::internal)?,
        external_url: row.try_get("external_url").map_err(parse)?,
        contact: row
            .try_get::<String, _>("contact")
            .map_err(parse)?
            .parse()
            .map_err(AppError::internal)?,
        status: row
            .try_get::<String, _>("status")
            .map_err(parse)?
            .parse()
            .map_err(AppError::internal)?,
        approval: row
            .try_get::<String, _>("approval")
            .map_err(parse)?
            .parse()
            .map_err(AppError::internal)?,
        hidden_reason: row.try_get("hidden_reason").map_err(parse)?,
        added_by: row.try_get("added_by").map_err(parse)?,
        created_at: row.try_get("created_at").map_err(parse)?,
        updated_at: row.try_get("updated_at").map_err(parse)?,
    })
}

#[async_trait]
impl ProductRepo for PgProductRepo {
    async fn insert(&self, product: &Product) -> Result<()> {
        sqlx::query(
            "INSERT INTO products (id, name, description, price, negotiable, category, images, \
             location, condition, age, external_url, contact, status, approval, hidden_reason, \
             added_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.price)
        .bind(product.negotiable)
        .bind(&product.category)
        .bind(&product.images)
        .bind(product.location.as_str())
        .bind(product.condition.as_str())
        .bind(product.age.as_str())
        .bind(&product.external_url)
        .bind(product.contact.as_str())
        .bind(product.status.as_str())
        .bind(product.approval.as_str())
        .bind(&product.hidden_reason)
        .bind(product.added_by)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .map(|row| row_to_product(&row))
            .transpose()
    }

    async fn apply_patch(&self, id: Uuid, patch: &ProductPatch) -> Result<()> {
        let mut qb = QueryBuilder::new("UPDATE products SET updated_at = now()");
        if let Some(name) = &patch.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(description) = &patch.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(price) = &patch.price {
            qb.push(", price = ").push_bind(price);
        }
        if let Some(negotiable) = patch.negotiable {
            qb.push(", negotiable = ").push_bind(negotiable);
        }
        if let Some(category) = &patch.category {
            qb.push(", category = ").push_bind(category);
        }
        if let Some(location) = patch.location {
            qb.push(", location = ").push_bind(location.as_str());
        }
        if let Some(condition) = patch.condition {
            qb.push(", condition = ").push_bind(condition.as_str());
        }
        if let Some(age) = patch.age {
            qb.push(", age = ").push_bind(age.as_str());
        }
        if let Some(external_url) = &patch.external_url {
            qb.push(", external_url = ").push_bind(external_url);
        }
        if let Some(contact) = patch.contact {
            qb.push(", contact = ").push_bind(contact.as_str());
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.build().execute(&self.pool).await.map_err(internal)?;
        Ok(())
    }

    async fn set_status(&self, id: Uuid, status: ProductStatus) -> Result<()> {
        sqlx::query("UPDATE products SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn set_approval<'a>(
        &self,
        id: Uuid,
        approval: ApprovalStatus,
        reason: Option<&'a str>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE products SET approval = $2, hidden_reason = $3, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(approval.as_str())
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(internal)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn list_public(
        &self,
        query: &ProductQuery,
        excluded_sellers: &[Uuid],
    ) -> Result<Vec<Product>> {
        let mut qb = QueryBuilder::new("SELECT * FROM products WHERE approval = ");
        qb.push_bind(ApprovalStatus::Approved.as_str());

        if !excluded_sellers.is_empty() {
            qb.push(" AND NOT (added_by = ANY(")
                .push_bind(excluded_sellers.to_vec())
                .push("))");
        }
        if let Some(category) = &query.category {
            qb.push(" AND category = ").push_bind(category);
        }
        if let Some(location) = query.location {
            qb.push(" AND location = ").push_bind(location.as_str());
        }
        if let Some(condition) = query.condition {
            qb.push(" AND condition = ").push_bind(condition.as_str());
        }
        if let Some(status) = query.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(text) = &query.text {
            let pattern = format!("%{}%", text.trim());
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR category ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY created_at DESC");

        let rows = qb.build().fetch_all(&self.pool).await.map_err(internal)?;
        rows.iter().map(row_to_product).collect()
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Product>> {
        let rows =
            sqlx::query("SELECT * FROM products WHERE added_by = $1 ORDER BY created_at DESC")
                .bind(owner)
                .fetch_all(&self.pool)
                .await
                .map_err(internal)?;
        rows.iter().map(row_to_product).collect()
    }

    async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        let rows = sqlx::query("SELECT * FROM products WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;
        rows.iter().map(row_to_product).collect()
    }

    async fn list_all(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query("SELECT * FROM products ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;
        rows.iter().map(row_to_product).collect()
    }

    async fn count_created_since(&self, owner: Uuid, since: DateTime<Utc>) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS recent FROM products WHERE added_by = $1 AND created_at >= $2",
        )
        .bind(owner)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(internal)?;
        row.try_get("recent").map_err(AppError::internal)
    }

    async fn counts(&self) -> Result<ProductCounts> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, \
             COUNT(*) FILTER (WHERE approval = 'Hidden') AS hidden, \
             COUNT(*) FILTER (WHERE status = 'Sold') AS sold \
             FROM products",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(internal)?;
        Ok(ProductCounts {
            total: row.try_get("total").map_err(AppError::internal)?,
            hidden: row.try_get("hidden").map_err(AppError::internal)?,
            sold: row.try_get("sold").map_err(AppError::internal)?,
        })
    }
}
