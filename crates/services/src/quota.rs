//! Rolling-window listing quota.
//!
//! A user may create at most `limit` listings per `window_hours` measured
//! backward from now, not aligned to calendar days. The check is a fresh
//! store count on every call; two concurrent creations can both pass and
//! land `limit + 1` rows. That over-admission is an accepted soft-quota
//! race, not something to lock away.

use chrono::{Duration, Utc};
use uuid::Uuid;

use domains::{AppError, ProductRepo, Result};

#[derive(Debug, Clone, Copy)]
pub struct ListingQuota {
    limit: u32,
    window_hours: i64,
}

impl ListingQuota {
    pub fn new(limit: u32, window_hours: i64) -> Self {
        Self {
            limit,
            window_hours,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    async fn recent_count(&self, products: &dyn ProductRepo, user: Uuid) -> Result<i64> {
        let since = Utc::now() - Duration::hours(self.window_hours);
        products.count_created_since(user, since).await
    }

    /// How many more listings the user may create right now.
    pub async fn remaining(&self, products: &dyn ProductRepo, user: Uuid) -> Result<u32> {
        let used = self.recent_count(products, user).await?.max(0);
        Ok(self.limit.saturating_sub(used.min(i64::from(u32::MAX)) as u32))
    }

    /// Rejects with [`AppError::RateLimited`] when the window is full.
    pub async fn check(&self, products: &dyn ProductRepo, user: Uuid) -> Result<()> {
        if self.recent_count(products, user).await? >= i64::from(self.limit) {
            return Err(AppError::RateLimited {
                limit: self.limit,
                window_hours: self.window_hours,
            });
        }
        Ok(())
    }
}
