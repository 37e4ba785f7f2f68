//! Time-bounded snapshot of blocked seller ids.
//!
//! Every public listing query excludes blocked sellers; this cache keeps that
//! from turning into a user-collection scan per request. It is an explicit
//! struct with an explicit lifecycle so the TTL and invalidation are testable
//! without process restarts.

use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use domains::{Result, UserRepo};

struct Snapshot {
    ids: Vec<Uuid>,
    fetched_at: Instant,
}

pub struct BlockedSellerCache {
    ttl: Duration,
    inner: RwLock<Option<Snapshot>>,
}

impl BlockedSellerCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(None),
        }
    }

    /// Returns the cached id list while its age is under the TTL; otherwise
    /// refetches from the store and replaces the snapshot.
    ///
    /// The lock is not held across the store call, so concurrent refreshes
    /// can both fetch; last write wins over the same ground truth. A store
    /// failure propagates — past the TTL there is no stale fallback.
    pub async fn ids(&self, users: &dyn UserRepo) -> Result<Vec<Uuid>> {
        if let Some(snapshot) = self.inner.read().await.as_ref() {
            if snapshot.fetched_at.elapsed() < self.ttl {
                return Ok(snapshot.ids.clone());
            }
        }

        let ids = users.blocked_ids().await?;
        debug!(count = ids.len(), "refreshed blocked-seller snapshot");
        *self.inner.write().await = Some(Snapshot {
            ids: ids.clone(),
            fetched_at: Instant::now(),
        });
        Ok(ids)
    }

    /// Drops the snapshot so the next [`ids`](Self::ids) call refetches.
    /// Block/unblock writes call this before their HTTP response is sent.
    pub async fn invalidate(&self) {
        *self.inner.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::MockUserRepo;

    fn repo_expecting(calls: usize, ids: Vec<Uuid>) -> MockUserRepo {
        let mut repo = MockUserRepo::new();
        repo.expect_blocked_ids()
            .times(calls)
            .returning(move || Ok(ids.clone()));
        repo
    }

    #[tokio::test]
    async fn repeated_calls_within_ttl_hit_store_once() {
        let blocked = vec![Uuid::new_v4()];
        let repo = repo_expecting(1, blocked.clone());
        let cache = BlockedSellerCache::new(Duration::from_secs(60));

        assert_eq!(cache.ids(&repo).await.unwrap(), blocked);
        assert_eq!(cache.ids(&repo).await.unwrap(), blocked);
        assert_eq!(cache.ids(&repo).await.unwrap(), blocked);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch_regardless_of_remaining_ttl() {
        let repo = repo_expecting(2, vec![]);
        let cache = BlockedSellerCache::new(Duration::from_secs(3600));

        cache.ids(&repo).await.unwrap();
        cache.invalidate().await;
        cache.ids(&repo).await.unwrap();
    }

    #[tokio::test]
    async fn expired_snapshot_refetches() {
        let repo = repo_expecting(2, vec![]);
        let cache = BlockedSellerCache::new(Duration::from_millis(10));

        cache.ids(&repo).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        cache.ids(&repo).await.unwrap();
    }

    #[tokio::test]
    async fn store_failure_propagates_without_stale_fallback() {
        let mut repo = MockUserRepo::new();
        repo.expect_blocked_ids()
            .times(1)
            .returning(|| Err(domains::AppError::internal("store down")));
        let cache = BlockedSellerCache::new(Duration::from_secs(60));

        assert!(cache.ids(&repo).await.is_err());
    }
}
