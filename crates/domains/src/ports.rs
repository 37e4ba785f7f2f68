//! # Port Traits
//!
//! Contracts between the service layer and the adapters. Every adapter crate
//! implements one or more of these; the `testing` feature exposes mockall
//! mocks (`MockUserRepo`, ...) for external test crates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    ApprovalStatus, ExitFeedback, ExternalIdentity, LoginMethod, Message, OtpRecord, Product,
    ProductCounts, ProductPatch, ProductQuery, ProductStatus, User, UserCounts,
};

/// Persistence contract for accounts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn insert(&self, user: &User) -> Result<()>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn update_mobile(&self, id: Uuid, mobile: &str) -> Result<()>;
    async fn set_mobile_verified(&self, id: Uuid, verified: bool) -> Result<()>;
    async fn attach_google_id(&self, id: Uuid, google_id: &str) -> Result<()>;
    /// Adds or removes `product` from the user's liked set.
    async fn set_like(&self, id: Uuid, product: Uuid, liked: bool) -> Result<()>;
    /// Identifiers of every currently blocked user. Ground truth for the
    /// blocked-seller cache.
    async fn blocked_ids(&self) -> Result<Vec<Uuid>>;
    /// `Some(reason)` blocks, `None` unblocks.
    async fn set_blocked<'a>(&self, id: Uuid, reason: Option<&'a str>) -> Result<()>;
    async fn list_all(&self) -> Result<Vec<User>>;
    async fn counts(&self) -> Result<UserCounts>;
}

/// Persistence contract for listings.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProductRepo: Send + Sync {
    async fn insert(&self, product: &Product) -> Result<()>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>>;
    /// Partial update: `None` fields in the patch keep their stored value.
    async fn apply_patch(&self, id: Uuid, patch: &ProductPatch) -> Result<()>;
    async fn set_status(&self, id: Uuid, status: ProductStatus) -> Result<()>;
    async fn set_approval<'a>(
        &self,
        id: Uuid,
        approval: ApprovalStatus,
        reason: Option<&'a str>,
    ) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    /// Approved listings matching `query`, excluding any seller in
    /// `excluded_sellers`. Price-range filtering is applied by the caller
    /// (read-time tolerance for non-numeric stored prices).
    async fn list_public(
        &self,
        query: &ProductQuery,
        excluded_sellers: &[Uuid],
    ) -> Result<Vec<Product>>;
    /// The owner's own listings, unfiltered by approval or blocking.
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Product>>;
    async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>>;
    async fn list_all(&self) -> Result<Vec<Product>>;
    /// How many listings `owner` created at or after `since`. Feeds the
    /// rolling-window quota.
    async fn count_created_since(&self, owner: Uuid, since: DateTime<Utc>) -> Result<i64>;
    async fn counts(&self) -> Result<ProductCounts>;
}

/// Persistence contract for verification codes.
///
/// "Live" means unexpired: implementations must treat an expired record as
/// absent, matching a store-side TTL deletion.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait OtpRepo: Send + Sync {
    async fn insert(&self, record: &OtpRecord) -> Result<()>;
    async fn find_live(&self, mobile: &str, user: Uuid) -> Result<Option<OtpRecord>>;
    /// Atomically increments the attempt counter and returns the new value.
    /// Must be a single conditional store operation, not read-then-write.
    async fn bump_attempts(&self, mobile: &str, user: Uuid) -> Result<i32>;
    async fn mark_verified(&self, mobile: &str, user: Uuid) -> Result<()>;
    async fn delete_pair(&self, mobile: &str, user: Uuid) -> Result<()>;
}

/// Persistence contract for support tickets.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MessageRepo: Send + Sync {
    async fn insert(&self, message: &Message) -> Result<()>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>>;
    async fn list_by_user(&self, user: Uuid) -> Result<Vec<Message>>;
    async fn list_all(&self) -> Result<Vec<Message>>;
    async fn mark_read(&self, id: Uuid, at: DateTime<Utc>) -> Result<()>;
    async fn resolve<'a>(&self, id: Uuid, reply: Option<&'a str>, at: DateTime<Utc>) -> Result<()>;
    async fn count_unread(&self) -> Result<i64>;
}

/// Persistence contract for exit-feedback analytics.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait FeedbackRepo: Send + Sync {
    /// Inserts unless a record with the same session id exists. Returns
    /// `true` when a row was written, `false` on duplicate.
    async fn insert_if_absent(&self, feedback: &ExitFeedback) -> Result<bool>;
    async fn exists(&self, session_id: &str) -> Result<bool>;
}

/// Image hosting contract: stores raw upload bytes, hands back a public
/// reference for the Product record.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store(&self, data: Vec<u8>, content_type: &str) -> Result<String>;
    async fn remove(&self, reference: &str) -> Result<()>;
}

/// One-way credential hashing.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Session-token issue/decode. Claims carry only the user id, the login
/// method and an expiry; callers re-fetch the user on every request.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenCodec: Send + Sync {
    fn issue(&self, user_id: Uuid, method: LoginMethod) -> Result<String>;
    fn decode(&self, token: &str) -> Result<Uuid>;
}

/// External identity (Google) token verification.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<ExternalIdentity>;
}
