//! Listing and moderation workflow.
//!
//! Mediates every Product state transition and what the public feed shows.
//! Public queries always intersect `approval = Approved` with the
//! blocked-seller exclusion, whichever filter endpoint they came through.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use domains::{
    AppError, ApprovalStatus, DashboardCounts, ImageStore, MessageRepo, NewProduct, Product,
    ProductPatch, ProductQuery, ProductRepo, ProductStatus, Result, UserRepo,
};

use crate::blocked_cache::BlockedSellerCache;
use crate::quota::ListingQuota;

/// Listings carry one or two images.
pub const MAX_IMAGES: usize = 2;

pub struct ListingService {
    products: Arc<dyn ProductRepo>,
    users: Arc<dyn UserRepo>,
    messages: Arc<dyn MessageRepo>,
    images: Arc<dyn ImageStore>,
    cache: Arc<BlockedSellerCache>,
    quota: ListingQuota,
}

impl ListingService {
    pub fn new(
        products: Arc<dyn ProductRepo>,
        users: Arc<dyn UserRepo>,
        messages: Arc<dyn MessageRepo>,
        images: Arc<dyn ImageStore>,
        cache: Arc<BlockedSellerCache>,
        quota: ListingQuota,
    ) -> Self {
        Self {
            products,
            users,
            messages,
            images,
            cache,
            quota,
        }
    }

    pub fn quota(&self) -> &ListingQuota {
        &self.quota
    }

    pub async fn remaining_quota(&self, owner: Uuid) -> Result<u32> {
        self.quota.remaining(self.products.as_ref(), owner).await
    }

    /// Creates a listing. The quota check runs before anything else so an
    /// over-quota request never pays for validation or image uploads.
    pub async fn create(
        &self,
        owner: Uuid,
        input: NewProduct,
        uploads: Vec<(Vec<u8>, String)>,
    ) -> Result<Product> {
        self.quota.check(self.products.as_ref(), owner).await?;

        validate_listing_input(&input)?;
        if uploads.is_empty() {
            return Err(AppError::Validation(
                "at least one product image is required".into(),
            ));
        }
        if uploads.len() > MAX_IMAGES {
            return Err(AppError::Validation(format!(
                "at most {MAX_IMAGES} images per listing"
            )));
        }

        let mut images = Vec::with_capacity(uploads.len());
        for (data, content_type) in uploads {
            images.push(self.images.store(data, &content_type).await?);
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: input.name.trim().to_owned(),
            description: input.description.trim().to_owned(),
            price: input.price.trim().to_owned(),
            negotiable: input.negotiable,
            category: input.category.trim().to_owned(),
            images,
            location: input.location,
            condition: input.condition,
            age: input.age,
            external_url: input.external_url,
            contact: input.contact,
            status: ProductStatus::Available,
            approval: ApprovalStatus::Approved,
            hidden_reason: None,
            added_by: owner,
            created_at: now,
            updated_at: now,
        };
        self.products.insert(&product).await?;
        info!(product = %product.id, %owner, "listing created");
        Ok(product)
    }

    /// Public feed, search and multi-dimension filter all funnel through
    /// here: approved rows only, blocked sellers excluded, then the price
    /// range applied with read-time tolerance (a non-numeric stored price
    /// never matches a bound).
    pub async fn public_listings(&self, query: ProductQuery) -> Result<Vec<Product>> {
        let blocked = self.cache.ids(self.users.as_ref()).await?;
        let mut rows = self.products.list_public(&query, &blocked).await?;

        if query.min_price.is_some() || query.max_price.is_some() {
            rows.retain(|p| match p.numeric_price() {
                Some(price) => {
                    query.min_price.is_none_or(|min| price >= min)
                        && query.max_price.is_none_or(|max| price <= max)
                }
                None => false,
            });
        }
        Ok(rows)
    }

    /// Free-text search: approved + available only.
    pub async fn search(&self, text: &str) -> Result<Vec<Product>> {
        self.public_listings(ProductQuery {
            text: Some(text.to_owned()),
            status: Some(ProductStatus::Available),
            ..ProductQuery::default()
        })
        .await
    }

    /// The owner's own listings, hidden ones included.
    pub async fn my_products(&self, owner: Uuid) -> Result<Vec<Product>> {
        self.products.list_by_owner(owner).await
    }

    pub async fn liked_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        self.products.list_by_ids(ids).await
    }

    /// Partial update by the owner. Omitted fields keep their stored value.
    pub async fn update(&self, requester: Uuid, id: Uuid, patch: ProductPatch) -> Result<Product> {
        self.owned(requester, id).await?;
        if let Some(price) = &patch.price {
            if price.trim().is_empty() {
                return Err(AppError::Validation("price cannot be empty".into()));
            }
        }
        if !patch.is_empty() {
            self.products.apply_patch(id, &patch).await?;
        }
        self.require(id).await
    }

    /// Owner-only Available <-> Sold toggle. Runs independently of the
    /// moderation flag; a hidden listing can still be marked sold.
    pub async fn toggle_status(&self, requester: Uuid, id: Uuid) -> Result<Product> {
        let product = self.owned(requester, id).await?;
        let next = match product.status {
            ProductStatus::Available => ProductStatus::Sold,
            ProductStatus::Sold => ProductStatus::Available,
        };
        self.products.set_status(id, next).await?;
        self.require(id).await
    }

    pub async fn delete_own(&self, requester: Uuid, id: Uuid) -> Result<()> {
        let product = self.owned(requester, id).await?;
        self.remove_images(&product).await;
        self.products.delete(id).await
    }

    // ── Admin moderation ────────────────────────────────────────────────

    pub async fn list_all(&self) -> Result<Vec<Product>> {
        self.products.list_all().await
    }

    pub async fn hide(&self, id: Uuid, reason: &str) -> Result<Product> {
        self.require(id).await?;
        self.products
            .set_approval(id, ApprovalStatus::Hidden, Some(reason))
            .await?;
        info!(product = %id, reason, "listing hidden");
        self.require(id).await
    }

    pub async fn unhide(&self, id: Uuid) -> Result<Product> {
        self.require(id).await?;
        self.products
            .set_approval(id, ApprovalStatus::Approved, None)
            .await?;
        info!(product = %id, "listing unhidden");
        self.require(id).await
    }

    /// Admin delete: permanent and unconditional, no ownership check.
    pub async fn admin_delete(&self, id: Uuid) -> Result<()> {
        let product = self.require(id).await?;
        self.remove_images(&product).await;
        self.products.delete(id).await
    }

    /// Blocks the seller and synchronously invalidates the blocked-seller
    /// cache before returning, so the next public query already excludes
    /// their inventory.
    pub async fn block_seller(&self, id: Uuid, reason: &str) -> Result<()> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User", id.to_string()))?;
        self.users.set_blocked(id, Some(reason)).await?;
        self.cache.invalidate().await;
        info!(user = %id, reason, "seller blocked");
        Ok(())
    }

    pub async fn unblock_seller(&self, id: Uuid) -> Result<()> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User", id.to_string()))?;
        self.users.set_blocked(id, None).await?;
        self.cache.invalidate().await;
        info!(user = %id, "seller unblocked");
        Ok(())
    }

    pub async fn dashboard(&self) -> Result<DashboardCounts> {
        let products = self.products.counts().await?;
        let users = self.users.counts().await?;
        let unread = self.messages.count_unread().await?;
        Ok(DashboardCounts {
            users: users.total,
            blocked_users: users.blocked,
            products: products.total,
            hidden_products: products.hidden,
            sold_products: products.sold,
            unread_messages: unread,
        })
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    async fn require(&self, id: Uuid) -> Result<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product", id.to_string()))
    }

    async fn owned(&self, requester: Uuid, id: Uuid) -> Result<Product> {
        let product = self.require(id).await?;
        if product.added_by != requester {
            return Err(AppError::Forbidden(
                "only the listing owner may do this".into(),
            ));
        }
        Ok(product)
    }

    /// Best effort: a dangling file on the image host is not worth failing
    /// the delete over.
    async fn remove_images(&self, product: &Product) {
        for reference in &product.images {
            if let Err(err) = self.images.remove(reference).await {
                warn!(product = %product.id, %err, "failed to remove image");
            }
        }
    }
}

fn validate_listing_input(input: &NewProduct) -> Result<()> {
    let required = [
        ("name", &input.name),
        ("description", &input.description),
        ("price", &input.price),
        ("category", &input.category),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{
        AgeBucket, Condition, ContactPreference, Location, MockImageStore, MockMessageRepo,
        MockProductRepo, MockUserRepo,
    };
    use std::time::Duration;

    fn listing_input() -> NewProduct {
        NewProduct {
            name: "Scientific calculator".into(),
            description: "FX-991, works fine".into(),
            price: "700".into(),
            negotiable: false,
            category: "Electronics".into(),
            location: Location::Bh1,
            condition: Condition::Good,
            age: AgeBucket::OneToTwoYears,
            external_url: None,
            contact: ContactPreference::Chat,
        }
    }

    fn service(products: MockProductRepo, users: MockUserRepo, images: MockImageStore) -> ListingService {
        ListingService::new(
            Arc::new(products),
            Arc::new(users),
            Arc::new(MockMessageRepo::new()),
            Arc::new(images),
            Arc::new(BlockedSellerCache::new(Duration::from_secs(60))),
            ListingQuota::new(5, 24),
        )
    }

    #[tokio::test]
    async fn quota_rejection_short_circuits_before_validation_and_upload() {
        let mut products = MockProductRepo::new();
        products
            .expect_count_created_since()
            .returning(|_, _| Ok(5));
        // No expectations on the image store: any call would fail the test.
        let svc = service(products, MockUserRepo::new(), MockImageStore::new());

        let mut input = listing_input();
        input.name.clear(); // invalid on purpose; quota must win
        let err = svc
            .create(Uuid::new_v4(), input, vec![(vec![1], "image/jpeg".into())])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn listing_requires_at_least_one_image() {
        let mut products = MockProductRepo::new();
        products
            .expect_count_created_since()
            .returning(|_, _| Ok(0));
        let svc = service(products, MockUserRepo::new(), MockImageStore::new());

        let err = svc
            .create(Uuid::new_v4(), listing_input(), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn create_defaults_available_and_approved() {
        let mut products = MockProductRepo::new();
        products
            .expect_count_created_since()
            .returning(|_, _| Ok(0));
        products.expect_insert().times(1).returning(|p| {
            assert_eq!(p.status, ProductStatus::Available);
            assert_eq!(p.approval, ApprovalStatus::Approved);
            Ok(())
        });
        let mut images = MockImageStore::new();
        images
            .expect_store()
            .times(1)
            .returning(|_, _| Ok("/static/uploads/a.jpg".into()));
        let svc = service(products, MockUserRepo::new(), images);

        let product = svc
            .create(
                Uuid::new_v4(),
                listing_input(),
                vec![(vec![1, 2], "image/jpeg".into())],
            )
            .await
            .unwrap();
        assert_eq!(product.images, vec!["/static/uploads/a.jpg".to_string()]);
    }

    #[tokio::test]
    async fn mutation_by_non_owner_is_forbidden() {
        let owner = Uuid::new_v4();
        let id = Uuid::new_v4();
        let mut products = MockProductRepo::new();
        products.expect_find_by_id().returning(move |pid| {
            let mut p = sample(owner);
            p.id = pid;
            Ok(Some(p))
        });
        let svc = service(products, MockUserRepo::new(), MockImageStore::new());

        let stranger = Uuid::new_v4();
        let err = svc
            .update(stranger, id, ProductPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = svc.toggle_status(stranger, id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = svc.delete_own(stranger, id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn price_filter_skips_non_numeric_prices() {
        let owner = Uuid::new_v4();
        let mut cheap = sample(owner);
        cheap.price = "100".into();
        let mut garbage = sample(owner);
        garbage.price = "ask me".into();
        let mut dear = sample(owner);
        dear.price = "9000".into();

        let rows = vec![cheap.clone(), garbage, dear];
        let mut products = MockProductRepo::new();
        products
            .expect_list_public()
            .returning(move |_, _| Ok(rows.clone()));
        let mut users = MockUserRepo::new();
        users.expect_blocked_ids().returning(|| Ok(vec![]));
        let svc = service(products, users, MockImageStore::new());

        let found = svc
            .public_listings(ProductQuery {
                min_price: Some(50.0),
                max_price: Some(500.0),
                ..ProductQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].price, "100");
    }

    #[tokio::test]
    async fn block_seller_invalidates_cache_before_returning() {
        let seller = Uuid::new_v4();
        let mut users = MockUserRepo::new();
        users.expect_find_by_id().returning(move |id| {
            Ok(Some(sample_user(id)))
        });
        users.expect_set_blocked().times(1).returning(|_, reason| {
            assert_eq!(reason, Some("spam listings"));
            Ok(())
        });
        // First public query: nobody blocked. After block + invalidate the
        // cache must refetch and see the seller.
        let mut call = 0;
        users.expect_blocked_ids().times(2).returning(move || {
            call += 1;
            Ok(if call == 1 { vec![] } else { vec![seller] })
        });
        let mut products = MockProductRepo::new();
        products
            .expect_list_public()
            .returning(|_, excluded| {
                let excluded = excluded.to_vec();
                Ok(if excluded.is_empty() {
                    vec![sample(Uuid::new_v4())]
                } else {
                    vec![]
                })
            });
        let svc = service(products, users, MockImageStore::new());

        assert_eq!(
            svc.public_listings(ProductQuery::default()).await.unwrap().len(),
            1
        );
        svc.block_seller(seller, "spam listings").await.unwrap();
        assert!(svc
            .public_listings(ProductQuery::default())
            .await
            .unwrap()
            .is_empty());
    }

    fn sample(owner: Uuid) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Desk lamp".into(),
            description: "Barely used".into(),
            price: "450".into(),
            negotiable: true,
            category: "Furniture".into(),
            images: vec!["/static/uploads/x.jpg".into()],
            location: Location::Bh2,
            condition: Condition::Good,
            age: AgeBucket::UnderSixMonths,
            external_url: None,
            contact: ContactPreference::Chat,
            status: ProductStatus::Available,
            approval: ApprovalStatus::Approved,
            hidden_reason: None,
            added_by: owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_user(id: Uuid) -> domains::User {
        domains::User {
            id,
            email: "seller@college.edu".into(),
            username: "seller".into(),
            password_hash: None,
            mobile: None,
            mobile_verified: false,
            google_id: None,
            liked_products: vec![],
            is_blocked: false,
            blocked_reason: None,
            blocked_at: None,
            created_at: Utc::now(),
        }
    }
}
