//! Seeds a local database with the moderator account and a handful of demo
//! listings. Safe to re-run: existing rows are left alone.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use secrecy::ExposeSecret;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use auth_adapters::Argon2Hasher;
use configs::Settings;
use domains::{
    AgeBucket, ApprovalStatus, Condition, ContactPreference, ImageStore, Location, PasswordHasher,
    Product, ProductRepo, ProductStatus, User, UserRepo,
};
use storage_adapters::postgres::{PgProductRepo, PgUserRepo};
use storage_adapters::LocalImageStore;

/// 1x1 transparent PNG, stored once per demo listing so every seeded row
/// carries a resolvable image reference.
const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0a, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = Settings::load().context("loading configuration")?;
    let pool = storage_adapters::postgres::connect(
        settings.database.url.expose_secret(),
        settings.database.max_connections,
    )
    .await
    .context("connecting to postgres")?;

    let users: Arc<dyn UserRepo> = Arc::new(PgUserRepo::new(pool.clone()));
    let products: Arc<dyn ProductRepo> = Arc::new(PgProductRepo::new(pool));
    let media = LocalImageStore::new(&settings.media.upload_dir, &settings.media.public_base);
    let hasher = Argon2Hasher::default();

    let admin = ensure_user(
        &*users,
        &hasher,
        &settings.auth.admin_email,
        "Moderator",
        "admin-password",
    )
    .await?;
    let seller = ensure_user(
        &*users,
        &hasher,
        &format!("demo.seller@{}", settings.auth.allowed_email_domain),
        "Demo Seller",
        "demo-password",
    )
    .await?;
    info!(admin = %admin, seller = %seller, "accounts ready");

    let demos = [
        (
            "Study table",
            "Solid wood desk, fits a laptop and two books.",
            "1200",
            "Furniture",
            Location::Bh1,
            Condition::Good,
        ),
        (
            "Scientific calculator",
            "FX-991ES, barely used after first year.",
            "650",
            "Electronics",
            Location::AcademicBlock,
            Condition::LikeNew,
        ),
        (
            "Badminton racket",
            "Comes with a spare grip.",
            "400",
            "Sports",
            Location::Gh1,
            Condition::Fair,
        ),
    ];
    let mut created = 0;
    let existing = products.list_by_owner(seller).await?;
    for spec in demos {
        if existing.iter().any(|p| p.name == spec.0) {
            continue;
        }
        let image = media.store(PLACEHOLDER_PNG.to_vec(), "image/png").await?;
        products.insert(&demo_product(seller, image, spec)).await?;
        created += 1;
    }
    info!(created, "demo listings seeded");
    Ok(())
}

async fn ensure_user(
    users: &dyn UserRepo,
    hasher: &Argon2Hasher,
    email: &str,
    username: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = users.find_by_email(email).await? {
        return Ok(existing.id);
    }
    let user = User {
        id: Uuid::new_v4(),
        email: email.to_owned(),
        username: username.to_owned(),
        password_hash: Some(hasher.hash(password)?),
        mobile: None,
        mobile_verified: false,
        google_id: None,
        liked_products: vec![],
        is_blocked: false,
        blocked_reason: None,
        blocked_at: None,
        created_at: Utc::now(),
    };
    users.insert(&user).await?;
    info!(%email, "created account");
    Ok(user.id)
}

/// (name, description, price, category, location, condition)
type DemoSpec = (&'static str, &'static str, &'static str, &'static str, Location, Condition);

fn demo_product(owner: Uuid, image: String, spec: DemoSpec) -> Product {
    let (name, description, price, category, location, condition) = spec;
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        description: description.to_owned(),
        price: price.to_owned(),
        negotiable: true,
        category: category.to_owned(),
        images: vec![image],
        location,
        condition,
        age: AgeBucket::SixToTwelveMonths,
        external_url: None,
        contact: ContactPreference::Chat,
        status: ProductStatus::Available,
        approval: ApprovalStatus::Approved,
        hidden_reason: None,
        added_by: owner,
        created_at: now,
        updated_at: now,
    }
}
