//! SellBUY server binary: wires the Postgres and local-media adapters into
//! the services and serves the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use secrecy::ExposeSecret;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api_adapters::{router, AppState};
use auth_adapters::{Argon2Hasher, GoogleVerifier, JwtCodec};
use configs::Settings;
use services::{
    AccountService, AdminPolicy, BlockedSellerCache, ListingQuota, ListingService, OtpService,
    SupportService,
};
use storage_adapters::postgres::{
    PgFeedbackRepo, PgMessageRepo, PgOtpRepo, PgProductRepo, PgUserRepo,
};
use storage_adapters::LocalImageStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "sellbuy=debug,info".into()),
        )
        .init();

    let settings = Settings::load().context("loading configuration")?;

    let pool = storage_adapters::postgres::connect(
        settings.database.url.expose_secret(),
        settings.database.max_connections,
    )
    .await
    .context("connecting to postgres")?;

    let users = Arc::new(PgUserRepo::new(pool.clone()));
    let products = Arc::new(PgProductRepo::new(pool.clone()));
    let otps = Arc::new(PgOtpRepo::new(pool.clone()));
    let messages = Arc::new(PgMessageRepo::new(pool.clone()));
    let feedback = Arc::new(PgFeedbackRepo::new(pool));
    let images = Arc::new(LocalImageStore::new(
        &settings.media.upload_dir,
        &settings.media.public_base,
    ));

    let hasher = Arc::new(Argon2Hasher::default());
    let tokens = Arc::new(JwtCodec::new(
        &settings.auth.jwt_secret,
        settings.auth.password_token_hours,
        settings.auth.google_token_hours,
    ));
    let identity = Arc::new(GoogleVerifier::new(settings.auth.google_client_id.clone()));

    let cache = Arc::new(BlockedSellerCache::new(Duration::from_secs(
        settings.cache.blocked_ttl_secs,
    )));
    let quota = ListingQuota::new(
        settings.quota.listings_per_window,
        settings.quota.window_hours,
    );

    let accounts = Arc::new(AccountService::new(
        users.clone(),
        hasher,
        tokens,
        identity,
        OtpService::new(otps),
        settings.auth.allowed_email_domain.clone(),
    ));
    let listings = Arc::new(ListingService::new(
        products,
        users,
        messages.clone(),
        images,
        cache,
        quota,
    ));
    let support = Arc::new(SupportService::new(messages, feedback));
    let admin = AdminPolicy::new(settings.auth.admin_email.clone());

    let state = AppState::new(accounts, listings, support, admin);

    let app = router(state)
        .nest_service(
            &settings.media.public_base,
            ServeDir::new(&settings.media.upload_dir),
        )
        .layer(cors_layer(&settings.server.allowed_origins)?)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("shut down cleanly");
    Ok(())
}

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin {origin}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!(%err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("ctrl-c received"),
        _ = terminate => info!("SIGTERM received"),
    }
}
