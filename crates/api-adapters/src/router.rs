//! Route table. The binary adds CORS, request ids, and static file serving
//! on top of this.

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{accounts, admin, products, support};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        // public
        .route("/signup", post(accounts::signup))
        .route("/login", post(accounts::login))
        .route("/google-login", post(accounts::google_login))
        .route("/get-products", get(products::get_products))
        .route("/search", get(products::search))
        .route("/filter-products", get(products::filter_products))
        .route("/exit-feedback", post(support::submit_exit_feedback))
        .route(
            "/exit-feedback/check/{session_id}",
            get(support::check_exit_feedback),
        )
        // signed-in
        .route("/my-products", get(products::my_products))
        .route("/add-product", post(products::add_product))
        .route("/update-product/{id}", put(products::update_product))
        .route(
            "/update-product-status/{id}",
            put(products::update_product_status),
        )
        .route("/delete-product/{id}", delete(products::delete_product))
        .route("/like-product", post(accounts::like_product))
        .route("/liked-products", get(accounts::liked_products))
        .route("/contact-admin", post(support::contact_admin))
        .route("/my-messages", get(support::my_messages))
        .route("/request-otp", post(accounts::request_otp))
        .route("/verify-otp", post(accounts::verify_otp))
        .route("/update-mobile", put(accounts::update_mobile))
        // moderation
        .route("/admin/products", get(admin::list_products))
        .route("/admin/hide-product/{id}", put(admin::hide_product))
        .route("/admin/unhide-product/{id}", put(admin::unhide_product))
        .route("/admin/delete-product/{id}", delete(admin::delete_product))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/block-user/{id}", put(admin::block_user))
        .route("/admin/unblock-user/{id}", put(admin::unblock_user))
        .route("/admin/messages", get(admin::list_messages))
        .route("/admin/messages/{id}/read", put(admin::read_message))
        .route("/admin/messages/{id}/resolve", put(admin::resolve_message))
        .route("/admin/dashboard", get(admin::dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
