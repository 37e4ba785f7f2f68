//! Moderation surface. Every handler here requires the `AdminUser`
//! extractor; there are no per-handler permission checks beyond it.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::AdminUser;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonRequest {
    pub reason: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub reply: Option<String>,
}

pub async fn list_products(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<impl IntoResponse> {
    let products = state.listings.list_all().await?;
    Ok(Json(json!({ "products": products })))
}

pub async fn hide_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ReasonRequest>,
) -> ApiResult<impl IntoResponse> {
    let product = state.listings.hide(id, &req.reason).await?;
    Ok(Json(json!({ "message": "listing hidden", "product": product })))
}

pub async fn unhide_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let product = state.listings.unhide(id).await?;
    Ok(Json(json!({ "message": "listing restored", "product": product })))
}

pub async fn delete_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.listings.admin_delete(id).await?;
    Ok(Json(json!({ "message": "listing deleted" })))
}

pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<impl IntoResponse> {
    let users = state.accounts.list_users().await?;
    Ok(Json(json!({ "users": users })))
}

pub async fn block_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ReasonRequest>,
) -> ApiResult<impl IntoResponse> {
    state.listings.block_seller(id, &req.reason).await?;
    Ok(Json(json!({ "message": "user blocked" })))
}

pub async fn unblock_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.listings.unblock_seller(id).await?;
    Ok(Json(json!({ "message": "user unblocked" })))
}

pub async fn list_messages(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<impl IntoResponse> {
    let messages = state.support.all_messages().await?;
    Ok(Json(json!({ "messages": messages })))
}

pub async fn read_message(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let message = state.support.mark_read(id).await?;
    Ok(Json(json!({ "message": "marked read", "ticket": message })))
}

pub async fn resolve_message(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ResolveRequest>,
) -> ApiResult<impl IntoResponse> {
    let message = state.support.resolve(id, req.reply.as_deref()).await?;
    Ok(Json(json!({ "message": "resolved", "ticket": message })))
}

pub async fn dashboard(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<impl IntoResponse> {
    let counts = state.listings.dashboard().await?;
    Ok(Json(json!({ "counts": counts })))
}
