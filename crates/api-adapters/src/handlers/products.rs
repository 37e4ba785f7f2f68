//! Public feed, search, filters, and owner listing operations.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use domains::{AppError, NewProduct, ProductPatch, ProductQuery};

use crate::error::{ApiError, ApiResult};
use crate::extract::AuthUser;
use crate::handlers::parse_opt;
use crate::state::AppState;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub category: Option<String>,
    pub location: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    pub category: Option<String>,
    pub location: Option<String>,
    pub condition: Option<String>,
    pub status: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

pub async fn get_products(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<impl IntoResponse> {
    let products = state
        .listings
        .public_listings(ProductQuery {
            category: query.category,
            location: parse_opt(query.location.as_ref())?,
            ..ProductQuery::default()
        })
        .await?;
    Ok(Json(json!({ "products": products })))
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let products = state.listings.search(&query.q).await?;
    Ok(Json(json!({ "products": products })))
}

pub async fn filter_products(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<impl IntoResponse> {
    let products = state
        .listings
        .public_listings(ProductQuery {
            category: query.category,
            location: parse_opt(query.location.as_ref())?,
            condition: parse_opt(query.condition.as_ref())?,
            status: parse_opt(query.status.as_ref())?,
            min_price: query.min_price,
            max_price: query.max_price,
            text: None,
        })
        .await?;
    Ok(Json(json!({ "products": products })))
}

pub async fn my_products(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<impl IntoResponse> {
    let products = state.listings.my_products(user.id).await?;
    let remaining = state.listings.remaining_quota(user.id).await?;
    Ok(Json(json!({ "products": products, "remainingQuota": remaining })))
}

/// Multipart form: the listing's text fields plus one or two `images` file
/// parts. The quota check inside the service runs before any upload work.
pub async fn add_product(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut fields = Map::new();
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError(AppError::Validation("malformed multipart payload".into())))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        if name == "images" || name == "image" {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let data = field
                .bytes()
                .await
                .map_err(|_| ApiError(AppError::Validation("unreadable image upload".into())))?;
            uploads.push((data.to_vec(), content_type));
        } else {
            let text = field
                .text()
                .await
                .map_err(|_| ApiError(AppError::Validation(format!("unreadable field {name}"))))?;
            let value = if name == "negotiable" {
                Value::Bool(text == "true" || text == "1")
            } else {
                Value::String(text)
            };
            fields.insert(name, value);
        }
    }

    let input: NewProduct = serde_json::from_value(Value::Object(fields))
        .map_err(|err| ApiError(AppError::Validation(format!("invalid listing: {err}"))))?;

    let product = state.listings.create(user.id, input, uploads).await?;
    let remaining = state.listings.remaining_quota(user.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "listing created",
            "product": product,
            "remainingQuota": remaining,
        })),
    ))
}

pub async fn update_product(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProductPatch>,
) -> ApiResult<impl IntoResponse> {
    let product = state.listings.update(user.id, id, patch).await?;
    Ok(Json(json!({ "message": "listing updated", "product": product })))
}

pub async fn update_product_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let product = state.listings.toggle_status(user.id, id).await?;
    Ok(Json(json!({
        "message": "status updated",
        "product": product,
    })))
}

pub async fn delete_product(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.listings.delete_own(user.id, id).await?;
    Ok(Json(json!({ "message": "listing deleted" })))
}
