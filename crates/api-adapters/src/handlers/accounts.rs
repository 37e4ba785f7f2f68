//! Signup, logins, OTP mobile verification, wishlist.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use services::accounts::Session;
use services::OtpOutcome;

use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    pub id_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileRequest {
    pub mobile: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub mobile: String,
    pub code: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub product_id: Uuid,
}

fn session_body(message: &str, session: Session) -> serde_json::Value {
    json!({ "message": message, "user": session.user, "token": session.token })
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = state
        .accounts
        .signup(&req.email, &req.username, &req.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(session_body("account created", session)),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = state.accounts.login(&req.email, &req.password).await?;
    Ok(Json(session_body("login successful", session)))
}

pub async fn google_login(
    State(state): State<AppState>,
    Json(req): Json<GoogleLoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = state.accounts.google_login(&req.id_token).await?;
    Ok(Json(session_body("login successful", session)))
}

pub async fn request_otp(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<MobileRequest>,
) -> ApiResult<impl IntoResponse> {
    let code = state.accounts.request_otp(&user, &req.mobile).await?;
    // SMS delivery is out of band and not wired up; the log line keeps the
    // flow testable in local environments.
    debug!(user = %user.id, %code, "verification code issued");
    Ok(Json(json!({ "message": "verification code sent" })))
}

pub async fn verify_otp(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<VerifyOtpRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state
        .accounts
        .verify_otp(&user, &req.mobile, &req.code)
        .await?;
    Ok(match outcome {
        OtpOutcome::Verified => Json(json!({
            "message": "mobile number verified",
            "verified": true,
        })),
        OtpOutcome::WrongCode { remaining } => Json(json!({
            "message": "wrong code",
            "verified": false,
            "attemptsLeft": remaining,
        })),
    })
}

pub async fn update_mobile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<MobileRequest>,
) -> ApiResult<impl IntoResponse> {
    state.accounts.update_mobile(&user, &req.mobile).await?;
    Ok(Json(json!({ "message": "mobile number updated" })))
}

pub async fn like_product(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<LikeRequest>,
) -> ApiResult<impl IntoResponse> {
    let liked = state.accounts.toggle_like(&user, req.product_id).await?;
    Ok(Json(json!({
        "message": if liked { "added to wishlist" } else { "removed from wishlist" },
        "liked": liked,
    })))
}

pub async fn liked_products(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<impl IntoResponse> {
    let products = state.listings.liked_products(&user.liked_products).await?;
    Ok(Json(json!({ "products": products })))
}
