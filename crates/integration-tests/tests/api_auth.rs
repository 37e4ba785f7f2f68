//! Signup, login and the authentication/admin gates, end to end through
//! the router.


use axum::http::{Method, StatusCode};
use serde_json::json;

use fixtures::{call, env, signup, ADMIN_EMAIL};

#[tokio::test]
async fn signup_then_login_round_trips() {
    let env = env();
    let (_, _) = signup(&env, "asha@college.edu", "asha").await;

    let (status, body) = call(
        &env,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": "asha@college.edu", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().unwrap().contains('.'));
    assert_eq!(body["user"]["email"], "asha@college.edu");
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn wrong_password_and_unknown_email_fail_alike() {
    let env = env();
    signup(&env, "asha@college.edu", "asha").await;

    let (wrong_pw, body_pw) = call(
        &env,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": "asha@college.edu", "password": "nope" })),
    )
    .await;
    let (no_user, body_user) = call(
        &env,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": "ghost@college.edu", "password": "nope" })),
    )
    .await;
    assert_eq!(wrong_pw, StatusCode::UNAUTHORIZED);
    assert_eq!(no_user, StatusCode::UNAUTHORIZED);
    assert_eq!(body_pw["message"], body_user["message"]);
}

#[tokio::test]
async fn foreign_email_domain_cannot_sign_up() {
    let env = env();
    let (status, body) = call(
        &env,
        Method::POST,
        "/signup",
        None,
        Some(json!({ "email": "x@gmail.com", "username": "x", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("college.edu"));
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let env = env();
    signup(&env, "asha@college.edu", "asha").await;
    let (status, _) = call(
        &env,
        Method::POST,
        "/signup",
        None,
        Some(json!({ "email": "asha@college.edu", "username": "other", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn missing_or_garbage_token_is_unauthorized() {
    let env = env();
    let (no_token, _) = call(&env, Method::GET, "/my-products", None, None).await;
    assert_eq!(no_token, StatusCode::UNAUTHORIZED);

    let (garbage, _) = call(&env, Method::GET, "/my-products", Some("not-a-jwt"), None).await;
    assert_eq!(garbage, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn blocking_cuts_off_a_still_valid_token() {
    let env = env();
    let (id, token) = signup(&env, "seller@college.edu", "seller").await;

    let (before, _) = call(&env, Method::GET, "/my-products", Some(&token), None).await;
    assert_eq!(before, StatusCode::OK);

    env.listings.block_seller(id, "scam reports").await.unwrap();
    let (after, _) = call(&env, Method::GET, "/my-products", Some(&token), None).await;
    assert_eq!(after, StatusCode::FORBIDDEN);

    let (login, _) = call(
        &env,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": "seller@college.edu", "password": "hunter22" })),
    )
    .await;
    assert_eq!(login, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn moderation_routes_reject_ordinary_accounts() {
    let env = env();
    let (_, token) = signup(&env, "student@college.edu", "student").await;
    let (status, _) = call(&env, Method::GET, "/admin/products", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn the_policy_email_passes_the_admin_gate() {
    let env = env();
    let (_, token) = signup(&env, ADMIN_EMAIL, "moderator").await;
    let (status, body) = call(&env, Method::GET, "/admin/products", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["products"].is_array());
}

#[tokio::test]
async fn google_login_creates_an_account_on_first_sight() {
    let env = env();
    let (status, body) = call(
        &env,
        Method::POST,
        "/google-login",
        None,
        Some(json!({ "idToken": "valid-token" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "google.user@college.edu");

    // Same identity again: no second account, same user id.
    let first_id = body["user"]["id"].as_str().unwrap().to_owned();
    let (_, again) = call(
        &env,
        Method::POST,
        "/google-login",
        None,
        Some(json!({ "idToken": "valid-token" })),
    )
    .await;
    assert_eq!(again["user"]["id"], first_id.as_str());
}

#[tokio::test]
async fn bad_google_token_is_unauthorized() {
    let env = env();
    let (status, _) = call(
        &env,
        Method::POST,
        "/google-login",
        None,
        Some(json!({ "idToken": "bad-token" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
