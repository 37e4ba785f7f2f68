//! Moderation through the router: hide/unhide, block/unblock, dashboard.


use axum::http::{Method, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use fixtures::{call, env, listing_fields, multipart_request, signup, TestEnv, ADMIN_EMAIL};

async fn seed_listing(env: &TestEnv, token: &str) -> String {
    let request = multipart_request("/add-product", token, &listing_fields(), 1);
    let response = env.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    body["product"]["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn hide_removes_from_public_but_not_from_owner_or_admin() {
    let env = env();
    let (_, admin) = signup(&env, ADMIN_EMAIL, "moderator").await;
    let (_, seller) = signup(&env, "seller@college.edu", "seller").await;
    let id = seed_listing(&env, &seller).await;

    let (status, body) = call(
        &env,
        Method::PUT,
        &format!("/admin/hide-product/{id}"),
        Some(&admin),
        Some(json!({ "reason": "duplicate" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["approval"], "Hidden");
    assert_eq!(body["product"]["hiddenReason"], "duplicate");

    let (_, feed) = call(&env, Method::GET, "/get-products", None, None).await;
    assert!(feed["products"].as_array().unwrap().is_empty());

    let (_, mine) = call(&env, Method::GET, "/my-products", Some(&seller), None).await;
    assert_eq!(mine["products"].as_array().unwrap().len(), 1);
    assert_eq!(mine["products"][0]["approval"], "Hidden");

    let (_, all) = call(&env, Method::GET, "/admin/products", Some(&admin), None).await;
    assert_eq!(all["products"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unhide_restores_public_visibility_and_clears_the_reason() {
    let env = env();
    let (_, admin) = signup(&env, ADMIN_EMAIL, "moderator").await;
    let (_, seller) = signup(&env, "seller@college.edu", "seller").await;
    let id = seed_listing(&env, &seller).await;

    call(
        &env,
        Method::PUT,
        &format!("/admin/hide-product/{id}"),
        Some(&admin),
        Some(json!({ "reason": "duplicate" })),
    )
    .await;
    let (status, body) = call(
        &env,
        Method::PUT,
        &format!("/admin/unhide-product/{id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["approval"], "Approved");
    assert!(body["product"]["hiddenReason"].is_null());

    let (_, feed) = call(&env, Method::GET, "/get-products", None, None).await;
    assert_eq!(feed["products"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn hidden_listing_can_still_be_marked_sold_by_its_owner() {
    let env = env();
    let (_, admin) = signup(&env, ADMIN_EMAIL, "moderator").await;
    let (_, seller) = signup(&env, "seller@college.edu", "seller").await;
    let id = seed_listing(&env, &seller).await;

    call(
        &env,
        Method::PUT,
        &format!("/admin/hide-product/{id}"),
        Some(&admin),
        Some(json!({ "reason": "under review" })),
    )
    .await;
    let (status, body) = call(
        &env,
        Method::PUT,
        &format!("/update-product-status/{id}"),
        Some(&seller),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["status"], "Sold");
    assert_eq!(body["product"]["approval"], "Hidden");
}

#[tokio::test]
async fn admin_delete_needs_no_ownership() {
    let env = env();
    let (_, admin) = signup(&env, ADMIN_EMAIL, "moderator").await;
    let (_, seller) = signup(&env, "seller@college.edu", "seller").await;
    let id = seed_listing(&env, &seller).await;

    let (status, _) = call(
        &env,
        Method::DELETE,
        &format!("/admin/delete-product/{id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(env.images.stored().is_empty());
    let (_, mine) = call(&env, Method::GET, "/my-products", Some(&seller), None).await;
    assert!(mine["products"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn blocking_a_seller_empties_their_shelf_immediately() {
    let env = env();
    let (_, admin) = signup(&env, ADMIN_EMAIL, "moderator").await;
    let (seller_id, seller) = signup(&env, "seller@college.edu", "seller").await;
    seed_listing(&env, &seller).await;

    // Warm the blocked-seller cache with an empty snapshot first.
    let (_, feed) = call(&env, Method::GET, "/get-products", None, None).await;
    assert_eq!(feed["products"].as_array().unwrap().len(), 1);

    let (status, _) = call(
        &env,
        Method::PUT,
        &format!("/admin/block-user/{seller_id}"),
        Some(&admin),
        Some(json!({ "reason": "spam listings" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // No TTL wait: the block invalidated the snapshot before responding.
    let (_, feed) = call(&env, Method::GET, "/get-products", None, None).await;
    assert!(feed["products"].as_array().unwrap().is_empty());

    let (unblock, _) = call(
        &env,
        Method::PUT,
        &format!("/admin/unblock-user/{seller_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(unblock, StatusCode::OK);
    let (_, feed) = call(&env, Method::GET, "/get-products", None, None).await;
    assert_eq!(feed["products"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn blocking_an_unknown_user_is_not_found() {
    let env = env();
    let (_, admin) = signup(&env, ADMIN_EMAIL, "moderator").await;
    let (status, _) = call(
        &env,
        Method::PUT,
        &format!("/admin/block-user/{}", uuid::Uuid::new_v4()),
        Some(&admin),
        Some(json!({ "reason": "spam" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dashboard_tallies_users_products_and_messages() {
    let env = env();
    let (_, admin) = signup(&env, ADMIN_EMAIL, "moderator").await;
    let (seller_id, seller) = signup(&env, "seller@college.edu", "seller").await;
    let id = seed_listing(&env, &seller).await;
    seed_listing(&env, &seller).await;

    call(
        &env,
        Method::PUT,
        &format!("/admin/hide-product/{id}"),
        Some(&admin),
        Some(json!({ "reason": "duplicate" })),
    )
    .await;
    call(
        &env,
        Method::POST,
        "/contact-admin",
        Some(&seller),
        Some(json!({ "subject": "Hidden listing", "body": "Why was my lamp hidden?" })),
    )
    .await;
    call(
        &env,
        Method::PUT,
        &format!("/admin/block-user/{seller_id}"),
        Some(&admin),
        Some(json!({ "reason": "repeat duplicates" })),
    )
    .await;

    let (status, body) = call(&env, Method::GET, "/admin/dashboard", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let counts = &body["counts"];
    assert_eq!(counts["users"], 2);
    assert_eq!(counts["blockedUsers"], 1);
    assert_eq!(counts["products"], 2);
    assert_eq!(counts["hiddenProducts"], 1);
    assert_eq!(counts["soldProducts"], 0);
    assert_eq!(counts["unreadMessages"], 1);
}
