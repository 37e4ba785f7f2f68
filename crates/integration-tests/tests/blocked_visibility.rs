//! Blocked-seller cache semantics observed from the public feed.


use domains::{
    AgeBucket, Condition, ContactPreference, Location, NewProduct, ProductQuery, UserRepo,
};

use fixtures::{env, signup};

fn input() -> NewProduct {
    NewProduct {
        name: "Desk fan".into(),
        description: "Survives hostel summers".into(),
        price: "550".into(),
        negotiable: true,
        category: "Electronics".into(),
        location: Location::Bh2,
        condition: Condition::Good,
        age: AgeBucket::OneToTwoYears,
        external_url: None,
        contact: ContactPreference::Both,
    }
}

fn upload() -> Vec<(Vec<u8>, String)> {
    vec![(vec![9, 9], "image/png".into())]
}

#[tokio::test]
async fn a_write_that_skips_the_service_stays_cached_until_invalidation() {
    let env = env();
    let (seller, _) = signup(&env, "seller@college.edu", "seller").await;
    let (other, _) = signup(&env, "other@college.edu", "other").await;
    env.listings.create(seller, input(), upload()).await.unwrap();

    // Warm the snapshot.
    assert_eq!(
        env.listings.public_listings(ProductQuery::default()).await.unwrap().len(),
        1
    );

    // Flip the flag directly in the store, bypassing the service. The feed
    // keeps serving the snapshot; within the TTL it may overexpose.
    env.users.set_blocked(seller, Some("out of band")).await.unwrap();
    assert_eq!(
        env.listings.public_listings(ProductQuery::default()).await.unwrap().len(),
        1
    );

    // Any service-level block drops the whole snapshot; the next feed read
    // refetches ground truth and sees the out-of-band block too.
    env.listings.block_seller(other, "unrelated block").await.unwrap();
    assert!(env
        .listings
        .public_listings(ProductQuery::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn service_level_block_and_unblock_take_effect_without_any_wait() {
    let env = env();
    let (seller, _) = signup(&env, "seller@college.edu", "seller").await;
    env.listings.create(seller, input(), upload()).await.unwrap();

    assert_eq!(
        env.listings.public_listings(ProductQuery::default()).await.unwrap().len(),
        1
    );

    env.listings.block_seller(seller, "spam").await.unwrap();
    assert!(env
        .listings
        .public_listings(ProductQuery::default())
        .await
        .unwrap()
        .is_empty());

    env.listings.unblock_seller(seller).await.unwrap();
    assert_eq!(
        env.listings.public_listings(ProductQuery::default()).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn blocked_sellers_inventory_is_excluded_not_deleted() {
    let env = env();
    let (seller, _) = signup(&env, "seller@college.edu", "seller").await;
    let product = env.listings.create(seller, input(), upload()).await.unwrap();

    env.listings.block_seller(seller, "spam").await.unwrap();

    // Still present for the owner and the moderators.
    assert_eq!(env.listings.my_products(seller).await.unwrap().len(), 1);
    assert!(env
        .listings
        .list_all()
        .await
        .unwrap()
        .iter()
        .any(|p| p.id == product.id));
}
