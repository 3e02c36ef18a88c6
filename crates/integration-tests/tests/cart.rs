//! Cart behaviour over HTTP.

use reqwest::StatusCode;

use shopfront_integration_tests::{TestContext, location, unique};

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_adding_twice_increments_one_line() {
    let ctx = TestContext::new().await;
    let (client, username) = ctx.shopper().await;
    let product_id = ctx.insert_product(&unique("widget")).await;

    for _ in 0..2 {
        let resp = client
            .post(ctx.url(&format!("/add_to_cart/{product_id}")))
            .send()
            .await
            .expect("Failed to add to cart");
        assert_eq!(location(&resp), "/");
    }

    assert_eq!(ctx.cart_quantity(&username, product_id).await, Some(2));
    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM cart c INNER JOIN users u ON u.id = c.user_id WHERE u.username = $1",
    )
    .bind(&username)
    .fetch_one(&ctx.pool)
    .await
    .expect("Failed to count cart rows");
    assert_eq!(rows, 1);

    let page = client
        .get(ctx.url("/cart"))
        .send()
        .await
        .expect("Failed to load cart");
    assert_eq!(page.status(), StatusCode::OK);
    let body = page.text().await.expect("body");
    assert!(body.contains("Product added to cart!"));
    assert!(body.contains("$10.00"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_catalog_badge_counts_units() {
    let ctx = TestContext::new().await;
    let (client, _) = ctx.shopper().await;
    let first = ctx.insert_product(&unique("badge")).await;
    let second = ctx.insert_product(&unique("badge")).await;

    for id in [first, first, second] {
        client
            .post(ctx.url(&format!("/add_to_cart/{id}")))
            .send()
            .await
            .expect("Failed to add to cart");
    }

    let body = client
        .get(ctx.url("/"))
        .send()
        .await
        .expect("Failed to load catalog")
        .text()
        .await
        .expect("body");
    assert!(body.contains(r#"<span class="badge">3</span>"#));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_concurrent_adds_do_not_lose_updates() {
    let ctx = TestContext::new().await;
    let (client, username) = ctx.shopper().await;
    let product_id = ctx.insert_product(&unique("race")).await;
    let url = ctx.url(&format!("/add_to_cart/{product_id}"));

    let adds = (0..5).map(|_| client.post(&url).send());
    for resp in spawn_all(adds).await {
        assert!(resp.expect("add failed").status().is_redirection());
    }

    assert_eq!(ctx.cart_quantity(&username, product_id).await, Some(5));
}

async fn spawn_all<F, T>(futures: impl Iterator<Item = F>) -> Vec<T>
where
    F: std::future::Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let handles: Vec<_> = futures.map(tokio::spawn).collect();
    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.expect("task panicked"));
    }
    results
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_remove_deletes_only_that_line() {
    let ctx = TestContext::new().await;
    let (client, username) = ctx.shopper().await;
    let keep = ctx.insert_product(&unique("keep")).await;
    let drop = ctx.insert_product(&unique("drop")).await;

    for id in [keep, drop, drop] {
        client
            .post(ctx.url(&format!("/add_to_cart/{id}")))
            .send()
            .await
            .expect("Failed to add to cart");
    }

    let resp = client
        .post(ctx.url(&format!("/remove_from_cart/{drop}")))
        .send()
        .await
        .expect("Failed to remove from cart");
    assert_eq!(location(&resp), "/cart");
    let page = ctx.follow(&client, &resp).await;
    assert!(page.contains("Item removed from cart"));

    assert_eq!(ctx.cart_quantity(&username, drop).await, None);
    assert_eq!(ctx.cart_quantity(&username, keep).await, Some(1));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_adding_unknown_product_fails_cleanly() {
    let ctx = TestContext::new().await;
    let (client, _) = ctx.shopper().await;

    let resp = client
        .post(ctx.url(&format!("/add_to_cart/{}", i32::MAX)))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(location(&resp), "/");
    let page = ctx.follow(&client, &resp).await;
    assert!(page.contains("Error adding product to cart"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_cart_load_failure_returns_to_catalog() {
    let ctx = TestContext::new().await;
    let (client, _) = ctx.shopper().await;

    // Sessions live in memory, so only the cart query fails
    ctx.pool.close().await;

    let resp = client
        .get(ctx.url("/cart"))
        .send()
        .await
        .expect("Failed to load cart");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    // The catalog needs the database too, so read the flash off a static page
    let page = client
        .get(ctx.url("/login"))
        .send()
        .await
        .expect("Failed to load login page")
        .text()
        .await
        .expect("body");
    assert!(page.contains("Error loading cart"));
}
