//! Registration, login, logout, and gate behaviour over HTTP.

use reqwest::StatusCode;

use shopfront_integration_tests::{PASSWORD, TestContext, location, unique};
use shopfront_storefront::db::UserRepository;

async fn user_count(ctx: &TestContext, username: &str, email: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = $1 OR email = $2")
        .bind(username)
        .bind(email)
        .fetch_one(&ctx.pool)
        .await
        .expect("Failed to count users")
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_register_stores_hash_not_password() {
    let ctx = TestContext::new().await;
    let client = TestContext::client();
    let username = unique("reg");

    let resp = ctx
        .register(&client, &username, &format!("{username}@example.com"))
        .await;
    assert_eq!(location(&resp), "/login");
    let page = ctx.follow(&client, &resp).await;
    assert!(page.contains("Registration successful! Please login."));

    let (hash, is_admin): (String, bool) =
        sqlx::query_as("SELECT password_hash, is_admin FROM users WHERE username = $1")
            .bind(&username)
            .fetch_one(&ctx.pool)
            .await
            .expect("user was inserted");
    assert!(hash.starts_with("$argon2"));
    assert!(!hash.contains(PASSWORD));
    assert!(!is_admin);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_duplicate_username_or_email_leaves_users_unchanged() {
    let ctx = TestContext::new().await;
    let client = TestContext::client();
    let username = unique("dup");
    let email = format!("{username}@example.com");

    ctx.register(&client, &username, &email).await;
    assert_eq!(user_count(&ctx, &username, &email).await, 1);

    // Same username, new email
    let other_email = format!("other_{email}");
    let resp = ctx.register(&client, &username, &other_email).await;
    assert_eq!(location(&resp), "/register");
    let page = ctx.follow(&client, &resp).await;
    assert!(page.contains("Username or email already exists"));

    // New username, same email
    let other_name = unique("dup");
    let resp = ctx.register(&client, &other_name, &email).await;
    assert_eq!(location(&resp), "/register");

    assert_eq!(user_count(&ctx, &username, &email).await, 1);
    assert_eq!(user_count(&ctx, &other_name, &other_email).await, 0);
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_login_redirects_by_stored_role() {
    let ctx = TestContext::new().await;

    let (shopper, _) = ctx.shopper().await;
    let resp = shopper
        .get(ctx.url("/"))
        .send()
        .await
        .expect("Failed to load catalog");
    let page = resp.text().await.expect("body");
    assert!(page.contains("Welcome back!"));
    assert!(!page.contains("href=\"/admin\""));

    let (admin, _) = ctx.admin().await;
    let resp = admin
        .get(ctx.url("/admin"))
        .send()
        .await
        .expect("Failed to load dashboard");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_wrong_password_and_unknown_user_look_the_same() {
    let ctx = TestContext::new().await;
    let (_, username) = ctx.shopper().await;

    let client = TestContext::client();
    let wrong_password = ctx.login(&client, &username, "not the password").await;
    assert_eq!(location(&wrong_password), "/login");
    let wrong_password_page = ctx.follow(&client, &wrong_password).await;

    let client = TestContext::client();
    let unknown_user = ctx.login(&client, &unique("ghost"), PASSWORD).await;
    assert_eq!(location(&unknown_user), "/login");
    let unknown_user_page = ctx.follow(&client, &unknown_user).await;

    assert!(wrong_password_page.contains("Invalid credentials"));
    assert_eq!(wrong_password_page, unknown_user_page);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_login_requires_exact_username() {
    let ctx = TestContext::new().await;
    let (_, username) = ctx.shopper().await;

    let client = TestContext::client();
    let padded = ctx.login(&client, &format!("  {username} "), PASSWORD).await;
    assert_eq!(location(&padded), "/login");
    assert!(ctx.follow(&client, &padded).await.contains("Invalid credentials"));

    let client = TestContext::client();
    let upper = ctx
        .login(&client, &username.to_uppercase(), PASSWORD)
        .await;
    assert_eq!(location(&upper), "/login");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_logout_ends_session() {
    let ctx = TestContext::new().await;
    let (client, _) = ctx.shopper().await;

    let resp = client
        .get(ctx.url("/logout"))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(location(&resp), "/login");
    let page = ctx.follow(&client, &resp).await;
    assert!(page.contains("You have been logged out"));

    let resp = client
        .get(ctx.url("/cart"))
        .send()
        .await
        .expect("Failed to request cart");
    assert_eq!(location(&resp), "/login");
}

// =============================================================================
// Gates
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_anonymous_is_sent_to_login() {
    let ctx = TestContext::new().await;
    let client = TestContext::client();

    for path in ["/cart", "/admin", "/admin/product/add"] {
        let resp = client
            .get(ctx.url(path))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(location(&resp), "/login", "{path}");
    }

    let resp = client
        .post(ctx.url("/add_to_cart/1"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(location(&resp), "/login");
    let page = ctx.follow(&client, &resp).await;
    assert!(page.contains("Please login first"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_non_admin_is_turned_away_without_writes() {
    let ctx = TestContext::new().await;
    let (client, _) = ctx.shopper().await;
    let product_id = ctx.insert_product(&unique("keep")).await;

    let resp = client
        .get(ctx.url("/admin"))
        .send()
        .await
        .expect("Failed to request dashboard");
    assert_eq!(location(&resp), "/");
    let page = ctx.follow(&client, &resp).await;
    assert!(page.contains("Admin access required"));

    let resp = client
        .post(ctx.url(&format!("/admin/product/delete/{product_id}")))
        .send()
        .await
        .expect("Failed to request delete");
    assert_eq!(location(&resp), "/");

    let still_there: Option<i32> = sqlx::query_scalar("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&ctx.pool)
        .await
        .expect("Failed to query product");
    assert_eq!(still_there, Some(product_id));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_admin_flag_is_read_per_request() {
    let ctx = TestContext::new().await;
    let users = UserRepository::new(&ctx.pool);

    // Granted after login: no re-login needed
    let (shopper, username) = ctx.shopper().await;
    users
        .set_admin(&username, true)
        .await
        .expect("Failed to grant admin");
    let resp = shopper
        .get(ctx.url("/admin"))
        .send()
        .await
        .expect("Failed to request dashboard");
    assert_eq!(resp.status(), StatusCode::OK);

    // Revoked after login: the session snapshot is not trusted
    let (admin, username) = ctx.admin().await;
    users
        .set_admin(&username, false)
        .await
        .expect("Failed to revoke admin");
    let resp = admin
        .get(ctx.url("/admin"))
        .send()
        .await
        .expect("Failed to request dashboard");
    assert_eq!(location(&resp), "/");
}
