//! Integration test harness for Shopfront.
//!
//! Each test spawns the real storefront router on an ephemeral port, backed
//! by `PostgreSQL` for data and an in-memory session store. Tests talk to it
//! over HTTP with a cookie-keeping client that does not follow redirects, so
//! redirect targets and flash messages can be asserted directly.
//!
//! # Running Tests
//!
//! ```bash
//! # Point at a disposable database (DB_HOST, DB_USER, DB_PASSWORD, DB_NAME)
//! cargo test -p shopfront-integration-tests -- --ignored
//! ```
//!
//! Names are suffixed with a random ID so tests can share one database and
//! run in parallel.

use std::net::SocketAddr;
use std::path::PathBuf;

use reqwest::{Client, Response, StatusCode, redirect::Policy};
use secrecy::SecretString;
use sqlx::PgPool;
use tempfile::TempDir;
use tower_sessions::MemoryStore;
use uuid::Uuid;

use shopfront_storefront::config::{DatabaseConfig, StorefrontConfig};
use shopfront_storefront::db::{self, UserRepository};
use shopfront_storefront::middleware::create_session_layer;
use shopfront_storefront::{AppState, app};

/// Password used for every account the harness creates.
pub const PASSWORD: &str = "correct horse battery staple";

/// A running storefront plus a direct database handle.
pub struct TestContext {
    pub base_url: String,
    pub pool: PgPool,
    /// Upload root; removed when the context is dropped.
    pub upload_dir: TempDir,
}

impl TestContext {
    /// Migrate the database and start a server.
    ///
    /// # Panics
    ///
    /// Panics if the database is unreachable or the server cannot bind.
    pub async fn new() -> Self {
        let database = DatabaseConfig::from_env().expect("DB_* environment variables must be set");
        let pool = db::create_pool(&database)
            .await
            .expect("Failed to connect to test database");
        sqlx::migrate!("../storefront/migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr: SocketAddr = listener.local_addr().expect("listener has an address");

        let config = StorefrontConfig {
            database,
            host: addr.ip(),
            port: addr.port(),
            base_url: format!("http://{addr}"),
            session_secret: SecretString::from(format!(
                "{}{}",
                Uuid::new_v4().simple(),
                Uuid::new_v4().simple()
            )),
            upload_dir: upload_dir.path().to_path_buf(),
            sentry_dsn: None,
        };

        let session_layer = create_session_layer(MemoryStore::default(), &config)
            .expect("Failed to build session layer");
        let router = app(AppState::new(&config, pool.clone()), session_layer);

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Test server crashed");
        });

        Self {
            base_url: format!("http://{addr}"),
            pool,
            upload_dir,
        }
    }

    /// Absolute URL for a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Where product images land.
    #[must_use]
    pub fn product_image_dir(&self) -> PathBuf {
        self.upload_dir.path().join("products")
    }

    /// A fresh browser: own cookie jar, no redirect following.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client() -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Register an account through the form. Returns the response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn register(&self, client: &Client, username: &str, email: &str) -> Response {
        client
            .post(self.url("/register"))
            .form(&[("username", username), ("email", email), ("password", PASSWORD)])
            .send()
            .await
            .expect("Failed to submit registration")
    }

    /// Log in through the form. Returns the response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn login(&self, client: &Client, username: &str, password: &str) -> Response {
        client
            .post(self.url("/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("Failed to submit login")
    }

    /// Register and log in a new shopper; returns the logged-in client and
    /// the username.
    ///
    /// # Panics
    ///
    /// Panics if registration or login does not succeed.
    pub async fn shopper(&self) -> (Client, String) {
        let client = Self::client();
        let username = unique("shopper");
        let response = self
            .register(&client, &username, &format!("{username}@example.com"))
            .await;
        assert_eq!(location(&response), "/login", "registration should succeed");

        let response = self.login(&client, &username, PASSWORD).await;
        assert_eq!(location(&response), "/", "login should succeed");

        (client, username)
    }

    /// Register a user, grant the admin flag out-of-band, and log in.
    ///
    /// # Panics
    ///
    /// Panics if any step fails.
    pub async fn admin(&self) -> (Client, String) {
        let client = Self::client();
        let username = unique("admin");
        self.register(&client, &username, &format!("{username}@example.com"))
            .await;
        UserRepository::new(&self.pool)
            .set_admin(&username, true)
            .await
            .expect("Failed to grant admin");

        let response = self.login(&client, &username, PASSWORD).await;
        assert_eq!(location(&response), "/admin", "admins land on the dashboard");

        (client, username)
    }

    /// Insert a product directly; returns its ID.
    ///
    /// # Panics
    ///
    /// Panics if the insert fails.
    pub async fn insert_product(&self, name: &str) -> i32 {
        sqlx::query_scalar(
            "INSERT INTO products (name, price, stock) VALUES ($1, 5.00, 10) RETURNING id",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to insert product")
    }

    /// Quantity of a cart line, if present.
    ///
    /// # Panics
    ///
    /// Panics if the query fails.
    pub async fn cart_quantity(&self, username: &str, product_id: i32) -> Option<i32> {
        sqlx::query_scalar(
            r"
            SELECT c.quantity FROM cart c
            INNER JOIN users u ON u.id = c.user_id
            WHERE u.username = $1 AND c.product_id = $2
            ",
        )
        .bind(username)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .expect("Failed to query cart")
    }

    /// Follow a redirect by hand and return the page body, which carries the
    /// flash messages.
    ///
    /// # Panics
    ///
    /// Panics if the response is not a redirect or the page cannot load.
    pub async fn follow(&self, client: &Client, response: &Response) -> String {
        let page = client
            .get(self.url(&location(response)))
            .send()
            .await
            .expect("Failed to follow redirect");
        assert_eq!(page.status(), StatusCode::OK);
        page.text().await.expect("Failed to read page")
    }
}

/// The `Location` header of a redirect response.
///
/// # Panics
///
/// Panics if the response is not a redirect.
#[must_use]
pub fn location(response: &Response) -> String {
    assert!(
        response.status().is_redirection(),
        "expected redirect, got {}",
        response.status()
    );
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("redirect has a location")
        .to_owned()
}

/// A name no other test run will use.
#[must_use]
pub fn unique(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}
