//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Product catalog
//! GET  /health                        - Liveness check
//! GET  /health/ready                  - Readiness check (database)
//!
//! # Auth
//! GET  /login                         - Login page
//! POST /login                         - Login action
//! GET  /register                      - Register page
//! POST /register                      - Register action
//! GET  /logout                        - Logout action
//!
//! # Cart (requires login)
//! GET  /cart                          - Cart page
//! POST /add_to_cart/{id}              - Add one unit
//! POST /remove_from_cart/{id}         - Remove the whole line
//!
//! # Admin (requires stored admin flag)
//! GET  /admin                         - Product dashboard
//! GET  /admin/product/add             - Add form
//! POST /admin/product/add             - Create (multipart)
//! GET  /admin/product/edit/{id}       - Edit form
//! POST /admin/product/edit/{id}       - Update (multipart)
//! POST /admin/product/delete/{id}     - Delete with cart lines
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod health;
pub mod home;

use axum::{
    Router,
    extract::Request,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Session, SessionManagerLayer, SessionStore};

use crate::flash;
use crate::middleware::request_id_middleware;
use crate::models::{CurrentUser, FlashMessage};
use crate::state::AppState;

/// Data every rendered page needs: navigation state and pending flashes.
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub flashes: Vec<FlashMessage>,
    /// Units in the user's cart, shown next to the cart link when known.
    pub cart_items: Option<i64>,
}

impl PageContext {
    /// Build the context, consuming the session's pending flash messages.
    ///
    /// Call this only when a page is actually rendered; a redirect should
    /// leave the flashes for the next page.
    pub async fn new(session: &Session, user: Option<CurrentUser>) -> Self {
        Self {
            user,
            flashes: flash::take(session).await,
            cart_items: None,
        }
    }

    /// Whether to show admin navigation.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/add_to_cart/{id}", post(cart::add))
        .route("/remove_from_cart/{id}", post(cart::remove))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route(
            "/product/add",
            get(admin::products::add_page).post(admin::products::add),
        )
        .route(
            "/product/edit/{id}",
            get(admin::products::edit_page).post(admin::products::edit),
        )
        .route("/product/delete/{id}", post(admin::products::delete))
        .layer(admin::products::upload_limit())
}

/// Create all page routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .merge(auth_routes())
        .merge(cart_routes())
        .nest("/admin", admin_routes())
}

/// Assemble the full application: pages, health checks, and the middleware
/// stack, over any session store.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S, SignedCookie>) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .layer(session_layer)
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
