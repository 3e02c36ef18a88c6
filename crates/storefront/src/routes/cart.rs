//! Cart route handlers.
//!
//! A cart is the user's rows in the `cart` table; every handler here requires
//! a logged-in user.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::{Price, ProductId};

use super::PageContext;
use crate::db::CartRepository;
use crate::filters;
use crate::flash;
use crate::middleware::RequireLogin;
use crate::models::CartLine;
use crate::state::AppState;

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub ctx: PageContext,
    pub lines: Vec<CartLine>,
    pub total: Price,
}

/// Show the current user's cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireLogin(user): RequireLogin,
) -> Response {
    let lines = match CartRepository::new(state.pool())
        .lines_for_user(user.id)
        .await
    {
        Ok(lines) => lines,
        Err(e) => {
            tracing::error!("Failed to load cart: {e}");
            flash::error(&session, "Error loading cart").await;
            return Redirect::to("/").into_response();
        }
    };

    let total = lines.iter().map(CartLine::line_total).sum();

    CartTemplate {
        ctx: PageContext::new(&session, Some(user)).await,
        lines,
        total,
    }
    .into_response()
}

/// Add one unit of a product to the cart.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireLogin(user): RequireLogin,
    Path(id): Path<ProductId>,
) -> Redirect {
    match CartRepository::new(state.pool()).add_one(user.id, id).await {
        Ok(quantity) => {
            tracing::debug!(quantity, "Cart line updated");
            flash::success(&session, "Product added to cart!").await;
        }
        Err(e) => {
            tracing::warn!("Failed to add to cart: {e}");
            flash::error(&session, "Error adding product to cart").await;
        }
    }

    Redirect::to("/")
}

/// Remove a product's line from the cart entirely.
///
/// Removing a line that is not there still counts as success.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireLogin(user): RequireLogin,
    Path(id): Path<ProductId>,
) -> Redirect {
    match CartRepository::new(state.pool()).remove(user.id, id).await {
        Ok(removed) => {
            tracing::debug!(removed, "Cart line removed");
            flash::success(&session, "Item removed from cart").await;
        }
        Err(e) => {
            tracing::error!("Failed to remove from cart: {e}");
            flash::error(&session, "Error removing item from cart").await;
        }
    }

    Redirect::to("/cart")
}
