//! Catalog page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use super::PageContext;
use crate::db::{CartRepository, ProductRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalUser;
use crate::models::Product;
use crate::state::AppState;

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub ctx: PageContext,
    pub products: Vec<Product>,
}

/// List every product.
///
/// Logged-in users also get their cart's unit count for the nav badge; a
/// failed count just hides the badge.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
) -> Result<IndexTemplate> {
    let products = ProductRepository::new(state.pool()).list_all().await?;

    let mut ctx = PageContext::new(&session, user).await;
    if let Some(user) = &ctx.user {
        match CartRepository::new(state.pool()).item_count(user.id).await {
            Ok(count) => ctx.cart_items = Some(count),
            Err(e) => tracing::warn!(user_id = %user.id, "Failed to count cart items: {e}"),
        }
    }

    Ok(IndexTemplate { ctx, products })
}
