//! Admin route handlers.
//!
//! Every handler takes `RequireAdmin`, which re-reads the stored admin flag on
//! each request.

pub mod products;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use super::PageContext;
use crate::db::ProductRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::state::AppState;

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub products: Vec<Product>,
}

/// List every product with edit and delete actions.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Result<DashboardTemplate> {
    let products = ProductRepository::new(state.pool()).list_all().await?;

    Ok(DashboardTemplate {
        ctx: PageContext::new(&session, Some(admin)).await,
        products,
    })
}
