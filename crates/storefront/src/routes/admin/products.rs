//! Admin product management: add, edit, delete.
//!
//! Add and edit forms are multipart so they can carry an optional image.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::{DEFAULT_PRODUCT_IMAGE, ProductId};

use crate::db::{ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::flash;
use crate::middleware::RequireAdmin;
use crate::models::{Product, ProductInput, ProductInputError};
use crate::routes::PageContext;
use crate::state::AppState;

/// Largest accepted add/edit request body.
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Body limit layer for the admin routes.
#[must_use]
pub fn upload_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(MAX_UPLOAD_BYTES)
}

// =============================================================================
// Form Types
// =============================================================================

/// A file part from the form.
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Bytes,
}

/// Raw add/edit form fields, before validation.
#[derive(Default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    pub category: String,
    /// Present only when a file with a non-empty filename was submitted.
    pub image: Option<ImageUpload>,
}

impl ProductForm {
    /// Read every part of a multipart body.
    ///
    /// Unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the body is not valid multipart.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to parse multipart data: {e}")))?
        {
            let field_name = field.name().unwrap_or_default().to_owned();

            if field_name == "image" {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read image: {e}")))?;
                if !filename.is_empty() {
                    form.image = Some(ImageUpload { filename, bytes });
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read {field_name}: {e}")))?;
            match field_name.as_str() {
                "name" => form.name = value,
                "description" => form.description = value,
                "price" => form.price = value,
                "stock" => form.stock = value,
                "category" => form.category = value,
                _ => {}
            }
        }

        Ok(form)
    }

    fn input(&self) -> std::result::Result<ProductInput, ProductInputError> {
        ProductInput::parse(
            &self.name,
            &self.description,
            &self.price,
            &self.stock,
            &self.category,
        )
    }
}

/// Why a product write failed. The text is shown to the admin.
#[derive(Debug, Error)]
pub enum ProductWriteError {
    #[error(transparent)]
    Input(#[from] ProductInputError),
    #[error("could not save image: {0}")]
    Image(#[from] std::io::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

// =============================================================================
// Templates
// =============================================================================

/// Add product page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/add_product.html")]
pub struct AddProductTemplate {
    pub ctx: PageContext,
}

/// Edit product page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/edit_product.html")]
pub struct EditProductTemplate {
    pub ctx: PageContext,
    pub product: Product,
}

// =============================================================================
// Add
// =============================================================================

/// Display the add product form.
pub async fn add_page(session: Session, RequireAdmin(admin): RequireAdmin) -> AddProductTemplate {
    AddProductTemplate {
        ctx: PageContext::new(&session, Some(admin)).await,
    }
}

/// Create a product from the submitted form.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    multipart: Multipart,
) -> Result<Redirect> {
    let form = ProductForm::from_multipart(multipart).await?;

    match create_product(&state, &form).await {
        Ok(product) => {
            tracing::info!(product_id = %product.id, "Product added");
            flash::success(&session, "Product added successfully!").await;
        }
        Err(e) => {
            tracing::warn!("Failed to add product: {e}");
            flash::error(&session, format!("Error adding product: {e}")).await;
        }
    }

    Ok(Redirect::to("/admin"))
}

async fn create_product(
    state: &AppState,
    form: &ProductForm,
) -> std::result::Result<Product, ProductWriteError> {
    let input = form.input()?;

    let saved = match &form.image {
        Some(upload) => state.images().save(&upload.filename, &upload.bytes).await?,
        None => None,
    };
    let image_url = saved.as_deref().unwrap_or(DEFAULT_PRODUCT_IMAGE);

    Ok(ProductRepository::new(state.pool())
        .create(&input, image_url)
        .await?)
}

// =============================================================================
// Edit
// =============================================================================

/// Display the edit form for an existing product.
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
pub async fn edit_page(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let Some(product) = ProductRepository::new(state.pool()).get_by_id(id).await? else {
        flash::error(&session, "Product not found").await;
        return Ok(Redirect::to("/admin").into_response());
    };

    Ok(EditProductTemplate {
        ctx: PageContext::new(&session, Some(admin)).await,
        product,
    }
    .into_response())
}

/// Update a product from the submitted form.
///
/// The stored image is replaced only when a new file is uploaded.
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Redirect> {
    let form = ProductForm::from_multipart(multipart).await?;

    match update_product(&state, id, &form).await {
        Ok(_) => {
            tracing::info!("Product updated");
            flash::success(&session, "Product updated successfully!").await;
        }
        Err(e) => {
            tracing::warn!("Failed to update product: {e}");
            flash::error(&session, format!("Error updating product: {e}")).await;
        }
    }

    Ok(Redirect::to("/admin"))
}

async fn update_product(
    state: &AppState,
    id: ProductId,
    form: &ProductForm,
) -> std::result::Result<Product, ProductWriteError> {
    let input = form.input()?;
    let products = ProductRepository::new(state.pool());

    let saved = match &form.image {
        Some(upload) => {
            // Don't let an edit of a missing product touch the image directory
            if products.get_by_id(id).await?.is_none() {
                return Err(RepositoryError::NotFound.into());
            }
            state.images().save(&upload.filename, &upload.bytes).await?
        }
        None => None,
    };

    Ok(products.update(id, &input, saved.as_deref()).await?)
}

// =============================================================================
// Delete
// =============================================================================

/// Delete a product and every cart line referencing it.
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Redirect {
    match ProductRepository::new(state.pool()).delete(id).await {
        Ok(cart_lines) => {
            tracing::info!(cart_lines, "Product deleted");
            flash::success(&session, "Product deleted successfully!").await;
        }
        Err(e) => {
            tracing::warn!("Failed to delete product: {e}");
            flash::error(&session, format!("Error deleting product: {e}")).await;
        }
    }

    Redirect::to("/admin")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(price: &str, stock: &str) -> ProductForm {
        ProductForm {
            name: "Widget".to_owned(),
            price: price.to_owned(),
            stock: stock.to_owned(),
            ..ProductForm::default()
        }
    }

    #[test]
    fn test_form_input_validates() {
        assert!(form("9.99", "5").input().is_ok());
        assert!(matches!(
            form("abc", "5").input(),
            Err(ProductInputError::Price(_))
        ));
    }

    #[test]
    fn test_write_error_text_is_shown_verbatim() {
        let err = ProductWriteError::from(ProductInputError::MissingName);
        assert_eq!(
            format!("Error adding product: {err}"),
            "Error adding product: name is required"
        );

        let err = ProductWriteError::from(RepositoryError::NotFound);
        assert_eq!(err.to_string(), "not found");
    }
}
