//! Product catalog route handlers.
//!
//! CRUD pages over the catalog. The listing is paginated ten per page,
//! newest-modified first; an unusable `page` parameter falls back to the
//! first page instead of failing.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use huellitas_core::ProductId;

use crate::db::{ProductRepository, RepositoryError};
use crate::error::AppError;
use crate::filters;
use crate::models::{Product, ProductInput};
use crate::state::AppState;

/// Products shown per listing page.
const PAGE_SIZE: u32 = 10;

// =============================================================================
// Form and Query Types
// =============================================================================

/// Pagination query parameters.
///
/// `page` stays a string so non-numeric values fall back to page 1
/// instead of rejecting the request.
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<String>,
}

/// Raw product form data; validated by [`ProductInput::parse`].
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
    pub stock_quantity: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<Product>,
    pub page: u32,
    pub total_pages: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Product create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub title: &'static str,
    pub action: String,
    pub error: Option<String>,
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock_quantity: String,
}

impl ProductFormTemplate {
    fn empty() -> Self {
        Self {
            title: "Nuevo producto",
            action: "/products/new".to_owned(),
            error: None,
            name: String::new(),
            description: String::new(),
            price: String::new(),
            stock_quantity: String::new(),
        }
    }

    fn for_product(product: &Product) -> Self {
        Self {
            title: "Editar producto",
            action: format!("/products/{}/edit", product.id),
            error: None,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            stock_quantity: product.stock_quantity.to_string(),
        }
    }

    /// Re-render the submitted values with a validation message.
    fn rejected(title: &'static str, action: String, form: ProductForm, message: String) -> Self {
        Self {
            title,
            action,
            error: Some(message),
            name: form.name,
            description: form.description,
            price: form.price,
            stock_quantity: form.stock_quantity,
        }
    }
}

/// Delete confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub product: Product,
}

// =============================================================================
// Routes
// =============================================================================

/// Display the product listing page.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<ProductsIndexTemplate, AppError> {
    let requested = query
        .page
        .as_deref()
        .and_then(|p| p.parse::<u32>().ok())
        .unwrap_or(1);

    let page = ProductRepository::new(state.pool())
        .list_page(requested, PAGE_SIZE)
        .await?;

    Ok(ProductsIndexTemplate {
        has_prev: page.has_prev(),
        has_next: page.has_next(),
        products: page.items,
        page: page.page,
        total_pages: page.total_pages,
    })
}

/// Display the new product form.
pub async fn new_form() -> impl IntoResponse {
    ProductFormTemplate::empty()
}

/// Handle new product form submission.
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Response, AppError> {
    match parse_form(&form) {
        Ok(input) => {
            let product = ProductRepository::new(state.pool()).create(input).await?;
            tracing::info!(id = %product.id, name = %product.name, "product created");
            Ok(Redirect::to("/products").into_response())
        }
        Err(message) => Ok(ProductFormTemplate::rejected(
            "Nuevo producto",
            "/products/new".to_owned(),
            form,
            message,
        )
        .into_response()),
    }
}

/// Display the edit form for an existing product.
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<ProductFormTemplate, AppError> {
    let id = ProductId::new(id);
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("producto {id}")))?;

    Ok(ProductFormTemplate::for_product(&product))
}

/// Handle edit form submission.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<ProductForm>,
) -> Result<Response, AppError> {
    let id = ProductId::new(id);

    match parse_form(&form) {
        Ok(input) => {
            let product = ProductRepository::new(state.pool())
                .update(id, input)
                .await
                .map_err(|e| match e {
                    RepositoryError::NotFound => AppError::NotFound(format!("producto {id}")),
                    other => AppError::Database(other),
                })?;
            tracing::info!(id = %product.id, "product updated");
            Ok(Redirect::to("/products").into_response())
        }
        Err(message) => Ok(ProductFormTemplate::rejected(
            "Editar producto",
            format!("/products/{id}/edit"),
            form,
            message,
        )
        .into_response()),
    }
}

/// Display the delete confirmation page.
pub async fn confirm_delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<ConfirmDeleteTemplate, AppError> {
    let id = ProductId::new(id);
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("producto {id}")))?;

    Ok(ConfirmDeleteTemplate { product })
}

/// Handle product deletion.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let id = ProductId::new(id);
    let deleted = ProductRepository::new(state.pool()).delete(id).await?;

    if !deleted {
        return Err(AppError::NotFound(format!("producto {id}")));
    }

    tracing::info!(%id, "product deleted");
    Ok(Redirect::to("/products").into_response())
}

fn parse_form(form: &ProductForm) -> Result<ProductInput, String> {
    ProductInput::parse(
        &form.name,
        &form.description,
        &form.price,
        &form.stock_quantity,
    )
    .map_err(|e| e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;

    fn sample_product(id: i32, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            description: "Alimento seco de alta calidad.".to_owned(),
            price: Decimal::new(7_500_000, 2),
            stock_quantity: 150,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn index_renders_products_and_pagination() {
        let html = ProductsIndexTemplate {
            products: vec![
                sample_product(1, "Concentrado premium para perros"),
                sample_product(2, "Collar isabelino talla M"),
            ],
            page: 2,
            total_pages: 3,
            has_prev: true,
            has_next: true,
        }
        .render()
        .unwrap();

        assert!(html.contains("Concentrado premium para perros"));
        assert!(html.contains("$ 75000.00"));
        assert!(html.contains("Página 2 de 3"));
        assert!(html.contains("/products?page=1"));
        assert!(html.contains("/products?page=3"));
    }

    #[test]
    fn index_renders_the_empty_state() {
        let html = ProductsIndexTemplate {
            products: Vec::new(),
            page: 1,
            total_pages: 1,
            has_prev: false,
            has_next: false,
        }
        .render()
        .unwrap();

        assert!(html.contains("No hay productos registrados"));
    }

    #[test]
    fn form_rerenders_submitted_values_with_the_error() {
        let form = ProductForm {
            name: "Collar".to_owned(),
            description: String::new(),
            price: "gratis".to_owned(),
            stock_quantity: "5".to_owned(),
        };
        let message = parse_form(&form).unwrap_err();

        let html = ProductFormTemplate::rejected(
            "Nuevo producto",
            "/products/new".to_owned(),
            form,
            message,
        )
        .render()
        .unwrap();

        assert!(html.contains("El precio no es válido"));
        assert!(html.contains("value=\"Collar\""));
        assert!(html.contains("value=\"gratis\""));
    }

    #[test]
    fn confirm_delete_names_the_product() {
        let html = ConfirmDeleteTemplate {
            product: sample_product(9, "Transportadora para gatos"),
        }
        .render()
        .unwrap();

        assert!(html.contains("Transportadora para gatos"));
        assert!(html.contains("/products/9/delete"));
    }
}
