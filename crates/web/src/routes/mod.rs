//! HTTP route handlers for the store.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /products               - Product listing (paginated, ?page=N)
//! GET  /products/new           - New product form
//! POST /products/new           - Create product
//! GET  /products/{id}/edit     - Edit product form
//! POST /products/{id}/edit     - Update product
//! GET  /products/{id}/delete   - Delete confirmation page
//! POST /products/{id}/delete   - Delete product
//!
//! # Auth (HTML)
//! GET  /auth/login             - Combined login/registration page
//! POST /auth/login             - Login action
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action (requires auth)
//!
//! # Auth (JSON API)
//! POST /api/auth/register      - Register, in-band {success, message}
//! POST /api/auth/login         - Login, establishes the session
//! ```

pub mod api;
pub mod auth;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/new", get(products::new_form).post(products::create))
        .route(
            "/{id}/edit",
            get(products::edit_form).post(products::update),
        )
        .route(
            "/{id}/delete",
            get(products::confirm_delete).post(products::delete),
        )
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(api::register))
        .route("/auth/login", post(api::login))
}

/// Create all routes for the store.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog routes
        .nest("/products", product_routes())
        // Auth routes
        .nest("/auth", auth_routes())
        // JSON API
        .nest("/api", api_routes())
}
