//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub store_name: &'static str,
    pub description: &'static str,
    pub user: Option<CurrentUser>,
}

/// Display the home page.
pub async fn home(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    HomeTemplate {
        store_name: "Huellitas Alegres",
        description: "Venta de productos para clínica veterinaria",
        user,
    }
}
