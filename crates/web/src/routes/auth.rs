//! Authentication route handlers (HTML).
//!
//! A single page carries both the login and the registration form.
//! Failures redirect back with a short code in the query string; the page
//! handler maps codes to user-facing messages, so arbitrary query text is
//! never echoed into the page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::db::users::PgUsers;
use crate::filters;
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password1: String,
    pub password2: String,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Combined login/registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Map a redirect error code to its user-facing message.
fn error_message(code: &str) -> &'static str {
    match code {
        "missing_fields" => "Por favor completa todos los campos",
        "credentials" => "Email o contraseña incorrectos",
        "inactive" => "Cuenta desactivada",
        "password_mismatch" => "Las contraseñas no coinciden",
        "password_too_short" => "La contraseña debe tener al menos 6 caracteres",
        "email_taken" => "Este email ya está registrado",
        "invalid_email" => "El correo electrónico no es válido",
        "session" => "No se pudo iniciar la sesión, inténtalo de nuevo",
        _ => "No se pudo completar la solicitud",
    }
}

/// Map a redirect success code to its user-facing message.
fn success_message(code: &str) -> &'static str {
    match code {
        "registered" => "¡Registro exitoso! Ya puedes iniciar sesión",
        "logged_out" => "Sesión cerrada exitosamente",
        _ => "Operación realizada",
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Display the combined login/registration page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error.as_deref().map(|c| error_message(c).to_owned()),
        success: query
            .success
            .as_deref()
            .map(|c| success_message(c).to_owned()),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return Redirect::to("/auth/login?error=missing_fields").into_response();
    }

    let auth = AuthService::new(PgUsers::new(state.pool()));
    match auth.login(&form.email, &form.password).await {
        Ok(user) => {
            let current = CurrentUser::from(&user);
            if let Err(e) = set_current_user(&session, &current).await {
                tracing::error!("Failed to set session: {e}");
                return Redirect::to("/auth/login?error=session").into_response();
            }

            tracing::info!(user = %current.username, "login");
            Redirect::to("/products").into_response()
        }
        Err(AuthError::Inactive) => Redirect::to("/auth/login?error=inactive").into_response(),
        Err(AuthError::InvalidCredentials) => {
            Redirect::to("/auth/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::error!("Login failed: {e}");
            Redirect::to("/auth/login?error=failed").into_response()
        }
    }
}

/// Handle registration form submission.
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    if form.email.trim().is_empty() || form.password1.is_empty() || form.password2.is_empty() {
        return Redirect::to("/auth/login?error=missing_fields").into_response();
    }

    if form.password1 != form.password2 {
        return Redirect::to("/auth/login?error=password_mismatch").into_response();
    }

    let auth = AuthService::new(PgUsers::new(state.pool()));
    match auth.register(&form.email, &form.password1).await {
        Ok(user) => {
            tracing::info!(user = %user.username, email = %user.email, "account registered");
            Redirect::to("/auth/login?success=registered").into_response()
        }
        Err(AuthError::EmailTaken) => {
            Redirect::to("/auth/login?error=email_taken").into_response()
        }
        Err(AuthError::InvalidEmail(_)) => {
            Redirect::to("/auth/login?error=invalid_email").into_response()
        }
        Err(AuthError::WeakPassword(_)) => {
            Redirect::to("/auth/login?error=password_too_short").into_response()
        }
        Err(e) => {
            tracing::error!("Registration failed: {e}");
            Redirect::to("/auth/login?error=failed").into_response()
        }
    }
}

/// Handle logout.
///
/// Clears the user from the session and destroys the session itself.
pub async fn logout(RequireAuth(user): RequireAuth, session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {e}");
    }

    tracing::info!(user = %user.username, "logout");
    Redirect::to("/auth/login?success=logged_out").into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn login_page_renders_mapped_messages() {
        let page = LoginTemplate {
            error: Some(error_message("credentials").to_owned()),
            success: None,
        };
        let html = page.render().unwrap();
        assert!(html.contains("Email o contraseña incorrectos"));
        assert!(html.contains("Iniciar sesión"));
        assert!(html.contains("Crear cuenta"));
    }

    #[test]
    fn unknown_codes_fall_back_to_a_generic_message() {
        assert_eq!(
            error_message("<script>alert(1)</script>"),
            "No se pudo completar la solicitud"
        );
    }
}
