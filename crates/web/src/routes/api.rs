//! JSON authentication API.
//!
//! The API keeps the original contract of the service: every response is
//! a JSON body with `success` and `message`, and failures travel in-band
//! (HTTP 200) rather than through status codes. Malformed JSON gets the
//! same treatment.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::db::users::PgUsers;
use crate::middleware::set_current_user;
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService, MIN_PASSWORD_LENGTH};
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Uniform API response body.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

impl ApiResponse {
    fn ok(message: &str) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.to_owned(),
            redirect_url: None,
        })
    }

    fn ok_with_redirect(message: &str, redirect_url: &str) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.to_owned(),
            redirect_url: Some(redirect_url.to_owned()),
        })
    }

    fn error(message: &str) -> Json<Self> {
        Json(Self {
            success: false,
            message: message.to_owned(),
            redirect_url: None,
        })
    }
}

/// Treat missing and empty fields alike.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Routes
// =============================================================================

/// Register a new account.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Json<ApiResponse> {
    let Ok(Json(request)) = payload else {
        return ApiResponse::error("Error en el formato de datos");
    };

    let (Some(email), Some(password), Some(password_confirm)) = (
        non_empty(request.email),
        non_empty(request.password),
        non_empty(request.password_confirm),
    ) else {
        return ApiResponse::error("Todos los campos son obligatorios");
    };

    if password != password_confirm {
        return ApiResponse::error("Las contraseñas no coinciden");
    }

    if password.len() < MIN_PASSWORD_LENGTH {
        return ApiResponse::error("La contraseña debe tener al menos 6 caracteres");
    }

    let auth = AuthService::new(PgUsers::new(state.pool()));
    match auth.register(&email, &password).await {
        Ok(user) => {
            tracing::info!(user = %user.username, email = %user.email, "account registered");
            ApiResponse::ok("Usuario registrado exitosamente")
        }
        Err(AuthError::EmailTaken) => ApiResponse::error("Este email ya está registrado"),
        Err(AuthError::InvalidEmail(_)) => {
            ApiResponse::error("El correo electrónico no es válido")
        }
        Err(AuthError::WeakPassword(_)) => {
            ApiResponse::error("La contraseña debe tener al menos 6 caracteres")
        }
        Err(e) => {
            tracing::error!("Registration failed: {e}");
            ApiResponse::error("Error interno del servidor")
        }
    }
}

/// Authenticate and establish a session.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Json<ApiResponse> {
    let Ok(Json(request)) = payload else {
        return ApiResponse::error("Error en la autenticación: Formato de datos inválido");
    };

    let (Some(email), Some(password)) = (non_empty(request.email), non_empty(request.password))
    else {
        return ApiResponse::error("Email y contraseña son obligatorios");
    };

    let auth = AuthService::new(PgUsers::new(state.pool()));
    match auth.login(&email, &password).await {
        Ok(user) => {
            let current = CurrentUser::from(&user);
            if let Err(e) = set_current_user(&session, &current).await {
                tracing::error!("Failed to set session: {e}");
                return ApiResponse::error(
                    "Error en la autenticación: No se pudo iniciar la sesión",
                );
            }

            tracing::info!(user = %current.username, "login");
            ApiResponse::ok_with_redirect(
                "Autenticación satisfactoria - Bienvenido a Huellitas Alegres",
                "/products",
            )
        }
        Err(AuthError::Inactive) => {
            ApiResponse::error("Error en la autenticación: Cuenta desactivada")
        }
        Err(AuthError::InvalidCredentials) => {
            ApiResponse::error("Error en la autenticación: Email o contraseña incorrectos")
        }
        Err(e) => {
            tracing::error!("Login failed: {e}");
            ApiResponse::error("Error en la autenticación: Error interno")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn redirect_url_is_omitted_when_absent() {
        let Json(body) = ApiResponse::error("Este email ya está registrado");
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(
            json,
            "{\"success\":false,\"message\":\"Este email ya está registrado\"}"
        );
    }

    #[test]
    fn successful_login_carries_the_redirect() {
        let Json(body) = ApiResponse::ok_with_redirect("Bienvenido", "/products");
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"redirect_url\":\"/products\""));
        assert!(json.contains("\"success\":true"));
    }

    #[test]
    fn blank_fields_count_as_missing() {
        assert_eq!(non_empty(Some("  ".to_owned())), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(
            non_empty(Some("maria@pets.com".to_owned())),
            Some("maria@pets.com".to_owned())
        );
    }
}
