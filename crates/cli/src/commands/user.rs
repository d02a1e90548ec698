//! Account management commands.

use tracing::info;

use huellitas_web::config::AppConfig;
use huellitas_web::db::{self, users::PgUsers};
use huellitas_web::services::auth::AuthService;

/// Create a new account through the same service the site uses, so the
/// username gets derived from the email's local part.
///
/// # Errors
///
/// Returns an error if configuration is missing, the email is invalid or
/// already registered, or the password is too short.
pub async fn create(email: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;

    let auth = AuthService::new(PgUsers::new(&pool));
    let user = auth.register(email, password).await?;

    info!(id = %user.id, username = %user.username, email = %user.email, "Account created");
    Ok(())
}
