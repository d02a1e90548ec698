//! Database migration command.
//!
//! Runs the embedded store migrations and creates the tower-sessions
//! table. Safe to run repeatedly; already-applied migrations are skipped.

use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;

use huellitas_web::config::AppConfig;
use huellitas_web::db;

/// Run all database migrations.
///
/// # Errors
///
/// Returns an error if configuration is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    info!("Connected to database");

    info!("Running store migrations");
    db::MIGRATOR.run(&pool).await?;

    info!("Creating session table");
    let store = PostgresStore::new(pool.clone());
    store.migrate().await?;

    info!("Migrations complete");
    Ok(())
}
