//! Huellitas CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (includes the session table)
//! huellitas-cli migrate
//!
//! # Load the 30-product pet-supply catalog
//! huellitas-cli seed products
//!
//! # Create an account from the command line
//! huellitas-cli user create -e maria@pets.com -p secreta
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed products` - Seed the catalog (products already present are skipped)
//! - `user create` - Create an account with a derived username

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "huellitas-cli")]
#[command(author, version, about = "Huellitas Alegres CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Load the pet-supply catalog (skips products that already exist)
    Products,
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new account
    Create {
        /// Email address (login identifier)
        #[arg(short, long)]
        email: String,

        /// Password (minimum 6 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Products => commands::seed::products().await?,
        },
        Commands::User { action } => match action {
            UserAction::Create { email, password } => {
                commands::user::create(&email, &password).await?;
            }
        },
    }
    Ok(())
}
