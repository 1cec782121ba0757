//! Shoe Store CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! shoe-cli migrate
//!
//! # Create the default admin (password from SEED_ADMIN_PASSWORD)
//! shoe-cli seed admin
//!
//! # Load products from a YAML catalog
//! shoe-cli seed catalog -f crates/cli/data/catalog.yaml
//!
//! # Create a user
//! shoe-cli user create -u alice -e alice@example.com -p 'long enough' -r admin
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use shoe_store_core::Role;

mod commands;

#[derive(Parser)]
#[command(name = "shoe-cli")]
#[command(author, version, about = "Shoe Store CLI tools")]
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
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Create the default admin account if no admin exists
    Admin,
    /// Insert products from a YAML catalog, skipping existing names
    Catalog {
        /// Path to the catalog file
        #[arg(short, long, default_value = "crates/cli/data/catalog.yaml")]
        file: String,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Display name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Role (`user` or `admin`)
        #[arg(short, long, default_value = "user")]
        role: Role,
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
            SeedTarget::Admin => commands::seed::admin().await?,
            SeedTarget::Catalog { file } => {
                commands::seed::catalog(&file).await?;
            }
        },
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                email,
                password,
                role,
            } => {
                commands::user::create(&username, &email, &password, role).await?;
            }
        },
    }
    Ok(())
}
