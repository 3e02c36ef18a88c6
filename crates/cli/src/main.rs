//! Shopfront CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! shopfront-cli migrate
//!
//! # Grant or revoke the admin flag
//! shopfront-cli admin grant alice
//! shopfront-cli admin revoke alice
//!
//! # Load products from YAML, replacing the current catalog
//! shopfront-cli seed catalog.yaml --clear
//! ```
//!
//! All commands read the same `DB_*` environment variables as the server.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shopfront-cli")]
#[command(author, version, about = "Shopfront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage the admin flag on user accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Insert products from a YAML file
    Seed {
        /// Path to the YAML product list
        file: String,

        /// Delete every product (and cart line) first
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Give a user admin access
    Grant {
        /// Username of an existing account
        username: String,
    },
    /// Remove a user's admin access
    Revoke {
        /// Username of an existing account
        username: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Grant { username } => commands::admin::set_admin(&username, true).await?,
            AdminAction::Revoke { username } => {
                commands::admin::set_admin(&username, false).await?;
            }
        },
        Commands::Seed { file, clear } => commands::seed::products(&file, clear).await?,
    }
    Ok(())
}
