//! a0sweep - Auth0 inactive-user remediation job.
//!
//! Scans the tenant's user directory for accounts inactive past a
//! configured threshold and blocks them. `-u` reverses one page of blocked
//! users from a test run instead.

#![deny(clippy::all)]

mod auth;
mod config;
mod directory;
mod error;
mod scan;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use auth::AuthClient;
use config::Config;
use directory::DirectoryClient;

/// Blocks inactive Auth0 directory users.
#[derive(Debug, Parser)]
#[command(name = "a0sweep", version)]
struct Cli {
    /// Unblock one page of currently blocked users instead of scanning.
    #[arg(short = 'u', long = "undo")]
    undo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (if present) before anything else
    if let Err(e) = dotenvy::dotenv() {
        // .env file is optional - only log if it's not a "file not found" error
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    init_logging();

    let cli = Cli::parse();

    info!("Starting a0sweep v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load().context("Configuration error")?;

    let auth_client = AuthClient::new(&config.auth0).context("Failed to create auth client")?;
    let access_token = auth_client
        .fetch_access_token()
        .await
        .context("Failed to obtain a Management API token")?;

    let directory = DirectoryClient::new(&config.auth0, access_token)
        .context("Failed to create directory client")?;

    if cli.undo {
        let unblocked = scan::undo_one_page(&config, &directory).await?;
        info!("Undo complete: {} users unblocked", unblocked);
    } else {
        let totals = scan::run_block_scan(&config, &directory).await?;
        info!(
            "Done: {} blocked by last activity, {} never active, {} total",
            totals.by_last_activity,
            totals.never_active,
            totals.total()
        );
    }

    Ok(())
}

/// Initialize tracing/logging.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}
