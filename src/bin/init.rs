//! themetog_init - One-time database initialization tool
//!
//! Creates a fresh forum database with themes, toggle settings and an admin account.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// themetog database initialization tool
#[derive(Parser, Debug)]
#[command(
    name = "themetog_init",
    version,
    about = "Initialize a new themetog database"
)]
struct Args {
    /// Path to SQLite database file to create (must not exist)
    #[arg(short, long)]
    database: PathBuf,

    /// Extra theme to install after the default theme (repeatable)
    #[arg(long = "theme")]
    themes: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "themetog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Read admin credentials from environment
    let admin_username = std::env::var("THEMETOG_ADMIN_USERNAME").map_err(|_| {
        anyhow::anyhow!("THEMETOG_ADMIN_USERNAME environment variable is required")
    })?;

    let admin_password = std::env::var("THEMETOG_ADMIN_PASSWORD").map_err(|_| {
        anyhow::anyhow!("THEMETOG_ADMIN_PASSWORD environment variable is required")
    })?;

    themetog::init::init_database(&args.database, &admin_username, &admin_password, &args.themes)
        .await?;

    Ok(())
}
