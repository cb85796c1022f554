//! Command line entry points
//!
//! - `serve`: run the HTTP API
//! - `migrate`: create the database tables

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Portfolio backend - projects and API key authorization
#[derive(Parser)]
#[command(name = "portfolio-backend")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server (default)
    Serve,

    /// Create storage tables and exit
    Migrate,
}

/// Load `.env`, then layered configuration
pub(crate) fn load_config() -> anyhow::Result<crate::AppConfig> {
    dotenvy::dotenv().ok();

    let config = crate::AppConfig::load()?;
    config.validate()?;

    Ok(config)
}
