//! CLI command definitions and dispatch.

pub mod config;
pub mod history;
pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use trailhub_core::config::AppConfig;
use trailhub_core::error::AppError;
use trailhub_database::DatabasePool;

use crate::output::OutputFormat;

/// TrailHub: activity history for business records
#[derive(Debug, Parser)]
#[command(name = "trailhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the TrailHub server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Record and inspect history
    History(history::HistoryArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.config).await,
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::History(args) => history::execute(args, &self.config, self.format).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration, using `TRAILHUB_ENV` for the overlay
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    let env = std::env::var("TRAILHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(config_path, &env)
}

/// Helper: connect and bring the schema up to date
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    let db = DatabasePool::connect(&config.database).await?;
    trailhub_database::migration::run_migrations(db.pool()).await?;
    Ok(db)
}
