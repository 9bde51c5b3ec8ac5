//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use trailhub_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the merged configuration
    Show,
    /// Validate the configuration
    Validate,
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = super::load_config(config_path)?;
            match format {
                OutputFormat::Json => output::print_json(&config),
                OutputFormat::Table => {
                    output::print_kv("server.host", &config.server.host);
                    output::print_kv("server.port", &config.server.port.to_string());
                    output::print_kv("database.url", &config.database.url);
                    output::print_kv(
                        "database.max_connections",
                        &config.database.max_connections.to_string(),
                    );
                    output::print_kv("history.time_zone", &config.history.time_zone);
                    output::print_kv("logging.level", &config.logging.level);
                    output::print_kv("logging.format", &config.logging.format);
                }
            }
        }
        ConfigCommand::Validate => match super::load_config(config_path) {
            Ok(config) => {
                output::print_success(&format!("Configuration '{config_path}' is valid"));
                println!("  Server: {}:{}", config.server.host, config.server.port);
                println!("  Database: {}", config.database.url);
                println!("  Day boundary: {}", config.history.time_zone);
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }

    Ok(())
}
