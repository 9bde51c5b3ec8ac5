//! Start the TrailHub server.

use clap::Args;

use trailhub_core::error::AppError;
use trailhub_database::DatabasePool;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Skip running database migrations on startup
    #[arg(long)]
    pub skip_migrate: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, config_path: &str) -> Result<(), AppError> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }

    println!("Starting TrailHub server...");
    println!("  Host: {}", config.server.host);
    println!("  Port: {}", config.server.port);

    let db = if args.skip_migrate {
        DatabasePool::connect(&config.database).await?
    } else {
        println!("Running database migrations...");
        super::connect(&config).await?
    };

    trailhub_api::run_server(config, db).await
}
