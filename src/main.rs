use std::path::PathBuf;

use tracing::{error, info};

use askar::drive::{seed, EntityStore};
use askar::{Config, Database, WebServer};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    // Load configuration
    let config = match Config::load_with_env(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", config_path.display());
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = askar::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        askar::logging::init_console_only(&config.logging.level);
    }

    info!("3askar Drive server");

    if let Err(e) = run(config).await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> askar::Result<()> {
    config.validate()?;

    let db = Database::open(&config.database.path).await?;

    let records = seed::load_records(&config.drive.seed_path)?;
    let store = EntityStore::with_records(records)?;
    info!(count = store.len(), "Drive records loaded");

    let server = WebServer::from_config(&config, db, store)?;
    info!(
        "Server configured on {}:{} (frontend {})",
        config.server.host, config.server.port, config.server.frontend_url
    );

    server.run().await?;
    Ok(())
}
