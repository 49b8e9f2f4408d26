use std::sync::Arc;

use tracing::{error, info};

use anonfs::{AppState, Config, Database, NamespaceStore, UploadClient, WebServer};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let config = match Config::load_with_env(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = anonfs::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        anonfs::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!("anonfs stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anonfs::Result<()> {
    config.validate()?;

    info!("anonfs - virtual file namespace");
    info!("Upload provider: {}", config.upload.url);

    let db = Database::open(&config.database).await?;
    NamespaceStore::new(&db).ensure_root().await?;

    let uploader = Arc::new(UploadClient::new(&config.upload)?);
    let state = AppState::new(Arc::new(db), uploader, config.upload.clone());

    let server = WebServer::new(&config.server, state)?;
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );
    server.run().await?;
    Ok(())
}
