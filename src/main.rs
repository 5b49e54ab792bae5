use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Use the library instead of redeclaring modules
use vin_cache::{
    config::{CacheMode, Config},
    database::Database,
    repositories::{SqliteVinRepository, VinCacheStore},
    services::{ExportService, LookupService},
    sources::VpicDecoder,
    web::{AppState, WebServer},
};

#[derive(Parser)]
#[command(name = "vin-cache")]
#[command(version)]
#[command(about = "A VIN lookup service with a local SQLite cache")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// SQLite cache file (overrides config file)
    #[arg(short = 'd', long, value_name = "PATH")]
    database_path: Option<String>,

    /// Cache initialisation mode: ephemeral or persistent
    #[arg(short = 'm', long, value_name = "MODE")]
    cache_mode: Option<CacheMode>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = if cli.log_level == "trace" {
        format!("vin_cache={},tower_http=trace", cli.log_level)
    } else {
        format!("vin_cache={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting VIN Cache Service v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(database_path) = cli.database_path {
        config.database.path = database_path.into();
    }
    if let Some(cache_mode) = cli.cache_mode {
        config.database.mode = cache_mode;
    }

    info!(
        "Using cache file: {} (mode: {:?}, remove on shutdown: {})",
        config.database.path.display(),
        config.database.mode,
        config.database.remove_on_shutdown
    );

    let database = Database::new(&config.database).await?;
    database.initialize().await?;
    info!("Database connection established");

    let store: Arc<dyn VinCacheStore> = Arc::new(SqliteVinRepository::new(database.pool()));
    let decoder = Arc::new(VpicDecoder::new(&config.decoder)?);
    info!("Decoder client initialized for {}", config.decoder.base_url);

    let state = AppState {
        store: store.clone(),
        lookup_service: LookupService::new(store.clone(), decoder),
        export_service: ExportService::new(
            store,
            config.export.clone(),
            Some(database.path().to_path_buf()),
        ),
    };

    let web_server = WebServer::new(&config.web, state)?;
    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );

    let served = web_server.serve_with_shutdown(shutdown_signal()).await;

    info!("Shutting down service");
    database.close().await?;

    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (Ctrl+C), shutting down gracefully"),
        _ = terminate => info!("Received SIGTERM, shutting down gracefully"),
    }
}
