//! Inventory API Main Entry Point
//!
//! Serves the asset inventory HTTP API over the ownership store, the
//! document store and the cache.

use dotenv::dotenv;
use inventory_api::config::LogFormat;
use inventory_api::{server, AppConfig, Dependencies, StartupError};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("inventory_api=info,inventory_document_repository=info,tower_http=info")
    });

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true),
                )
                .init();

            info!(
                service_name = "inventory-api",
                service_version = env!("CARGO_PKG_VERSION"),
                "Tracing initialized with JSON format"
            );
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
                .init();

            info!(
                service_name = "inventory-api",
                service_version = env!("CARGO_PKG_VERSION"),
                "Tracing initialized with console output"
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing(LogFormat::from_env());

    let config = AppConfig::from_env().inspect_err(|e| error!(error = %e, "Invalid configuration"))?;

    info!("Starting asset inventory API");

    let deps = match Dependencies::new(&config).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let app = server::create_app(deps.state);
    if let Err(e) = server::run_server(app, config.server_addr()).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }

    Ok(())
}
