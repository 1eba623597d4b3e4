//! ppm-api - PPM Analysis Service
//!
//! Ingests raw proton-precession-magnetometer sample batches over HTTP,
//! delegates the numeric curve fit to the external analysis engine, and
//! persists the structured results.

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ppm_api::engine::EngineInvoker;
use ppm_api::AppState;
use ppm_common::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting ppm-api (PPM Analysis Service)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Optional first argument: config file path
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    info!("Database: {}", config.database.path.display());
    info!(
        "Engine: {} {}",
        config.engine.interpreter.display(),
        config.engine.script.display()
    );

    let db_pool = ppm_api::db::init_database_pool(&config.database.path).await?;
    info!("Database connection established");

    let invoker = EngineInvoker::new(config.engine.clone());
    let state = AppState::new(db_pool, invoker);

    let app = ppm_api::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Listening on http://{}", config.server.bind);
    info!("Health check: http://{}/health", config.server.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
