//! Screentime server entrypoint: loads the risk model once, refuses to start without it,
//! then serves the prediction, entry, and dashboard routes.

use anyhow::Context;
use screentime_risk::{
    config::AppConfig,
    logging::StructuredLogger,
    risk::RiskEngine,
    server::{self, AppState},
    storage,
    tracker::Tracker,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?
        .with_env_overrides();

    StructuredLogger::init(&config.log)?;
    info!(config = %config_path.display(), model = %config.model.path.display(), "screentime server starting");

    let engine = RiskEngine::load(&config.model.path);
    engine
        .ensure_ready()
        .context("risk model must load before serving")?;

    let store = storage::open_store(&config.tracker)?;
    let tracker = Tracker::new(store, config.tracker.green_threshold_minutes)?;

    let state = AppState {
        engine: Arc::new(engine),
        tracker: Arc::new(tracker),
    };
    let app = server::router(state, &config.server.static_dir);

    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind_addr))?;
    server::serve(app, addr).await?;

    info!("screentime server stopped");
    Ok(())
}
