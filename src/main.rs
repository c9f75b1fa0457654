// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::application::query_service::QueryService;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::influx_repository::InfluxRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    config.validate()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(InfluxRepository::new(&config.influx)?);

    // Create services (application layer)
    let query_service = QueryService::new(repository, config.influx.bucket.clone());

    let state = Arc::new(AppState { query_service });
    let router = build_router(state);

    let addr: SocketAddr = config.server.bind_addr.parse()?;
    tracing::info!(
        "Starting vessel-telemetry on {} (backend {}, bucket {})",
        addr,
        config.influx.url,
        config.influx.bucket
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
