// src/main.rs
use anyhow::Result;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod aggregator;
mod config;
mod probe;
mod selection;
mod server;
mod status;

use crate::{
    aggregator::{static_registry, ServerRetriever, StatusAggregator},
    config::Config,
    probe::{HttpServer, Server},
    server::RequestHandler,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("component_status=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());

    info!("Loading configuration from: {}", config_path);
    let config = config::load_config(&config_path).await?;

    // Build the probe registry and hand it to the aggregator
    let registry = build_registry(&config)?;
    let aggregator = Arc::new(StatusAggregator::new(registry));
    info!(
        components = config.components.len(),
        "registered component targets"
    );

    // Create request handler
    let handler = RequestHandler::new(aggregator);

    // Start main server
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Starting component status server on {}", addr);

    server::serve(addr, handler).await?;

    Ok(())
}

fn build_registry(config: &Config) -> Result<ServerRetriever> {
    let mut servers: HashMap<String, Arc<dyn Server>> = HashMap::new();
    for component in &config.components {
        let probe = HttpServer::new(
            component.url.clone(),
            component.check_path.clone(),
            Duration::from_secs(component.timeout_secs),
        )?;
        servers.insert(component.name.clone(), Arc::new(probe));
    }
    Ok(static_registry(servers))
}
