// src/aggregator/registry.rs
use crate::probe::Server;
use std::collections::HashMap;
use std::sync::Arc;

/// Capability that yields the current name-to-target mapping. Invoked fresh
/// on every list/get; the aggregator never caches the result, so concurrent
/// calls may observe different target sets.
pub type ServerRetriever = Arc<dyn Fn() -> HashMap<String, Arc<dyn Server>> + Send + Sync>;

/// Wraps a fixed target map as a retriever. Handy for configuration-driven
/// deployments and for test doubles.
pub fn static_registry(servers: HashMap<String, Arc<dyn Server>>) -> ServerRetriever {
    Arc::new(move || servers.clone())
}
