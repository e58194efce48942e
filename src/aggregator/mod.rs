// src/aggregator/mod.rs
mod registry;
mod status_aggregator;

pub use registry::{static_registry, ServerRetriever};
pub use status_aggregator::{AggregatorError, StatusAggregator};
