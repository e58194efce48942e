// src/aggregator/status_aggregator.rs
use super::ServerRetriever;
use crate::probe::{Server, ServerCheck};
use crate::selection::{ListOptions, SelectionPredicate};
use crate::status::{
    ComponentCondition, ComponentStatus, ComponentStatusList, ConditionStatus, ConditionType,
};
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("component not found: {0}")]
    NotFound(String),
}

/// Aggregates per-component health probes into status records.
///
/// The target map comes from the injected retriever on every call, so the
/// aggregator itself holds no component state.
pub struct StatusAggregator {
    get_servers: ServerRetriever,
}

impl StatusAggregator {
    pub fn new(get_servers: ServerRetriever) -> Self {
        Self { get_servers }
    }

    /// Short alias advertised for the resource kind.
    pub fn short_names() -> &'static [&'static str] {
        &["cs"]
    }

    /// The resource is cluster-scoped.
    pub fn namespace_scoped() -> bool {
        false
    }

    /// Probes every target concurrently and returns the records that pass
    /// the selection predicate.
    ///
    /// One task is spawned per target with no bound on fan-out width. The
    /// call does not return until every probe has finished; a hanging target
    /// hangs the whole list, since no timeout is enforced at this layer.
    /// Probe errors never fail the call, they become record data.
    pub async fn list(&self, options: Option<&ListOptions>) -> ComponentStatusList {
        let servers = (self.get_servers)();

        // Each worker sends exactly once into a channel sized to the target
        // count, so no send ever blocks.
        let (tx, mut rx) = mpsc::channel(servers.len().max(1));
        let mut workers = Vec::with_capacity(servers.len());
        for (name, server) in servers {
            let tx = tx.clone();
            let worker_name = name.clone();
            let handle = tokio::spawn(async move {
                let status = component_status(&worker_name, server.as_ref()).await;
                let _ = tx.send(status).await;
            });
            workers.push((name, handle));
        }
        drop(tx);

        // Join barrier: no partial results while any probe is outstanding.
        // A panicked worker is folded back in as an Unknown record instead
        // of aborting the batch.
        let mut panicked = Vec::new();
        for (name, handle) in workers {
            if let Err(err) = handle.await {
                warn!(component = %name, %err, "probe task panicked");
                panicked.push((name, err));
            }
        }

        let predicate = SelectionPredicate::from_options(options);

        let mut items = Vec::new();
        while let Some(status) = rx.recv().await {
            if predicate.matches(&status) {
                items.push(status);
            }
        }
        for (name, err) in panicked {
            let status = panicked_status(&name, &err);
            if predicate.matches(&status) {
                items.push(status);
            }
        }

        // Completion order is nondeterministic; a stable sort by name keeps
        // the response deterministic for clients.
        items.sort_by(|a, b| a.name.cmp(&b.name));

        ComponentStatusList { items }
    }

    /// Probes a single component by name. Selectors do not apply to get.
    pub async fn get(&self, name: &str) -> Result<ComponentStatus, AggregatorError> {
        let servers = (self.get_servers)();
        match servers.get(name) {
            Some(server) => Ok(component_status(name, server.as_ref()).await),
            None => Err(AggregatorError::NotFound(name.to_string())),
        }
    }
}

async fn component_status(name: &str, server: &dyn Server) -> ComponentStatus {
    let ServerCheck {
        outcome,
        message,
        error,
    } = server.do_server_check().await;
    debug!(component = name, ?outcome, "probe finished");

    let condition = ComponentCondition {
        condition_type: ConditionType::Healthy,
        status: ConditionStatus::from(outcome),
        message,
        error: error.map(|e| e.to_string()).unwrap_or_default(),
    };

    ComponentStatus {
        name: name.to_string(),
        labels: BTreeMap::new(),
        conditions: vec![condition],
    }
}

fn panicked_status(name: &str, err: &JoinError) -> ComponentStatus {
    ComponentStatus {
        name: name.to_string(),
        labels: BTreeMap::new(),
        conditions: vec![ComponentCondition {
            condition_type: ConditionType::Healthy,
            status: ConditionStatus::Unknown,
            message: String::new(),
            error: format!("probe panicked: {err}"),
        }],
    }
}
