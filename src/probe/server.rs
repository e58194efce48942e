// src/probe/server.rs
use async_trait::async_trait;

/// Tri-state result of a single health probe. Indeterminate outcomes
/// (timeouts, malformed responses) are `Unknown`, distinct from a
/// confirmed `Failure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProbeOutcome {
    Success,
    Failure,
    Unknown,
}

/// What one backend check reported. `outcome` and `error` are orthogonal:
/// a check may report `Success` and still attach an error.
#[derive(Debug)]
pub struct ServerCheck {
    pub outcome: ProbeOutcome,
    pub message: String,
    pub error: Option<anyhow::Error>,
}

impl ServerCheck {
    pub fn new(outcome: ProbeOutcome, message: impl Into<String>) -> Self {
        Self {
            outcome,
            message: message.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: anyhow::Error) -> Self {
        self.error = Some(error);
        self
    }
}

/// A probe target. Implementations must be safe to check concurrently
/// across different targets; any timeout is the implementation's own
/// responsibility.
#[async_trait]
pub trait Server: Send + Sync {
    async fn do_server_check(&self) -> ServerCheck;
}
