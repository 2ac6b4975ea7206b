//! Failing brain implementation - every completion errors.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chat_core::{async_trait, Brain, BrainError, CompletionRequest};

/// Which error a [`FailingBrain`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Unavailable,
    Network,
    Timeout,
    Empty,
}

/// A brain that fails every request with the configured error.
#[derive(Debug, Clone)]
pub struct FailingBrain {
    kind: FailureKind,
    calls: Arc<AtomicUsize>,
}

impl FailingBrain {
    /// Create a brain that always fails with `kind`.
    pub fn new(kind: FailureKind) -> Self {
        Self {
            kind,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of completions requested.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FailingBrain {
    fn default() -> Self {
        Self::new(FailureKind::Unavailable)
    }
}

#[async_trait]
impl Brain for FailingBrain {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, BrainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(match self.kind {
            FailureKind::Unavailable => BrainError::Unavailable("mock outage".to_string()),
            FailureKind::Network => BrainError::Network("connection reset".to_string()),
            FailureKind::Timeout => BrainError::Timeout(Duration::from_secs(30)),
            FailureKind::Empty => BrainError::MalformedResponse("empty reply".to_string()),
        })
    }

    fn name(&self) -> &str {
        "FailingBrain"
    }

    async fn is_ready(&self) -> bool {
        false
    }
}
