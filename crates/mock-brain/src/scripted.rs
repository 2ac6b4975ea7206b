//! Scripted brain implementation - replays canned replies in order.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chat_core::{async_trait, Brain, BrainError, CompletionRequest};

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Reply with this text.
    Reply(String),
    /// Fail with a processing error carrying this message.
    Fail(String),
}

/// A brain that returns scripted replies in order, then a fallback reply.
///
/// Clones share the script and the request log.
#[derive(Debug, Clone)]
pub struct ScriptedBrain {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    fallback: String,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedBrain {
    /// Create a brain that always answers `fallback` once the script runs out.
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: fallback.into(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a reply.
    pub fn then_reply(self, text: impl Into<String>) -> Self {
        self.push(Scripted::Reply(text.into()));
        self
    }

    /// Queue a failure.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(Scripted::Fail(message.into()));
        self
    }

    /// Queue an outcome on a shared handle.
    pub fn push(&self, outcome: Scripted) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(outcome);
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of completions requested.
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl Brain for ScriptedBrain {
    async fn complete(&self, request: CompletionRequest) -> Result<String, BrainError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Fail(message)) => Err(BrainError::ProcessingFailed(message)),
            None => Ok(self.fallback.clone()),
        }
    }

    fn name(&self) -> &str {
        "ScriptedBrain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            persona: String::new(),
            group_name: String::new(),
            context: Vec::new(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_script_then_fallback() {
        let brain = ScriptedBrain::new("boh")
            .then_reply("prima")
            .then_fail("rotto");

        assert_eq!(brain.complete(request()).await.unwrap(), "prima");
        assert!(matches!(
            brain.complete(request()).await,
            Err(BrainError::ProcessingFailed(msg)) if msg == "rotto"
        ));
        assert_eq!(brain.complete(request()).await.unwrap(), "boh");
        assert_eq!(brain.call_count(), 3);
    }
}
