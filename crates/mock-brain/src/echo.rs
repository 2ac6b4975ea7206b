//! Echo brain implementation - echoes the message being answered.

use std::sync::{Arc, Mutex};

use chat_core::{async_trait, Brain, BrainError, CompletionRequest};

/// A simple brain that replies with the text of the latest context entry.
///
/// Every request is recorded so tests can inspect what the AI would have seen.
#[derive(Debug, Clone, Default)]
pub struct EchoBrain {
    /// Optional prefix to add before the echo.
    prefix: Option<String>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl EchoBrain {
    /// Create a new EchoBrain with no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new EchoBrain with a custom prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_brain::EchoBrain;
    ///
    /// let brain = EchoBrain::with_prefix("eh? ");
    /// // Will respond with "eh? <original message>"
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
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
impl Brain for EchoBrain {
    async fn complete(&self, request: CompletionRequest) -> Result<String, BrainError> {
        let text = request
            .latest()
            .map(|entry| entry.text.clone())
            .unwrap_or_default();

        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        Ok(match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, text),
            None => text,
        })
    }

    fn name(&self) -> &str {
        "EchoBrain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::{ChatEvent, ContextEntry};

    fn request(text: &str) -> CompletionRequest {
        CompletionRequest {
            persona: "nonno".to_string(),
            group_name: "Famiglia".to_string(),
            context: vec![ContextEntry::from_event(&ChatEvent::new(
                "g",
                "+15551234567",
                text,
                1,
            ))],
            image: None,
        }
    }

    #[tokio::test]
    async fn test_echo_no_prefix() {
        let brain = EchoBrain::new();
        let response = brain.complete(request("Hello!")).await.unwrap();
        assert_eq!(response, "Hello!");
    }

    #[tokio::test]
    async fn test_echo_with_prefix() {
        let brain = EchoBrain::with_prefix("Echo: ");
        let response = brain.complete(request("Hello!")).await.unwrap();
        assert_eq!(response, "Echo: Hello!");
    }

    #[tokio::test]
    async fn test_requests_are_recorded_across_clones() {
        let brain = EchoBrain::new();
        let observer = brain.clone();

        brain.complete(request("uno")).await.unwrap();
        brain.complete(request("due")).await.unwrap();

        assert_eq!(observer.call_count(), 2);
        assert_eq!(observer.requests()[1].latest().unwrap().text, "due");
    }

    #[tokio::test]
    async fn test_brain_name_and_ready() {
        let brain = EchoBrain::new();
        assert_eq!(brain.name(), "EchoBrain");
        assert!(brain.is_ready().await);
    }
}
