use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use crate::models::message::AgentMessage;
use crate::models::tool::ToolSignature;
use crate::providers::base::{Completion, Provider};

/// A mock provider that returns pre-configured completions for testing
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Result<Completion, String>>>>,
    requests: Arc<Mutex<Vec<Vec<AgentMessage>>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of completions
    pub fn new(responses: Vec<Completion>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    /// Create a mock whose replies may also be failures
    pub fn with_results(responses: Vec<Result<Completion, String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle to the histories sent so far, one entry per call
    pub fn requests(&self) -> Arc<Mutex<Vec<Vec<AgentMessage>>>> {
        Arc::clone(&self.requests)
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _model: &str,
        _system: &str,
        history: &[AgentMessage],
        _tools: &[ToolSignature],
    ) -> Result<Completion> {
        self.requests.lock().unwrap().push(history.to_vec());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Return empty response if no more pre-configured responses
            Ok(Completion::default())
        } else {
            responses.remove(0).map_err(|e| anyhow!(e))
        }
    }
}
