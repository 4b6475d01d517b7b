//! Mock text generator for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::text_generator::{
    GenerationError, GenerationRequest, ProviderInfo, TextGenerator,
};

/// Scriptable generator: queued responses and failures are returned in
/// order, then the default response repeats. Records every prompt it
/// receives for assertions.
pub struct MockGenerator {
    script: Mutex<VecDeque<Result<String, GenerationError>>>,
    default_response: String,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_response: "How can I help you today?".to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queues a successful response.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push_back(Ok(text.into()));
        self
    }

    /// Queues a failure.
    pub fn with_failure(self, error: GenerationError) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push_back(Err(error));
        self
    }

    /// Changes the response used once the script runs out.
    pub fn with_default_response(mut self, text: impl Into<String>) -> Self {
        self.default_response = text.into();
        self
    }

    /// Number of generate calls received.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    /// The most recent prompt, if any call was made.
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .last()
            .cloned()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        self.prompts
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(request.prompt);
        self.script
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front()
            .unwrap_or_else(|| Ok(self.default_response.clone()))
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "mock".to_string(),
            model: "scripted".to_string(),
        }
    }
}
