//! Text Generator Port - Interface for hosted text-generation backends.
//!
//! The triage core only needs one capability from a model provider:
//! turn a completion-style prompt into raw generated text. Everything
//! else (sanitization, escalation) happens on our side of the seam.

use async_trait::async_trait;

/// Errors that can occur while generating text
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("Upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed, check the API key")]
    AuthenticationFailed,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream returned an empty completion")]
    EmptyCompletion,

    #[error("Failed to parse upstream payload: {0}")]
    Parse(String),

    #[error("Generation service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl GenerationError {
    /// Returns true for transient failures that a bounded retry may fix.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network(_) | Self::RateLimited { .. } => true,
            Self::Upstream { status, .. } => *status >= 500,
            Self::AuthenticationFailed
            | Self::EmptyCompletion
            | Self::Parse(_)
            | Self::ServiceUnavailable(_) => false,
        }
    }

    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}

/// Sampling parameters passed through to the model endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
    /// The completion is cut at the first occurrence of any of these.
    pub stop_sequences: Vec<String>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 150,
            temperature: 0.7,
            top_p: 0.95,
            repetition_penalty: 1.2,
            stop_sequences: vec![
                "Patient:".to_string(),
                "Human:".to_string(),
                "\n\n".to_string(),
            ],
        }
    }
}

/// A single generation request: the composed prompt plus parameters.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub params: GenerationParams,
}

impl GenerationRequest {
    /// Creates a request with default parameters.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            params: GenerationParams::default(),
        }
    }

    /// Replaces the sampling parameters.
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Overrides the token budget.
    pub fn with_max_new_tokens(mut self, max_new_tokens: u32) -> Self {
        self.params.max_new_tokens = max_new_tokens;
        self
    }
}

/// Identifies a concrete provider for logging and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    pub name: String,
    pub model: String,
}

/// Port for text-generation backends
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates raw completion text for the given request.
    ///
    /// # Errors
    /// Returns `GenerationError` when the upstream call fails or the
    /// payload cannot be interpreted.
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;

    /// Returns provider name and model for diagnostics.
    fn provider_info(&self) -> ProviderInfo;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod params {
        use super::*;

        #[test]
        fn defaults_match_consultation_tuning() {
            let params = GenerationParams::default();
            assert_eq!(params.max_new_tokens, 150);
            assert!((params.temperature - 0.7).abs() < f32::EPSILON);
            assert!((params.top_p - 0.95).abs() < f32::EPSILON);
            assert!((params.repetition_penalty - 1.2).abs() < f32::EPSILON);
            assert_eq!(
                params.stop_sequences,
                vec!["Patient:", "Human:", "\n\n"]
            );
        }

        #[test]
        fn request_builder_overrides_token_budget() {
            let request = GenerationRequest::new("prompt").with_max_new_tokens(64);
            assert_eq!(request.params.max_new_tokens, 64);
        }
    }

    mod retryability {
        use super::*;

        #[test]
        fn transient_failures_are_retryable() {
            assert!(GenerationError::Timeout { timeout_secs: 60 }.is_retryable());
            assert!(GenerationError::network("connection reset").is_retryable());
            assert!(GenerationError::RateLimited { retry_after_secs: 30 }.is_retryable());
            assert!(GenerationError::upstream(503, "model loading").is_retryable());
        }

        #[test]
        fn permanent_failures_are_not_retryable() {
            assert!(!GenerationError::AuthenticationFailed.is_retryable());
            assert!(!GenerationError::upstream(400, "bad request").is_retryable());
            assert!(!GenerationError::parse("unexpected shape").is_retryable());
            assert!(!GenerationError::ServiceUnavailable("circuit open".into()).is_retryable());
        }
    }
}
