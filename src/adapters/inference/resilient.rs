//! Resilient text generator wrapper.
//!
//! Wraps any `TextGenerator` with a bounded retry (jittered backoff)
//! and a circuit breaker. While the circuit is open, requests fail
//! immediately with `ServiceUnavailable` instead of hitting the
//! upstream endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::warn;

use crate::ports::circuit_breaker::CircuitBreaker;
use crate::ports::text_generator::{
    GenerationError, GenerationRequest, ProviderInfo, TextGenerator,
};

/// Retry behavior for transient upstream failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Base delay before a retry; actual delay adds up to 50% jitter.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    fn delay(&self) -> Duration {
        let base = self.backoff.as_millis() as u64;
        let jitter = rand::thread_rng().gen_range(0..=base / 2);
        Duration::from_millis(base + jitter)
    }
}

/// Decorator adding retry and circuit breaking to a text generator.
pub struct ResilientGenerator {
    inner: Arc<dyn TextGenerator>,
    breaker: Arc<dyn CircuitBreaker>,
    retry: RetryPolicy,
}

impl ResilientGenerator {
    pub fn new(inner: Arc<dyn TextGenerator>, breaker: Arc<dyn CircuitBreaker>) -> Self {
        Self {
            inner,
            breaker,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl TextGenerator for ResilientGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        if !self.breaker.should_allow() {
            return Err(GenerationError::ServiceUnavailable(
                "text generation circuit is open".to_string(),
            ));
        }

        let mut attempt = 0;
        loop {
            match self.inner.generate(request.clone()).await {
                Ok(text) => {
                    self.breaker.record_success();
                    return Ok(text);
                }
                Err(err) if err.is_retryable() => {
                    self.breaker.record_failure();
                    if attempt >= self.retry.max_retries {
                        return Err(err);
                    }
                    attempt += 1;
                    let delay = self.retry.delay();
                    warn!(
                        error = %err,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "generation failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                // Permanent failures say nothing about upstream health.
                Err(err) => return Err(err),
            }
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.inner.provider_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::circuit_breaker::InMemoryCircuitBreaker;
    use crate::adapters::inference::MockGenerator;
    use crate::ports::circuit_breaker::{CircuitBreakerConfig, CircuitState};

    fn breaker_with_threshold(failure_threshold: u32) -> Arc<InMemoryCircuitBreaker> {
        Arc::new(InMemoryCircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold,
            recovery_timeout: Duration::from_secs(60),
            success_threshold: 1,
        }))
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_retries: 1,
            backoff: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn passes_through_successful_generation() {
        let mock = Arc::new(MockGenerator::new().with_response("All fine"));
        let breaker = breaker_with_threshold(3);
        let gen = ResilientGenerator::new(mock.clone(), breaker).with_retry(fast_retry());

        let text = gen.generate(GenerationRequest::new("p")).await.unwrap();
        assert_eq!(text, "All fine");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn retries_once_on_transient_failure() {
        let mock = Arc::new(
            MockGenerator::new()
                .with_failure(GenerationError::network("reset"))
                .with_response("Recovered"),
        );
        let breaker = breaker_with_threshold(5);
        let gen = ResilientGenerator::new(mock.clone(), breaker).with_retry(fast_retry());

        let text = gen.generate(GenerationRequest::new("p")).await.unwrap();
        assert_eq!(text, "Recovered");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn gives_up_after_bounded_retries() {
        let mock = Arc::new(
            MockGenerator::new()
                .with_failure(GenerationError::network("reset"))
                .with_failure(GenerationError::network("reset again")),
        );
        let breaker = breaker_with_threshold(5);
        let gen = ResilientGenerator::new(mock.clone(), breaker).with_retry(fast_retry());

        let err = gen.generate(GenerationRequest::new("p")).await.unwrap_err();
        assert!(matches!(err, GenerationError::Network(_)));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_failures() {
        let mock = Arc::new(
            MockGenerator::new().with_failure(GenerationError::AuthenticationFailed),
        );
        let breaker = breaker_with_threshold(5);
        let gen = ResilientGenerator::new(mock.clone(), breaker.clone()).with_retry(fast_retry());

        let err = gen.generate(GenerationRequest::new("p")).await.unwrap_err();
        assert_eq!(err, GenerationError::AuthenticationFailed);
        assert_eq!(mock.call_count(), 1);
        // Permanent failures do not trip the breaker.
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn open_circuit_short_circuits_to_service_unavailable() {
        let mock = Arc::new(
            MockGenerator::new()
                .with_failure(GenerationError::network("down"))
                .with_failure(GenerationError::network("down")),
        );
        let breaker = breaker_with_threshold(2);
        let gen = ResilientGenerator::new(mock.clone(), breaker.clone()).with_retry(fast_retry());

        // Two transient failures trip the breaker.
        let _ = gen.generate(GenerationRequest::new("p")).await;
        assert_eq!(breaker.state(), CircuitState::Open);

        let err = gen.generate(GenerationRequest::new("p")).await.unwrap_err();
        assert!(matches!(err, GenerationError::ServiceUnavailable(_)));
        // The upstream was not called again.
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn success_records_into_breaker() {
        let mock = Arc::new(MockGenerator::new().with_response("ok"));
        let breaker = breaker_with_threshold(1);
        let gen = ResilientGenerator::new(mock, breaker.clone()).with_retry(fast_retry());

        gen.generate(GenerationRequest::new("p")).await.unwrap();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }
}
