//! CircuitBreaker port - Interface for inference-backend resilience.
//!
//! The circuit breaker prevents cascading failures when the hosted
//! text-generation endpoint becomes unavailable or slow.
//!
//! ## States
//!
//! - **Closed**: Normal operation, requests flow through
//! - **Open**: Too many failures, requests rejected immediately
//! - **Half-Open**: Testing if the service recovered
//!
//! ## Transitions
//!
//! ```text
//! Closed --[failure_threshold exceeded]--> Open
//! Open --[recovery_timeout elapsed]--> Half-Open
//! Half-Open --[success_threshold reached]--> Closed
//! Half-Open --[any failure]--> Open
//! ```

use std::time::Duration;

/// Circuit breaker states for external service protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation - requests flow through to the service.
    Closed,

    /// Too many failures - requests rejected immediately without calling
    /// the service. Transitions to HalfOpen after recovery_timeout.
    Open,

    /// Testing if the service recovered - requests allowed through.
    /// Success → Closed, Failure → Open.
    HalfOpen,
}

impl CircuitState {
    /// Check if the circuit allows requests through.
    pub fn allows_requests(&self) -> bool {
        matches!(self, CircuitState::Closed | CircuitState::HalfOpen)
    }
}

/// Configuration for circuit breaker behavior.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit.
    ///
    /// Default: 5 failures
    pub failure_threshold: u32,

    /// Time to wait before testing recovery (moving to half-open).
    ///
    /// Default: 30 seconds
    pub recovery_timeout: Duration,

    /// Number of successes in half-open state needed to close the circuit.
    ///
    /// Default: 3 successes
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 3,
        }
    }
}

impl CircuitBreakerConfig {
    /// Config tuned for hosted inference endpoints (lower threshold,
    /// longer recovery - cold model loads are slow).
    pub fn for_inference_provider() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(60),
            success_threshold: 2,
        }
    }
}

/// Port for circuit breaker functionality.
///
/// Wrapped around the text generator so that a dead upstream is
/// reported immediately instead of burning a timeout per request.
pub trait CircuitBreaker: Send + Sync {
    /// Get the current state of the circuit.
    fn state(&self) -> CircuitState;

    /// Check if a request should be allowed through.
    ///
    /// Returns `false` only while the circuit is open and the recovery
    /// timeout has not yet elapsed.
    fn should_allow(&self) -> bool;

    /// Record a successful request.
    ///
    /// In half-open state, this counts toward the success threshold.
    /// In closed state, this resets the failure count.
    fn record_success(&self);

    /// Record a failed request.
    ///
    /// In closed state, this counts toward the failure threshold.
    /// In half-open state, this immediately reopens the circuit.
    fn record_failure(&self);

    /// Force reset the circuit to closed state.
    fn reset(&self);
}
