//! In-memory circuit breaker.

use std::sync::Mutex;
use std::time::Instant;

use tracing::{info, warn};

use crate::ports::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    half_open_successes: u32,
    opened_at: Option<Instant>,
}

impl BreakerState {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            half_open_successes: 0,
            opened_at: None,
        }
    }
}

/// Process-local circuit breaker implementing the port's state machine.
pub struct InMemoryCircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
}

impl InMemoryCircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerState::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerState> {
        // A poisoned lock only means a panic elsewhere; the state itself
        // is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn open(&self, inner: &mut BreakerState) {
        inner.state = CircuitState::Open;
        inner.opened_at = Some(Instant::now());
        inner.half_open_successes = 0;
        warn!(
            failures = inner.consecutive_failures,
            "circuit breaker opened"
        );
    }
}

impl CircuitBreaker for InMemoryCircuitBreaker {
    fn state(&self) -> CircuitState {
        self.lock().state
    }

    fn should_allow(&self) -> bool {
        let mut inner = self.lock();
        if inner.state.allows_requests() {
            return true;
        }

        let recovered = inner
            .opened_at
            .map(|at| at.elapsed() >= self.config.recovery_timeout)
            .unwrap_or(true);
        if recovered {
            inner.state = CircuitState::HalfOpen;
            inner.half_open_successes = 0;
            info!("circuit breaker half-open, probing recovery");
            true
        } else {
            false
        }
    }

    fn record_success(&self) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                inner.half_open_successes += 1;
                if inner.half_open_successes >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.consecutive_failures = 0;
                    inner.opened_at = None;
                    info!("circuit breaker closed after recovery");
                }
            }
            CircuitState::Open => {}
        }
    }

    fn record_failure(&self) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.config.failure_threshold {
                    self.open(&mut inner);
                }
            }
            // Any failure while probing reopens the circuit.
            CircuitState::HalfOpen => {
                inner.consecutive_failures += 1;
                self.open(&mut inner);
            }
            CircuitState::Open => {}
        }
    }

    fn reset(&self) {
        let mut inner = self.lock();
        *inner = BreakerState::new();
    }
}
