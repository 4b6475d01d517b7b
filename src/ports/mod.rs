//! Ports - trait seams between the application core and its adapters.

pub mod circuit_breaker;
pub mod session_store;
pub mod text_generator;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use session_store::{SessionStore, SessionStoreError};
pub use text_generator::{
    GenerationError, GenerationParams, GenerationRequest, ProviderInfo, TextGenerator,
};
