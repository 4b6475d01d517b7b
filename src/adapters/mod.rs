//! Adapters - concrete implementations of the ports.

pub mod circuit_breaker;
pub mod http;
pub mod inference;
pub mod storage;
