//! Text generation adapters.

pub mod huggingface;
pub mod mock;
pub mod resilient;

pub use huggingface::{HuggingFaceConfig, HuggingFaceGenerator};
pub use mock::MockGenerator;
pub use resilient::{ResilientGenerator, RetryPolicy};
