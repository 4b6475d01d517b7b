//! Domain layer - pure triage logic with no I/O dependencies.

pub mod foundation;
pub mod triage;
