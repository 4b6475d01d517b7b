//! Application layer - orchestrates domain logic through the ports.

pub mod handlers;
pub mod session_locks;

pub use session_locks::SessionLocks;
