//! Physio Triage - conversational triage backend for a physiotherapy
//! practice chat assistant.
//!
//! The service runs a phase-based consultation per session: patient
//! messages feed heuristic field extraction, prompts go to a hosted
//! text-generation endpoint, completions are sanitized, and an
//! escalation policy decides when to recommend booking an appointment.
//!
//! Layout follows a hexagonal architecture:
//! - `domain` - pure triage logic (phases, extraction, sanitization, escalation)
//! - `ports` - trait seams (text generation, session storage, circuit breaking)
//! - `application` - command handlers and per-session serialization
//! - `adapters` - Hugging Face client, in-memory storage, HTTP API
//! - `config` - environment-driven configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
