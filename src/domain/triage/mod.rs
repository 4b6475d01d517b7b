//! The triage consultation core: phase machine, field extraction,
//! prompt composition, response sanitization, and escalation policy.

pub mod escalation;
pub mod phase;
pub mod prompt;
pub mod rules;
pub mod sanitizer;
pub mod state;

pub use escalation::{should_escalate, SCHEDULE_APPOINTMENT_MARKER};
pub use phase::ConsultationPhase;
pub use prompt::PromptComposer;
pub use sanitizer::ResponseSanitizer;
pub use state::{ConversationState, ExtractedFields, Speaker, Turn};
