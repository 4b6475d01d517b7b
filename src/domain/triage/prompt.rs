//! Prompt composition for the text-generation backend.
//!
//! Produces a single completion-style prompt: a fixed consultation
//! persona, the speaker-prefixed transcript, the newest patient line,
//! and a trailing cue so the model continues as the assistant.

use super::state::{ConversationState, Speaker};

/// How the assistant introduces itself inside prompts and transcripts.
pub const ASSISTANT_NAME: &str = "Dr. AI";

const CONSULTATION_HEADER: &str = "You are Dr. AI, a friendly virtual physiotherapy assistant conducting \
a triage consultation for a physiotherapy practice.

Consultation rules:
- Greet the patient warmly, then focus on their complaint.
- Ask exactly one question at a time.
- Keep every response to two sentences at most.
- Reference what the patient already told you; never repeat a question.
- Never write the patient's side of the conversation.
- When you have enough information, either suggest simple self-care or \
recommend booking an appointment by including [SCHEDULE_APPOINTMENT] in your response.";

/// Builds prompts from conversation state. Stateless and pure: the same
/// state and message always produce the same prompt.
#[derive(Debug, Clone, Default)]
pub struct PromptComposer;

impl PromptComposer {
    pub fn new() -> Self {
        Self
    }

    /// Composes the full prompt for the next assistant response.
    ///
    /// `latest_message` is repeated after the transcript so the model
    /// always sees the line it must answer directly above the cue, even
    /// when the transcript grows long.
    pub fn compose(&self, state: &ConversationState, latest_message: &str) -> String {
        let mut prompt = String::from(CONSULTATION_HEADER);
        prompt.push_str("\n\nCurrent focus: ");
        prompt.push_str(state.phase.directive());
        prompt.push_str("\n\nCurrent conversation:\n");

        for turn in &state.transcript {
            let label = match turn.speaker {
                Speaker::Patient => "Patient",
                Speaker::Assistant => ASSISTANT_NAME,
            };
            prompt.push_str(label);
            prompt.push_str(": ");
            prompt.push_str(&turn.text);
            prompt.push('\n');
        }

        prompt.push_str("\nPatient: ");
        prompt.push_str(latest_message.trim());
        prompt.push('\n');
        prompt.push_str(ASSISTANT_NAME);
        prompt.push(':');
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;

    fn state_with_history() -> ConversationState {
        let mut state = ConversationState::new(SessionId::new());
        state.record_patient_message("My lower back hurts");
        state.record_assistant_message("How long has it been bothering you?");
        state
    }

    #[test]
    fn includes_persona_and_rules() {
        let prompt = PromptComposer::new().compose(&state_with_history(), "about a week");
        assert!(prompt.contains("virtual physiotherapy assistant"));
        assert!(prompt.contains("one question at a time"));
        assert!(prompt.contains("two sentences at most"));
    }

    #[test]
    fn includes_speaker_prefixed_transcript() {
        let prompt = PromptComposer::new().compose(&state_with_history(), "about a week");
        assert!(prompt.contains("Patient: My lower back hurts"));
        assert!(prompt.contains("Dr. AI: How long has it been bothering you?"));
    }

    #[test]
    fn ends_with_assistant_cue_after_latest_message() {
        let prompt = PromptComposer::new().compose(&state_with_history(), "about a week");
        assert!(prompt.ends_with("Patient: about a week\nDr. AI:"));
    }

    #[test]
    fn focus_line_follows_the_phase() {
        use crate::domain::triage::ConsultationPhase;

        let composer = PromptComposer::new();

        let fresh = ConversationState::new(SessionId::new());
        let prompt = composer.compose(&fresh, "hello");
        assert!(prompt.contains("Current focus: "));
        assert!(prompt.contains(ConsultationPhase::Greeting.directive()));

        let prompt = composer.compose(&state_with_history(), "about a week");
        assert!(prompt.contains(ConsultationPhase::InitialAssessment.directive()));
        assert!(!prompt.contains(ConsultationPhase::Greeting.directive()));
    }

    #[test]
    fn is_deterministic() {
        let state = state_with_history();
        let composer = PromptComposer::new();
        assert_eq!(
            composer.compose(&state, "about a week"),
            composer.compose(&state, "about a week")
        );
    }
}
