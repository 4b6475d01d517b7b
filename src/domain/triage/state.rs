//! Conversation state for a single triage session.
//!
//! Tracks the transcript, the consultation phase, and the clinical
//! fields extracted so far. All mutation goes through
//! `record_patient_message` / `record_assistant_message`, which keep the
//! phase and the extracted fields consistent with the transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::SessionId;

use super::phase::ConsultationPhase;
use super::rules::{self, Slot};

/// Who produced a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Patient,
    Assistant,
}

/// One utterance in the consultation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Clinical fields accumulated from patient messages.
///
/// `main_complaint` and `location` keep their first value; the other
/// fields track the most recent matching message, since patients refine
/// those answers as the consultation digs deeper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub main_complaint: Option<String>,
    pub location: Option<String>,
    pub duration: Option<String>,
    pub intensity: Option<String>,
    pub triggers: Option<String>,
}

impl ExtractedFields {
    /// True once location and duration are both known.
    pub fn has_initial_picture(&self) -> bool {
        self.location.is_some() && self.duration.is_some()
    }

    /// True once intensity and triggers are both known.
    pub fn has_detailed_picture(&self) -> bool {
        self.intensity.is_some() && self.triggers.is_some()
    }

    fn apply(&mut self, slot: Slot, value: String) {
        match slot {
            // First mention of a body part wins.
            Slot::Location => {
                if self.location.is_none() {
                    self.location = Some(value);
                }
            }
            Slot::Duration => self.duration = Some(value),
            Slot::Intensity => self.intensity = Some(value),
            Slot::Triggers => self.triggers = Some(value),
        }
    }
}

/// The full state of one triage conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub session_id: SessionId,
    pub transcript: Vec<Turn>,
    pub phase: ConsultationPhase,
    pub fields: ExtractedFields,
    /// Number of assistant responses recorded, i.e. questions asked.
    pub assistant_turns: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationState {
    /// Creates a fresh Greeting-phase conversation.
    pub fn new(session_id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            transcript: Vec::new(),
            phase: ConsultationPhase::Greeting,
            fields: ExtractedFields::default(),
            assistant_turns: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Records a patient message: appends it to the transcript, runs the
    /// extraction rules over it, and advances the phase if warranted.
    ///
    /// Empty and whitespace-only messages are ignored entirely.
    pub fn record_patient_message(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        // The first thing the patient says (before the assistant has
        // asked a second question) is taken as the main complaint.
        if self.fields.main_complaint.is_none() && self.assistant_turns <= 1 {
            self.fields.main_complaint = Some(text.trim().to_string());
        }

        for rule in rules::rules() {
            if let Some(value) = rule.extract(text) {
                self.fields.apply(rule.slot(), value);
            }
        }

        self.transcript.push(Turn::new(Speaker::Patient, text));
        self.updated_at = Utc::now();
        self.advance_phase();
    }

    /// Records an assistant response and advances the phase if warranted.
    ///
    /// Empty and whitespace-only messages are ignored entirely.
    pub fn record_assistant_message(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        self.transcript.push(Turn::new(Speaker::Assistant, text));
        self.assistant_turns += 1;
        self.updated_at = Utc::now();
        self.advance_phase();
    }

    /// Number of patient turns recorded so far.
    pub fn patient_turns(&self) -> usize {
        self.transcript
            .iter()
            .filter(|t| t.speaker == Speaker::Patient)
            .count()
    }

    // Phase transitions only ever step forward, each from its direct
    // predecessor. Checked after every recorded turn, since the last
    // transition depends on how many questions the assistant has asked.
    fn advance_phase(&mut self) {
        match self.phase {
            ConsultationPhase::Greeting => {
                if self.patient_turns() > 0 {
                    self.phase = ConsultationPhase::InitialAssessment;
                }
            }
            ConsultationPhase::InitialAssessment => {
                if self.fields.has_initial_picture() {
                    self.phase = ConsultationPhase::DetailedAssessment;
                }
            }
            ConsultationPhase::DetailedAssessment => {
                if self.fields.has_detailed_picture() && self.assistant_turns >= 4 {
                    self.phase = ConsultationPhase::Conclusion;
                }
            }
            ConsultationPhase::Conclusion => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ConversationState {
        ConversationState::new(SessionId::new())
    }

    mod transcript_recording {
        use super::*;

        #[test]
        fn records_turns_in_order() {
            let mut s = state();
            s.record_patient_message("My knee hurts");
            s.record_assistant_message("How long has it been sore?");
            assert_eq!(s.transcript.len(), 2);
            assert_eq!(s.transcript[0].speaker, Speaker::Patient);
            assert_eq!(s.transcript[1].speaker, Speaker::Assistant);
            assert_eq!(s.assistant_turns, 1);
        }

        #[test]
        fn ignores_empty_and_whitespace_messages() {
            let mut s = state();
            s.record_patient_message("");
            s.record_patient_message("   \n\t ");
            s.record_assistant_message("  ");
            assert!(s.transcript.is_empty());
            assert_eq!(s.phase, ConsultationPhase::Greeting);
            assert_eq!(s.assistant_turns, 0);
        }
    }

    mod field_extraction {
        use super::*;

        #[test]
        fn first_message_becomes_main_complaint() {
            let mut s = state();
            s.record_patient_message("My lower back hurts");
            assert_eq!(s.fields.main_complaint.as_deref(), Some("My lower back hurts"));
            assert_eq!(s.fields.location.as_deref(), Some("lower back"));
        }

        #[test]
        fn main_complaint_is_not_overwritten() {
            let mut s = state();
            s.record_patient_message("My neck hurts");
            s.record_assistant_message("When did it start?");
            s.record_patient_message("Also my knee aches");
            assert_eq!(s.fields.main_complaint.as_deref(), Some("My neck hurts"));
        }

        #[test]
        fn main_complaint_window_closes_after_second_question() {
            let mut s = state();
            s.record_assistant_message("Hello, what brings you in?");
            s.record_assistant_message("Anything bothering you today?");
            s.record_patient_message("Well, nothing much");
            assert_eq!(s.fields.main_complaint, None);
        }

        #[test]
        fn location_keeps_first_value() {
            let mut s = state();
            s.record_patient_message("My neck hurts");
            s.record_patient_message("And my knee aches too");
            assert_eq!(s.fields.location.as_deref(), Some("neck"));
        }

        #[test]
        fn duration_overwrites_on_new_match() {
            let mut s = state();
            s.record_patient_message("It started a few days ago");
            s.record_patient_message("Actually, more like two weeks");
            assert_eq!(s.fields.duration.as_deref(), Some("Actually, more like two weeks"));
        }

        #[test]
        fn one_message_can_fill_several_slots() {
            let mut s = state();
            s.record_patient_message("My hip hurts, worse after a week of running");
            assert_eq!(s.fields.location.as_deref(), Some("hip"));
            assert!(s.fields.duration.is_some());
            assert!(s.fields.triggers.is_some());
        }
    }

    mod phase_transitions {
        use super::*;

        #[test]
        fn greeting_advances_on_first_patient_message() {
            let mut s = state();
            s.record_patient_message("Hello there");
            assert_eq!(s.phase, ConsultationPhase::InitialAssessment);
        }

        #[test]
        fn assistant_turns_alone_do_not_leave_greeting() {
            let mut s = state();
            s.record_assistant_message("Hello! What brings you in today?");
            assert_eq!(s.phase, ConsultationPhase::Greeting);
        }

        #[test]
        fn location_and_duration_reach_detailed_assessment() {
            let mut s = state();
            s.record_patient_message("My lower back hurts");
            assert_eq!(s.phase, ConsultationPhase::InitialAssessment);
            s.record_patient_message("For about a week now");
            assert_eq!(s.phase, ConsultationPhase::DetailedAssessment);
        }

        #[test]
        fn conclusion_requires_four_assistant_questions() {
            let mut s = state();
            s.record_patient_message("My lower back hurts");
            s.record_assistant_message("q1");
            s.record_patient_message("It's been about 3 weeks");
            s.record_assistant_message("q2");
            s.record_patient_message("I'd say 8 out of 10");
            s.record_assistant_message("q3");
            s.record_patient_message("It's worse after sitting");
            // Intensity and triggers are known, but only 3 questions asked.
            assert_eq!(s.phase, ConsultationPhase::DetailedAssessment);
            s.record_assistant_message("q4");
            assert_eq!(s.phase, ConsultationPhase::Conclusion);
        }

        #[test]
        fn phases_never_skip_forward() {
            let mut s = state();
            // Everything in one message still only advances one step.
            s.record_patient_message("My lower back hurts, 8/10, worse after a week of sitting");
            assert_eq!(s.phase, ConsultationPhase::InitialAssessment);
        }
    }

    mod phase_monotonicity {
        use super::*;
        use proptest::prelude::*;

        fn sample_messages() -> Vec<&'static str> {
            vec![
                "My lower back hurts",
                "It's been about 3 weeks",
                "I'd say 8 out of 10",
                "It's worse after sitting",
                "hello",
                "",
                "   ",
                "no change really",
                "pain in my neck aches at night",
                "maybe a month",
            ]
        }

        proptest! {
            #[test]
            fn phase_never_regresses(
                msgs in prop::collection::vec(prop::sample::select(sample_messages()), 0..12),
                speakers in prop::collection::vec(any::<bool>(), 0..12),
            ) {
                let mut s = state();
                let mut last = s.phase;
                for (msg, is_patient) in msgs.iter().zip(speakers.iter()) {
                    if *is_patient {
                        s.record_patient_message(msg);
                    } else {
                        s.record_assistant_message(msg);
                    }
                    prop_assert!(s.phase >= last);
                    last = s.phase;
                }
            }
        }
    }
}
