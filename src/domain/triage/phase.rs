//! Consultation phases within a triage conversation.
//!
//! Phases advance strictly forward as the patient supplies information;
//! a conversation never moves back to an earlier phase.

use serde::{Deserialize, Serialize};

/// The current phase of a triage consultation.
///
/// Phases flow in one direction only:
/// `Greeting` → `InitialAssessment` → `DetailedAssessment` → `Conclusion`
///
/// The `Ord` derive follows that order, so "never regresses" can be
/// checked with a plain comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationPhase {
    /// No patient input yet; the assistant opens the conversation.
    Greeting,

    /// The patient has started describing the problem.
    /// The assistant establishes where it hurts and for how long.
    InitialAssessment,

    /// Location and duration are known.
    /// The assistant probes intensity and aggravating factors.
    DetailedAssessment,

    /// Enough has been gathered to advise the patient, and to decide
    /// whether an appointment should be scheduled.
    Conclusion,
}

impl ConsultationPhase {
    /// Returns what the consultation should focus on while in this phase.
    pub fn directive(&self) -> &'static str {
        match self {
            Self::Greeting => "Welcome the patient and ask what brings them in.",
            Self::InitialAssessment => "Establish where the pain is and how long it has lasted.",
            Self::DetailedAssessment => "Probe pain intensity and what makes it better or worse.",
            Self::Conclusion => "Summarise findings and advise on self-care or an appointment.",
        }
    }

    /// Returns a shorter label for the phase, suitable for UI display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Greeting => "Greeting",
            Self::InitialAssessment => "Initial Assessment",
            Self::DetailedAssessment => "Detailed Assessment",
            Self::Conclusion => "Conclusion",
        }
    }

    /// Returns true once the consultation has gathered enough to conclude.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Conclusion)
    }
}

impl Default for ConsultationPhase {
    fn default() -> Self {
        Self::Greeting
    }
}
