//! Appointment escalation policy.
//!
//! Decides, from accumulated conversation state alone, whether the next
//! assistant response must carry the machine-readable scheduling marker.
//! The policy is authoritative: markers the model emits on its own are
//! stripped upstream and never reach the patient.

use once_cell::sync::Lazy;
use regex::Regex;

use super::state::ConversationState;

/// Control token the frontend watches for to offer appointment booking.
pub const SCHEDULE_APPOINTMENT_MARKER: &str = "[SCHEDULE_APPOINTMENT]";

// Scale denominators ("9/10", "3 / 10") would otherwise read as a
// severe rating of 10, so they are reduced before the severity scan.
static SCALE_DENOMINATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\s*10\b").expect("scale denominator pattern is valid"));

static SEVERE_RATING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:7|8|9|10)\b").expect("severe rating pattern is valid"));

static REPEATED_SPACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}").expect("repeated space pattern is valid"));

/// Returns true when the consultation warrants recommending an
/// appointment: the conversation has reached its conclusion AND the
/// symptoms read as severe (rating ≥ 7) or persistent (weeks or longer).
pub fn should_escalate(state: &ConversationState) -> bool {
    if !state.phase.is_final() {
        return false;
    }

    let severe = state
        .fields
        .intensity
        .as_deref()
        .is_some_and(is_severe_rating);

    let persistent = state.fields.duration.as_deref().is_some_and(|d| {
        let d = d.to_lowercase();
        d.contains("week") || d.contains("month")
    });

    severe || persistent
}

/// Appends the scheduling marker to an outgoing response.
pub fn append_marker(text: &str) -> String {
    let text = text.trim_end();
    if text.is_empty() {
        SCHEDULE_APPOINTMENT_MARKER.to_string()
    } else {
        format!("{text} {SCHEDULE_APPOINTMENT_MARKER}")
    }
}

/// Removes any model-emitted scheduling markers so that only this
/// policy decides when the marker appears.
pub fn strip_marker(text: &str) -> String {
    if !text.contains(SCHEDULE_APPOINTMENT_MARKER) {
        return text.to_string();
    }
    let stripped = text.replace(SCHEDULE_APPOINTMENT_MARKER, "");
    REPEATED_SPACES.replace_all(&stripped, " ").trim().to_string()
}

fn is_severe_rating(intensity: &str) -> bool {
    let without_denominators = SCALE_DENOMINATOR.replace_all(intensity, "/");
    SEVERE_RATING.is_match(&without_denominators)
}
