//! Heuristic extraction rules applied to incoming patient messages.
//!
//! Each rule pairs a case-insensitive pattern with the clinical slot it
//! fills. Rules are deliberately shallow keyword heuristics, not NLP:
//! they only need to be good enough to steer the consultation phases.

use once_cell::sync::Lazy;
use regex::Regex;

/// The clinical field a rule fills when it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Body part, e.g. "lower back". Set once, first match wins.
    Location,
    /// How long the symptom has persisted. Overwritten on every match.
    Duration,
    /// Pain severity, typically on a 0-10 scale. Overwritten on every match.
    Intensity,
    /// Aggravating factors or movements. Overwritten on every match.
    Triggers,
}

/// What a matching rule stores into its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value {
    /// The first capture group of the pattern.
    CaptureGroup,
    /// The whole (trimmed) patient message.
    WholeMessage,
}

/// A single pattern → slot mapping.
pub struct ExtractionRule {
    slot: Slot,
    pattern: &'static Lazy<Regex>,
    value: Value,
}

impl ExtractionRule {
    /// The slot this rule fills.
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Runs the rule against one patient message.
    ///
    /// Returns the extracted value when the pattern matches, `None`
    /// otherwise. Extraction never fails, it just declines to match.
    pub fn extract(&self, message: &str) -> Option<String> {
        let captures = self.pattern.captures(message)?;
        let text = match self.value {
            Value::CaptureGroup => captures.get(1)?.as_str().trim(),
            Value::WholeMessage => message.trim(),
        };
        Some(text.to_string())
    }
}

// "my lower back hurts", "pain in my left shoulder"
static LOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:in|on|my)\s+(\w+(?:\s+\w+)?)\s+(?:hurts|pain|aches)")
        .expect("location pattern is valid")
});

// Any mention of a calendar unit counts as a duration statement.
static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)day|week|month|year").expect("duration pattern is valid")
});

// "on a scale of...", "7/10", "8 out of 10", or the word itself.
static INTENSITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)scale|intensity|\d+\s*/\s*10|\d+\s+out\s+of\s+10")
        .expect("intensity pattern is valid")
});

// "when I bend", "after sitting", "worse in the morning".
static TRIGGERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)when|after|worse").expect("triggers pattern is valid")
});

static RULES: Lazy<Vec<ExtractionRule>> = Lazy::new(|| {
    vec![
        ExtractionRule {
            slot: Slot::Location,
            pattern: &LOCATION,
            value: Value::CaptureGroup,
        },
        ExtractionRule {
            slot: Slot::Duration,
            pattern: &DURATION,
            value: Value::WholeMessage,
        },
        ExtractionRule {
            slot: Slot::Intensity,
            pattern: &INTENSITY,
            value: Value::WholeMessage,
        },
        ExtractionRule {
            slot: Slot::Triggers,
            pattern: &TRIGGERS,
            value: Value::WholeMessage,
        },
    ]
});

/// The full rule table, in application order.
pub fn rules() -> &'static [ExtractionRule] {
    &RULES
}
