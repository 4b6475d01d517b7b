//! Sanitization of raw model completions.
//!
//! Small instruct models routinely echo role labels, continue the
//! dialogue on the patient's behalf, or emit template control tokens.
//! The sanitizer strips all of that down to the single assistant
//! utterance we actually want to show.

use once_cell::sync::Lazy;
use regex::Regex;

// One or more role labels stacked at the very start of the completion,
// e.g. "Dr. AI: ..." or "Assistant: Dr. AI: ...".
static LEADING_ROLE_LABELS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(?:Human|User|Assistant|Patient|Doctor|Dr\. AI):?\s*)+")
        .expect("leading role label pattern is valid")
});

// Chat-template control tokens such as <|assistant|> or <|endoftext|>.
static CONTROL_TOKENS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\|.*?\|>").expect("control token pattern is valid"));

// A fabricated dialogue turn: everything from the first line that opens
// with a role label through to the end of the completion.
static FABRICATED_TURNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\n\s*(?:Human|User|Assistant|Patient|Doctor|Dr\. AI):?.*")
        .expect("fabricated turn pattern is valid")
});

// Inline "Patient: ..." lines that survived truncation.
static PATIENT_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Patient:.*?\n").expect("patient line pattern is valid"));

// Leading list numbering like "1) " or "2. ", possibly stacked.
static LIST_NUMBERING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?:\d+[).]\s+)+").expect("list numbering pattern is valid"));

static REPEATED_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").expect("repeated newline pattern is valid"));

static REPEATED_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}").expect("repeated whitespace pattern is valid"));

static LEADING_NON_ALPHA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^A-Za-z]*").expect("leading non-alpha pattern is valid"));

/// Cleans raw completions into a single presentable assistant reply.
///
/// Total (never fails, worst case returns an empty string) and
/// idempotent: sanitizing already-sanitized text is a no-op.
#[derive(Debug, Clone, Default)]
pub struct ResponseSanitizer;

impl ResponseSanitizer {
    pub fn new() -> Self {
        Self
    }

    /// Sanitizes a raw completion.
    ///
    /// The pass pipeline is re-applied until the text stops changing.
    /// Each pass only ever shrinks its input, so this terminates, and it
    /// makes the result a fixed point: `sanitize(sanitize(x)) == sanitize(x)`
    /// even for inputs where one pass uncovers new junk (e.g. a role
    /// label hidden behind leading punctuation).
    pub fn sanitize(&self, raw: &str) -> String {
        let mut current = Self::pass(raw);
        loop {
            let next = Self::pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn pass(text: &str) -> String {
        let text = LEADING_ROLE_LABELS.replace(text, "");
        let text = CONTROL_TOKENS.replace_all(&text, "");
        let text = FABRICATED_TURNS.replace(&text, "");
        let text = PATIENT_LINES.replace_all(&text, "");
        let text = LIST_NUMBERING.replace_all(&text, "");
        let text = REPEATED_NEWLINES.replace_all(&text, "\n");
        let text = REPEATED_WHITESPACE.replace_all(&text, " ");
        let text = LEADING_NON_ALPHA.replace(&text, "");
        text.trim().to_string()
    }
}
