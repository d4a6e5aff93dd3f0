//! Printable-text classifier shared by every path that accepts file content.
//!
//! The summarizer, the translator, and the local converters all need the same
//! answer to the same question: does this string carry readable text, or did
//! someone upload a binary file? One shared heuristic keeps accept/reject
//! behavior identical across all three paths instead of drifting apart in
//! per-caller regexes.
//!
//! The check samples a bounded prefix so a multi-megabyte document costs the
//! same as a short one.

use once_cell::sync::Lazy;
use regex::Regex;

/// How many leading characters the classifier inspects.
const SAMPLE_CHARS: usize = 256;

/// Maximum tolerated fraction of control characters in the sample.
const MAX_CONTROL_RATIO: f64 = 0.10;

/// At least one letter or digit must appear in the sample.
static RE_WORDISH: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]").unwrap());

/// Returns true when `content` looks like printable text.
///
/// Rejects: empty/whitespace-only input, anything containing a NUL or the
/// replacement character (a UTF-8 decode already went wrong upstream), samples
/// with no letters or digits at all, and samples dominated by control
/// characters other than `\n`, `\r`, `\t`.
pub fn looks_like_text(content: &str) -> bool {
    if content.trim().is_empty() {
        return false;
    }

    let sample: String = content.chars().take(SAMPLE_CHARS).collect();

    if sample.contains('\0') || sample.contains('\u{FFFD}') {
        return false;
    }
    if !RE_WORDISH.is_match(&sample) {
        return false;
    }

    let total = sample.chars().count();
    let control = sample
        .chars()
        .filter(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
        .count();
    (control as f64) / (total as f64) <= MAX_CONTROL_RATIO
}
