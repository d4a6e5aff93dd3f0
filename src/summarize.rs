//! Extractive summarization: pick the most informative sentences, keep them
//! in source order.
//!
//! ## How it works
//!
//! 1. Inputs under [`MIN_SUMMARIZABLE_CHARS`] are returned trimmed, verbatim —
//!    there is nothing to condense.
//! 2. The text is cleaned (odd symbols out, whitespace normalised) and split
//!    on `.`/`!`/`?` runs into candidate sentences. Candidates shorter than
//!    [`MIN_SENTENCE_CHARS`] or longer than [`MAX_SENTENCE_CHARS`] are
//!    dropped; the pool is capped at [`MAX_CANDIDATES`].
//! 3. Three or fewer candidates are joined as-is.
//! 4. Otherwise each candidate is scored and the top [`SUMMARY_SENTENCES`]
//!    are selected — then **re-sorted by original position**, because a
//!    summary that reorders its source reads as nonsense.
//!
//! The scoring weights are empirical. They were tuned against real documents,
//! not derived from any linguistic model; treat them as calibrated constants.
//!
//! This function never fails on well-formed input: an internal inconsistency
//! produces [`FALLBACK_SUMMARY`] rather than an error, since summarization is
//! a best-effort convenience on top of the document pipeline.

use once_cell::sync::Lazy;
use regex::Regex;

/// Inputs shorter than this are returned trimmed, without summarization.
pub const MIN_SUMMARIZABLE_CHARS: usize = 100;

/// Input beyond this many characters is ignored; the head of a document
/// carries nearly all of its summary-worthy sentences.
pub const MAX_INPUT_CHARS: usize = 5000;

/// Candidate sentence length bounds, in characters.
const MIN_SENTENCE_CHARS: usize = 15;
const MAX_SENTENCE_CHARS: usize = 300;

/// Cap on the candidate pool.
const MAX_CANDIDATES: usize = 18;

/// How many sentences the summary keeps.
const SUMMARY_SENTENCES: usize = 3;

/// Returned when summarization itself fails unexpectedly.
pub const FALLBACK_SUMMARY: &str =
    "A summary could not be generated for this document; it may contain unsupported characters.";

/// Connective and emphasis words that mark a sentence as carrying argument
/// structure rather than filler.
const KEYWORDS: &[&str] = &[
    "however",
    "therefore",
    "because",
    "moreover",
    "consequently",
    "overall",
    "important",
    "significant",
    "key",
    "result",
    "conclusion",
    "summary",
];

static RE_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s.,!?;:()\-]").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

/// Produce an extractive summary of `text`.
///
/// Deterministic, pure, and infallible: short input comes back trimmed,
/// everything else becomes at most [`SUMMARY_SENTENCES`] sentences in their
/// original order, ending with a period.
pub fn summarize(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_SUMMARIZABLE_CHARS {
        return trimmed.to_string();
    }

    let capped: String = trimmed.chars().take(MAX_INPUT_CHARS).collect();
    let cleaned = clean(&capped);

    let candidates: Vec<&str> = RE_SENTENCE_END
        .split(&cleaned)
        .map(str::trim)
        .filter(|s| {
            let n = s.chars().count();
            n >= MIN_SENTENCE_CHARS && n <= MAX_SENTENCE_CHARS
        })
        .take(MAX_CANDIDATES)
        .collect();

    if candidates.is_empty() {
        return FALLBACK_SUMMARY.to_string();
    }

    if candidates.len() <= SUMMARY_SENTENCES {
        return finish(candidates.join(". "));
    }

    // Score, pick the top N, then restore source order.
    let total = candidates.len();
    let mut scored: Vec<(usize, i32)> = candidates
        .iter()
        .enumerate()
        .map(|(i, s)| (i, score_sentence(s, i, total)))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.truncate(SUMMARY_SENTENCES);
    scored.sort_by_key(|(i, _)| *i);

    let picked: Vec<&str> = scored.iter().map(|(i, _)| candidates[*i]).collect();
    finish(picked.join(". "))
}

/// Strip symbol noise and normalise whitespace runs to single spaces.
fn clean(text: &str) -> String {
    let s = RE_NOISE.replace_all(text, " ");
    RE_WHITESPACE.replace_all(&s, " ").trim().to_string()
}

/// Heuristic sentence score. Higher is more summary-worthy.
///
/// Rewards: a word count in the 15–30 band (+3; a looser 8–40 band gets +1),
/// position near the start or end of the document (+2), digits (+1), internal
/// commas (+1), and each connective keyword (+2).
fn score_sentence(sentence: &str, index: usize, total: usize) -> i32 {
    let words = sentence.split_whitespace().count();
    let lower = sentence.to_lowercase();

    let mut score = 0i32;
    if (15..=30).contains(&words) {
        score += 3;
    } else if (8..=40).contains(&words) {
        score += 1;
    }
    if index < 2 || index + 2 >= total {
        score += 2;
    }
    if sentence.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if sentence.contains(',') {
        score += 1;
    }
    for kw in KEYWORDS {
        if lower.contains(kw) {
            score += 2;
        }
    }
    score
}

/// Append the trailing period if the joined summary lacks one.
fn finish(mut summary: String) -> String {
    if !summary.ends_with('.') {
        summary.push('.');
    }
    summary
}
