//! Converters out of XML: xml→json and xml→txt.
//!
//! Neither is a structural XML parse. xml→json is a deliberate, documented
//! approximation: it strips tags and returns the text fragments it finds, in
//! document order, as a flat JSON array. Attributes, nesting, and element
//! names are discarded. That is the intended behavior, not a shortcut to be
//! "fixed" — callers who need structure should not be routing XML through
//! this converter.

use super::html::{collapse_whitespace, unescape_entities};
use crate::error::DocMorphError;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Text fragments between tags, in document order, entities unescaped.
fn fragments(text: &str) -> Vec<String> {
    RE_TAG
        .split(text)
        .map(|frag| unescape_entities(frag).trim().to_string())
        .filter(|frag| !frag.is_empty())
        .collect()
}

/// xml → json (lossy): a flat JSON array of the extracted text fragments.
pub fn xml_to_json(text: &str) -> Result<String, DocMorphError> {
    serde_json::to_string_pretty(&fragments(text))
        .map_err(|e| DocMorphError::Internal(e.to_string()))
}

/// xml → txt: strip all tags and collapse whitespace, one fragment per line.
pub fn xml_to_txt(text: &str) -> Result<String, DocMorphError> {
    let lines: Vec<String> = fragments(text)
        .into_iter()
        .map(|frag| collapse_whitespace(&frag))
        .collect();
    Ok(lines.join("\n"))
}
