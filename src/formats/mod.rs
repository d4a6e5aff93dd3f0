//! The local text-format toolkit: pure converters between txt, html, csv,
//! json, and xml.
//!
//! Every converter here is a synchronous pure function — no I/O, no shared
//! state, no network. The directed pair table is deliberately asymmetric:
//! not every conversion has a sensible inverse (xml→json, for example, is a
//! documented lossy approximation), so the table lists exactly what exists
//! and [`convert`] rejects everything else with
//! [`DocMorphError::UnsupportedConversion`].
//!
//! | from | to |
//! |------|----|
//! | txt  | html, csv, json, xml |
//! | html | txt |
//! | csv  | json, xml, html |
//! | json | csv, xml, txt |
//! | xml  | json, txt |

use crate::error::DocMorphError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod csv;
pub mod html;
pub mod json;
pub mod text;
pub mod xml;

/// A locally convertible text format.
///
/// Parsing is strict: exactly the lowercase tokens `txt`, `html`, `csv`,
/// `json`, `xml`. Anything else is not a local format and routes to the
/// remote vendor boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Txt,
    Html,
    Csv,
    Json,
    Xml,
}

impl Format {
    /// The canonical short extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Txt => "txt",
            Format::Html => "html",
            Format::Csv => "csv",
            Format::Json => "json",
            Format::Xml => "xml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "txt" => Ok(Format::Txt),
            "html" => Ok(Format::Html),
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            "xml" => Ok(Format::Xml),
            _ => Err(()),
        }
    }
}

/// Whether a local converter exists for the directed pair.
pub fn is_local_pair(from: &str, to: &str) -> bool {
    match (Format::from_str(from), Format::from_str(to)) {
        (Ok(f), Ok(t)) => converter_for(f, t).is_some(),
        _ => false,
    }
}

/// Convert decoded text between two local formats.
///
/// Returns [`DocMorphError::UnsupportedConversion`] for any directed pair
/// outside the table — including same-format "conversions" — and
/// [`DocMorphError::MalformedInput`] when a json→* converter receives
/// invalid JSON.
pub fn convert(text: &str, from: Format, to: Format) -> Result<String, DocMorphError> {
    match converter_for(from, to) {
        Some(f) => f(text),
        None => Err(DocMorphError::UnsupportedConversion {
            from: from.to_string(),
            to: to.to_string(),
        }),
    }
}

type Converter = fn(&str) -> Result<String, DocMorphError>;

/// The directed dispatch table. One place, one entry per supported pair.
fn converter_for(from: Format, to: Format) -> Option<Converter> {
    use Format::*;
    let f: Converter = match (from, to) {
        (Txt, Html) => text::txt_to_html,
        (Txt, Csv) => text::txt_to_csv,
        (Txt, Json) => text::txt_to_json,
        (Txt, Xml) => text::txt_to_xml,
        (Html, Txt) => html::html_to_txt,
        (Csv, Json) => csv::csv_to_json,
        (Csv, Xml) => csv::csv_to_xml,
        (Csv, Html) => csv::csv_to_html,
        (Json, Csv) => json::json_to_csv,
        (Json, Xml) => json::json_to_xml,
        (Json, Txt) => json::json_to_txt,
        (Xml, Json) => xml::xml_to_json,
        (Xml, Txt) => xml::xml_to_txt,
        _ => return None,
    };
    Some(f)
}

// ── Shared escaping helpers ──────────────────────────────────────────────

/// Escape the five characters HTML cares about.
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text content for XML (same set, `&apos;` spelling).
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Make an arbitrary header or key usable as an XML element name.
///
/// Characters outside `[A-Za-z0-9_.-]` become `_`; a leading digit (or an
/// empty name) gets a `_` prefix.
pub(crate) fn sanitize_xml_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
