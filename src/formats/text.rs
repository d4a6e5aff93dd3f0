//! Converters out of plain text: txt→html, txt→csv, txt→json, txt→xml.
//!
//! All four treat the input as an ordered list of lines. None of them can
//! fail on well-formed text; the `Result` return keeps the dispatch table
//! signature uniform.

use super::{csv::quote_field, escape_html, escape_xml};
use crate::error::DocMorphError;
use serde_json::json;

/// txt → html: each line becomes an escaped `<p>` inside a full document
/// shell; empty lines become `<p>&nbsp;</p>` so vertical spacing survives.
pub fn txt_to_html(text: &str) -> Result<String, DocMorphError> {
    let mut body = String::new();
    for line in text.lines() {
        if line.is_empty() {
            body.push_str("    <p>&nbsp;</p>\n");
        } else {
            body.push_str(&format!("    <p>{}</p>\n", escape_html(line)));
        }
    }

    Ok(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"UTF-8\">\n    \
         <title>Converted Document</title>\n</head>\n<body>\n{body}</body>\n</html>\n"
    ))
}

/// txt → csv: each line becomes one quoted field, embedded quotes doubled.
pub fn txt_to_csv(text: &str) -> Result<String, DocMorphError> {
    Ok(text
        .lines()
        .map(quote_field)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// txt → json: `{document: {title, lines, totalLines, convertedAt}}`.
///
/// `convertedAt` is an RFC 3339 stamp of the conversion time; everything else
/// is a pure function of the input.
pub fn txt_to_json(text: &str) -> Result<String, DocMorphError> {
    let lines: Vec<&str> = text.lines().collect();
    let doc = json!({
        "document": {
            "title": "Converted Document",
            "lines": lines,
            "totalLines": lines.len(),
            "convertedAt": chrono::Utc::now().to_rfc3339(),
        }
    });
    serde_json::to_string_pretty(&doc).map_err(|e| DocMorphError::Internal(e.to_string()))
}

/// txt → xml: one escaped `<line id="n">` element per input line.
pub fn txt_to_xml(text: &str) -> Result<String, DocMorphError> {
    let mut out =
        String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<document>\n  <content>\n");
    for (i, line) in text.lines().enumerate() {
        out.push_str(&format!(
            "    <line id=\"{}\">{}</line>\n",
            i + 1,
            escape_xml(line)
        ));
    }
    out.push_str("  </content>\n</document>\n");
    Ok(out)
}
