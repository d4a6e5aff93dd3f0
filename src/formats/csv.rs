//! CSV tokenizing and the csv→json / csv→xml / csv→html converters.
//!
//! ## Tokenizer contract
//!
//! One left-to-right scan with a quote-toggle flag:
//!
//! * `"` outside a quoted field opens quoting (even mid-field).
//! * `""` inside a quoted field emits one literal `"`.
//! * Any other `"` inside a quoted field closes it.
//! * `,` outside quotes ends the field; inside quotes it is content.
//! * End of line flushes the last field unconditionally, so an empty line
//!   yields exactly one empty field and an unterminated quote is treated as
//!   closed by end-of-input.
//!
//! No whitespace trimming anywhere — ` a ` stays ` a `.

use super::{escape_html, escape_xml, sanitize_xml_name};
use crate::error::DocMorphError;
use serde_json::{Map, Value};

/// Parse one CSV line into its fields.
pub fn tokenize_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if !in_quotes => in_quotes = true,
            '"' => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            other => field.push(other),
        }
    }
    fields.push(field);
    fields
}

/// Quote a field for CSV output, doubling embedded quotes.
pub(crate) fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Split CSV text into a header record and data records.
///
/// The first non-empty line is the header; wholly empty lines are skipped.
fn records(text: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let mut lines = text.lines().filter(|l| !l.is_empty());
    let headers = lines.next().map(tokenize_line).unwrap_or_default();
    let rows: Vec<Vec<String>> = lines.map(tokenize_line).collect();
    (headers, rows)
}

/// Column name for position `i`: the header if present, `column_N` otherwise.
fn column_name(headers: &[String], i: usize) -> String {
    match headers.get(i) {
        Some(h) if !h.is_empty() => h.clone(),
        _ => format!("column_{}", i + 1),
    }
}

/// csv → json: an array of objects keyed by header name, each row carrying
/// its 1-based `_rowIndex`.
pub fn csv_to_json(text: &str) -> Result<String, DocMorphError> {
    let (headers, rows) = records(text);

    let objects: Vec<Value> = rows
        .iter()
        .enumerate()
        .map(|(i, fields)| {
            let mut obj = Map::new();
            for (j, value) in fields.iter().enumerate() {
                obj.insert(column_name(&headers, j), Value::String(value.clone()));
            }
            obj.insert("_rowIndex".to_string(), Value::from(i as u64 + 1));
            Value::Object(obj)
        })
        .collect();

    serde_json::to_string_pretty(&objects).map_err(|e| DocMorphError::Internal(e.to_string()))
}

/// csv → xml: `<data><row id="n"><header>value</header>…</row></data>`.
///
/// Header names are sanitised into valid element names; values are escaped.
pub fn csv_to_xml(text: &str) -> Result<String, DocMorphError> {
    let (headers, rows) = records(text);

    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<data>\n");
    for (i, fields) in rows.iter().enumerate() {
        out.push_str(&format!("  <row id=\"{}\">\n", i + 1));
        for (j, value) in fields.iter().enumerate() {
            let tag = sanitize_xml_name(&column_name(&headers, j));
            out.push_str(&format!("    <{tag}>{}</{tag}>\n", escape_xml(value)));
        }
        out.push_str("  </row>\n");
    }
    out.push_str("</data>\n");
    Ok(out)
}

/// csv → html: a `<table>` with the header row as `<th>` cells and data rows
/// as `<td>` cells, all values escaped.
pub fn csv_to_html(text: &str) -> Result<String, DocMorphError> {
    let (headers, rows) = records(text);

    let mut out = String::from("<table>\n  <thead>\n    <tr>\n");
    for h in &headers {
        out.push_str(&format!("      <th>{}</th>\n", escape_html(h)));
    }
    out.push_str("    </tr>\n  </thead>\n  <tbody>\n");
    for fields in &rows {
        out.push_str("    <tr>\n");
        for value in fields {
            out.push_str(&format!("      <td>{}</td>\n", escape_html(value)));
        }
        out.push_str("    </tr>\n");
    }
    out.push_str("  </tbody>\n</table>\n");
    Ok(out)
}
