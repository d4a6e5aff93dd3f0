//! Converters out of JSON: json→csv, json→xml, json→txt.
//!
//! All three parse with `serde_json` first; invalid JSON surfaces as
//! [`DocMorphError::MalformedInput`] before any output is produced, so a
//! partial conversion is never emitted.

use super::csv::quote_field;
use super::{escape_xml, sanitize_xml_name};
use crate::error::DocMorphError;
use serde_json::Value;

fn parse(text: &str) -> Result<Value, DocMorphError> {
    serde_json::from_str(text).map_err(DocMorphError::bad_json)
}

/// Render a JSON value as a single CSV cell.
///
/// Strings go in bare (then CSV-quoted), `null` becomes the empty string,
/// and nested values fall back to their compact JSON text.
fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn csv_row(fields: impl IntoIterator<Item = String>) -> String {
    fields
        .into_iter()
        .map(|f| quote_field(&f))
        .collect::<Vec<_>>()
        .join(",")
}

/// json → csv.
///
/// * Array of objects: headers are the keys of the first element, one row per
///   element, missing keys default to the empty string.
/// * Array of scalars: a single `value` column.
/// * Single object: one header row from its keys, one value row.
/// * Scalar: a single `value` column with one row.
pub fn json_to_csv(text: &str) -> Result<String, DocMorphError> {
    let value = parse(text)?;

    let out = match &value {
        Value::Array(items) => match items.first() {
            Some(Value::Object(first)) => {
                let headers: Vec<String> = first.keys().cloned().collect();
                let mut lines = vec![csv_row(headers.iter().cloned())];
                for item in items {
                    let row = headers.iter().map(|h| {
                        item.get(h).map(cell).unwrap_or_default()
                    });
                    lines.push(csv_row(row));
                }
                lines.join("\n")
            }
            Some(_) => {
                let mut lines = vec![csv_row(["value".to_string()])];
                lines.extend(items.iter().map(|v| csv_row([cell(v)])));
                lines.join("\n")
            }
            None => csv_row(["value".to_string()]),
        },
        Value::Object(obj) => {
            let headers = csv_row(obj.keys().cloned());
            let row = csv_row(obj.values().map(cell));
            format!("{headers}\n{row}")
        }
        scalar => format!("{}\n{}", csv_row(["value".to_string()]), csv_row([cell(scalar)])),
    };

    Ok(out)
}

/// json → xml: recursive serialisation of arbitrary JSON under `<root>`.
///
/// Objects become nested tags keyed by (sanitised) property name, arrays
/// become `<item index="n">` wrappers, scalars become escaped text.
pub fn json_to_xml(text: &str) -> Result<String, DocMorphError> {
    let value = parse(text)?;

    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root>");
    write_value(&mut out, &value, 1);
    out.push_str("\n</root>\n");
    Ok(out)
}

/// Append `value` to `out`, indented `depth` levels under its opening tag.
///
/// Scalars are written inline on the current line; containers open a nested
/// block.
fn write_value(out: &mut String, value: &Value, depth: usize) {
    let pad = "  ".repeat(depth);
    match value {
        Value::Object(obj) => {
            for (key, v) in obj {
                let tag = sanitize_xml_name(key);
                out.push_str(&format!("\n{pad}<{tag}>"));
                if v.is_object() || v.is_array() {
                    write_value(out, v, depth + 1);
                    out.push_str(&format!("\n{pad}"));
                } else {
                    out.push_str(&scalar_text(v));
                }
                out.push_str(&format!("</{tag}>"));
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                out.push_str(&format!("\n{pad}<item index=\"{i}\">"));
                if v.is_object() || v.is_array() {
                    write_value(out, v, depth + 1);
                    out.push_str(&format!("\n{pad}"));
                } else {
                    out.push_str(&scalar_text(v));
                }
                out.push_str("</item>");
            }
        }
        scalar => {
            out.push_str(&format!("\n{pad}{}", scalar_text(scalar)));
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => escape_xml(s),
        other => escape_xml(&other.to_string()),
    }
}

/// json → txt: pretty-print the parsed document (round-trip formatting only).
pub fn json_to_txt(text: &str) -> Result<String, DocMorphError> {
    let value = parse(text)?;
    serde_json::to_string_pretty(&value).map_err(|e| DocMorphError::Internal(e.to_string()))
}
