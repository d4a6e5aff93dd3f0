//! Transport encoding: move file content through a JSON-shaped boundary.
//!
//! File payloads arrive as base64 text, sometimes with a
//! `data:<media-type>;base64,` prefix left over from a browser `FileReader`.
//! This module decodes them to plain text, re-encodes conversion results, and
//! owns the two fixed lookup tables the dispatcher needs: MIME type → short
//! extension and short extension → media type.
//!
//! ## Decode fallback
//!
//! Some callers send raw text where base64 was expected. When base64 decoding
//! fails but the payload itself reads as printable text, we accept it as-is
//! rather than failing a request that plainly carries usable content. A
//! payload that decodes to non-UTF-8 bytes is genuinely binary and is
//! rejected with [`DocMorphError::Decode`].

use crate::classify::looks_like_text;
use crate::error::DocMorphError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Decode a transport-encoded payload to text.
///
/// Accepts plain base64, data-URL-prefixed base64, and (as a fallback) raw
/// printable text.
pub fn decode_payload(content: &str) -> Result<String, DocMorphError> {
    let b64 = match content.split_once(',') {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => content,
    };

    match BASE64.decode(b64.trim()) {
        Ok(bytes) => String::from_utf8(bytes).map_err(|e| DocMorphError::Decode {
            detail: format!("decoded bytes are not valid UTF-8 ({e})"),
        }),
        Err(e) if looks_like_text(content) => {
            tracing::debug!("payload is not base64 ({e}); using it as plain text");
            Ok(content.to_string())
        }
        Err(e) => Err(DocMorphError::Decode {
            detail: e.to_string(),
        }),
    }
}

/// Encode converted text back into the transport representation.
pub fn encode_payload(text: &str) -> String {
    BASE64.encode(text.as_bytes())
}

/// Map a MIME type or bare extension to a canonical short extension.
///
/// Bare extensions pass through lowercased; unknown MIME types fall back to
/// the subtype after the `/`.
pub fn canonical_extension(format: &str) -> String {
    let f = format.trim().to_ascii_lowercase();
    if let Some((_, subtype)) = f.split_once('/') {
        match f.as_str() {
            "text/plain" => "txt",
            "text/html" => "html",
            "text/csv" => "csv",
            "application/json" => "json",
            "application/xml" | "text/xml" => "xml",
            "application/pdf" => "pdf",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
            "application/vnd.openxmlformats-officedocument.presentationml.presentation" => "pptx",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => "xlsx",
            "application/msword" => "doc",
            "application/vnd.ms-powerpoint" => "ppt",
            "application/vnd.ms-excel" => "xls",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/bmp" => "bmp",
            "image/tiff" => "tiff",
            "image/webp" => "webp",
            _ => subtype,
        }
        .to_string()
    } else {
        f
    }
}

/// Media type for a short extension, used when labelling conversion output.
pub fn media_type_for(ext: &str) -> &'static str {
    match ext {
        "txt" => "text/plain",
        "html" => "text/html",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

/// Derive the output filename: everything before the first `.` of the input
/// name, plus the target extension.
pub fn output_filename(file_name: &str, target_ext: &str) -> String {
    let base = file_name.split('.').next().unwrap_or("").trim();
    let base = if base.is_empty() { "converted" } else { base };
    format!("{base}.{target_ext}")
}

/// Render a payload as a `data:` URL for callers that hand results straight
/// to a browser download.
pub fn data_url(media_type: &str, b64_content: &str) -> String {
    format!("data:{media_type};base64,{b64_content}")
}
