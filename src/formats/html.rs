//! html → txt: reduce markup to readable plain text.
//!
//! Ordered pure passes, same shape as any text-cleanup pipeline here:
//!
//! 1. Drop `<script>` and `<style>` blocks wholesale (their text content is
//!    code, not prose).
//! 2. Turn `<br>` and the closing tags of block elements into newlines so
//!    paragraph structure survives tag stripping.
//! 3. Strip every remaining tag.
//! 4. Unescape the five standard entities (`&amp;` last, so `&amp;lt;`
//!    correctly becomes `&lt;` and not `<`).
//! 5. Collapse whitespace: runs of spaces/tabs to one space, trimmed lines,
//!    runs of blank lines to one.

use crate::error::DocMorphError;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_SCRIPT_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").unwrap());

static RE_LINE_BREAKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|h[1-6]|li|tr|table|ul|ol|blockquote)>").unwrap()
});

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

/// html → txt.
pub fn html_to_txt(text: &str) -> Result<String, DocMorphError> {
    let s = RE_SCRIPT_STYLE.replace_all(text, "");
    let s = RE_LINE_BREAKS.replace_all(&s, "\n");
    let s = RE_TAG.replace_all(&s, "");
    let s = unescape_entities(&s);
    Ok(collapse_whitespace(&s))
}

/// Unescape the five standard HTML/XML entities.
///
/// `&amp;` must be handled last: otherwise `&amp;lt;` would decode twice.
pub(crate) fn unescape_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Collapse horizontal whitespace runs, trim lines, and squeeze blank lines.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let squeezed = RE_SPACES.replace_all(s, " ");
    let mut prev_blank = true; // swallow leading blank lines
    for line in squeezed.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !prev_blank {
                out.push("");
            }
            prev_blank = true;
        } else {
            out.push(line);
            prev_blank = false;
        }
    }
    while out.last() == Some(&"") {
        out.pop();
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags() {
        let out = html_to_txt("<html><body><p>Hello</p><p>World</p></body></html>").unwrap();
        assert_eq!(out, "Hello\nWorld");
    }

    #[test]
    fn drops_script_and_style_content() {
        let html = "<style>p { color: red }</style><p>Visible</p><script>alert('x')</script>";
        let out = html_to_txt(html).unwrap();
        assert_eq!(out, "Visible");
    }

    #[test]
    fn br_becomes_newline() {
        assert_eq!(html_to_txt("a<br>b<br />c").unwrap(), "a\nb\nc");
    }

    #[test]
    fn unescapes_standard_entities() {
        let out = html_to_txt("<p>1 &lt; 2 &amp;&amp; &quot;ok&quot;</p>").unwrap();
        assert_eq!(out, "1 < 2 && \"ok\"");
    }

    #[test]
    fn double_escaped_amp_decodes_once() {
        assert_eq!(unescape_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn collapses_whitespace_runs() {
        let out = html_to_txt("<p>too    many\t\tspaces</p>\n\n\n<p>next</p>").unwrap();
        assert_eq!(out, "too many spaces\n\nnext");
    }
}
