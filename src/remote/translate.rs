//! Translation via a MyMemory-style text-in/text-out GET API.
//!
//! The vendor contract is a single request: text and a language pair go in
//! as query parameters, translated text comes back as JSON. Two quirks worth
//! noting:
//!
//! * The free tier rejects long payloads, so input is truncated to the
//!   configured bound (with a trailing ellipsis) **before** sending — the
//!   vendor never sees more than `max_translate_chars` characters.
//! * When the vendor is unavailable or declines, the caller still deserves
//!   the text back: [`Translator::translate`] degrades to returning the
//!   untranslated input with a warning attached rather than discarding it.
//!   Transport-level failures (the request never produced a readable
//!   response) still surface as [`DocMorphError::RemoteService`].

use crate::config::RemoteConfig;
use crate::error::DocMorphError;
use serde::Deserialize;
use tracing::{debug, warn};

/// A translation result, possibly degraded.
#[derive(Debug, Clone)]
pub struct Translation {
    /// The translated text — or, when `degraded` is set, the original text.
    pub text: String,
    /// Present when the vendor declined and the original text was returned.
    pub degraded: Option<String>,
}

impl Translation {
    fn ok(text: String) -> Self {
        Self {
            text,
            degraded: None,
        }
    }

    fn fallback(original: &str, warning: String) -> Self {
        Self {
            text: format!("[TRANSLATION UNAVAILABLE - ORIGINAL TEXT]\n\n{original}"),
            degraded: Some(warning),
        }
    }
}

// ── Vendor response shape ────────────────────────────────────────────────

#[derive(Deserialize)]
struct VendorResponse {
    #[serde(rename = "responseStatus")]
    status: serde_json::Value, // the vendor sends 200 as number or string
    #[serde(rename = "responseDetails", default)]
    details: Option<String>,
    #[serde(rename = "responseData", default)]
    data: Option<VendorData>,
}

#[derive(Deserialize)]
struct VendorData {
    #[serde(rename = "translatedText", default)]
    translated_text: Option<String>,
}

impl VendorResponse {
    fn is_ok(&self) -> bool {
        match &self.status {
            serde_json::Value::Number(n) => n.as_i64() == Some(200),
            serde_json::Value::String(s) => s == "200",
            _ => false,
        }
    }
}

/// Client for the translation vendor.
pub struct Translator {
    client: reqwest::Client,
    endpoint: String,
    contact_email: Option<String>,
    max_chars: usize,
}

impl Translator {
    pub fn new(config: &RemoteConfig) -> Result<Self, DocMorphError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .user_agent("docmorph/0.3")
            .build()
            .map_err(|e| DocMorphError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.translation_api_url.clone(),
            contact_email: config.contact_email.clone(),
            max_chars: config.max_translate_chars,
        })
    }

    /// Translate `text` into `target_lang` (an ISO language code).
    ///
    /// Input beyond the configured bound is truncated before sending. Vendor
    /// refusals degrade to the original text with a warning; only transport
    /// failures return an error.
    pub async fn translate(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<Translation, DocMorphError> {
        let text = truncate(text, self.max_chars);

        let mut query: Vec<(&str, String)> = vec![
            ("q", text.clone()),
            ("langpair", format!("auto|{target_lang}")),
        ];
        if let Some(ref email) = self.contact_email {
            query.push(("de", email.clone()));
        }

        let response = match self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                return Err(DocMorphError::RemoteService {
                    detail: format!("translation request failed: {e}"),
                })
            }
        };

        if !response.status().is_success() {
            warn!("Translation vendor returned HTTP {}", response.status());
            return Ok(Translation::fallback(
                &text,
                "translation service temporarily unavailable".into(),
            ));
        }

        let body: VendorResponse =
            response
                .json()
                .await
                .map_err(|e| DocMorphError::RemoteService {
                    detail: format!("unreadable translation response: {e}"),
                })?;

        if !body.is_ok() {
            let detail = body
                .details
                .unwrap_or_else(|| "translation service unavailable".into());
            warn!("Translation vendor declined: {detail}");
            return Ok(Translation::fallback(&text, detail));
        }

        match body.data.and_then(|d| d.translated_text) {
            Some(translated) if !translated.is_empty() => {
                debug!("Translated {} chars → {target_lang}", text.len());
                Ok(Translation::ok(translated))
            }
            _ => Ok(Translation::fallback(
                &text,
                "no translation received from the service".into(),
            )),
        }
    }
}

/// Truncate to at most `max_chars` characters, marking the cut with `…`.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars).collect();
        out.push('…');
        out
    }
}
