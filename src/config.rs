//! Configuration for the remote vendor boundary.
//!
//! Everything the remote orchestrator and translator need to talk to their
//! vendors lives in [`RemoteConfig`], built via [`RemoteConfigBuilder`].
//! Credentials and endpoints are always injected by the caller — nothing is
//! compiled into the library. Keeping every knob in one struct makes configs
//! trivial to share across tasks, serialise for logging, and diff between runs.
//!
//! # Design choice: builder over constructor
//! A many-field constructor breaks on every new field. The builder lets
//! callers set only what they care about and rely on documented defaults.

use crate::error::DocMorphError;
use serde::{Deserialize, Serialize};

/// Configuration for remote conversion and translation.
///
/// Built via [`RemoteConfig::builder()`] or, for quick CLI use,
/// [`RemoteConfig::from_env()`].
///
/// # Example
/// ```rust
/// use docmorph::RemoteConfig;
///
/// let config = RemoteConfig::builder()
///     .api_key("cc-secret")
///     .poll_interval_ms(2000)
///     .max_poll_attempts(30)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the conversion vendor's job API. Default: CloudConvert v2.
    pub conversion_api_url: String,

    /// Bearer token for the conversion vendor. No default — the vendor
    /// rejects unauthenticated jobs, so remote conversion requires one.
    pub api_key: Option<String>,

    /// Base URL of the translation vendor's GET endpoint. Default: MyMemory.
    pub translation_api_url: String,

    /// Contact address sent to the translation vendor (`de=` parameter);
    /// raises the free-tier quota. Default: none.
    pub contact_email: Option<String>,

    /// Fixed delay between status polls, in milliseconds. Default: 2000.
    ///
    /// The vendor job API is poll-only, and conversion jobs typically take a
    /// few seconds; a fixed 2 s cadence keeps request volume low without
    /// adding noticeable latency. Tests set this to 0 with a fake backend.
    pub poll_interval_ms: u64,

    /// Maximum number of status polls before giving up. Default: 30.
    ///
    /// Combined with the default interval this bounds a job at ~60 s. The
    /// bound surfaces as [`DocMorphError::Timeout`], never a silent hang:
    /// there is no cancellation primitive, so exceeding it simply stops
    /// polling and discards the handle (the vendor job continues server-side).
    pub max_poll_attempts: u32,

    /// Per-request HTTP timeout in seconds. Default: 30.
    pub request_timeout_secs: u64,

    /// Maximum characters forwarded to the translation vendor. Default: 3000.
    ///
    /// The free translation tier rejects longer payloads; input beyond the
    /// bound is truncated with a trailing ellipsis before sending.
    pub max_translate_chars: usize,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            conversion_api_url: "https://api.cloudconvert.com/v2".to_string(),
            api_key: None,
            translation_api_url: "https://api.mymemory.translated.net/get".to_string(),
            contact_email: None,
            poll_interval_ms: 2000,
            max_poll_attempts: 30,
            request_timeout_secs: 30,
            max_translate_chars: 3000,
        }
    }
}

impl RemoteConfig {
    /// Create a new builder for `RemoteConfig`.
    pub fn builder() -> RemoteConfigBuilder {
        RemoteConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a config from environment variables.
    ///
    /// Reads `DOCMORPH_API_KEY`, `DOCMORPH_CONVERSION_URL`,
    /// `DOCMORPH_TRANSLATION_URL`, and `DOCMORPH_CONTACT_EMAIL`; anything
    /// unset falls back to the defaults. Convenient for
    /// `docmorph convert report.pdf --to docx` with no other wiring.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("DOCMORPH_API_KEY") {
            if !key.is_empty() {
                config.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("DOCMORPH_CONVERSION_URL") {
            if !url.is_empty() {
                config.conversion_api_url = url;
            }
        }
        if let Ok(url) = std::env::var("DOCMORPH_TRANSLATION_URL") {
            if !url.is_empty() {
                config.translation_api_url = url;
            }
        }
        if let Ok(email) = std::env::var("DOCMORPH_CONTACT_EMAIL") {
            if !email.is_empty() {
                config.contact_email = Some(email);
            }
        }
        config
    }
}

/// Builder for [`RemoteConfig`].
#[derive(Debug)]
pub struct RemoteConfigBuilder {
    config: RemoteConfig,
}

impl RemoteConfigBuilder {
    pub fn conversion_api_url(mut self, url: impl Into<String>) -> Self {
        self.config.conversion_api_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn translation_api_url(mut self, url: impl Into<String>) -> Self {
        self.config.translation_api_url = url.into();
        self
    }

    pub fn contact_email(mut self, email: impl Into<String>) -> Self {
        self.config.contact_email = Some(email.into());
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    pub fn max_poll_attempts(mut self, n: u32) -> Self {
        self.config.max_poll_attempts = n.max(1);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs.max(1);
        self
    }

    pub fn max_translate_chars(mut self, n: usize) -> Self {
        self.config.max_translate_chars = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RemoteConfig, DocMorphError> {
        let c = &self.config;
        if c.max_poll_attempts == 0 {
            return Err(DocMorphError::InvalidConfig(
                "max_poll_attempts must be ≥ 1".into(),
            ));
        }
        if c.conversion_api_url.is_empty() || c.translation_api_url.is_empty() {
            return Err(DocMorphError::InvalidConfig(
                "vendor API URLs must not be empty".into(),
            ));
        }
        if c.max_translate_chars < 16 {
            return Err(DocMorphError::InvalidConfig(format!(
                "max_translate_chars must be ≥ 16, got {}",
                c.max_translate_chars
            )));
        }
        Ok(self.config)
    }
}
