//! Translation boundary
//!
//! Recognized signboard text is handed to an external translation service.
//! The service sits behind a trait so the server can be exercised without
//! network access; failures are expected to degrade gracefully at the caller
//! (fall back to the untranslated text) rather than fail the request.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("translation request failed: {0}")]
    Request(String),

    #[error("unexpected translation response: {0}")]
    Response(String),
}

/// Text-in/text-out translation capability
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError>;
}

/// Translator backed by the public Google translate endpoint
pub struct GoogleTranslator {
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new() -> Self {
        Self {
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
        }
    }
}

impl Default for GoogleTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator for GoogleTranslator {
    fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError> {
        // Nothing to translate; do not touch the network
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let response = ureq::get(self.endpoint.as_str())
            .query("client", "gtx")
            .query("sl", "auto")
            .query("tl", target_lang)
            .query("dt", "t")
            .query("q", text)
            .call()
            .map_err(|e| TranslateError::Request(e.to_string()))?;

        let body = response
            .into_body()
            .read_to_vec()
            .map_err(|e| TranslateError::Request(e.to_string()))?;

        let value: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|e| TranslateError::Response(e.to_string()))?;

        parse_segments(&value)
    }
}

/// The endpoint answers with a nested array; element 0 lists translated
/// segments as `[translated, original, ...]` pairs.
fn parse_segments(value: &serde_json::Value) -> Result<String, TranslateError> {
    let segments = value
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| TranslateError::Response("missing segment array".to_string()))?;

    let mut translated = String::new();
    for segment in segments {
        if let Some(chunk) = segment.get(0).and_then(|c| c.as_str()) {
            translated.push_str(chunk);
        }
    }

    Ok(translated)
}
