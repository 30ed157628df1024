//! Remote speech-to-text client.
//!
//! [`SpeechRecognizer`] is the async interface the speech loop drives.
//! [`WebSpeechRecognizer`] POSTs raw 16-bit PCM to the configured
//! endpoint (by default the Google web-speech v2 service) and parses its
//! newline-separated JSON response.  All connection details come from
//! [`SpeechConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::SpeechConfig;
use crate::speech::pcm;

// ---------------------------------------------------------------------------
// RecognizeError
// ---------------------------------------------------------------------------

/// Errors that can occur during one recognition attempt.
#[derive(Debug, Error)]
pub enum RecognizeError {
    /// The service heard audio but produced no transcript.  Not a fault —
    /// the loop logs it quietly and listens again.
    #[error("could not understand audio")]
    Unintelligible,

    /// HTTP transport or connection error.
    #[error("speech service request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("speech service request timed out")]
    Timeout,

    /// The response body could not be parsed.
    #[error("failed to parse speech service response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for RecognizeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RecognizeError::Timeout
        } else {
            RecognizeError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechRecognizer trait
// ---------------------------------------------------------------------------

/// Async trait for speech-to-text backends.
///
/// Implementors must be `Send + Sync` so they can be shared across threads
/// (e.g. wrapped in `Arc<dyn SpeechRecognizer>`).
///
/// # Arguments
/// * `audio`       – mono `f32` PCM samples in `[-1, 1]`.
/// * `sample_rate` – rate of `audio` in Hz.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, audio: &[f32], sample_rate: u32) -> Result<String, RecognizeError>;
}

const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechRecognizer>) {}
};

// ---------------------------------------------------------------------------
// WebSpeechRecognizer
// ---------------------------------------------------------------------------

/// Speaks the Google web-speech v2 wire format: raw L16 PCM in, one JSON
/// object per line out.
pub struct WebSpeechRecognizer {
    client: reqwest::Client,
    config: SpeechConfig,
}

impl WebSpeechRecognizer {
    /// Build a recognizer from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &SpeechConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    /// Request URL with language and (only when configured) the API key.
    pub(crate) fn request_url(&self) -> String {
        let mut url = format!(
            "{}?client=chromium&lang={}",
            self.config.endpoint, self.config.language
        );
        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            url.push_str("&key=");
            url.push_str(key);
        }
        url
    }
}

#[async_trait]
impl SpeechRecognizer for WebSpeechRecognizer {
    async fn recognize(&self, audio: &[f32], sample_rate: u32) -> Result<String, RecognizeError> {
        let body = pcm::to_i16_le_bytes(audio);

        let response = self
            .client
            .post(self.request_url())
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("audio/l16; rate={sample_rate}"),
            )
            .body(body)
            .send()
            .await?;

        let text = response.text().await?;
        parse_transcript(&text)
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Extract the first transcript from the service's line-JSON response.
///
/// The service streams one JSON object per line; the first lines often
/// carry an empty `result` array before the final hypothesis arrives.
/// An exhausted body with no transcript means the audio was not understood.
pub(crate) fn parse_transcript(body: &str) -> Result<String, RecognizeError> {
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value: serde_json::Value =
            serde_json::from_str(line).map_err(|e| RecognizeError::Parse(e.to_string()))?;

        let transcript = value["result"][0]["alternative"][0]["transcript"]
            .as_str()
            .map(str::trim)
            .unwrap_or("");

        if !transcript.is_empty() {
            return Ok(transcript.to_string());
        }
    }

    Err(RecognizeError::Unintelligible)
}

// ---------------------------------------------------------------------------
// MockRecognizer  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response without any network
/// traffic.
#[cfg(test)]
pub struct MockRecognizer {
    response: std::sync::Mutex<Vec<Result<String, RecognizeError>>>,
}

#[cfg(test)]
impl MockRecognizer {
    /// Replay `responses` in order; afterwards every call is
    /// [`RecognizeError::Unintelligible`].
    pub fn sequence(responses: Vec<Result<String, RecognizeError>>) -> Self {
        let mut responses = responses;
        responses.reverse(); // pop() from the back
        Self {
            response: std::sync::Mutex::new(responses),
        }
    }

    /// Always return `Ok(text)` once, then fall silent.
    pub fn once(text: impl Into<String>) -> Self {
        Self::sequence(vec![Ok(text.into())])
    }
}

#[cfg(test)]
#[async_trait]
impl SpeechRecognizer for MockRecognizer {
    async fn recognize(&self, _audio: &[f32], _rate: u32) -> Result<String, RecognizeError> {
        self.response
            .lock()
            .unwrap()
            .pop()
            .unwrap_or(Err(RecognizeError::Unintelligible))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
