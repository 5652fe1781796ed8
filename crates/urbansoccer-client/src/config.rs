//! Client configuration.

use std::time::Duration;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Default timeout for campaign calls.
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_millis(15_000);
/// Default timeout for speech synthesis.
pub const DEFAULT_SPEECH_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Where and how patiently to reach the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Timeout for start/resume/play/reset.
    pub api_timeout: Duration,
    /// Timeout for speech synthesis.
    pub speech_timeout: Duration,
}

impl ClientConfig {
    /// Configuration for `base_url` with default timeouts.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_owned(),
            api_timeout: DEFAULT_API_TIMEOUT,
            speech_timeout: DEFAULT_SPEECH_TIMEOUT,
        }
    }
}
