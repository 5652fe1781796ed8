//! Environment configuration for the terminal driver.

use std::path::PathBuf;
use std::time::Duration;

use urbansoccer_client::ClientConfig;
use urbansoccer_client::cache::DEFAULT_CAMPAIGN_FILE;
use urbansoccer_client::config::{DEFAULT_API_TIMEOUT, DEFAULT_API_URL, DEFAULT_SPEECH_TIMEOUT};
use urbansoccer_narration::domain::playback::MAX_VOLUME;

use crate::error::AppError;

/// Settings read from `URBANSOCCER_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Backend connection settings.
    pub client: ClientConfig,
    /// Bearer credential, if any.
    pub api_token: Option<String>,
    /// File holding the selected campaign.
    pub campaign_file: PathBuf,
    /// Whether narration is spoken automatically.
    pub auto_play: bool,
    /// Initial narration volume, 0–100.
    pub volume: u8,
}

impl CliConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let client = ClientConfig {
            base_url: var("URBANSOCCER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
            api_timeout: millis(var("URBANSOCCER_API_TIMEOUT_MS"), "URBANSOCCER_API_TIMEOUT_MS")?
                .unwrap_or(DEFAULT_API_TIMEOUT),
            speech_timeout: millis(
                var("URBANSOCCER_SPEECH_TIMEOUT_MS"),
                "URBANSOCCER_SPEECH_TIMEOUT_MS",
            )?
            .unwrap_or(DEFAULT_SPEECH_TIMEOUT),
        };

        let auto_play = match var("URBANSOCCER_AUTOPLAY") {
            None => false,
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                AppError::Config(format!("URBANSOCCER_AUTOPLAY must be a boolean, got {raw:?}"))
            })?,
        };

        let volume = match var("URBANSOCCER_VOLUME") {
            None => MAX_VOLUME,
            Some(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|v| *v <= MAX_VOLUME)
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "URBANSOCCER_VOLUME must be between 0 and {MAX_VOLUME}, got {raw:?}"
                    ))
                })?,
        };

        Ok(Self {
            client,
            api_token: var("URBANSOCCER_API_TOKEN"),
            campaign_file: var("URBANSOCCER_CAMPAIGN_FILE")
                .map_or_else(|| PathBuf::from(DEFAULT_CAMPAIGN_FILE), PathBuf::from),
            auto_play,
            volume,
        })
    }
}

fn millis(raw: Option<String>, key: &str) -> Result<Option<Duration>, AppError> {
    raw.map(|raw| {
        raw.trim()
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .ok_or_else(|| {
                AppError::Config(format!(
                    "{key} must be a positive number of milliseconds, got {raw:?}"
                ))
            })
    })
    .transpose()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
