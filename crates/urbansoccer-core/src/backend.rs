//! Campaign backend and speech synthesis seams.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ClientError;
use crate::turn::TurnPayload;

/// Remote operations the turn engine performs against the campaign backend.
#[async_trait]
pub trait CampaignBackend: Send + Sync {
    /// Starts a fresh game for the campaign.
    async fn start_session(&self, campaign_id: &str) -> Result<TurnPayload, ClientError>;

    /// Resumes the game in progress for the campaign.
    async fn resume_session(&self, campaign_id: &str) -> Result<TurnPayload, ClientError>;

    /// Plays one action card and returns the resulting turn.
    async fn submit_action(
        &self,
        campaign_id: &str,
        action_id: &str,
    ) -> Result<TurnPayload, ClientError>;

    /// Discards all server-side progress for the campaign.
    async fn reset_session(&self, campaign_id: &str) -> Result<(), ClientError>;
}

/// Synthesized narration audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// Encoded audio bytes.
    pub data: Bytes,
    /// MIME type reported by the server, if any.
    pub content_type: Option<String>,
}

impl AudioClip {
    /// Wraps raw bytes with an optional MIME type.
    #[must_use]
    pub fn new(data: impl Into<Bytes>, content_type: Option<String>) -> Self {
        Self {
            data: data.into(),
            content_type,
        }
    }

    /// Whether the clip looks playable. Empty bodies and non-audio MIME
    /// types (an HTML error page, a JSON error body) are rejected.
    #[must_use]
    pub fn is_playable(&self) -> bool {
        if self.data.is_empty() {
            return false;
        }
        match self.content_type.as_deref() {
            Some(mime) => {
                let mime = mime.to_ascii_lowercase();
                mime.starts_with("audio/") || mime == "application/octet-stream"
            }
            None => true,
        }
    }
}

/// Remote text-to-speech.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Renders `text` to playable audio.
    async fn synthesize_speech(&self, text: &str) -> Result<AudioClip, ClientError>;
}
