//! Failure taxonomy shared by every campaign backend call.

use thiserror::Error;

/// Classified failure of a campaign backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The bearer credential was rejected (HTTP 401).
    #[error("unauthorized: session expired")]
    Unauthorized,

    /// The campaign no longer exists server-side (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// No HTTP status was received: network unreachable or timed out.
    #[error("connectivity error: {0}")]
    Connectivity(String),

    /// The server rejected the submitted action (HTTP 400).
    #[error("invalid action: {}", .detail.as_deref().unwrap_or("rejected by server"))]
    InvalidAction {
        /// Server-provided detail text, if any.
        detail: Option<String>,
    },

    /// Any other status, or a response body that could not be understood.
    #[error("unexpected backend error (status {status:?}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Unknown {
        /// HTTP status code, when one was received.
        status: Option<u16>,
        /// Server-provided detail text, if any.
        detail: Option<String>,
    },
}

impl ClientError {
    /// Message suitable for showing to the player.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Session expired. Please sign in again.".to_owned(),
            Self::NotFound(_) => "Campaign not found.".to_owned(),
            Self::Connectivity(_) => {
                "Connectivity problem. Check that the API is running.".to_owned()
            }
            Self::InvalidAction { .. } => "Invalid action.".to_owned(),
            Self::Unknown { detail, .. } => detail
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| "Unexpected error. Please try again.".to_owned()),
        }
    }

    /// Whether re-triggering the same operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connectivity(_) | Self::InvalidAction { .. } | Self::Unknown { .. }
        )
    }

    /// Whether this failure must force the player to re-authenticate.
    #[must_use]
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Failure reading or writing the locally cached campaign selection.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache storage could not be read or written.
    #[error("cache i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The cached record is not a valid campaign.
    #[error("cached campaign is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}
