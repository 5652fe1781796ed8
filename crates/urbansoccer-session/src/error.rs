//! Turn session error types.

use thiserror::Error;
use urbansoccer_core::error::{CacheError, ClientError};

use crate::domain::aggregates::SessionPhase;

/// Failure of a turn session operation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The campaign backend call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The caller holds no usable credential; the backend was not contacted.
    #[error("caller is not authenticated")]
    NotAuthenticated,

    /// The campaign to load has no identifier.
    #[error("campaign has no identifier")]
    MissingCampaignId,

    /// The backend answered with a turn the engine cannot present.
    #[error("incoherent turn payload: {0}")]
    IncoherentPayload(String),

    /// The operation is not accepted in the current phase.
    #[error("operation not allowed while {0}")]
    InvalidState(SessionPhase),

    /// No campaign has been selected for play.
    #[error("no campaign selected")]
    NoCampaignSelected,

    /// The request was overtaken by an exit or teardown while in flight.
    #[error("session was closed while the request was in flight")]
    Cancelled,

    /// The cached campaign selection could not be read.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl SessionError {
    /// Message suitable for showing to the player.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(e) => e.user_message(),
            Self::NotAuthenticated => ClientError::Unauthorized.user_message(),
            Self::MissingCampaignId | Self::NoCampaignSelected => {
                "No campaign selected. Pick a campaign to play.".to_owned()
            }
            Self::IncoherentPayload(_) => {
                "The game server sent an incomplete turn. Please try again.".to_owned()
            }
            Self::InvalidState(phase) => format!("Not possible right now ({phase})."),
            Self::Cancelled => "The game was closed.".to_owned(),
            Self::Cache(_) => "The selected campaign could not be read.".to_owned(),
        }
    }

    /// Whether repeating the failed operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Client(e) => e.is_retryable(),
            Self::IncoherentPayload(_) => true,
            _ => false,
        }
    }

    /// Whether this failure must force the player to re-authenticate.
    #[must_use]
    pub fn requires_reauthentication(&self) -> bool {
        match self {
            Self::Client(e) => e.requires_reauthentication(),
            Self::NotAuthenticated => true,
            _ => false,
        }
    }
}
