//! Requests issued by the turn session and the outcomes of applying their
//! responses.
//!
//! Every backend request carries the sequence number that was current when
//! it was issued; a response is applied only while that number is still
//! current.

use serde::Serialize;
use urbansoccer_core::turn::TurnState;
use uuid::Uuid;

use crate::error::SessionError;

/// Which backend operation loads the campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    /// `start_session`.
    Start,
    /// `resume_session`.
    Resume,
}

/// A start or resume request to send to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    /// Sequence number of this request.
    pub sequence: u64,
    /// Campaign to load.
    pub campaign_id: String,
    /// Start or resume.
    pub mode: LoadMode,
    /// Correlation ID shared by every request of this load.
    pub correlation_id: Uuid,
}

/// A card submission to send to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTicket {
    /// Sequence number of this request.
    pub sequence: u64,
    /// Campaign being played.
    pub campaign_id: String,
    /// The played card.
    pub action_id: String,
    /// Correlation ID of the submission.
    pub correlation_id: Uuid,
}

/// Result of selecting or confirming a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The card is armed and awaits confirmation.
    Armed(String),
    /// The armed card was confirmed; submit it.
    Submit(SubmitTicket),
    /// Nothing happened: wrong phase or unknown card.
    Ignored,
}

/// A turn accepted into the session.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedTurn {
    /// The new turn state.
    pub turn: TurnState,
    /// Sequence number the turn was applied under; narration is tagged with it.
    pub turn_sequence: u64,
}

/// Result of applying a start or resume response.
#[derive(Debug)]
pub enum LoadApplied {
    /// The campaign is ready to play (or already over).
    Ready(AppliedTurn),
    /// The resume answer was unusable; send this start request once.
    RetryAsStart(LoadTicket),
    /// Loading halted in `LoadError`.
    Failed(SessionError),
    /// The response belongs to a request that is no longer current.
    Stale,
}

/// Result of applying a play response.
#[derive(Debug)]
pub enum SubmitApplied {
    /// The turn was accepted.
    Applied(AppliedTurn),
    /// The response was unusable; the previous turn is still current.
    Rejected(SessionError),
    /// The response belongs to a request that is no longer current.
    Stale,
}
