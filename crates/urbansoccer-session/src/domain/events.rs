//! Notifications published by the turn session.

use serde::Serialize;
use urbansoccer_core::event::EventMetadata;
use urbansoccer_core::turn::GameResult;

use super::commands::LoadMode;

/// How the player left the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitIntent {
    /// Leave with server-side progress untouched.
    PauseAndKeep,
    /// Leave and reset the campaign server-side.
    AbandonAndDiscard,
}

/// Event type identifier for [`SessionEventKind::LoadRequested`].
pub const LOAD_REQUESTED_EVENT_TYPE: &str = "session.load_requested";
/// Event type identifier for [`SessionEventKind::SessionHealed`].
pub const SESSION_HEALED_EVENT_TYPE: &str = "session.session_healed";
/// Event type identifier for [`SessionEventKind::LoadFailed`].
pub const LOAD_FAILED_EVENT_TYPE: &str = "session.load_failed";
/// Event type identifier for [`SessionEventKind::CardArmed`].
pub const CARD_ARMED_EVENT_TYPE: &str = "session.card_armed";
/// Event type identifier for [`SessionEventKind::SelectionCancelled`].
pub const SELECTION_CANCELLED_EVENT_TYPE: &str = "session.selection_cancelled";
/// Event type identifier for [`SessionEventKind::ActionSubmitted`].
pub const ACTION_SUBMITTED_EVENT_TYPE: &str = "session.action_submitted";
/// Event type identifier for [`SessionEventKind::TurnApplied`].
pub const TURN_APPLIED_EVENT_TYPE: &str = "session.turn_applied";
/// Event type identifier for [`SessionEventKind::SubmissionFailed`].
pub const SUBMISSION_FAILED_EVENT_TYPE: &str = "session.submission_failed";
/// Event type identifier for [`SessionEventKind::GameOver`].
pub const GAME_OVER_EVENT_TYPE: &str = "session.game_over";
/// Event type identifier for [`SessionEventKind::ReauthenticationRequired`].
pub const REAUTHENTICATION_REQUIRED_EVENT_TYPE: &str = "session.reauthentication_required";
/// Event type identifier for [`SessionEventKind::SessionExited`].
pub const SESSION_EXITED_EVENT_TYPE: &str = "session.session_exited";
/// Event type identifier for [`SessionEventKind::ResetFailed`].
pub const RESET_FAILED_EVENT_TYPE: &str = "session.reset_failed";

/// Event payload variants for the turn session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEventKind {
    /// A start or resume request was issued.
    LoadRequested {
        /// Whether the campaign is being started or resumed.
        mode: LoadMode,
    },
    /// A resume answered with an unusable turn; the campaign is being
    /// started over once and the narration history was discarded.
    SessionHealed,
    /// Loading halted in `LoadError`.
    LoadFailed {
        /// Player-facing description.
        message: String,
    },
    /// A card was armed and awaits confirmation.
    CardArmed {
        /// The armed card.
        action_id: String,
    },
    /// The armed card was disarmed without playing it.
    SelectionCancelled {
        /// The disarmed card.
        action_id: String,
    },
    /// A card was played and the submission is in flight.
    ActionSubmitted {
        /// The played card.
        action_id: String,
    },
    /// A new turn replaced the turn state.
    TurnApplied {
        /// Narration of the new turn.
        narration: String,
        /// Number of playable cards.
        action_count: usize,
        /// Whether the campaign ended with this turn.
        is_terminal: bool,
    },
    /// A submission failed; the previous turn is still current.
    SubmissionFailed {
        /// The card that was played.
        action_id: String,
        /// Player-facing description.
        message: String,
    },
    /// The campaign reached a terminal outcome.
    GameOver {
        /// Terminal result, when the server reported one.
        result: Option<GameResult>,
    },
    /// The credential was rejected; the player must sign in again.
    ReauthenticationRequired,
    /// The player left the session.
    SessionExited {
        /// How the player left.
        intent: ExitIntent,
    },
    /// Discarding server-side progress failed; the exit went ahead anyway.
    ResetFailed {
        /// Player-facing description.
        message: String,
    },
}

impl SessionEventKind {
    /// Dotted event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::LoadRequested { .. } => LOAD_REQUESTED_EVENT_TYPE,
            Self::SessionHealed => SESSION_HEALED_EVENT_TYPE,
            Self::LoadFailed { .. } => LOAD_FAILED_EVENT_TYPE,
            Self::CardArmed { .. } => CARD_ARMED_EVENT_TYPE,
            Self::SelectionCancelled { .. } => SELECTION_CANCELLED_EVENT_TYPE,
            Self::ActionSubmitted { .. } => ACTION_SUBMITTED_EVENT_TYPE,
            Self::TurnApplied { .. } => TURN_APPLIED_EVENT_TYPE,
            Self::SubmissionFailed { .. } => SUBMISSION_FAILED_EVENT_TYPE,
            Self::GameOver { .. } => GAME_OVER_EVENT_TYPE,
            Self::ReauthenticationRequired => REAUTHENTICATION_REQUIRED_EVENT_TYPE,
            Self::SessionExited { .. } => SESSION_EXITED_EVENT_TYPE,
            Self::ResetFailed { .. } => RESET_FAILED_EVENT_TYPE,
        }
    }
}

/// Event envelope for the turn session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: SessionEventKind,
}

impl SessionEvent {
    /// Dotted event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }
}
