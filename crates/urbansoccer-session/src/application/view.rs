//! Read-only snapshot of the session for renderers.

use serde::Serialize;
use urbansoccer_core::turn::{GameResult, TurnState};
use urbansoccer_narration::NarrationStatus;

use crate::domain::aggregates::{SessionPhase, TurnSession};

/// Everything a screen needs to render the current turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    /// Engine phase.
    pub phase: SessionPhase,
    /// Loaded campaign identifier.
    pub campaign_id: Option<String>,
    /// Loaded campaign display name.
    pub campaign_name: Option<String>,
    /// Current turn.
    pub turn: TurnState,
    /// Card awaiting confirmation.
    pub armed_action: Option<String>,
    /// Sequence number of the current turn.
    pub turn_sequence: u64,
    /// Whether narration is spoken automatically.
    pub auto_play: bool,
    /// Whether the campaign was started over because its resume was unusable.
    pub healed: bool,
    /// Player-facing description of the last failure.
    pub last_error: Option<String>,
    /// Result label once the game is over.
    pub result_label: Option<&'static str>,
    /// Narration playback status.
    pub narration: NarrationStatus,
}

impl SessionView {
    pub(crate) fn capture(session: &TurnSession, narration: NarrationStatus) -> Self {
        let turn = session.turn().clone();
        let result_label =
            (session.phase() == SessionPhase::GameOver).then(|| GameResult::label(turn.result));
        Self {
            phase: session.phase(),
            campaign_id: session.campaign_id().map(str::to_owned),
            campaign_name: session.campaign().map(|c| c.display_name().to_owned()),
            turn,
            armed_action: session.armed_action().map(str::to_owned),
            turn_sequence: session.turn_sequence(),
            auto_play: session.auto_play(),
            healed: session.healed(),
            last_error: session.last_error().map(str::to_owned),
            result_label,
            narration,
        }
    }

    /// Whether a card may be selected right now.
    #[must_use]
    pub fn accepts_selection(&self) -> bool {
        self.phase == SessionPhase::AwaitingAction
    }
}
