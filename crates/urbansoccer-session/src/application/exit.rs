//! Session exit controller: keep progress or discard it.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use urbansoccer_core::error::ClientError;

use super::engine::GameEngine;
use crate::domain::events::ExitIntent;

/// How an exit went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitOutcome {
    /// How the player left.
    pub intent: ExitIntent,
    /// Why discarding server-side progress failed, if it did. The exit
    /// itself always completes.
    pub reset_error: Option<ClientError>,
}

impl ExitOutcome {
    /// Message to show the player on the way out.
    #[must_use]
    pub fn message(&self) -> String {
        match (self.intent, &self.reset_error) {
            (ExitIntent::PauseAndKeep, _) => "Progress saved. You can continue later.".to_owned(),
            (ExitIntent::AbandonAndDiscard, None) => "Progress discarded.".to_owned(),
            (ExitIntent::AbandonAndDiscard, Some(error)) => format!(
                "Left the game, but progress could not be discarded: {}",
                error.user_message()
            ),
        }
    }
}

/// Leaves the session behind an engine.
#[derive(Debug, Clone)]
pub struct ExitController {
    engine: Arc<GameEngine>,
}

impl ExitController {
    /// Creates a controller for `engine`.
    #[must_use]
    pub fn new(engine: Arc<GameEngine>) -> Self {
        Self { engine }
    }

    /// Stops narration and leaves; server-side progress is untouched.
    pub fn pause_and_keep(&self) -> ExitOutcome {
        let campaign_id = self.engine.exit(ExitIntent::PauseAndKeep);
        info!(campaign_id = campaign_id.as_deref().unwrap_or(""), "progress saved");
        ExitOutcome {
            intent: ExitIntent::PauseAndKeep,
            reset_error: None,
        }
    }

    /// Stops narration, leaves, and resets the campaign server-side.
    ///
    /// A failed reset is reported in the outcome but never blocks the exit.
    #[instrument(skip(self))]
    pub async fn abandon_and_discard(&self) -> ExitOutcome {
        let intent = ExitIntent::AbandonAndDiscard;
        let Some(campaign_id) = self.engine.exit(intent) else {
            debug!("no campaign loaded; nothing to discard");
            return ExitOutcome {
                intent,
                reset_error: None,
            };
        };

        let reset_error = match self.engine.backend().reset_session(&campaign_id).await {
            Ok(()) => {
                info!(campaign_id = %campaign_id, "progress discarded");
                None
            }
            Err(error) => {
                warn!(campaign_id = %campaign_id, error = %error, "campaign reset failed");
                self.engine.note_reset_failure(&error);
                Some(error)
            }
        };
        ExitOutcome {
            intent,
            reset_error,
        }
    }
}
