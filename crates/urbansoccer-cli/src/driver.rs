//! Interactive game loop over the turn engine.

use std::fmt::Write as _;
use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};
use urbansoccer_core::cache::CampaignCache;
use urbansoccer_narration::SpeakOutcome;
use urbansoccer_session::{
    ExitController, GameEngine, SelectOutcome, SessionError, SessionEvent, SessionListener,
    SessionPhase,
};

use crate::command::{Command, HELP};
use crate::error::AppError;
use crate::render::{render_history, render_launch, render_view};

/// Whether the loop keeps reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command.
    Continue,
    /// The player left the game.
    Exit,
}

/// Listener that mirrors every session event into the log.
#[must_use]
pub fn event_logger() -> Arc<dyn SessionListener> {
    Arc::new(|event: &SessionEvent| {
        let payload = serde_json::to_string(&event.kind).unwrap_or_default();
        info!(
            event_type = event.event_type(),
            campaign_id = event.metadata.campaign_id.as_deref().unwrap_or(""),
            turn_sequence = event.metadata.turn_sequence,
            correlation_id = ?event.metadata.correlation_id,
            payload = %payload,
            "session event"
        );
    })
}

/// Plays the cached campaign from terminal commands.
#[derive(Clone)]
pub struct Driver {
    engine: Arc<GameEngine>,
    exit: ExitController,
    cache: Arc<dyn CampaignCache>,
}

impl Driver {
    /// Creates a driver for `engine`, loading the campaign held in `cache`.
    #[must_use]
    pub fn new(engine: Arc<GameEngine>, cache: Arc<dyn CampaignCache>) -> Self {
        Self {
            exit: ExitController::new(engine.clone()),
            engine,
            cache,
        }
    }

    /// Loads the selected campaign and renders the first turn.
    pub async fn start(&self) -> (Flow, String) {
        let launch = match self.cache.load_selected() {
            Ok(Some(session)) => render_launch(&session),
            Ok(None) | Err(_) => String::new(),
        };
        let (flow, text) = match self.engine.load_selected(self.cache.as_ref()).await {
            Ok(_) => (Flow::Continue, render_view(&self.engine.view())),
            Err(error) => self.failure(&error),
        };
        (flow, format!("{launch}{text}"))
    }

    /// Applies one command and returns what to print.
    pub async fn handle(&self, command: Command) -> (Flow, String) {
        debug!(?command, "command");
        match command {
            Command::Card(position) => {
                let view = self.engine.view();
                let card = position
                    .checked_sub(1)
                    .and_then(|index| view.turn.available_actions.get(index));
                let Some(card) = card else {
                    return (Flow::Continue, format!("There is no card {position}.\n"));
                };
                let result = self.engine.select(&card.action_id).await;
                self.after_selection(result)
            }
            Command::Confirm => {
                let result = self.engine.confirm().await;
                self.after_selection(result)
            }
            Command::Cancel => match self.engine.cancel_selection() {
                Some(_) => (Flow::Continue, render_view(&self.engine.view())),
                None => (Flow::Continue, "No card is armed.\n".to_owned()),
            },
            Command::Listen => match self.engine.play_narration().await {
                SpeakOutcome::Silent => (
                    Flow::Continue,
                    "Narration is unavailable on this device.\n".to_owned(),
                ),
                SpeakOutcome::Remote | SpeakOutcome::Local | SpeakOutcome::Superseded => {
                    (Flow::Continue, String::new())
                }
            },
            Command::Pause => {
                self.engine.pause_narration();
                (Flow::Continue, String::new())
            }
            Command::Resume => {
                self.engine.resume_narration();
                (Flow::Continue, String::new())
            }
            Command::Stop => {
                self.engine.stop_narration();
                (Flow::Continue, String::new())
            }
            Command::Volume(level) => {
                self.engine.set_volume(level);
                let volume = self.engine.narration_status().volume;
                (Flow::Continue, format!("Volume {volume}.\n"))
            }
            Command::History => (Flow::Continue, render_history(&self.engine.history())),
            Command::Retry => {
                if self.engine.phase() == SessionPhase::LoadError {
                    self.start().await
                } else {
                    (Flow::Continue, "Nothing to retry.\n".to_owned())
                }
            }
            Command::Quit => {
                let outcome = self.exit.pause_and_keep();
                (Flow::Exit, format!("{}\n", outcome.message()))
            }
            Command::Abandon => {
                let outcome = self.exit.abandon_and_discard().await;
                (Flow::Exit, format!("{}\n", outcome.message()))
            }
            Command::Help => (Flow::Continue, format!("{HELP}\n")),
        }
    }

    fn after_selection(&self, result: Result<SelectOutcome, SessionError>) -> (Flow, String) {
        match result {
            Ok(SelectOutcome::Ignored) => (
                Flow::Continue,
                "That card cannot be played right now.\n".to_owned(),
            ),
            Ok(SelectOutcome::Armed(_) | SelectOutcome::Played(_)) => {
                (Flow::Continue, render_view(&self.engine.view()))
            }
            Err(error) => self.failure(&error),
        }
    }

    fn failure(&self, error: &SessionError) -> (Flow, String) {
        warn!(error = %error, "session operation failed");
        if error.requires_reauthentication() {
            self.engine.dispose();
            return (
                Flow::Exit,
                format!("{}\nSet URBANSOCCER_API_TOKEN and start again.\n", error.user_message()),
            );
        }
        let view = self.engine.view();
        let mut text = render_view(&view);
        if view.last_error.is_none() {
            let _ = writeln!(text, "! {}", error.user_message());
        }
        if view.phase == SessionPhase::LoadError {
            text.push_str(if error.is_retryable() {
                "(type 'retry' to try again or 'q' to leave)\n"
            } else {
                "(type 'q' to leave)\n"
            });
        }
        (Flow::Continue, text)
    }

    /// Runs the prompt loop until the player leaves or input ends.
    ///
    /// End of input leaves the game with progress kept.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if reading input or writing output fails.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> Result<(), AppError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let (flow, text) = self.start().await;
        write!(output, "{text}")?;
        if flow == Flow::Exit {
            output.flush()?;
            return Ok(());
        }

        let mut lines = input.lines();
        loop {
            write!(output, "> ")?;
            output.flush()?;
            let Some(line) = lines.next_line().await? else {
                let outcome = self.exit.pause_and_keep();
                writeln!(output, "\n{}", outcome.message())?;
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            let Some(command) = Command::parse(&line) else {
                writeln!(output, "Unknown command. Type ? for help.")?;
                continue;
            };
            let (flow, text) = self.handle(command).await;
            write!(output, "{text}")?;
            if flow == Flow::Exit {
                break;
            }
        }
        output.flush()?;
        info!("game loop finished");
        Ok(())
    }
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
