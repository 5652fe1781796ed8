//! The turn session state machine.
//!
//! `TurnSession` is pure: it never performs I/O. The engine asks it for a
//! ticket, performs the backend call, and hands the response back. Each
//! transition records the events it produced; the engine drains and
//! publishes them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use urbansoccer_core::campaign::{CampaignSession, has_real_progress};
use urbansoccer_core::clock::Clock;
use urbansoccer_core::error::ClientError;
use urbansoccer_core::event::EventMetadata;
use urbansoccer_core::turn::{TurnPayload, TurnState};
use uuid::Uuid;

use super::commands::{
    AppliedTurn, LoadApplied, LoadMode, LoadTicket, Selection, SubmitApplied, SubmitTicket,
};
use super::events::{ExitIntent, SessionEvent, SessionEventKind};
use crate::error::SessionError;

/// Lifecycle phase of the turn session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No campaign loaded.
    #[default]
    Idle,
    /// A start or resume request is in flight.
    Loading,
    /// Waiting for the player to play a card.
    AwaitingAction,
    /// A card submission is in flight.
    Submitting,
    /// The campaign has ended.
    GameOver,
    /// Loading failed; a new load may be attempted.
    LoadError,
}

impl SessionPhase {
    /// Snake-case name of the phase.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::AwaitingAction => "awaiting_action",
            Self::Submitting => "submitting",
            Self::GameOver => "game_over",
            Self::LoadError => "load_error",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One narrated turn, kept for the history view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationEntry {
    /// Sequence number the turn was applied under.
    pub turn_sequence: u64,
    /// Narration text.
    pub text: String,
    /// When the turn was applied.
    pub recorded_at: DateTime<Utc>,
}

/// The aggregate root for one played campaign screen.
#[derive(Debug, Default)]
pub struct TurnSession {
    phase: SessionPhase,
    campaign: Option<CampaignSession>,
    turn: TurnState,
    /// Armed card awaiting confirmation.
    pending: Option<String>,
    history: Vec<NarrationEntry>,
    /// Bumped by every issued request and by every exit.
    sequence: u64,
    /// Sequence number of the turn currently shown.
    turn_sequence: u64,
    auto_play: bool,
    healed: bool,
    last_error: Option<String>,
    /// Uncommitted events pending publication.
    uncommitted_events: Vec<SessionEvent>,
}

impl TurnSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new(auto_play: bool) -> Self {
        Self {
            auto_play,
            ..Self::default()
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The loaded campaign, if any.
    #[must_use]
    pub fn campaign(&self) -> Option<&CampaignSession> {
        self.campaign.as_ref()
    }

    /// Identifier of the loaded campaign, if any.
    #[must_use]
    pub fn campaign_id(&self) -> Option<&str> {
        self.campaign.as_ref().and_then(CampaignSession::campaign_id)
    }

    /// Current turn state.
    #[must_use]
    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    /// The armed card, if any.
    #[must_use]
    pub fn armed_action(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Narration of every turn applied since the campaign was loaded.
    #[must_use]
    pub fn history(&self) -> &[NarrationEntry] {
        &self.history
    }

    /// Sequence number of the turn currently shown.
    #[must_use]
    pub fn turn_sequence(&self) -> u64 {
        self.turn_sequence
    }

    /// Whether new narration is spoken automatically.
    #[must_use]
    pub fn auto_play(&self) -> bool {
        self.auto_play
    }

    /// Whether the last load had to start the campaign over.
    #[must_use]
    pub fn healed(&self) -> bool {
        self.healed
    }

    /// Player-facing description of the last failure, cleared by the next
    /// accepted turn.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Events recorded since the last drain.
    #[must_use]
    pub fn uncommitted_events(&self) -> &[SessionEvent] {
        &self.uncommitted_events
    }

    /// Removes and returns the recorded events.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }

    /// Turns automatic narration on. Returns `true` if it was off.
    pub fn enable_auto_play(&mut self) -> bool {
        !std::mem::replace(&mut self.auto_play, true)
    }

    fn is_current(&self, sequence: u64) -> bool {
        self.sequence == sequence
    }

    fn record(&mut self, kind: SessionEventKind, correlation_id: Option<Uuid>, clock: &dyn Clock) {
        let metadata = EventMetadata::new(
            kind.event_type(),
            self.campaign_id().map(str::to_owned),
            self.turn_sequence,
            correlation_id,
            clock,
        );
        self.uncommitted_events.push(SessionEvent { metadata, kind });
    }

    fn halt_load(&mut self, error: &SessionError, correlation_id: Uuid, clock: &dyn Clock) {
        let message = error.user_message();
        self.phase = SessionPhase::LoadError;
        self.last_error = Some(message.clone());
        self.record(
            SessionEventKind::LoadFailed { message },
            Some(correlation_id),
            clock,
        );
        if error.requires_reauthentication() {
            self.record(
                SessionEventKind::ReauthenticationRequired,
                Some(correlation_id),
                clock,
            );
        }
    }

    /// Opens a load of `campaign`, permitted from `Idle` or `LoadError`.
    ///
    /// Everything from a previous campaign is discarded. Resume is chosen
    /// when the campaign has real progress, start otherwise.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` outside `Idle`/`LoadError`
    /// (nothing changes). Returns `NotAuthenticated` or `MissingCampaignId`
    /// after halting in `LoadError`; no request may be sent.
    pub fn begin_load(
        &mut self,
        campaign: CampaignSession,
        authorized: bool,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<LoadTicket, SessionError> {
        if !matches!(self.phase, SessionPhase::Idle | SessionPhase::LoadError) {
            return Err(SessionError::InvalidState(self.phase));
        }

        self.sequence += 1;
        self.turn_sequence = 0;
        self.turn = TurnState::default();
        self.pending = None;
        self.history.clear();
        self.healed = false;
        self.last_error = None;
        let mode = if has_real_progress(&campaign) {
            LoadMode::Resume
        } else {
            LoadMode::Start
        };
        let campaign_id = campaign.campaign_id().map(str::to_owned);
        self.campaign = Some(campaign);

        if !authorized {
            let error = SessionError::NotAuthenticated;
            self.halt_load(&error, correlation_id, clock);
            return Err(error);
        }
        let Some(campaign_id) = campaign_id else {
            let error = SessionError::MissingCampaignId;
            self.halt_load(&error, correlation_id, clock);
            return Err(error);
        };

        self.phase = SessionPhase::Loading;
        self.record(
            SessionEventKind::LoadRequested { mode },
            Some(correlation_id),
            clock,
        );
        Ok(LoadTicket {
            sequence: self.sequence,
            campaign_id,
            mode,
            correlation_id,
        })
    }

    /// Applies a start or resume response.
    ///
    /// An unusable answer to a resume is retried exactly once as a start;
    /// an unusable answer to a start halts in `LoadError`.
    pub fn apply_load(
        &mut self,
        ticket: &LoadTicket,
        payload: TurnPayload,
        clock: &dyn Clock,
    ) -> LoadApplied {
        if !self.is_current(ticket.sequence) || self.phase != SessionPhase::Loading {
            return LoadApplied::Stale;
        }

        if !payload.is_coherent() {
            if ticket.mode == LoadMode::Resume {
                self.sequence += 1;
                self.healed = true;
                self.history.clear();
                self.record(
                    SessionEventKind::SessionHealed,
                    Some(ticket.correlation_id),
                    clock,
                );
                return LoadApplied::RetryAsStart(LoadTicket {
                    sequence: self.sequence,
                    campaign_id: ticket.campaign_id.clone(),
                    mode: LoadMode::Start,
                    correlation_id: ticket.correlation_id,
                });
            }
            let error = SessionError::IncoherentPayload(
                "start returned no narration or no playable cards".to_owned(),
            );
            self.halt_load(&error, ticket.correlation_id, clock);
            return LoadApplied::Failed(error);
        }

        LoadApplied::Ready(self.accept(payload, ticket.sequence, ticket.correlation_id, clock))
    }

    /// Halts in `LoadError` after a failed start or resume request.
    ///
    /// Returns `false` if the request is no longer current.
    pub fn fail_load(&mut self, ticket: &LoadTicket, error: &ClientError, clock: &dyn Clock) -> bool {
        if !self.is_current(ticket.sequence) || self.phase != SessionPhase::Loading {
            return false;
        }
        self.halt_load(
            &SessionError::Client(error.clone()),
            ticket.correlation_id,
            clock,
        );
        true
    }

    /// Two-phase card selection.
    ///
    /// The first selection arms a card; selecting the armed card again
    /// submits it; selecting a different card re-arms. Ignored outside
    /// `AwaitingAction` and for cards not offered this turn.
    pub fn select(&mut self, action_id: &str, correlation_id: Uuid, clock: &dyn Clock) -> Selection {
        if self.phase != SessionPhase::AwaitingAction || self.turn.action(action_id).is_none() {
            return Selection::Ignored;
        }
        if self.pending.as_deref() == Some(action_id) {
            return self.submit_armed(correlation_id, clock);
        }
        self.pending = Some(action_id.to_owned());
        self.record(
            SessionEventKind::CardArmed {
                action_id: action_id.to_owned(),
            },
            Some(correlation_id),
            clock,
        );
        Selection::Armed(action_id.to_owned())
    }

    /// Submits the armed card, if any.
    pub fn confirm(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Selection {
        if self.phase != SessionPhase::AwaitingAction || self.pending.is_none() {
            return Selection::Ignored;
        }
        self.submit_armed(correlation_id, clock)
    }

    /// Disarms the armed card. Returns the card that was armed.
    pub fn cancel_selection(&mut self, clock: &dyn Clock) -> Option<String> {
        let action_id = self.pending.take()?;
        self.record(
            SessionEventKind::SelectionCancelled {
                action_id: action_id.clone(),
            },
            None,
            clock,
        );
        Some(action_id)
    }

    fn submit_armed(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Selection {
        let Some(campaign_id) = self.campaign_id().map(str::to_owned) else {
            return Selection::Ignored;
        };
        let Some(action_id) = self.pending.take() else {
            return Selection::Ignored;
        };
        self.sequence += 1;
        self.phase = SessionPhase::Submitting;
        self.record(
            SessionEventKind::ActionSubmitted {
                action_id: action_id.clone(),
            },
            Some(correlation_id),
            clock,
        );
        Selection::Submit(SubmitTicket {
            sequence: self.sequence,
            campaign_id,
            action_id,
            correlation_id,
        })
    }

    /// Applies a play response.
    ///
    /// An unusable answer counts as a failed submission: the previous turn
    /// stays current and the session returns to `AwaitingAction`.
    pub fn apply_submit(
        &mut self,
        ticket: &SubmitTicket,
        payload: TurnPayload,
        clock: &dyn Clock,
    ) -> SubmitApplied {
        if !self.is_current(ticket.sequence) || self.phase != SessionPhase::Submitting {
            return SubmitApplied::Stale;
        }
        if !payload.is_coherent() {
            let error = SessionError::IncoherentPayload(
                "play returned no narration or no playable cards".to_owned(),
            );
            self.roll_back(ticket, &error, clock);
            return SubmitApplied::Rejected(error);
        }
        SubmitApplied::Applied(self.accept(payload, ticket.sequence, ticket.correlation_id, clock))
    }

    /// Rolls back after a failed submission. Returns `false` if the request
    /// is no longer current.
    pub fn fail_submit(
        &mut self,
        ticket: &SubmitTicket,
        error: &ClientError,
        clock: &dyn Clock,
    ) -> bool {
        if !self.is_current(ticket.sequence) || self.phase != SessionPhase::Submitting {
            return false;
        }
        self.roll_back(ticket, &SessionError::Client(error.clone()), clock);
        true
    }

    fn roll_back(&mut self, ticket: &SubmitTicket, error: &SessionError, clock: &dyn Clock) {
        let message = error.user_message();
        self.phase = SessionPhase::AwaitingAction;
        self.last_error = Some(message.clone());
        self.record(
            SessionEventKind::SubmissionFailed {
                action_id: ticket.action_id.clone(),
                message,
            },
            Some(ticket.correlation_id),
            clock,
        );
        if error.requires_reauthentication() {
            self.record(
                SessionEventKind::ReauthenticationRequired,
                Some(ticket.correlation_id),
                clock,
            );
        }
    }

    fn accept(
        &mut self,
        payload: TurnPayload,
        sequence: u64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> AppliedTurn {
        let turn = TurnState::from_payload(payload);
        self.turn_sequence = sequence;
        self.pending = None;
        self.last_error = None;
        self.phase = if turn.is_terminal {
            SessionPhase::GameOver
        } else {
            SessionPhase::AwaitingAction
        };
        self.history.push(NarrationEntry {
            turn_sequence: sequence,
            text: turn.narration.clone(),
            recorded_at: clock.now(),
        });
        self.record(
            SessionEventKind::TurnApplied {
                narration: turn.narration.clone(),
                action_count: turn.available_actions.len(),
                is_terminal: turn.is_terminal,
            },
            Some(correlation_id),
            clock,
        );
        if turn.is_terminal {
            self.record(
                SessionEventKind::GameOver {
                    result: turn.result,
                },
                Some(correlation_id),
                clock,
            );
        }
        self.turn = turn.clone();
        AppliedTurn {
            turn,
            turn_sequence: sequence,
        }
    }

    /// Leaves the session: back to `Idle`, in-flight requests invalidated.
    ///
    /// Returns the identifier of the campaign that was loaded.
    pub fn exit(&mut self, intent: ExitIntent, clock: &dyn Clock) -> Option<String> {
        self.record(SessionEventKind::SessionExited { intent }, None, clock);
        let campaign_id = self.campaign_id().map(str::to_owned);
        self.close();
        campaign_id
    }

    /// Records that discarding server-side progress failed.
    pub fn note_reset_failure(&mut self, error: &ClientError, clock: &dyn Clock) {
        self.record(
            SessionEventKind::ResetFailed {
                message: error.user_message(),
            },
            None,
            clock,
        );
        if error.requires_reauthentication() {
            self.record(SessionEventKind::ReauthenticationRequired, None, clock);
        }
    }

    /// Back to `Idle` without recording anything; used on teardown.
    pub fn close(&mut self) {
        self.sequence += 1;
        self.phase = SessionPhase::Idle;
        self.campaign = None;
        self.turn = TurnState::default();
        self.pending = None;
    }
}
