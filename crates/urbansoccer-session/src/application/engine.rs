//! The game turn session engine.
//!
//! Owns the [`TurnSession`] behind a mutex that is never held across a
//! suspension point, performs backend calls against the tickets the session
//! hands out, publishes recorded events to listeners and drives narration.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, instrument, warn};
use urbansoccer_core::backend::CampaignBackend;
use urbansoccer_core::cache::CampaignCache;
use urbansoccer_core::campaign::CampaignSession;
use urbansoccer_core::clock::Clock;
use urbansoccer_core::error::ClientError;
use urbansoccer_core::identity::IdentityProvider;
use urbansoccer_core::turn::TurnState;
use urbansoccer_narration::{NarrationPlayer, NarrationStatus, SpeakOutcome};
use uuid::Uuid;

use super::listeners::{ListenerId, ListenerRegistry, SessionListener};
use super::view::SessionView;
use crate::domain::aggregates::{NarrationEntry, SessionPhase, TurnSession};
use crate::domain::commands::{
    AppliedTurn, LoadApplied, LoadMode, Selection, SubmitApplied, SubmitTicket,
};
use crate::domain::events::{ExitIntent, SessionEvent};
use crate::error::SessionError;

/// What selecting (or confirming) a card did.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    /// The card is armed; select it again or confirm to play it.
    Armed(String),
    /// Nothing happened: wrong phase or unknown card.
    Ignored,
    /// The card was played and this is the new turn.
    Played(TurnState),
}

/// Drives one played campaign.
pub struct GameEngine {
    state: Mutex<TurnSession>,
    listeners: Mutex<ListenerRegistry>,
    backend: Arc<dyn CampaignBackend>,
    identity: Arc<dyn IdentityProvider>,
    narration: NarrationPlayer,
    clock: Arc<dyn Clock>,
}

impl GameEngine {
    /// Creates an idle engine with automatic narration off.
    #[must_use]
    pub fn new(
        backend: Arc<dyn CampaignBackend>,
        identity: Arc<dyn IdentityProvider>,
        narration: NarrationPlayer,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state: Mutex::new(TurnSession::new(false)),
            listeners: Mutex::new(ListenerRegistry::default()),
            backend,
            identity,
            narration,
            clock,
        }
    }

    /// Speaks new narration automatically from the first turn on.
    #[must_use]
    pub fn with_auto_play(mut self, enabled: bool) -> Self {
        self.state = Mutex::new(TurnSession::new(enabled));
        self
    }

    fn lock(&self) -> MutexGuard<'_, TurnSession> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn registry(&self) -> MutexGuard<'_, ListenerRegistry> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs one transition under the lock, then publishes what it recorded.
    fn transition<R>(&self, f: impl FnOnce(&mut TurnSession, &dyn Clock) -> R) -> R {
        let (result, events) = {
            let mut session = self.lock();
            let result = f(&mut session, self.clock.as_ref());
            (result, session.take_events())
        };
        self.publish(&events);
        result
    }

    fn publish(&self, events: &[SessionEvent]) {
        if events.is_empty() {
            return;
        }
        let listeners = self.registry().snapshot();
        for event in events {
            debug!(event_type = event.event_type(), "session event");
            for listener in &listeners {
                listener.on_event(event);
            }
        }
    }

    fn reauthenticate(&self, error: &ClientError) {
        if error.requires_reauthentication() {
            warn!("credential rejected; signing out");
            self.identity.invalidate_session();
        }
    }

    async fn narrate(&self, applied: &AppliedTurn) {
        if !self.lock().auto_play() {
            debug!("auto-play is off; new narration not spoken");
            self.narration.stop();
            return;
        }
        let outcome = self
            .narration
            .speak(&applied.turn.narration, applied.turn_sequence)
            .await;
        debug!(turn_sequence = applied.turn_sequence, ?outcome, "narration requested");
    }

    /// Loads `campaign`, resuming it if it has real progress and starting it
    /// otherwise. Permitted from `Idle` and `LoadError`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` in any other phase. Every other
    /// error leaves the engine in `LoadError`: `NotAuthenticated` when the
    /// caller holds no credential, `Client` when the backend call failed,
    /// `IncoherentPayload` when neither resume nor start produced a playable
    /// turn. Returns `Cancelled` if the session was exited meanwhile.
    #[instrument(skip(self, campaign), fields(campaign_id = %campaign.id))]
    pub async fn load(&self, campaign: CampaignSession) -> Result<TurnState, SessionError> {
        let correlation_id = Uuid::new_v4();
        let authorized = self.identity.is_authorized();
        let begun = self.transition(|session, clock| {
            session.begin_load(campaign, authorized, correlation_id, clock)
        });
        let mut ticket = match begun {
            Ok(ticket) => ticket,
            Err(error) => {
                if matches!(error, SessionError::NotAuthenticated) {
                    warn!("no usable credential; campaign not loaded");
                    self.identity.invalidate_session();
                }
                return Err(error);
            }
        };

        loop {
            info!(
                correlation_id = %ticket.correlation_id,
                mode = ?ticket.mode,
                "loading campaign"
            );
            let response = match ticket.mode {
                LoadMode::Start => self.backend.start_session(&ticket.campaign_id).await,
                LoadMode::Resume => self.backend.resume_session(&ticket.campaign_id).await,
            };
            let payload = match response {
                Ok(payload) => payload,
                Err(error) => {
                    warn!(error = %error, "campaign load failed");
                    self.reauthenticate(&error);
                    let current =
                        self.transition(|session, clock| session.fail_load(&ticket, &error, clock));
                    return Err(if current {
                        SessionError::Client(error)
                    } else {
                        SessionError::Cancelled
                    });
                }
            };

            match self.transition(|session, clock| session.apply_load(&ticket, payload, clock)) {
                LoadApplied::Ready(applied) => {
                    info!(
                        turn_sequence = applied.turn_sequence,
                        actions = applied.turn.available_actions.len(),
                        "campaign loaded"
                    );
                    self.narrate(&applied).await;
                    return Ok(applied.turn);
                }
                LoadApplied::RetryAsStart(next) => {
                    warn!("resume returned no playable turn; starting the campaign over");
                    ticket = next;
                }
                LoadApplied::Failed(error) => {
                    warn!(error = %error, "campaign load failed");
                    return Err(error);
                }
                LoadApplied::Stale => return Err(SessionError::Cancelled),
            }
        }
    }

    /// Loads the campaign the selection screen cached.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoCampaignSelected` when nothing is cached and
    /// `Cache` when the cache cannot be read; no backend call is made in
    /// either case. Otherwise see [`load`](Self::load).
    pub async fn load_selected(&self, cache: &dyn CampaignCache) -> Result<TurnState, SessionError> {
        let Some(campaign) = cache.load_selected()? else {
            warn!("no campaign selected");
            return Err(SessionError::NoCampaignSelected);
        };
        self.load(campaign).await
    }

    /// Selects a card: arms it, or plays it if it was already armed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when a played card's submission failed; the
    /// previous turn stays current and the engine is back in
    /// `AwaitingAction`.
    #[instrument(skip(self))]
    pub async fn select(&self, action_id: &str) -> Result<SelectOutcome, SessionError> {
        let correlation_id = Uuid::new_v4();
        let selection =
            self.transition(|session, clock| session.select(action_id, correlation_id, clock));
        self.settle(selection).await
    }

    /// Plays the armed card.
    ///
    /// # Errors
    ///
    /// See [`select`](Self::select).
    pub async fn confirm(&self) -> Result<SelectOutcome, SessionError> {
        let correlation_id = Uuid::new_v4();
        let selection = self.transition(|session, clock| session.confirm(correlation_id, clock));
        self.settle(selection).await
    }

    /// Disarms the armed card. Returns the card that was armed.
    pub fn cancel_selection(&self) -> Option<String> {
        self.transition(|session, clock| session.cancel_selection(clock))
    }

    async fn settle(&self, selection: Selection) -> Result<SelectOutcome, SessionError> {
        match selection {
            Selection::Armed(action_id) => {
                debug!(action_id = %action_id, "card armed");
                Ok(SelectOutcome::Armed(action_id))
            }
            Selection::Ignored => Ok(SelectOutcome::Ignored),
            Selection::Submit(ticket) => self.submit(ticket).await.map(SelectOutcome::Played),
        }
    }

    async fn submit(&self, ticket: SubmitTicket) -> Result<TurnState, SessionError> {
        info!(
            campaign_id = %ticket.campaign_id,
            action_id = %ticket.action_id,
            correlation_id = %ticket.correlation_id,
            "submitting action"
        );
        let response = self
            .backend
            .submit_action(&ticket.campaign_id, &ticket.action_id)
            .await;
        let payload = match response {
            Ok(payload) => payload,
            Err(error) => {
                warn!(error = %error, action_id = %ticket.action_id, "action submission failed");
                self.reauthenticate(&error);
                let current =
                    self.transition(|session, clock| session.fail_submit(&ticket, &error, clock));
                return Err(if current {
                    SessionError::Client(error)
                } else {
                    SessionError::Cancelled
                });
            }
        };

        match self.transition(|session, clock| session.apply_submit(&ticket, payload, clock)) {
            SubmitApplied::Applied(applied) => {
                if applied.turn.is_terminal {
                    info!(result = ?applied.turn.result, "game over");
                }
                self.narrate(&applied).await;
                Ok(applied.turn)
            }
            SubmitApplied::Rejected(error) => {
                warn!(error = %error, "play response rejected");
                Err(error)
            }
            SubmitApplied::Stale => Err(SessionError::Cancelled),
        }
    }

    /// Speaks the current narration on the player's request and turns
    /// automatic narration on for every later turn.
    pub async fn play_narration(&self) -> SpeakOutcome {
        let (text, turn_sequence) = {
            let mut session = self.lock();
            if session.enable_auto_play() {
                info!("auto-play enabled");
            }
            (session.turn().narration.clone(), session.turn_sequence())
        };
        if text.trim().is_empty() {
            return SpeakOutcome::Silent;
        }
        self.narration.speak(&text, turn_sequence).await
    }

    /// Pauses narration. Accepted in any phase.
    pub fn pause_narration(&self) {
        self.narration.pause();
    }

    /// Resumes paused narration. Accepted in any phase.
    pub fn resume_narration(&self) {
        self.narration.resume();
    }

    /// Stops narration. Accepted in any phase.
    pub fn stop_narration(&self) {
        self.narration.stop();
    }

    /// Sets the narration volume, clamped to 0–100.
    pub fn set_volume(&self, volume: i32) {
        self.narration.set_volume(volume);
    }

    /// Narration playback status.
    #[must_use]
    pub fn narration_status(&self) -> NarrationStatus {
        self.narration.status()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.lock().phase()
    }

    /// Snapshot for rendering.
    #[must_use]
    pub fn view(&self) -> SessionView {
        let narration = self.narration.status();
        SessionView::capture(&self.lock(), narration)
    }

    /// Narration of every turn since the campaign was loaded, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<NarrationEntry> {
        self.lock().history().to_vec()
    }

    /// Registers a listener for every future event.
    pub fn subscribe(&self, listener: Arc<dyn SessionListener>) -> ListenerId {
        self.registry().add(listener)
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.registry().remove(id)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registry().len()
    }

    /// Tears the engine down: stops narration, invalidates in-flight
    /// requests and deregisters every listener.
    pub fn dispose(&self) {
        self.narration.stop();
        self.lock().close();
        self.registry().clear();
        info!("session engine disposed");
    }

    pub(crate) fn backend(&self) -> &dyn CampaignBackend {
        self.backend.as_ref()
    }

    pub(crate) fn exit(&self, intent: ExitIntent) -> Option<String> {
        self.narration.stop();
        self.transition(|session, clock| session.exit(intent, clock))
    }

    pub(crate) fn note_reset_failure(&self, error: &ClientError) {
        self.reauthenticate(error);
        self.transition(|session, clock| session.note_reset_failure(error, clock));
    }
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("phase", &self.phase())
            .field("narration", &self.narration)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use urbansoccer_core::campaign::CampaignStatus;
    use urbansoccer_core::turn::GameResult;
    use urbansoccer_narration::{NarrationChannel, PlaybackPhase};
    use urbansoccer_test_support::{
        AudioEvent, BackendCall, FixedClock, Gate, MemoryCampaignCache, RecordingAudioOutput,
        RecordingLocalSpeech, ScriptedBackend, ScriptedSynthesizer, StaticIdentity,
        kickoff_payload, turn_payload,
    };

    use super::*;

    #[derive(Default)]
    struct RecordingListener {
        events: Mutex<Vec<SessionEvent>>,
    }

    impl RecordingListener {
        fn types(&self) -> Vec<&'static str> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(SessionEvent::event_type)
                .collect()
        }
    }

    impl SessionListener for RecordingListener {
        fn on_event(&self, event: &SessionEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    struct Harness {
        engine: Arc<GameEngine>,
        backend: Arc<ScriptedBackend>,
        identity: Arc<StaticIdentity>,
        output: Arc<RecordingAudioOutput>,
        listener: Arc<RecordingListener>,
    }

    fn harness_with(backend: ScriptedBackend, identity: StaticIdentity, auto_play: bool) -> Harness {
        let backend = Arc::new(backend);
        let identity = Arc::new(identity);
        let output = Arc::new(RecordingAudioOutput::new());
        let player = NarrationPlayer::builder(Arc::new(RecordingLocalSpeech::new()))
            .remote(Arc::new(ScriptedSynthesizer::new()), output.clone())
            .build();
        let engine = GameEngine::new(
            backend.clone(),
            identity.clone(),
            player,
            Arc::new(FixedClock::kickoff()),
        )
        .with_auto_play(auto_play);
        let engine = Arc::new(engine);
        let listener = Arc::new(RecordingListener::default());
        engine.subscribe(listener.clone());
        Harness {
            engine,
            backend,
            identity,
            output,
            listener,
        }
    }

    fn harness(backend: ScriptedBackend) -> Harness {
        harness_with(backend, StaticIdentity::signed_in(), true)
    }

    fn fresh_campaign() -> CampaignSession {
        let mut campaign = CampaignSession::new("c1", "Derby Day");
        campaign.status = CampaignStatus::Active;
        campaign
    }

    fn campaign_in_progress() -> CampaignSession {
        let mut campaign = fresh_campaign();
        campaign.progress.elapsed_turns = 4;
        campaign
    }

    #[tokio::test]
    async fn test_fresh_campaign_is_started_and_narrated() {
        // Arrange
        let h = harness(ScriptedBackend::new().on_start(Ok(kickoff_payload())));

        // Act
        let turn = h.engine.load(fresh_campaign()).await.unwrap();

        // Assert
        assert_eq!(h.backend.calls(), vec![BackendCall::Start("c1".to_owned())]);
        assert_eq!(turn.narration, "Kickoff!");
        assert_eq!(turn.available_actions.len(), 1);
        assert!(!turn.is_terminal);
        assert_eq!(h.engine.phase(), SessionPhase::AwaitingAction);
        assert_eq!(h.output.played(), vec!["Kickoff!".to_owned()]);
        assert_eq!(
            h.listener.types(),
            vec!["session.load_requested", "session.turn_applied"]
        );
    }

    #[tokio::test]
    async fn test_campaign_in_progress_is_resumed_never_started() {
        let h = harness(ScriptedBackend::new().on_resume(Ok(turn_payload(
            "Second half",
            &["pass", "shoot"],
        ))));

        let turn = h.engine.load(campaign_in_progress()).await.unwrap();

        assert_eq!(h.backend.calls(), vec![BackendCall::Resume("c1".to_owned())]);
        assert_eq!(turn.narration, "Second half");
    }

    #[tokio::test]
    async fn test_empty_resume_starts_over_exactly_once() {
        // Arrange
        let h = harness(
            ScriptedBackend::new()
                .on_resume(Ok(turn_payload("Welcome back", &[])))
                .on_start(Ok(kickoff_payload())),
        );

        // Act
        let turn = h.engine.load(campaign_in_progress()).await.unwrap();

        // Assert
        assert_eq!(
            h.backend.calls(),
            vec![
                BackendCall::Resume("c1".to_owned()),
                BackendCall::Start("c1".to_owned()),
            ]
        );
        assert_eq!(turn.narration, "Kickoff!");
        assert!(h.engine.view().healed);
        assert_eq!(h.engine.history().len(), 1);
    }

    #[tokio::test]
    async fn test_incoherent_start_after_heal_halts_without_looping() {
        let h = harness(
            ScriptedBackend::new()
                .on_resume(Ok(turn_payload("", &[])))
                .on_start(Ok(turn_payload("Kickoff!", &[])))
                .on_start(Ok(kickoff_payload())),
        );

        let result = h.engine.load(campaign_in_progress()).await;

        assert!(matches!(result, Err(SessionError::IncoherentPayload(_))));
        assert_eq!(h.backend.start_calls(), 1);
        assert_eq!(h.engine.phase(), SessionPhase::LoadError);
        assert!(h.output.played().is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_halts_in_load_error_with_message() {
        // Arrange
        let h = harness(
            ScriptedBackend::new().on_start(Err(ClientError::NotFound("campaign c1".to_owned()))),
        );

        // Act
        let result = h.engine.load(fresh_campaign()).await;

        // Assert
        assert!(matches!(
            result,
            Err(SessionError::Client(ClientError::NotFound(_)))
        ));
        let view = h.engine.view();
        assert_eq!(view.phase, SessionPhase::LoadError);
        assert_eq!(view.last_error.as_deref(), Some("Campaign not found."));
        assert_eq!(h.backend.start_calls(), 1);
    }

    #[tokio::test]
    async fn test_unauthenticated_caller_never_reaches_backend() {
        // Arrange
        let h = harness_with(
            ScriptedBackend::new().on_start(Ok(kickoff_payload())),
            StaticIdentity::signed_out(),
            true,
        );

        // Act
        let result = h.engine.load(fresh_campaign()).await;

        // Assert
        assert!(matches!(result, Err(SessionError::NotAuthenticated)));
        assert!(h.backend.calls().is_empty());
        assert_eq!(h.engine.phase(), SessionPhase::LoadError);
        assert_eq!(h.identity.invalidations(), 1);
        assert!(
            h.listener
                .types()
                .contains(&"session.reauthentication_required")
        );
    }

    #[tokio::test]
    async fn test_load_is_rejected_once_a_campaign_is_playing() {
        let h = harness(ScriptedBackend::new().on_start(Ok(kickoff_payload())));
        h.engine.load(fresh_campaign()).await.unwrap();

        let result = h.engine.load(fresh_campaign()).await;

        assert!(matches!(
            result,
            Err(SessionError::InvalidState(SessionPhase::AwaitingAction))
        ));
        assert_eq!(h.backend.start_calls(), 1);
    }

    #[tokio::test]
    async fn test_load_selected_without_selection_makes_no_request() {
        let h = harness(ScriptedBackend::new());
        let cache = MemoryCampaignCache::default();

        let result = h.engine.load_selected(&cache).await;

        assert!(matches!(result, Err(SessionError::NoCampaignSelected)));
        assert!(h.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_load_selected_uses_cached_campaign() {
        let h = harness(ScriptedBackend::new().on_resume(Ok(kickoff_payload())));
        let cache = MemoryCampaignCache::with(campaign_in_progress());

        h.engine.load_selected(&cache).await.unwrap();

        assert_eq!(h.backend.calls(), vec![BackendCall::Resume("c1".to_owned())]);
    }

    #[tokio::test]
    async fn test_selecting_same_card_twice_plays_it_once() {
        // Arrange
        let h = harness(
            ScriptedBackend::new()
                .on_start(Ok(kickoff_payload()))
                .on_submit(Ok(turn_payload("Great pass!", &["shoot"]))),
        );
        h.engine.load(fresh_campaign()).await.unwrap();

        // Act
        let first = h.engine.select("pass").await.unwrap();
        let second = h.engine.select("pass").await.unwrap();

        // Assert
        assert_eq!(first, SelectOutcome::Armed("pass".to_owned()));
        let SelectOutcome::Played(turn) = second else {
            panic!("expected Played");
        };
        assert_eq!(turn.narration, "Great pass!");
        assert_eq!(h.backend.submitted_actions(), vec!["pass".to_owned()]);
        assert_eq!(
            h.backend.calls().last(),
            Some(&BackendCall::Submit {
                campaign_id: "c1".to_owned(),
                action_id: "pass".to_owned(),
            })
        );
    }

    #[tokio::test]
    async fn test_selecting_a_different_card_rearms_without_request() {
        let h = harness(
            ScriptedBackend::new().on_start(Ok(turn_payload("Kickoff!", &["pass", "shoot"]))),
        );
        h.engine.load(fresh_campaign()).await.unwrap();

        h.engine.select("pass").await.unwrap();
        let outcome = h.engine.select("shoot").await.unwrap();

        assert_eq!(outcome, SelectOutcome::Armed("shoot".to_owned()));
        assert!(h.backend.submitted_actions().is_empty());
        assert_eq!(h.engine.view().armed_action.as_deref(), Some("shoot"));
    }

    #[tokio::test]
    async fn test_confirm_plays_armed_card_and_cancel_disarms() {
        let h = harness(
            ScriptedBackend::new()
                .on_start(Ok(turn_payload("Kickoff!", &["pass", "shoot"])))
                .on_submit(Ok(turn_payload("Shot on goal!", &["pass"]))),
        );
        h.engine.load(fresh_campaign()).await.unwrap();

        h.engine.select("pass").await.unwrap();
        assert_eq!(h.engine.cancel_selection(), Some("pass".to_owned()));
        assert_eq!(h.engine.confirm().await.unwrap(), SelectOutcome::Ignored);
        h.engine.select("shoot").await.unwrap();
        let outcome = h.engine.confirm().await.unwrap();

        assert!(matches!(outcome, SelectOutcome::Played(_)));
        assert_eq!(h.backend.submitted_actions(), vec!["shoot".to_owned()]);
    }

    #[tokio::test]
    async fn test_select_while_submitting_is_a_no_op() {
        // Arrange
        let gate = Gate::new();
        let h = harness(
            ScriptedBackend::new()
                .on_start(Ok(turn_payload("Kickoff!", &["pass", "shoot"])))
                .on_submit(Ok(turn_payload("Great pass!", &["shoot"])))
                .gate_submissions(gate.clone()),
        );
        h.engine.load(fresh_campaign()).await.unwrap();
        h.engine.select("pass").await.unwrap();
        let in_flight = {
            let engine = Arc::clone(&h.engine);
            tokio::spawn(async move { engine.select("pass").await })
        };
        gate.wait_entered().await;

        // Act
        let during = h.engine.select("shoot").await.unwrap();
        let phase_during = h.engine.phase();
        gate.open();
        let played = in_flight.await.unwrap().unwrap();

        // Assert
        assert_eq!(during, SelectOutcome::Ignored);
        assert_eq!(phase_during, SessionPhase::Submitting);
        assert!(matches!(played, SelectOutcome::Played(_)));
        assert_eq!(h.backend.submitted_actions(), vec!["pass".to_owned()]);
    }

    #[tokio::test]
    async fn test_game_over_freezes_actions() {
        // Arrange
        let h = harness(
            ScriptedBackend::new()
                .on_start(Ok(kickoff_payload()))
                .on_submit_game_over("Final whistle!", GameResult::Win),
        );
        h.engine.load(fresh_campaign()).await.unwrap();
        h.engine.select("pass").await.unwrap();

        // Act
        h.engine.select("pass").await.unwrap();
        let later = h.engine.select("pass").await.unwrap();

        // Assert
        let view = h.engine.view();
        assert_eq!(view.phase, SessionPhase::GameOver);
        assert_eq!(view.turn.result, Some(GameResult::Win));
        assert!(view.turn.available_actions.is_empty());
        assert_eq!(view.result_label, Some("Victory!"));
        assert_eq!(later, SelectOutcome::Ignored);
        assert_eq!(h.backend.submitted_actions().len(), 1);
        assert!(h.listener.types().contains(&"session.game_over"));
        assert_eq!(h.output.played().last().map(String::as_str), Some("Final whistle!"));
    }

    #[tokio::test]
    async fn test_failed_submission_rolls_back_to_previous_turn() {
        // Arrange
        let h = harness(
            ScriptedBackend::new()
                .on_start(Ok(kickoff_payload()))
                .on_submit(Err(ClientError::Connectivity("timed out".to_owned()))),
        );
        let before = h.engine.load(fresh_campaign()).await.unwrap();
        h.engine.select("pass").await.unwrap();

        // Act
        let result = h.engine.select("pass").await;

        // Assert
        assert!(matches!(
            result,
            Err(SessionError::Client(ClientError::Connectivity(_)))
        ));
        let view = h.engine.view();
        assert_eq!(view.phase, SessionPhase::AwaitingAction);
        assert_eq!(view.turn, before);
        assert_eq!(
            view.last_error.as_deref(),
            Some("Connectivity problem. Check that the API is running.")
        );
        assert_eq!(h.identity.invalidations(), 0);
    }

    #[tokio::test]
    async fn test_unauthorized_submission_signs_the_player_out() {
        let h = harness(
            ScriptedBackend::new()
                .on_start(Ok(kickoff_payload()))
                .on_submit(Err(ClientError::Unauthorized)),
        );
        h.engine.load(fresh_campaign()).await.unwrap();
        h.engine.select("pass").await.unwrap();

        let result = h.engine.select("pass").await;

        assert!(matches!(
            result,
            Err(SessionError::Client(ClientError::Unauthorized))
        ));
        assert_eq!(h.identity.invalidations(), 1);
        assert_eq!(h.engine.phase(), SessionPhase::AwaitingAction);
        assert!(
            h.listener
                .types()
                .contains(&"session.reauthentication_required")
        );
    }

    #[tokio::test]
    async fn test_new_turn_stops_previous_narration_first() {
        let h = harness(
            ScriptedBackend::new()
                .on_start(Ok(kickoff_payload()))
                .on_submit(Ok(turn_payload("Great pass!", &["shoot"]))),
        );
        h.engine.load(fresh_campaign()).await.unwrap();

        h.engine.select("pass").await.unwrap();
        h.engine.select("pass").await.unwrap();

        assert_eq!(
            h.output.events(),
            vec![
                AudioEvent::Played {
                    label: "Kickoff!".to_owned(),
                    volume: 100,
                },
                AudioEvent::Released,
                AudioEvent::Played {
                    label: "Great pass!".to_owned(),
                    volume: 100,
                },
            ]
        );
        let texts: Vec<String> = h.engine.history().into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["Kickoff!".to_owned(), "Great pass!".to_owned()]);
    }

    #[tokio::test]
    async fn test_narration_waits_for_manual_play_before_auto_playing() {
        // Arrange
        let h = harness_with(
            ScriptedBackend::new()
                .on_start(Ok(kickoff_payload()))
                .on_submit(Ok(turn_payload("Great pass!", &["shoot"]))),
            StaticIdentity::signed_in(),
            false,
        );
        h.engine.load(fresh_campaign()).await.unwrap();
        assert!(h.output.played().is_empty());

        // Act
        let manual = h.engine.play_narration().await;
        h.engine.select("pass").await.unwrap();
        h.engine.select("pass").await.unwrap();

        // Assert
        assert_eq!(manual, SpeakOutcome::Remote);
        assert!(h.engine.view().auto_play);
        assert_eq!(
            h.output.played(),
            vec!["Kickoff!".to_owned(), "Great pass!".to_owned()]
        );
    }

    #[tokio::test]
    async fn test_narration_controls_work_in_any_phase() {
        let h = harness(ScriptedBackend::new().on_start(Ok(kickoff_payload())));
        h.engine.set_volume(120);
        h.engine.pause_narration();
        h.engine.load(fresh_campaign()).await.unwrap();

        h.engine.pause_narration();
        let paused = h.engine.narration_status();
        h.engine.resume_narration();
        h.engine.set_volume(35);
        h.engine.stop_narration();
        h.engine.stop_narration();

        assert_eq!(paused.phase, PlaybackPhase::Paused);
        assert_eq!(paused.channel, NarrationChannel::Remote);
        assert_eq!(
            h.output.events()[1..],
            [
                AudioEvent::Paused,
                AudioEvent::Resumed,
                AudioEvent::Volume(35),
                AudioEvent::Released,
            ]
        );
        assert_eq!(h.engine.narration_status().volume, 35);
    }

    #[tokio::test]
    async fn test_unsubscribed_listener_receives_nothing() {
        let h = harness(ScriptedBackend::new().on_start(Ok(kickoff_payload())));
        let late = Arc::new(RecordingListener::default());
        let id = h.engine.subscribe(late.clone());

        assert!(h.engine.unsubscribe(id));
        h.engine.load(fresh_campaign()).await.unwrap();

        assert!(late.types().is_empty());
        assert!(!h.listener.types().is_empty());
    }

    #[tokio::test]
    async fn test_dispose_cancels_in_flight_submission_and_drops_listeners() {
        // Arrange
        let gate = Gate::new();
        let h = harness(
            ScriptedBackend::new()
                .on_start(Ok(kickoff_payload()))
                .on_submit(Ok(turn_payload("Too late", &["shoot"])))
                .gate_submissions(gate.clone()),
        );
        h.engine.load(fresh_campaign()).await.unwrap();
        h.engine.select("pass").await.unwrap();
        let in_flight = {
            let engine = Arc::clone(&h.engine);
            tokio::spawn(async move { engine.select("pass").await })
        };
        gate.wait_entered().await;

        // Act
        h.engine.dispose();
        gate.open();
        let result = in_flight.await.unwrap();

        // Assert
        assert!(matches!(result, Err(SessionError::Cancelled)));
        assert_eq!(h.engine.phase(), SessionPhase::Idle);
        assert_eq!(h.engine.listener_count(), 0);
        assert_eq!(h.output.played(), vec!["Kickoff!".to_owned()]);
        assert_eq!(h.engine.narration_status().phase, PlaybackPhase::Idle);
    }

    #[tokio::test]
    async fn test_events_carry_campaign_and_fixed_time() {
        let h = harness(ScriptedBackend::new().on_start(Ok(kickoff_payload())));

        h.engine.load(fresh_campaign()).await.unwrap();

        let events = h.listener.events.lock().unwrap().clone();
        let clock = FixedClock::kickoff();
        assert!(events.iter().all(|e| e.metadata.occurred_at == clock.0));
        assert!(
            events
                .iter()
                .all(|e| e.metadata.campaign_id.as_deref() == Some("c1"))
        );
        assert_eq!(
            events[0].metadata.correlation_id,
            events[1].metadata.correlation_id
        );
    }
}
