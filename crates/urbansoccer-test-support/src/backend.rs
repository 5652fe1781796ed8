//! Scripted campaign backend and speech synthesizer.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use urbansoccer_core::backend::{AudioClip, CampaignBackend, SpeechSynthesizer};
use urbansoccer_core::error::ClientError;
use urbansoccer_core::turn::{ActionCard, GameResult, TurnPayload};

use crate::gate::Gate;

/// A call received by [`ScriptedBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// `start_session(campaign_id)`.
    Start(String),
    /// `resume_session(campaign_id)`.
    Resume(String),
    /// `submit_action(campaign_id, action_id)`.
    Submit {
        /// Campaign the action was played in.
        campaign_id: String,
        /// The played card.
        action_id: String,
    },
    /// `reset_session(campaign_id)`.
    Reset(String),
}

/// Builds a non-terminal turn payload with one card per id.
#[must_use]
pub fn turn_payload(narration: &str, action_ids: &[&str]) -> TurnPayload {
    TurnPayload {
        narration: narration.to_owned(),
        available_cards: action_ids
            .iter()
            .map(|id| ActionCard::new(*id, id.to_uppercase()))
            .collect(),
        ..TurnPayload::default()
    }
}

/// The canonical opening turn: "Kickoff!" with a single `pass` card.
#[must_use]
pub fn kickoff_payload() -> TurnPayload {
    turn_payload("Kickoff!", &["pass"])
}

impl BackendCall {
    fn is_start(&self) -> bool {
        matches!(self, Self::Start(_))
    }
}

fn unscripted() -> ClientError {
    ClientError::Unknown {
        status: None,
        detail: Some("no scripted response".to_owned()),
    }
}

/// A campaign backend that replays queued responses and records every call.
///
/// Unscripted start/resume/submit calls fail with `ClientError::Unknown`;
/// unscripted resets succeed.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    calls: Mutex<Vec<BackendCall>>,
    start: Mutex<VecDeque<Result<TurnPayload, ClientError>>>,
    resume: Mutex<VecDeque<Result<TurnPayload, ClientError>>>,
    submit: Mutex<VecDeque<Result<TurnPayload, ClientError>>>,
    reset: Mutex<VecDeque<Result<(), ClientError>>>,
    submit_gate: Option<Arc<Gate>>,
}

impl ScriptedBackend {
    /// Creates a backend with nothing scripted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a `start_session` response.
    #[must_use]
    pub fn on_start(self, response: Result<TurnPayload, ClientError>) -> Self {
        self.start.lock().unwrap().push_back(response);
        self
    }

    /// Queues a `resume_session` response.
    #[must_use]
    pub fn on_resume(self, response: Result<TurnPayload, ClientError>) -> Self {
        self.resume.lock().unwrap().push_back(response);
        self
    }

    /// Queues a `submit_action` response.
    #[must_use]
    pub fn on_submit(self, response: Result<TurnPayload, ClientError>) -> Self {
        self.submit.lock().unwrap().push_back(response);
        self
    }

    /// Queues a terminal `submit_action` response.
    #[must_use]
    pub fn on_submit_game_over(self, narration: &str, result: GameResult) -> Self {
        let payload = TurnPayload {
            narration: narration.to_owned(),
            available_cards: vec![ActionCard::new("pass", "Pass")],
            is_game_over: true,
            result: Some(result),
            ..TurnPayload::default()
        };
        self.on_submit(Ok(payload))
    }

    /// Queues a `reset_session` response.
    #[must_use]
    pub fn on_reset(self, response: Result<(), ClientError>) -> Self {
        self.reset.lock().unwrap().push_back(response);
        self
    }

    /// Holds every `submit_action` call at `gate` until the test opens it.
    #[must_use]
    pub fn gate_submissions(mut self, gate: Arc<Gate>) -> Self {
        self.submit_gate = Some(gate);
        self
    }

    /// Snapshot of all calls received so far.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of `start_session` calls received.
    pub fn start_calls(&self) -> usize {
        self.calls().iter().filter(|c| c.is_start()).count()
    }

    /// Played action ids, in order.
    pub fn submitted_actions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BackendCall::Submit { action_id, .. } => Some(action_id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CampaignBackend for ScriptedBackend {
    async fn start_session(&self, campaign_id: &str) -> Result<TurnPayload, ClientError> {
        self.record(BackendCall::Start(campaign_id.to_owned()));
        let next = self.start.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(unscripted()))
    }

    async fn resume_session(&self, campaign_id: &str) -> Result<TurnPayload, ClientError> {
        self.record(BackendCall::Resume(campaign_id.to_owned()));
        let next = self.resume.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(unscripted()))
    }

    async fn submit_action(
        &self,
        campaign_id: &str,
        action_id: &str,
    ) -> Result<TurnPayload, ClientError> {
        self.record(BackendCall::Submit {
            campaign_id: campaign_id.to_owned(),
            action_id: action_id.to_owned(),
        });
        if let Some(gate) = &self.submit_gate {
            gate.pass().await;
        }
        let next = self.submit.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(unscripted()))
    }

    async fn reset_session(&self, campaign_id: &str) -> Result<(), ClientError> {
        self.record(BackendCall::Reset(campaign_id.to_owned()));
        let next = self.reset.lock().unwrap().pop_front();
        next.unwrap_or(Ok(()))
    }
}

/// A speech synthesizer that renders each text as audio whose bytes are the
/// UTF-8 text itself, so playback doubles can report what was heard.
#[derive(Debug, Default)]
pub struct ScriptedSynthesizer {
    requests: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, ClientError>>,
    gates: Mutex<HashMap<String, Arc<Gate>>>,
    fail_all: Option<ClientError>,
    content_type: Option<String>,
}

impl ScriptedSynthesizer {
    /// A synthesizer that succeeds for every text with `audio/mpeg` clips.
    #[must_use]
    pub fn new() -> Self {
        Self {
            content_type: Some("audio/mpeg".to_owned()),
            ..Self::default()
        }
    }

    /// A synthesizer that rejects every request with `error`.
    #[must_use]
    pub fn failing(error: ClientError) -> Self {
        Self {
            fail_all: Some(error),
            ..Self::new()
        }
    }

    /// A synthesizer that answers with a non-audio MIME type.
    #[must_use]
    pub fn returning_content_type(content_type: &str) -> Self {
        Self {
            content_type: Some(content_type.to_owned()),
            ..Self::default()
        }
    }

    /// Holds synthesis of `text` at `gate` until the test opens it.
    #[must_use]
    pub fn gate_text(self, text: &str, gate: Arc<Gate>) -> Self {
        self.gates.lock().unwrap().insert(text.to_owned(), gate);
        self
    }

    /// Makes synthesis of `text` fail with `error`.
    #[must_use]
    pub fn fail_text(self, text: &str, error: ClientError) -> Self {
        self.failures.lock().unwrap().insert(text.to_owned(), error);
        self
    }

    /// Texts requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for ScriptedSynthesizer {
    async fn synthesize_speech(&self, text: &str) -> Result<AudioClip, ClientError> {
        self.requests.lock().unwrap().push(text.to_owned());
        let gate = self.gates.lock().unwrap().get(text).cloned();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if let Some(error) = &self.fail_all {
            return Err(error.clone());
        }
        if let Some(error) = self.failures.lock().unwrap().get(text) {
            return Err(error.clone());
        }
        Ok(AudioClip::new(
            text.as_bytes().to_vec(),
            self.content_type.clone(),
        ))
    }
}
