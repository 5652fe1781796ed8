//! Urban Soccer — Narration Playback.
//!
//! Makes the current narration audible through the remote speech channel
//! (backend synthesis played as audio) with a live fallback to on-device
//! speech, and guarantees that at most one narration is audible at a time.

pub mod application;
pub mod domain;

pub use application::player::{NarrationPlayer, NarrationPlayerBuilder, SpeakOutcome};
pub use domain::channels::{AudioOutput, CompletionHandle, LocalSpeech, PlaybackError, Utterance};
pub use domain::playback::{LocalVoice, NarrationChannel, NarrationStatus, PlaybackPhase};
