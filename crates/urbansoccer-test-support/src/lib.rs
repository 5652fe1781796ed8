//! Shared test doubles for the Urban Soccer turn engine.

mod audio;
mod backend;
mod cache;
mod clock;
mod gate;
mod identity;

pub use audio::{AudioEvent, RecordingAudioOutput, RecordingLocalSpeech, SpeechEvent};
pub use backend::{BackendCall, ScriptedBackend, ScriptedSynthesizer, kickoff_payload, turn_payload};
pub use cache::MemoryCampaignCache;
pub use clock::FixedClock;
pub use gate::Gate;
pub use identity::StaticIdentity;
