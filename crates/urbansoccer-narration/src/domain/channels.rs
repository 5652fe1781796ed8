//! Ports for the two speech channels.

use std::fmt;
use std::sync::Weak;

use thiserror::Error;
use urbansoccer_core::backend::AudioClip;

use super::playback::LocalVoice;

/// A channel refused or failed to produce audio.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The channel cannot handle this audio format.
    #[error("unsupported audio: {0}")]
    Unsupported(String),

    /// The output device failed.
    #[error("audio device error: {0}")]
    Device(String),

    /// The channel is not available on this device.
    #[error("speech channel unavailable")]
    Unavailable,
}

/// Receives natural-completion notifications.
pub(crate) trait CompletionSink: Send + Sync {
    fn playback_finished(&self, generation: u64);
}

/// Handed to a channel when it starts speaking; the channel calls
/// [`finished`](Self::finished) once the narration ends on its own.
///
/// Completions that arrive after the narration was superseded or stopped
/// are ignored, so a channel may call this from any thread at any time.
pub struct CompletionHandle {
    generation: u64,
    sink: Weak<dyn CompletionSink>,
}

impl CompletionHandle {
    pub(crate) fn new(generation: u64, sink: Weak<dyn CompletionSink>) -> Self {
        Self { generation, sink }
    }

    /// Request generation this handle belongs to.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reports natural completion.
    pub fn finished(self) {
        if let Some(sink) = self.sink.upgrade() {
            sink.playback_finished(self.generation);
        }
    }
}

impl fmt::Debug for CompletionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionHandle")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Plays synthesized audio clips.
pub trait AudioOutput: Send + Sync {
    /// Starts playing `clip` at `volume` (0–100).
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError` if the clip cannot be played.
    fn play(
        &self,
        clip: AudioClip,
        volume: u8,
        completion: CompletionHandle,
    ) -> Result<(), PlaybackError>;

    /// Pauses the current clip.
    fn pause(&self);

    /// Resumes the paused clip.
    fn resume(&self);

    /// Changes the volume of the current clip.
    fn set_volume(&self, volume: u8);

    /// Halts playback and releases the held clip.
    fn release(&self);
}

/// A single on-device speech request.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Text to speak.
    pub text: String,
    /// Volume, 0–100.
    pub volume: u8,
    /// Voice parameters.
    pub voice: LocalVoice,
}

impl Utterance {
    /// Volume as a 0.0–1.0 gain.
    #[must_use]
    pub fn gain(&self) -> f32 {
        f32::from(self.volume) / 100.0
    }
}

/// On-device speech synthesis.
pub trait LocalSpeech: Send + Sync {
    /// Whether on-device speech exists at all.
    fn is_available(&self) -> bool;

    /// Starts speaking `utterance`.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError` if speech could not start.
    fn speak(&self, utterance: Utterance, completion: CompletionHandle)
    -> Result<(), PlaybackError>;

    /// Pauses speech.
    fn pause(&self);

    /// Resumes paused speech.
    fn resume(&self);

    /// Cancels current and queued speech.
    fn cancel(&self);
}
