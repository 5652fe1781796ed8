//! Recording speech channels.
//!
//! Both doubles keep the completion handle of the narration they are
//! currently playing so a test can finish it naturally.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use urbansoccer_core::backend::AudioClip;
use urbansoccer_narration::{AudioOutput, CompletionHandle, LocalSpeech, PlaybackError, Utterance};

/// A call received by [`RecordingAudioOutput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    /// A clip started; `label` is the clip bytes read as UTF-8.
    Played {
        /// What was played.
        label: String,
        /// Volume it started at.
        volume: u8,
    },
    /// `pause`.
    Paused,
    /// `resume`.
    Resumed,
    /// `set_volume`.
    Volume(u8),
    /// `release`.
    Released,
}

/// Audio output that records every call.
#[derive(Debug, Default)]
pub struct RecordingAudioOutput {
    events: Mutex<Vec<AudioEvent>>,
    current: Mutex<Option<CompletionHandle>>,
    failing: AtomicBool,
}

impl RecordingAudioOutput {
    /// An output that plays everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An output whose `play` always fails.
    #[must_use]
    pub fn failing() -> Self {
        let output = Self::default();
        output.failing.store(true, Ordering::SeqCst);
        output
    }

    /// Snapshot of all calls received so far.
    pub fn events(&self) -> Vec<AudioEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Labels of every clip played, in order.
    pub fn played(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                AudioEvent::Played { label, .. } => Some(label),
                _ => None,
            })
            .collect()
    }

    /// Number of `release` calls.
    pub fn releases(&self) -> usize {
        self.count(&AudioEvent::Released)
    }

    /// Takes the completion handle of the last played clip.
    pub fn take_completion(&self) -> Option<CompletionHandle> {
        self.current.lock().unwrap().take()
    }

    /// Lets the last played clip end on its own.
    pub fn finish_current(&self) {
        if let Some(handle) = self.take_completion() {
            handle.finished();
        }
    }

    fn count(&self, event: &AudioEvent) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }

    fn record(&self, event: AudioEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl AudioOutput for RecordingAudioOutput {
    fn play(
        &self,
        clip: AudioClip,
        volume: u8,
        completion: CompletionHandle,
    ) -> Result<(), PlaybackError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PlaybackError::Device("output rejected the clip".to_owned()));
        }
        self.record(AudioEvent::Played {
            label: String::from_utf8_lossy(&clip.data).into_owned(),
            volume,
        });
        *self.current.lock().unwrap() = Some(completion);
        Ok(())
    }

    fn pause(&self) {
        self.record(AudioEvent::Paused);
    }

    fn resume(&self) {
        self.record(AudioEvent::Resumed);
    }

    fn set_volume(&self, volume: u8) {
        self.record(AudioEvent::Volume(volume));
    }

    fn release(&self) {
        self.record(AudioEvent::Released);
    }
}

/// A call received by [`RecordingLocalSpeech`].
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    /// `speak`.
    Spoken(Utterance),
    /// `pause`.
    Paused,
    /// `resume`.
    Resumed,
    /// `cancel`.
    Cancelled,
}

/// On-device speech that records every call.
#[derive(Debug)]
pub struct RecordingLocalSpeech {
    available: bool,
    failing: bool,
    events: Mutex<Vec<SpeechEvent>>,
    current: Mutex<Option<CompletionHandle>>,
}

impl RecordingLocalSpeech {
    /// Working on-device speech.
    #[must_use]
    pub fn new() -> Self {
        Self {
            available: true,
            failing: false,
            events: Mutex::new(Vec::new()),
            current: Mutex::new(None),
        }
    }

    /// A device without speech synthesis.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Speech that exists but refuses to start.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    /// Snapshot of all calls received so far.
    pub fn events(&self) -> Vec<SpeechEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Every utterance spoken, in order.
    pub fn spoken(&self) -> Vec<Utterance> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SpeechEvent::Spoken(utterance) => Some(utterance),
                _ => None,
            })
            .collect()
    }

    /// Number of `cancel` calls.
    pub fn cancellations(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SpeechEvent::Cancelled))
            .count()
    }

    /// Takes the completion handle of the last utterance.
    pub fn take_completion(&self) -> Option<CompletionHandle> {
        self.current.lock().unwrap().take()
    }

    /// Lets the last utterance end on its own.
    pub fn finish_current(&self) {
        if let Some(handle) = self.take_completion() {
            handle.finished();
        }
    }

    fn record(&self, event: SpeechEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Default for RecordingLocalSpeech {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSpeech for RecordingLocalSpeech {
    fn is_available(&self) -> bool {
        self.available
    }

    fn speak(
        &self,
        utterance: Utterance,
        completion: CompletionHandle,
    ) -> Result<(), PlaybackError> {
        if self.failing {
            return Err(PlaybackError::Device("speech engine refused".to_owned()));
        }
        self.record(SpeechEvent::Spoken(utterance));
        *self.current.lock().unwrap() = Some(completion);
        Ok(())
    }

    fn pause(&self) {
        self.record(SpeechEvent::Paused);
    }

    fn resume(&self) {
        self.record(SpeechEvent::Resumed);
    }

    fn cancel(&self) {
        self.record(SpeechEvent::Cancelled);
    }
}
