//! Narration player: remote speech with a local fallback.
//!
//! One player is owned per game screen. Every channel call happens outside
//! the state lock so a channel may report completion re-entrantly. A halt
//! that lands while a channel is starting is settled once the channel
//! returns.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, info, warn};
use urbansoccer_core::backend::SpeechSynthesizer;

use crate::domain::channels::{
    AudioOutput, CompletionHandle, CompletionSink, LocalSpeech, Utterance,
};
use crate::domain::playback::{
    Halt, LocalVoice, MAX_VOLUME, NarrationChannel, NarrationStatus, PlaybackState, clamp_volume,
};

/// How a `speak` request ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// Backend-synthesized audio is playing.
    Remote,
    /// On-device speech is playing.
    Local,
    /// Neither channel could speak; the narration stays silent.
    Silent,
    /// A newer request or a `stop` overtook this one; nothing was started.
    Superseded,
}

struct RemoteChannel {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    output: Arc<dyn AudioOutput>,
}

struct PlayerInner {
    state: Mutex<PlaybackState>,
    remote: Option<RemoteChannel>,
    local: Arc<dyn LocalSpeech>,
    voice: LocalVoice,
}

impl PlayerInner {
    fn lock(&self) -> MutexGuard<'_, PlaybackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn teardown(&self, halt: Halt) {
        if halt.release_remote {
            self.release_remote();
        }
        if halt.cancel_local {
            self.local.cancel();
        }
    }

    fn release_remote(&self) {
        if let Some(remote) = &self.remote {
            remote.output.release();
        }
    }
}

impl CompletionSink for PlayerInner {
    fn playback_finished(&self, generation: u64) {
        let release = self.lock().complete(generation);
        debug!(generation, "narration finished");
        if release {
            self.release_remote();
        }
    }
}

/// Plays narration through exactly one audible channel at a time.
#[derive(Clone)]
pub struct NarrationPlayer {
    inner: Arc<PlayerInner>,
}

/// Builds a [`NarrationPlayer`].
pub struct NarrationPlayerBuilder {
    remote: Option<RemoteChannel>,
    local: Arc<dyn LocalSpeech>,
    voice: LocalVoice,
    volume: u8,
}

impl NarrationPlayerBuilder {
    /// Tries backend synthesis played through `output` before falling back
    /// to on-device speech.
    #[must_use]
    pub fn remote(
        mut self,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        output: Arc<dyn AudioOutput>,
    ) -> Self {
        self.remote = Some(RemoteChannel {
            synthesizer,
            output,
        });
        self
    }

    /// Voice used for on-device speech.
    #[must_use]
    pub fn voice(mut self, voice: LocalVoice) -> Self {
        self.voice = voice;
        self
    }

    /// Initial sticky volume, clamped to 0–100.
    #[must_use]
    pub fn volume(mut self, volume: i32) -> Self {
        self.volume = clamp_volume(volume);
        self
    }

    /// Builds the player.
    #[must_use]
    pub fn build(self) -> NarrationPlayer {
        NarrationPlayer {
            inner: Arc::new(PlayerInner {
                state: Mutex::new(PlaybackState::new(self.volume)),
                remote: self.remote,
                local: self.local,
                voice: self.voice,
            }),
        }
    }
}

impl NarrationPlayer {
    /// Starts building a player around on-device speech.
    #[must_use]
    pub fn builder(local: Arc<dyn LocalSpeech>) -> NarrationPlayerBuilder {
        NarrationPlayerBuilder {
            remote: None,
            local,
            voice: LocalVoice::default(),
            volume: MAX_VOLUME,
        }
    }

    fn completion(&self, generation: u64) -> CompletionHandle {
        let inner: Arc<dyn CompletionSink> = self.inner.clone();
        let sink: Weak<dyn CompletionSink> = Arc::downgrade(&inner);
        CompletionHandle::new(generation, sink)
    }

    /// Current playback status.
    #[must_use]
    pub fn status(&self) -> NarrationStatus {
        self.inner.lock().status()
    }

    /// Speaks `text`, narration of turn `turn_sequence`.
    ///
    /// Whatever is audible is stopped first. Requests tagged with an older
    /// turn than one already narrated are dropped, as are requests overtaken
    /// by a newer `speak` or a `stop` while synthesis was in flight.
    pub async fn speak(&self, text: &str, turn_sequence: u64) -> SpeakOutcome {
        let Some((generation, halt)) = self.inner.lock().begin(turn_sequence) else {
            debug!(turn_sequence, "dropping narration for a superseded turn");
            return SpeakOutcome::Superseded;
        };
        self.inner.teardown(halt);

        if let Some(remote) = &self.inner.remote {
            match remote.synthesizer.synthesize_speech(text).await {
                Ok(clip) if clip.is_playable() => {
                    let volume = {
                        let mut state = self.inner.lock();
                        if !state.mark_speaking(generation, NarrationChannel::Remote) {
                            debug!(turn_sequence, "synthesized narration arrived too late");
                            return SpeakOutcome::Superseded;
                        }
                        state.volume()
                    };
                    match remote
                        .output
                        .play(clip, volume, self.completion(generation))
                    {
                        Ok(()) => {
                            if !self.inner.lock().is_current(generation) {
                                debug!(turn_sequence, "narration stopped while starting");
                                remote.output.release();
                                return SpeakOutcome::Superseded;
                            }
                            info!(turn_sequence, channel = "remote", "narration started");
                            return SpeakOutcome::Remote;
                        }
                        Err(e) => {
                            warn!(error = %e, "remote narration playback failed");
                            if self.inner.lock().revert(generation) {
                                self.inner.release_remote();
                            }
                        }
                    }
                }
                Ok(clip) => {
                    warn!(
                        bytes = clip.data.len(),
                        content_type = clip.content_type.as_deref().unwrap_or("unknown"),
                        "synthesized narration is not playable audio"
                    );
                }
                Err(e) => {
                    warn!(error = %e, "speech synthesis failed");
                }
            }
        }

        self.speak_locally(text, generation, turn_sequence)
    }

    fn speak_locally(&self, text: &str, generation: u64, turn_sequence: u64) -> SpeakOutcome {
        if !self.inner.local.is_available() {
            debug!("no on-device speech; narration stays silent");
            return if self.inner.lock().is_current(generation) {
                SpeakOutcome::Silent
            } else {
                SpeakOutcome::Superseded
            };
        }

        let utterance = {
            let mut state = self.inner.lock();
            if !state.mark_speaking(generation, NarrationChannel::Local) {
                return SpeakOutcome::Superseded;
            }
            Utterance {
                text: text.to_owned(),
                volume: state.volume(),
                voice: self.inner.voice.clone(),
            }
        };

        match self
            .inner
            .local
            .speak(utterance, self.completion(generation))
        {
            Ok(()) => {
                if !self.inner.lock().is_current(generation) {
                    debug!(turn_sequence, "narration stopped while starting");
                    self.inner.local.cancel();
                    return SpeakOutcome::Superseded;
                }
                info!(turn_sequence, channel = "local", "narration started");
                SpeakOutcome::Local
            }
            Err(e) => {
                warn!(error = %e, "on-device narration failed");
                self.inner.lock().revert(generation);
                SpeakOutcome::Silent
            }
        }
    }

    /// Pauses the audible channel. No-op unless speaking.
    pub fn pause(&self) {
        let channel = self.inner.lock().pause();
        match channel {
            Some(NarrationChannel::Remote) => {
                if let Some(remote) = &self.inner.remote {
                    remote.output.pause();
                }
            }
            Some(NarrationChannel::Local) => self.inner.local.pause(),
            Some(NarrationChannel::None) | None => {}
        }
    }

    /// Resumes the paused channel. No-op unless paused.
    pub fn resume(&self) {
        let channel = self.inner.lock().resume();
        match channel {
            Some(NarrationChannel::Remote) => {
                if let Some(remote) = &self.inner.remote {
                    remote.output.resume();
                }
            }
            Some(NarrationChannel::Local) => self.inner.local.resume(),
            Some(NarrationChannel::None) | None => {}
        }
    }

    /// Halts and releases both channels and abandons any in-flight request.
    /// Idempotent.
    pub fn stop(&self) {
        let halt = self.inner.lock().halt();
        self.inner.teardown(halt);
    }

    /// Sets the sticky volume, clamped to 0–100.
    ///
    /// A playing remote clip changes volume immediately; on-device speech
    /// picks the new volume up on the next narration.
    pub fn set_volume(&self, volume: i32) {
        let live = self.inner.lock().set_volume(volume);
        if let (Some(volume), Some(remote)) = (live, &self.inner.remote) {
            remote.output.set_volume(volume);
        }
    }
}

impl std::fmt::Debug for NarrationPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrationPlayer")
            .field("status", &self.status())
            .field("remote", &self.inner.remote.is_some())
            .finish_non_exhaustive()
    }
}
