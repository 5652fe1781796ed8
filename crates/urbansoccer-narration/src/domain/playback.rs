//! Narration playback state machine.
//!
//! Pure bookkeeping: which channel is audible, in which phase, at what
//! volume, and which speak request is current. Channel calls are made by
//! the player from the [`Halt`] and flag values these transitions return.

use serde::Serialize;

/// Highest accepted volume.
pub const MAX_VOLUME: u8 = 100;

/// The speech channel currently producing audio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrationChannel {
    /// Nothing is audible.
    #[default]
    None,
    /// Backend-synthesized audio.
    Remote,
    /// On-device speech synthesis.
    Local,
}

/// Playback phase of the active channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// Nothing is playing.
    #[default]
    Idle,
    /// Audio is playing.
    Speaking,
    /// Audio is paused and can be resumed.
    Paused,
}

/// Voice parameters passed to on-device speech.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalVoice {
    /// BCP 47 language tag.
    pub lang: String,
    /// Speaking rate, 1.0 being normal speed.
    pub rate: f32,
    /// Voice pitch, 1.0 being the default pitch.
    pub pitch: f32,
}

impl Default for LocalVoice {
    fn default() -> Self {
        Self {
            lang: "pt-BR".to_owned(),
            rate: 0.9,
            pitch: 1.0,
        }
    }
}

/// Read-only view of the playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NarrationStatus {
    /// Audible channel.
    pub channel: NarrationChannel,
    /// Phase of the audible channel.
    pub phase: PlaybackPhase,
    /// Sticky volume, 0–100.
    pub volume: u8,
}

/// Channel teardown the player must perform after a halting transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Halt {
    /// A remote clip is held and must be released.
    pub release_remote: bool,
    /// On-device speech must be cancelled.
    pub cancel_local: bool,
}

/// Clamps an arbitrary volume request into `0..=100`.
#[must_use]
pub fn clamp_volume(requested: i32) -> u8 {
    u8::try_from(requested.clamp(0, i32::from(MAX_VOLUME))).unwrap_or(MAX_VOLUME)
}

/// Narration playback state.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    channel: NarrationChannel,
    phase: PlaybackPhase,
    volume: u8,
    /// Identifies the current speak request; bumped by every halt.
    generation: u64,
    /// Highest turn sequence number seen by `begin`.
    latest_turn: u64,
    remote_held: bool,
}

impl PlaybackState {
    /// Creates an idle state with the given sticky volume.
    #[must_use]
    pub fn new(volume: u8) -> Self {
        Self {
            channel: NarrationChannel::None,
            phase: PlaybackPhase::Idle,
            volume: volume.min(MAX_VOLUME),
            generation: 0,
            latest_turn: 0,
            remote_held: false,
        }
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> NarrationStatus {
        NarrationStatus {
            channel: self.channel,
            phase: self.phase,
            volume: self.volume,
        }
    }

    /// Current request generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Sticky volume.
    #[must_use]
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Whether `generation` still identifies the current request.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Unconditionally stops both channels and invalidates any in-flight
    /// request.
    pub fn halt(&mut self) -> Halt {
        let halt = Halt {
            release_remote: self.remote_held,
            cancel_local: self.channel == NarrationChannel::Local,
        };
        self.generation += 1;
        self.channel = NarrationChannel::None;
        self.phase = PlaybackPhase::Idle;
        self.remote_held = false;
        halt
    }

    /// Opens a new speak request for narration belonging to `turn_sequence`.
    ///
    /// Returns `None` when a newer turn has already been narrated; otherwise
    /// halts whatever is audible and returns the new generation together
    /// with the teardown to perform. Local speech is always cancelled so a
    /// queued utterance can never follow the new narration.
    pub fn begin(&mut self, turn_sequence: u64) -> Option<(u64, Halt)> {
        if turn_sequence < self.latest_turn {
            return None;
        }
        self.latest_turn = turn_sequence;
        let mut halt = self.halt();
        halt.cancel_local = true;
        Some((self.generation, halt))
    }

    /// Records that `channel` started speaking for `generation`.
    ///
    /// Returns `false` if the request was superseded in the meantime.
    pub fn mark_speaking(&mut self, generation: u64, channel: NarrationChannel) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.channel = channel;
        self.phase = PlaybackPhase::Speaking;
        self.remote_held = channel == NarrationChannel::Remote;
        true
    }

    /// Undoes [`mark_speaking`](Self::mark_speaking) after the channel
    /// refused to start. Returns `true` if a remote clip must be released.
    pub fn revert(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        let release = self.remote_held;
        self.channel = NarrationChannel::None;
        self.phase = PlaybackPhase::Idle;
        self.remote_held = false;
        release
    }

    /// Handles natural completion of the request identified by `generation`.
    ///
    /// Returns `true` if a remote clip must be released. Completions of
    /// superseded requests are ignored.
    pub fn complete(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) || self.phase == PlaybackPhase::Idle {
            return false;
        }
        self.revert(generation)
    }

    /// Pauses the active channel. Returns the channel to pause, if any.
    pub fn pause(&mut self) -> Option<NarrationChannel> {
        if self.phase != PlaybackPhase::Speaking {
            return None;
        }
        self.phase = PlaybackPhase::Paused;
        Some(self.channel)
    }

    /// Resumes the paused channel. Returns the channel to resume, if any.
    pub fn resume(&mut self) -> Option<NarrationChannel> {
        if self.phase != PlaybackPhase::Paused {
            return None;
        }
        self.phase = PlaybackPhase::Speaking;
        Some(self.channel)
    }

    /// Stores a new sticky volume.
    ///
    /// Returns the clamped volume when it must be applied to a live remote
    /// stream; local speech picks it up on the next utterance only.
    pub fn set_volume(&mut self, requested: i32) -> Option<u8> {
        self.volume = clamp_volume(requested);
        (self.channel == NarrationChannel::Remote && self.phase != PlaybackPhase::Idle)
            .then_some(self.volume)
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(MAX_VOLUME)
    }
}
