//! Terminal stand-ins for the two speech channels.
//!
//! A terminal cannot play audio, so both channels report what they would
//! do on the transcript. Console speech finishes as soon as its line is
//! written; a "played" clip stays current until it is released.

use std::io::{self, Stdout, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use urbansoccer_core::backend::AudioClip;
use urbansoccer_narration::{AudioOutput, CompletionHandle, LocalSpeech, PlaybackError, Utterance};

fn guard<W>(writer: &Mutex<W>) -> MutexGuard<'_, W> {
    writer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// On-device speech that prints each utterance.
#[derive(Debug)]
pub struct ConsoleSpeech<W = Stdout> {
    out: Mutex<W>,
}

impl ConsoleSpeech<Stdout> {
    /// Console speech writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleSpeech<W> {
    /// Console speech writing to `out`.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Consumes the channel and returns its writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> LocalSpeech for ConsoleSpeech<W> {
    fn is_available(&self) -> bool {
        true
    }

    fn speak(
        &self,
        utterance: Utterance,
        completion: CompletionHandle,
    ) -> Result<(), PlaybackError> {
        {
            let mut out = guard(&self.out);
            writeln!(
                out,
                "  [narrator {} vol {}] {}",
                utterance.voice.lang, utterance.volume, utterance.text
            )
            .map_err(|e| PlaybackError::Device(e.to_string()))?;
        }
        completion.finished();
        Ok(())
    }

    fn pause(&self) {}

    fn resume(&self) {}

    fn cancel(&self) {}
}

/// Audio output that describes clips instead of playing them.
#[derive(Debug)]
pub struct ConsoleAudioOutput<W = Stdout> {
    out: Mutex<W>,
    current: Mutex<Option<CompletionHandle>>,
}

impl ConsoleAudioOutput<Stdout> {
    /// Audio output writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleAudioOutput<W> {
    /// Audio output writing to `out`.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            current: Mutex::new(None),
        }
    }

    /// Consumes the channel and returns its writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn note(&self, line: &str) {
        // Transcript lines are best effort.
        let _ = writeln!(guard(&self.out), "  [audio] {line}");
    }
}

impl<W: Write + Send> AudioOutput for ConsoleAudioOutput<W> {
    fn play(
        &self,
        clip: AudioClip,
        volume: u8,
        completion: CompletionHandle,
    ) -> Result<(), PlaybackError> {
        writeln!(
            guard(&self.out),
            "  [audio] playing {} bytes of {} at volume {volume}",
            clip.data.len(),
            clip.content_type.as_deref().unwrap_or("audio")
        )
        .map_err(|e| PlaybackError::Device(e.to_string()))?;
        *guard(&self.current) = Some(completion);
        Ok(())
    }

    fn pause(&self) {
        self.note("paused");
    }

    fn resume(&self) {
        self.note("resumed");
    }

    fn set_volume(&self, volume: u8) {
        self.note(&format!("volume {volume}"));
    }

    fn release(&self) {
        if guard(&self.current).take().is_some() {
            self.note("stopped");
        }
    }
}
