//! Player commands typed at the prompt.

/// One line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Select the card at this 1-based position.
    Card(usize),
    /// Play the armed card.
    Confirm,
    /// Disarm the armed card.
    Cancel,
    /// Speak the current narration and keep narrating later turns.
    Listen,
    /// Pause narration.
    Pause,
    /// Resume narration.
    Resume,
    /// Stop narration.
    Stop,
    /// Set narration volume.
    Volume(i32),
    /// Show the narration history.
    History,
    /// Retry a failed load.
    Retry,
    /// Leave, keeping progress.
    Quit,
    /// Leave and discard progress.
    Abandon,
    /// Show the command list.
    Help,
}

/// Prompt help text.
pub const HELP: &str = "\
commands:
  <n>        select card n (select again or 'c' to play it)
  c          confirm the armed card
  x          cancel the armed card
  l          listen to the narration (turns on auto-play)
  p / r / s  pause, resume or stop narration
  v <0-100>  set narration volume
  h          narration history
  retry      retry loading the campaign
  q          leave and keep progress
  abandon    leave and discard progress
  ?          this help";

impl Command {
    /// Parses a trimmed input line. Returns `None` for anything unrecognised.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let mut words = line.split_whitespace();
        let head = words.next()?.to_ascii_lowercase();
        let rest: Vec<&str> = words.collect();

        let command = match (head.as_str(), rest.as_slice()) {
            ("c" | "confirm", []) => Self::Confirm,
            ("x" | "cancel", []) => Self::Cancel,
            ("l" | "listen", []) => Self::Listen,
            ("p" | "pause", []) => Self::Pause,
            ("r" | "resume", []) => Self::Resume,
            ("s" | "stop", []) => Self::Stop,
            ("v" | "volume", [level]) => Self::Volume(level.parse().ok()?),
            ("h" | "history", []) => Self::History,
            ("retry", []) => Self::Retry,
            ("q" | "quit", []) => Self::Quit,
            ("abandon", []) => Self::Abandon,
            ("?" | "help", []) => Self::Help,
            (n, []) => {
                let index: usize = n.parse().ok()?;
                if index == 0 {
                    return None;
                }
                Self::Card(index)
            }
            _ => return None,
        };
        Some(command)
    }
}
