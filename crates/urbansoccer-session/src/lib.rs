//! Urban Soccer — Game Turn Session Engine.
//!
//! Drives one played campaign from start or resume through a sequence of
//! action-card turns to a terminal outcome, narrating every turn, and owns
//! the two ways of leaving a session (keep progress or discard it).

pub mod application;
pub mod domain;
pub mod error;

pub use application::engine::{GameEngine, SelectOutcome};
pub use application::exit::{ExitController, ExitOutcome};
pub use application::listeners::{ListenerId, SessionListener};
pub use application::view::SessionView;
pub use domain::aggregates::{NarrationEntry, SessionPhase, TurnSession};
pub use domain::events::{ExitIntent, SessionEvent, SessionEventKind};
pub use error::SessionError;
