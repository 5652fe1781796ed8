//! Urban Soccer CLI — terminal driver for the turn engine.
//!
//! Loads the campaign selected in the cache file, renders each turn as
//! text and reads player commands from standard input.

pub mod command;
pub mod config;
pub mod console;
pub mod driver;
pub mod error;
pub mod render;

pub use command::Command;
pub use config::CliConfig;
pub use console::{ConsoleAudioOutput, ConsoleSpeech};
pub use driver::{Driver, Flow, event_logger};
pub use error::AppError;
