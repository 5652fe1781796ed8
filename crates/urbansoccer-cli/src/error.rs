//! Urban Soccer CLI — startup and runtime errors.

use thiserror::Error;
use urbansoccer_client::SetupError;

/// Startup and runtime errors for the terminal driver.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The HTTP client could not be built.
    #[error("client setup error: {0}")]
    Setup(#[from] SetupError),

    /// Terminal I/O failed.
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}
