//! Client setup errors.

use thiserror::Error;

/// The HTTP client could not be constructed.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The configured API URL is not a usable base URL.
    #[error("invalid api url {url:?}: {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The underlying HTTP client failed to build.
    #[error("http client could not be built: {0}")]
    Http(#[from] reqwest::Error),
}
