//! Urban Soccer — infrastructure adapters.
//!
//! HTTP implementation of the campaign backend and speech synthesis seams,
//! a bearer-token identity that honours JWT expiry, and the JSON file that
//! holds the selected campaign.

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod identity;

mod classify;

pub use cache::FileCampaignCache;
pub use config::ClientConfig;
pub use error::SetupError;
pub use http::HttpCampaignClient;
pub use identity::TokenIdentity;
