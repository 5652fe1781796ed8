//! Cached campaign selection.
//!
//! The campaign-selection screen writes the chosen campaign here; the turn
//! engine reads it exactly once when it loads.

use crate::campaign::CampaignSession;
use crate::error::CacheError;

/// Storage for the single selected campaign record.
pub trait CampaignCache: Send + Sync {
    /// Returns the cached campaign, or `None` if nothing was selected.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the storage cannot be read or holds a
    /// malformed record.
    fn load_selected(&self) -> Result<Option<CampaignSession>, CacheError>;

    /// Replaces the cached campaign.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the storage cannot be written.
    fn store_selected(&self, session: &CampaignSession) -> Result<(), CacheError>;

    /// Forgets the cached campaign.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the storage cannot be written.
    fn clear_selected(&self) -> Result<(), CacheError>;
}
