//! In-memory campaign cache.

use std::sync::Mutex;

use urbansoccer_core::cache::CampaignCache;
use urbansoccer_core::campaign::CampaignSession;
use urbansoccer_core::error::CacheError;

/// Campaign cache held in memory.
#[derive(Debug, Default)]
pub struct MemoryCampaignCache {
    selected: Mutex<Option<CampaignSession>>,
}

impl MemoryCampaignCache {
    /// A cache already holding `session`.
    #[must_use]
    pub fn with(session: CampaignSession) -> Self {
        Self {
            selected: Mutex::new(Some(session)),
        }
    }
}

impl CampaignCache for MemoryCampaignCache {
    fn load_selected(&self) -> Result<Option<CampaignSession>, CacheError> {
        Ok(self.selected.lock().unwrap().clone())
    }

    fn store_selected(&self, session: &CampaignSession) -> Result<(), CacheError> {
        *self.selected.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn clear_selected(&self) -> Result<(), CacheError> {
        *self.selected.lock().unwrap() = None;
        Ok(())
    }
}
