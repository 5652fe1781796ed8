//! JSON file holding the selected campaign.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;
use urbansoccer_core::cache::CampaignCache;
use urbansoccer_core::campaign::CampaignSession;
use urbansoccer_core::error::CacheError;

/// Default file name for the cached selection.
pub const DEFAULT_CAMPAIGN_FILE: &str = "selected_campaign.json";

/// Campaign cache stored as a single JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileCampaignCache {
    path: PathBuf,
}

impl FileCampaignCache {
    /// Creates a cache backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CampaignCache for FileCampaignCache {
    fn load_selected(&self) -> Result<Option<CampaignSession>, CacheError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let session = serde_json::from_str(&raw)?;
        Ok(Some(session))
    }

    fn store_selected(&self, session: &CampaignSession) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw)?;
        debug!(path = %self.path.display(), campaign_id = %session.id, "campaign selection stored");
        Ok(())
    }

    fn clear_selected(&self) -> Result<(), CacheError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
