use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::CatalogProfile;
use super::mod_event::ModEvent;

/// The durable record of sync progress.
///
/// One instance per cache directory, persisted as `manifest.data`.
/// Invariant: `pending_events` holds only events not yet successfully
/// applied, with no duplicate ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Upper bound of the last successfully applied event window
    pub last_sync: DateTime<Utc>,

    /// Events fetched but not yet applied, in remote delivery order
    pub pending_events: Vec<ModEvent>,

    /// Last known catalog metadata
    pub catalog: CatalogProfile,

    /// remote URL -> local path for downloaded images. Entries whose
    /// local file disappeared are pruned on load and lookup.
    pub image_index: HashMap<String, PathBuf>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            last_sync: DateTime::<Utc>::UNIX_EPOCH,
            pending_events: Vec::new(),
            catalog: CatalogProfile::default(),
            image_index: HashMap::new(),
        }
    }
}
