use serde::{Deserialize, Serialize};

/// Metadata describing the remote catalog itself, refreshed on every
/// synchronization pass and persisted inside the manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogProfile {
    pub id: u64,
    pub name: String,
    pub summary: Option<String>,
    pub icon_url: Option<String>,
}
