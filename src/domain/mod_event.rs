use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A remote notification that a mod changed state.
///
/// Delivery is at-least-once: duplicates of the same event id can arrive
/// across polls, so application must be idempotent. Events live in the
/// manifest's pending queue until successfully applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModEvent {
    /// Remote event id, unique per occurrence
    pub id: u64,

    /// The mod this event concerns
    pub mod_id: u64,

    pub event_type: ModEventType,

    /// When the event was recorded remotely
    pub date_added: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModEventType {
    /// The mod became visible in the catalog
    #[serde(rename = "MOD_AVAILABLE")]
    ModAvailable,

    /// The mod was hidden or deleted remotely
    #[serde(rename = "MOD_UNAVAILABLE")]
    ModUnavailable,

    /// Profile fields changed
    #[serde(rename = "MOD_EDITED")]
    ModEdited,

    /// A new primary modfile was published
    #[serde(rename = "MODFILE_CHANGED")]
    ModfileChanged,

    /// Any event type this build does not understand. Dropped with an
    /// error log instead of being retried forever.
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ModEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModEventType::ModAvailable => write!(f, "MOD_AVAILABLE"),
            ModEventType::ModUnavailable => write!(f, "MOD_UNAVAILABLE"),
            ModEventType::ModEdited => write!(f, "MOD_EDITED"),
            ModEventType::ModfileChanged => write!(f, "MODFILE_CHANGED"),
            ModEventType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
