// events/types.rs
//
// Notifications emitted by the sync engine. Each one is an immutable fact
// that has already been applied to local state; handlers react, they do
// not veto.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::domain::{ModProfile, Modfile};

/// Trait that all notification events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

// ============================================================================
// MOD CACHE EVENTS
// ============================================================================

/// A mod was seen for the first time and cached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModAdded {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub profile: ModProfile,
}

impl ModAdded {
    pub fn new(profile: ModProfile) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            profile,
        }
    }
}

impl DomainEvent for ModAdded {
    fn event_id(&self) -> Uuid {
        self.event_id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
    fn event_type(&self) -> &'static str {
        "ModAdded"
    }
}

/// A cached mod was removed (became unavailable and was not retained)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModRemoved {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub mod_id: u64,
}

impl ModRemoved {
    pub fn new(mod_id: u64) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            mod_id,
        }
    }
}

impl DomainEvent for ModRemoved {
    fn event_id(&self) -> Uuid {
        self.event_id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
    fn event_type(&self) -> &'static str {
        "ModRemoved"
    }
}

/// A cached mod's profile fields changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModUpdated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub mod_id: u64,
}

impl ModUpdated {
    pub fn new(mod_id: u64) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            mod_id,
        }
    }
}

impl DomainEvent for ModUpdated {
    fn event_id(&self) -> Uuid {
        self.event_id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
    fn event_type(&self) -> &'static str {
        "ModUpdated"
    }
}

/// A mod published a new primary modfile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModfileChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub mod_id: u64,
    pub modfile: Modfile,
}

impl ModfileChanged {
    pub fn new(mod_id: u64, modfile: Modfile) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            mod_id,
            modfile,
        }
    }
}

impl DomainEvent for ModfileChanged {
    fn event_id(&self) -> Uuid {
        self.event_id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
    fn event_type(&self) -> &'static str {
        "ModfileChanged"
    }
}

// ============================================================================
// DOWNLOAD EVENTS
// ============================================================================

/// A binary artifact finished downloading and passed verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryDownloaded {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub mod_id: u64,
    pub modfile_id: u64,
    pub path: PathBuf,
}

impl BinaryDownloaded {
    pub fn new(mod_id: u64, modfile_id: u64, path: PathBuf) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            mod_id,
            modfile_id,
            path,
        }
    }
}

impl DomainEvent for BinaryDownloaded {
    fn event_id(&self) -> Uuid {
        self.event_id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
    fn event_type(&self) -> &'static str {
        "BinaryDownloaded"
    }
}

/// A mod logo landed on disk (one size)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModLogoUpdated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub mod_id: u64,
    pub version: String,
    pub path: PathBuf,
}

impl ModLogoUpdated {
    pub fn new(mod_id: u64, version: String, path: PathBuf) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            mod_id,
            version,
            path,
        }
    }
}

impl DomainEvent for ModLogoUpdated {
    fn event_id(&self) -> Uuid {
        self.event_id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
    fn event_type(&self) -> &'static str {
        "ModLogoUpdated"
    }
}

/// A gallery image landed on disk (one size)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModGalleryImageUpdated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub mod_id: u64,
    pub file_name: String,
    pub version: String,
    pub path: PathBuf,
}

impl ModGalleryImageUpdated {
    pub fn new(mod_id: u64, file_name: String, version: String, path: PathBuf) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            mod_id,
            file_name,
            version,
            path,
        }
    }
}

impl DomainEvent for ModGalleryImageUpdated {
    fn event_id(&self) -> Uuid {
        self.event_id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
    fn event_type(&self) -> &'static str {
        "ModGalleryImageUpdated"
    }
}

// ============================================================================
// SESSION & SUBSCRIPTION EVENTS
// ============================================================================

/// The user subscribed to a mod (locally observed via diff or direct call)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionAdded {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub mod_id: u64,
}

impl SubscriptionAdded {
    pub fn new(mod_id: u64) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            mod_id,
        }
    }
}

impl DomainEvent for SubscriptionAdded {
    fn event_id(&self) -> Uuid {
        self.event_id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
    fn event_type(&self) -> &'static str {
        "SubscriptionAdded"
    }
}

/// The user's subscription to a mod ended
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRemoved {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub mod_id: u64,
}

impl SubscriptionRemoved {
    pub fn new(mod_id: u64) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            mod_id,
        }
    }
}

impl DomainEvent for SubscriptionRemoved {
    fn event_id(&self) -> Uuid {
        self.event_id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
    fn event_type(&self) -> &'static str {
        "SubscriptionRemoved"
    }
}

/// The session ended, either explicitly or after a 401/403
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLoggedOut {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl UserLoggedOut {
    pub fn new() -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
        }
    }
}

impl Default for UserLoggedOut {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainEvent for UserLoggedOut {
    fn event_id(&self) -> Uuid {
        self.event_id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
    fn event_type(&self) -> &'static str {
        "UserLoggedOut"
    }
}

// ============================================================================
// CATALOG EVENTS
// ============================================================================

/// Catalog metadata was refreshed from the remote service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProfileRefreshed {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub catalog_id: u64,
    pub name: String,
}

impl CatalogProfileRefreshed {
    pub fn new(catalog_id: u64, name: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            catalog_id,
            name,
        }
    }
}

impl DomainEvent for CatalogProfileRefreshed {
    fn event_id(&self) -> Uuid {
        self.event_id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
    fn event_type(&self) -> &'static str {
        "CatalogProfileRefreshed"
    }
}
