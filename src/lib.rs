// src/lib.rs
// ModMirror - Local-first mirror of a remote mod catalog
//
// Architecture:
// - Domain-centric: entities and invariants live in `domain`
// - Event-driven: services coordinate through the event bus
// - Crash-tolerant: every mutation persists before it is visible
// - Explicit: the remote is behind a trait, sessions invalidate on 401/403

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod domain;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;

// ============================================================================
// REMOTE ACCESS & APPLICATION LAYER
// ============================================================================

pub mod application;
pub mod integrations;

// ============================================================================
// PUBLIC API - Domain Entities
// ============================================================================

pub use domain::{
    validate_mod_profile,
    validate_modfile,
    // Session
    AuthenticatedUser,
    // Catalog metadata
    CatalogProfile,
    GalleryImageLocator,
    GalleryImageVersion,
    LogoLocator,
    LogoVersion,
    // Sync progress
    Manifest,
    ModBinaryStatus,
    // Remote change feed
    ModEvent,
    ModEventType,
    // Mods
    ModProfile,
    Modfile,
    UserProfile,
};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus,
    // Download events
    BinaryDownloaded,
    CatalogProfileRefreshed,
    DomainEvent,
    EventBus,
    EventLogEntry,
    // Cache events
    ModAdded,
    ModGalleryImageUpdated,
    ModLogoUpdated,
    ModRemoved,
    ModUpdated,
    ModfileChanged,
    // Session & subscription events
    SubscriptionAdded,
    SubscriptionRemoved,
    UserLoggedOut,
};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    DiskModRepository,
    JsonManifestRepository,
    JsonUserRepository,
    ManifestRepository,
    ModRepository,
    UserRepository,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    // Downloads
    DownloadHandle,
    DownloadRequest,
    DownloadService,
    // Event application
    EventProcessor,
    HttpTransfer,
    ImageFetch,
    // State stores
    ManifestStore,
    ModCache,
    // Background polling
    PollerConfig,
    // Session & subscriptions
    SessionService,
    SubscriptionService,
    SyncConfig,
    // Synchronization
    SyncService,
    Transfer,
    TransferStream,
    UpdatePoller,
};

// ============================================================================
// PUBLIC API - Remote Access & Application Layer
// ============================================================================

pub use application::{default_cache_dir, MirrorConfig, MirrorContext};
pub use integrations::{fetch_all, CatalogClient, HttpCatalogClient, Page, DEFAULT_PAGE_SIZE};
