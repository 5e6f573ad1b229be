// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod download_service;
pub mod event_processor;
pub mod manifest_store;
pub mod mod_cache;
pub mod session_service;
pub mod subscription_service;
pub mod sync_service;
pub mod update_poller;

// Re-export all services and their types
pub use download_service::{
    sha256_hex,
    DownloadHandle,
    DownloadRequest,
    DownloadService,
    HttpTransfer,
    ImageFetch,
    Transfer,
    TransferStream,
};

pub use event_processor::EventProcessor;

pub use manifest_store::ManifestStore;

pub use mod_cache::{
    BulkApplyOutcome,
    ModCache,
};

pub use session_service::SessionService;

pub use subscription_service::SubscriptionService;

pub use sync_service::{
    SyncConfig,
    SyncService,
};

pub use update_poller::{
    PollerConfig,
    UpdatePoller,
};
