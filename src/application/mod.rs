// src/application/mod.rs
//
// Application Layer - the embedder's entry point.
//
// Wires the full engine over one cache directory and exposes the
// services an embedding application talks to. Nothing below this layer
// knows the graph exists; everything is plain Arc-shared services.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::events::{create_event_bus, EventBus};
use crate::integrations::{CatalogClient, HttpCatalogClient};
use crate::repositories::{
    DiskModRepository, JsonManifestRepository, JsonUserRepository, ModRepository,
};
use crate::services::{
    DownloadService, EventProcessor, HttpTransfer, ManifestStore, ModCache, PollerConfig,
    SessionService, SubscriptionService, SyncConfig, SyncService, Transfer, UpdatePoller,
};

/// Everything needed to open a mirror against one remote catalog.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Catalog base URL, e.g. `https://api.example.com/v1/games/42`
    pub base_url: String,
    pub api_key: String,
    /// Cache directory; defaults to a per-user data directory
    pub cache_dir: Option<PathBuf>,
    pub sync: SyncConfig,
    pub poller: PollerConfig,
}

impl MirrorConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            cache_dir: None,
            sync: SyncConfig::default(),
            poller: PollerConfig::default(),
        }
    }
}

/// Per-user default cache location.
pub fn default_cache_dir() -> AppResult<PathBuf> {
    dirs::data_local_dir()
        .map(|dir| dir.join("modmirror"))
        .ok_or_else(|| AppError::Other("no local data directory available".to_string()))
}

/// The assembled engine. One instance per cache directory.
pub struct MirrorContext {
    cache_root: PathBuf,
    bus: Arc<EventBus>,
    mods: Arc<ModCache>,
    manifest: Arc<ManifestStore>,
    session: Arc<SessionService>,
    subscriptions: Arc<SubscriptionService>,
    downloads: Arc<DownloadService>,
    sync: Arc<SyncService>,
    poller: UpdatePoller,
}

impl MirrorContext {
    /// Open a mirror over HTTP. Must be called inside a Tokio runtime.
    pub fn open(config: MirrorConfig) -> AppResult<Self> {
        let client = Arc::new(HttpCatalogClient::new(&config.base_url, &config.api_key)?);
        let transfer = Arc::new(HttpTransfer::new()?);
        let cache_root = match &config.cache_dir {
            Some(dir) => dir.clone(),
            None => default_cache_dir()?,
        };
        Self::assemble(client, transfer, &cache_root, config.sync, config.poller)
    }

    /// Open a mirror over caller-supplied remote implementations. This is
    /// the seam embedders and tests use to run without a network.
    pub fn with_client(
        client: Arc<dyn CatalogClient>,
        transfer: Arc<dyn Transfer>,
        cache_root: &Path,
        sync: SyncConfig,
        poller: PollerConfig,
    ) -> AppResult<Self> {
        Self::assemble(client, transfer, cache_root, sync, poller)
    }

    fn assemble(
        client: Arc<dyn CatalogClient>,
        transfer: Arc<dyn Transfer>,
        cache_root: &Path,
        sync_config: SyncConfig,
        poller_config: PollerConfig,
    ) -> AppResult<Self> {
        std::fs::create_dir_all(cache_root)?;
        log::info!("opening mirror at {}", cache_root.display());

        let bus = create_event_bus();
        let mod_repo: Arc<dyn ModRepository> = Arc::new(DiskModRepository::new(cache_root));
        let mods = Arc::new(ModCache::new(Arc::clone(&mod_repo)));
        let manifest = Arc::new(ManifestStore::load(Arc::new(JsonManifestRepository::new(
            cache_root,
        )))?);
        let session = Arc::new(SessionService::load(
            Arc::clone(&client),
            Arc::new(JsonUserRepository::new(cache_root)),
            Arc::clone(&bus),
        )?);
        let subscriptions = Arc::new(SubscriptionService::new(
            Arc::clone(&client),
            Arc::clone(&session),
            Arc::clone(&bus),
        ));
        let processor = Arc::new(EventProcessor::new(
            Arc::clone(&client),
            Arc::clone(&mods),
            Arc::clone(&manifest),
            Arc::clone(&mod_repo),
            Arc::clone(&session),
            Arc::clone(&bus),
        ));
        let downloads = Arc::new(DownloadService::new(
            transfer,
            Arc::clone(&client),
            Arc::clone(&mod_repo),
            Arc::clone(&manifest),
            Arc::clone(&bus),
        ));
        let sync = Arc::new(SyncService::new(
            client,
            Arc::clone(&mods),
            Arc::clone(&manifest),
            processor,
            Arc::clone(&subscriptions),
            Arc::clone(&session),
            Arc::clone(&bus),
            sync_config,
        ));
        let poller = UpdatePoller::new(Arc::clone(&sync), poller_config);

        Ok(Self {
            cache_root: cache_root.to_path_buf(),
            bus,
            mods,
            manifest,
            session,
            subscriptions,
            downloads,
            sync,
            poller,
        })
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    pub fn mod_profile(&self, mod_id: u64) -> Option<crate::domain::ModProfile> {
        self.mods.get(mod_id)
    }

    pub fn catalog_profile(&self) -> crate::domain::CatalogProfile {
        self.manifest.catalog()
    }

    pub fn authenticated_user(&self) -> Option<crate::domain::AuthenticatedUser> {
        self.session.authenticated_user()
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn mods(&self) -> &Arc<ModCache> {
        &self.mods
    }

    pub fn manifest(&self) -> &Arc<ManifestStore> {
        &self.manifest
    }

    pub fn session(&self) -> &Arc<SessionService> {
        &self.session
    }

    pub fn subscriptions(&self) -> &Arc<SubscriptionService> {
        &self.subscriptions
    }

    pub fn downloads(&self) -> &Arc<DownloadService> {
        &self.downloads
    }

    pub fn sync(&self) -> &Arc<SyncService> {
        &self.sync
    }

    /// Restore state from disk and retry anything left over from a crash.
    pub async fn bootstrap(&self) -> AppResult<()> {
        self.sync.bootstrap().await
    }

    /// Run one sync pass right now, regardless of the poll interval.
    pub async fn poll_now(&self) -> AppResult<()> {
        self.sync.poll_once(chrono::Utc::now()).await
    }

    pub fn enable_polling(&self) {
        self.poller.enable();
    }

    pub fn disable_polling(&self) {
        self.poller.disable();
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_enabled()
    }

    /// Open a session and pull the account's subscription list.
    pub async fn log_in(&self, token: impl Into<String>) -> AppResult<()> {
        self.session.log_in(token.into()).await?;
        self.sync.refresh_subscriptions().await
    }

    pub fn log_out(&self) -> AppResult<()> {
        self.session.log_out()
    }
}
