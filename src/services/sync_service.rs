// src/services/sync_service.rs
//
// One synchronization pass: refresh catalog metadata, fetch the event
// window [last_sync, now), apply it, advance the cursor, and reconcile
// subscriptions when a session is open.
//
// The cursor only advances after the window's events are durably queued,
// so a crash mid-pass refetches the same window and the queue dedupe
// absorbs the overlap.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::error::AppResult;
use crate::events::{CatalogProfileRefreshed, EventBus, ModAdded, ModUpdated};
use crate::integrations::{fetch_all, CatalogClient, DEFAULT_PAGE_SIZE};
use crate::services::event_processor::EventProcessor;
use crate::services::manifest_store::ManifestStore;
use crate::services::mod_cache::ModCache;
use crate::services::session_service::SessionService;
use crate::services::subscription_service::SubscriptionService;

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Minimum gap between event windows; a poll inside it is a no-op
    pub sync_threshold: Duration,
    /// Page size for bulk listings
    pub page_size: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sync_threshold: Duration::seconds(15),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

pub struct SyncService {
    client: Arc<dyn CatalogClient>,
    cache: Arc<ModCache>,
    manifest: Arc<ManifestStore>,
    processor: Arc<EventProcessor>,
    subscriptions: Arc<SubscriptionService>,
    session: Arc<SessionService>,
    bus: Arc<EventBus>,
    config: SyncConfig,
}

impl SyncService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client: Arc<dyn CatalogClient>,
        cache: Arc<ModCache>,
        manifest: Arc<ManifestStore>,
        processor: Arc<EventProcessor>,
        subscriptions: Arc<SubscriptionService>,
        session: Arc<SessionService>,
        bus: Arc<EventBus>,
        config: SyncConfig,
    ) -> Self {
        Self {
            client,
            cache,
            manifest,
            processor,
            subscriptions,
            session,
            bus,
            config,
        }
    }

    /// Restore local state after startup: reload cached profiles,
    /// re-check the persisted session, and retry events left pending by
    /// an earlier crash. A brand-new cache is seeded with a full mirror
    /// pass; later runs rely on the event stream.
    pub async fn bootstrap(&self) -> AppResult<()> {
        let loaded = self.cache.load_from_disk()?;
        log::info!("restored {} cached mod profiles", loaded);

        self.session.validate_persisted().await;
        self.processor.process_pending().await?;
        self.refresh_catalog_profile().await;

        if self.cache.is_empty() {
            let now = Utc::now();
            self.mirror_all_mods().await?;
            self.manifest.advance_last_sync(now)?;
        }
        Ok(())
    }

    /// Run one pass against the remote. `now` becomes the new cursor on
    /// success; a failed event fetch leaves it untouched so the window is
    /// refetched next time.
    pub async fn poll_once(&self, now: DateTime<Utc>) -> AppResult<()> {
        let last = self.manifest.last_sync();
        if now.signed_duration_since(last) < self.config.sync_threshold {
            log::debug!("last sync {} is within the threshold, skipping", last);
            return Ok(());
        }

        self.refresh_catalog_profile().await;

        let events = fetch_all(self.config.page_size, |offset, limit| {
            self.client.list_events(last, now, offset, limit)
        })
        .await?;
        log::info!("fetched {} events for window ending {}", events.len(), now);

        self.processor.ingest(events).await?;
        self.manifest.advance_last_sync(now)?;

        if self.session.is_logged_in() {
            self.reconcile_subscriptions().await?;
        }
        Ok(())
    }

    /// Pull the complete remote catalog into the local cache. Used for
    /// initial mirroring; later passes rely on the event stream.
    pub async fn mirror_all_mods(&self) -> AppResult<usize> {
        let profiles = fetch_all(self.config.page_size, |offset, limit| {
            self.client.list_mods(offset, limit)
        })
        .await?;

        let count = profiles.len();
        let outcome = self.cache.apply_bulk(profiles)?;
        for profile in outcome.added {
            self.bus.emit(ModAdded::new(profile));
        }
        for profile in outcome.updated {
            self.bus.emit(ModUpdated::new(profile.id));
        }
        log::info!("mirrored {} mod profiles", count);
        Ok(count)
    }

    /// Fetch and apply the authoritative subscription list now. Called
    /// after login and as part of every logged-in poll.
    pub async fn refresh_subscriptions(&self) -> AppResult<()> {
        self.reconcile_subscriptions().await
    }

    /// Catalog metadata is cosmetic; a failed refresh never aborts the pass.
    async fn refresh_catalog_profile(&self) {
        match self.client.get_catalog_profile().await {
            Ok(profile) => {
                if profile == self.manifest.catalog() {
                    return;
                }
                match self.manifest.set_catalog(profile.clone()) {
                    Ok(()) => {
                        self.bus
                            .emit(CatalogProfileRefreshed::new(profile.id, profile.name));
                    }
                    Err(e) => log::warn!("unable to persist catalog profile: {}", e),
                }
            }
            Err(e) => log::warn!("catalog profile refresh failed: {}", e),
        }
    }

    /// Fetch the authoritative subscription list, refresh the cached
    /// profiles it carries, and diff it against the stored id set. A
    /// 401/403 here ends the session.
    async fn reconcile_subscriptions(&self) -> AppResult<()> {
        let Some(token) = self.session.token() else {
            return Ok(());
        };

        let fetched = fetch_all(self.config.page_size, |offset, limit| {
            self.client.list_subscriptions(&token, offset, limit)
        })
        .await;

        match fetched {
            Ok(profiles) => {
                let ids: Vec<u64> = profiles.iter().map(|p| p.id).collect();
                let outcome = self.cache.apply_bulk(profiles)?;
                for profile in outcome.added {
                    self.bus.emit(ModAdded::new(profile));
                }
                for profile in outcome.updated {
                    self.bus.emit(ModUpdated::new(profile.id));
                }
                self.subscriptions.reconcile(ids)
            }
            Err(e) => {
                self.session.invalidate_on_auth_error(&e);
                Err(e)
            }
        }
    }
}
