// src/services/event_processor.rs
//
// Applies remote change events to the local mirror.
//
// Events are delivered at-least-once, so every handler is idempotent.
// The pending queue is iterated as a snapshot and applied events are
// removed in a second pass; an event whose application fails stays
// queued and is retried on the next poll.

use std::sync::Arc;

use crate::domain::{validate_modfile, ModEvent, ModEventType};
use crate::error::{AppError, AppResult};
use crate::events::{EventBus, ModAdded, ModRemoved, ModUpdated, ModfileChanged};
use crate::integrations::CatalogClient;
use crate::repositories::ModRepository;
use crate::services::manifest_store::ManifestStore;
use crate::services::mod_cache::ModCache;
use crate::services::session_service::SessionService;

pub struct EventProcessor {
    client: Arc<dyn CatalogClient>,
    cache: Arc<ModCache>,
    manifest: Arc<ManifestStore>,
    mod_repo: Arc<dyn ModRepository>,
    session: Arc<SessionService>,
    bus: Arc<EventBus>,
}

impl EventProcessor {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        cache: Arc<ModCache>,
        manifest: Arc<ManifestStore>,
        mod_repo: Arc<dyn ModRepository>,
        session: Arc<SessionService>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            client,
            cache,
            manifest,
            mod_repo,
            session,
            bus,
        }
    }

    /// Enqueue freshly fetched events (deduplicated by id against ones
    /// still pending from an earlier pass) and process the whole queue.
    pub async fn ingest(&self, fetched: Vec<ModEvent>) -> AppResult<()> {
        let appended = self.manifest.enqueue_events(fetched)?;
        if appended > 0 {
            log::info!("{} new events queued", appended);
        }
        self.process_pending().await
    }

    /// Apply every pending event in delivery order. Events that applied
    /// (or were deliberately dropped) are dequeued afterwards; failures
    /// stay pending for the next poll.
    pub async fn process_pending(&self) -> AppResult<()> {
        let snapshot = self.manifest.pending_events();
        if snapshot.is_empty() {
            return Ok(());
        }

        let mut resolved = Vec::new();
        for event in &snapshot {
            log::info!(
                "processing event {} ({}) for mod {}",
                event.id,
                event.event_type,
                event.mod_id
            );
            match self.apply(event).await {
                Ok(()) => resolved.push(event.id),
                Err(e) => {
                    log::warn!(
                        "event {} for mod {} left pending: {}",
                        event.id,
                        event.mod_id,
                        e
                    );
                }
            }
        }

        self.manifest.remove_events(&resolved)
    }

    /// Apply one event. Ok means the event is resolved and may be
    /// dequeued; Err means it stays pending.
    async fn apply(&self, event: &ModEvent) -> AppResult<()> {
        match event.event_type {
            ModEventType::ModAvailable => {
                let profile = self.client.get_mod(event.mod_id).await?;
                self.cache.put(profile.clone())?;
                self.bus.emit(ModAdded::new(profile));
            }

            ModEventType::ModUnavailable => {
                // Subscribed or installed mods are retained even when the
                // remote hides them; the event is still resolved.
                let retained = self.session.is_subscribed(event.mod_id)
                    || self.mod_repo.has_binaries(event.mod_id);
                if retained {
                    log::info!("mod {} unavailable but locally retained", event.mod_id);
                } else if self.cache.contains(event.mod_id) {
                    self.cache.remove(event.mod_id)?;
                    self.bus.emit(ModRemoved::new(event.mod_id));
                }
            }

            ModEventType::ModEdited => {
                let profile = self.client.get_mod(event.mod_id).await?;
                self.cache.put(profile)?;
                self.bus.emit(ModUpdated::new(event.mod_id));
            }

            ModEventType::ModfileChanged => {
                if !self.cache.contains(event.mod_id) {
                    log::info!(
                        "modfile change for uncached mod {}, ignoring",
                        event.mod_id
                    );
                    return Ok(());
                }
                let profile = self.client.get_mod(event.mod_id).await?;
                let modfile = self
                    .client
                    .get_modfile(event.mod_id, profile.primary_modfile_id)
                    .await?;
                validate_modfile(&modfile).map_err(AppError::Domain)?;
                self.cache.put(profile)?;
                self.mod_repo.save_modfile(&modfile)?;
                self.bus.emit(ModfileChanged::new(event.mod_id, modfile));
            }

            ModEventType::Unknown => {
                // Dropped rather than retried forever, so the queue
                // stays bounded.
                log::error!(
                    "unhandled event type for event {} (mod {}), dropping",
                    event.id,
                    event.mod_id
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testutil::{sample_event, sample_modfile, sample_profile};
    use crate::error::AppError;
    use crate::events::create_event_bus;
    use crate::integrations::catalog::MockCatalogClient;
    use crate::repositories::{DiskModRepository, JsonManifestRepository, JsonUserRepository};
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    struct Fixture {
        processor: EventProcessor,
        cache: Arc<ModCache>,
        manifest: Arc<ManifestStore>,
        mod_repo: Arc<DiskModRepository>,
        session: Arc<SessionService>,
        bus: Arc<EventBus>,
        _dir: TempDir,
    }

    fn fixture(client: MockCatalogClient) -> Fixture {
        let dir = TempDir::new().unwrap();
        let client: Arc<dyn CatalogClient> = Arc::new(client);
        let bus = create_event_bus();
        let mod_repo = Arc::new(DiskModRepository::new(dir.path()));
        let cache = Arc::new(ModCache::new(
            Arc::clone(&mod_repo) as Arc<dyn ModRepository>
        ));
        let manifest = Arc::new(
            ManifestStore::load(Arc::new(JsonManifestRepository::new(dir.path()))).unwrap(),
        );
        let session = Arc::new(
            SessionService::load(
                Arc::clone(&client),
                Arc::new(JsonUserRepository::new(dir.path())),
                Arc::clone(&bus),
            )
            .unwrap(),
        );
        let processor = EventProcessor::new(
            Arc::clone(&client),
            Arc::clone(&cache),
            Arc::clone(&manifest),
            Arc::clone(&mod_repo) as Arc<dyn ModRepository>,
            Arc::clone(&session),
            Arc::clone(&bus),
        );
        Fixture {
            processor,
            cache,
            manifest,
            mod_repo,
            session,
            bus,
            _dir: dir,
        }
    }

    async fn log_in(fx: &Fixture) {
        fx.session.log_in("tok".to_string()).await.unwrap();
    }

    #[tokio::test]
    async fn test_available_caches_and_dequeues() {
        let mut client = MockCatalogClient::new();
        client
            .expect_get_mod()
            .returning(|id| Ok(sample_profile(id)));

        let fx = fixture(client);
        fx.processor
            .ingest(vec![sample_event(1, 10, ModEventType::ModAvailable)])
            .await
            .unwrap();

        assert!(fx.cache.contains(10));
        assert!(fx.manifest.pending_events().is_empty());
        assert_eq!(fx.bus.get_event_log()[0].event_type, "ModAdded");
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_event_pending() {
        let mut client = MockCatalogClient::new();
        client
            .expect_get_mod()
            .returning(|_| Err(AppError::Other("remote down".to_string())));

        let fx = fixture(client);
        fx.processor
            .ingest(vec![sample_event(1, 10, ModEventType::ModAvailable)])
            .await
            .unwrap();

        assert!(!fx.cache.contains(10));
        assert_eq!(fx.manifest.pending_events().len(), 1);
    }

    #[tokio::test]
    async fn test_edited_is_idempotent() {
        let mut client = MockCatalogClient::new();
        client
            .expect_get_mod()
            .returning(|id| Ok(sample_profile(id)));

        let fx = fixture(client);
        fx.cache.put(sample_profile(10)).unwrap();

        let event = sample_event(1, 10, ModEventType::ModEdited);
        fx.processor.ingest(vec![event.clone()]).await.unwrap();
        let after_first = fx.cache.get(10).unwrap();

        // The same event arrives again on a later poll
        fx.processor.ingest(vec![event]).await.unwrap();
        let after_second = fx.cache.get(10).unwrap();

        assert_eq!(after_first, after_second);
        assert!(fx.manifest.pending_events().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_removes_unretained_mod() {
        let fx = fixture(MockCatalogClient::new());
        fx.cache.put(sample_profile(10)).unwrap();

        fx.processor
            .ingest(vec![sample_event(1, 10, ModEventType::ModUnavailable)])
            .await
            .unwrap();

        assert!(!fx.cache.contains(10));
        assert!(fx.manifest.pending_events().is_empty());
        assert_eq!(fx.bus.get_event_log()[0].event_type, "ModRemoved");
    }

    #[tokio::test]
    async fn test_unavailable_but_subscribed_is_retained() {
        let mut client = MockCatalogClient::new();
        client.expect_get_authenticated_user().returning(|_| {
            Ok(crate::domain::UserProfile {
                id: 1,
                username: "tester".to_string(),
            })
        });

        let fx = fixture(client);
        log_in(&fx).await;
        fx.session
            .set_subscribed_ids(BTreeSet::from([10]))
            .unwrap();
        fx.cache.put(sample_profile(10)).unwrap();

        fx.processor
            .ingest(vec![sample_event(1, 10, ModEventType::ModUnavailable)])
            .await
            .unwrap();

        // Retained in cache, but the event is still dequeued
        assert!(fx.cache.contains(10));
        assert!(fx.manifest.pending_events().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_with_downloaded_binary_is_retained() {
        let fx = fixture(MockCatalogClient::new());
        fx.cache.put(sample_profile(10)).unwrap();
        std::fs::write(fx.mod_repo.binary_path(10, 100), b"zip").unwrap();

        fx.processor
            .ingest(vec![sample_event(1, 10, ModEventType::ModUnavailable)])
            .await
            .unwrap();

        assert!(fx.cache.contains(10));
        assert!(fx.manifest.pending_events().is_empty());
    }

    #[tokio::test]
    async fn test_modfile_changed_fetches_and_notifies() {
        let mut client = MockCatalogClient::new();
        client
            .expect_get_mod()
            .returning(|id| Ok(sample_profile(id)));
        client
            .expect_get_modfile()
            .returning(|mod_id, modfile_id| Ok(sample_modfile(mod_id, modfile_id)));

        let fx = fixture(client);
        fx.cache.put(sample_profile(10)).unwrap();

        fx.processor
            .ingest(vec![sample_event(1, 10, ModEventType::ModfileChanged)])
            .await
            .unwrap();

        // Record persisted for the profile's primary modfile (10 * 10)
        assert!(fx.mod_repo.load_modfile(10, 100).unwrap().is_some());
        assert!(fx.manifest.pending_events().is_empty());
        assert_eq!(fx.bus.get_event_log()[0].event_type, "ModfileChanged");
    }

    #[tokio::test]
    async fn test_modfile_changed_for_uncached_mod_is_dropped() {
        let fx = fixture(MockCatalogClient::new());

        fx.processor
            .ingest(vec![sample_event(1, 99, ModEventType::ModfileChanged)])
            .await
            .unwrap();

        assert!(fx.manifest.pending_events().is_empty());
        assert!(fx.bus.get_event_log().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_event_type_is_dropped() {
        let fx = fixture(MockCatalogClient::new());

        fx.processor
            .ingest(vec![sample_event(1, 10, ModEventType::Unknown)])
            .await
            .unwrap();

        assert!(fx.manifest.pending_events().is_empty());
    }

    #[tokio::test]
    async fn test_failed_event_retries_on_next_pass() {
        let mut client = MockCatalogClient::new();
        let mut call = 0;
        client.expect_get_mod().returning_st(move |id| {
            call += 1;
            if call == 1 {
                Err(AppError::Other("remote down".to_string()))
            } else {
                Ok(sample_profile(id))
            }
        });

        let fx = fixture(client);
        fx.processor
            .ingest(vec![sample_event(1, 10, ModEventType::ModAvailable)])
            .await
            .unwrap();
        assert_eq!(fx.manifest.pending_events().len(), 1);

        // Next poll delivers the same event again; the pending copy wins
        fx.processor
            .ingest(vec![sample_event(1, 10, ModEventType::ModAvailable)])
            .await
            .unwrap();

        assert!(fx.cache.contains(10));
        assert!(fx.manifest.pending_events().is_empty());
    }
}
