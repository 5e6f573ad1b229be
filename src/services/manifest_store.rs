// src/services/manifest_store.rs
//
// Owns the in-memory Manifest and persists every mutation synchronously
// before returning, so a crash between polls never loses applied state.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::domain::{CatalogProfile, Manifest, ModEvent};
use crate::error::AppResult;
use crate::repositories::ManifestRepository;

pub struct ManifestStore {
    repo: Arc<dyn ManifestRepository>,
    manifest: Mutex<Manifest>,
}

impl ManifestStore {
    /// Load the persisted manifest (or defaults on corruption) and prune
    /// image index entries whose local file disappeared.
    pub fn load(repo: Arc<dyn ManifestRepository>) -> AppResult<Self> {
        let mut manifest = repo.load()?;

        let before = manifest.image_index.len();
        manifest.image_index.retain(|_, path| path.exists());
        if manifest.image_index.len() != before {
            log::info!(
                "pruned {} stale image index entries",
                before - manifest.image_index.len()
            );
            repo.save(&manifest)?;
        }

        Ok(Self {
            repo,
            manifest: Mutex::new(manifest),
        })
    }

    pub fn last_sync(&self) -> DateTime<Utc> {
        self.manifest.lock().unwrap().last_sync
    }

    /// Advance the sync cursor. Called only after an event window has been
    /// fetched and applied.
    pub fn advance_last_sync(&self, until: DateTime<Utc>) -> AppResult<()> {
        let mut manifest = self.manifest.lock().unwrap();
        manifest.last_sync = until;
        self.repo.save(&manifest)
    }

    pub fn catalog(&self) -> CatalogProfile {
        self.manifest.lock().unwrap().catalog.clone()
    }

    pub fn set_catalog(&self, catalog: CatalogProfile) -> AppResult<()> {
        let mut manifest = self.manifest.lock().unwrap();
        manifest.catalog = catalog;
        self.repo.save(&manifest)
    }

    /// Snapshot of the pending queue, in remote delivery order.
    pub fn pending_events(&self) -> Vec<ModEvent> {
        self.manifest.lock().unwrap().pending_events.clone()
    }

    /// Append freshly fetched events, skipping ids already pending from an
    /// earlier, partially failed pass. Returns how many were appended.
    pub fn enqueue_events(&self, events: Vec<ModEvent>) -> AppResult<usize> {
        let mut manifest = self.manifest.lock().unwrap();

        let mut appended = 0;
        for event in events {
            if manifest.pending_events.iter().any(|e| e.id == event.id) {
                log::debug!("event {} already pending, skipping duplicate", event.id);
                continue;
            }
            manifest.pending_events.push(event);
            appended += 1;
        }

        if appended > 0 {
            self.repo.save(&manifest)?;
        }
        Ok(appended)
    }

    /// Drop successfully applied events from the queue.
    pub fn remove_events(&self, ids: &[u64]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut manifest = self.manifest.lock().unwrap();
        manifest.pending_events.retain(|e| !ids.contains(&e.id));
        self.repo.save(&manifest)
    }

    /// Local path for a previously downloaded image. An entry whose file
    /// went missing is pruned so a fresh download can be attempted.
    pub fn cached_image(&self, server_url: &str) -> Option<PathBuf> {
        let mut manifest = self.manifest.lock().unwrap();

        match manifest.image_index.get(server_url) {
            Some(path) if path.exists() => Some(path.clone()),
            Some(_) => {
                manifest.image_index.remove(server_url);
                if let Err(e) = self.repo.save(&manifest) {
                    log::warn!("unable to persist image index prune: {}", e);
                }
                None
            }
            None => None,
        }
    }

    /// Record a completed image download. Only ever called on success.
    pub fn record_image(&self, server_url: &str, local_path: &Path) -> AppResult<()> {
        let mut manifest = self.manifest.lock().unwrap();
        manifest
            .image_index
            .insert(server_url.to_string(), local_path.to_path_buf());
        self.repo.save(&manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testutil::sample_event;
    use crate::domain::ModEventType;
    use crate::repositories::JsonManifestRepository;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> ManifestStore {
        ManifestStore::load(Arc::new(JsonManifestRepository::new(dir.path()))).unwrap()
    }

    #[test]
    fn test_enqueue_deduplicates_by_event_id() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let appended = store
            .enqueue_events(vec![
                sample_event(1, 10, ModEventType::ModEdited),
                sample_event(2, 11, ModEventType::ModAvailable),
            ])
            .unwrap();
        assert_eq!(appended, 2);

        // A later fetch re-delivers event 1
        let appended = store
            .enqueue_events(vec![
                sample_event(1, 10, ModEventType::ModEdited),
                sample_event(3, 12, ModEventType::ModUnavailable),
            ])
            .unwrap();
        assert_eq!(appended, 1);

        let ids: Vec<u64> = store.pending_events().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_events_persists() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store
            .enqueue_events(vec![
                sample_event(1, 10, ModEventType::ModEdited),
                sample_event(2, 11, ModEventType::ModEdited),
            ])
            .unwrap();
        store.remove_events(&[1]).unwrap();

        // Reload from disk to prove persistence
        let reloaded = self::store(&dir);
        let ids: Vec<u64> = reloaded.pending_events().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_advance_last_sync_persists() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let now = Utc::now();
        store.advance_last_sync(now).unwrap();

        let reloaded = self::store(&dir);
        assert_eq!(reloaded.last_sync(), now);
    }

    #[test]
    fn test_cached_image_prunes_missing_files() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let live = dir.path().join("live.png");
        std::fs::write(&live, b"png").unwrap();
        store.record_image("https://img.example/live", &live).unwrap();

        let dead = dir.path().join("dead.png");
        std::fs::write(&dead, b"png").unwrap();
        store.record_image("https://img.example/dead", &dead).unwrap();
        std::fs::remove_file(&dead).unwrap();

        assert_eq!(store.cached_image("https://img.example/live"), Some(live));
        assert_eq!(store.cached_image("https://img.example/dead"), None);
        // The pruned entry stays gone after reload
        let reloaded = self::store(&dir);
        assert_eq!(reloaded.cached_image("https://img.example/dead"), None);
    }

    #[test]
    fn test_load_prunes_stale_index_entries() {
        let dir = TempDir::new().unwrap();
        {
            let store = store(&dir);
            let gone = dir.path().join("gone.png");
            std::fs::write(&gone, b"png").unwrap();
            store.record_image("https://img.example/gone", &gone).unwrap();
            std::fs::remove_file(&gone).unwrap();
        }

        let reloaded = store(&dir);
        assert_eq!(reloaded.cached_image("https://img.example/gone"), None);
    }
}
