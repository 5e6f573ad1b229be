// src/repositories/manifest_repository.rs
//
// Manifest persistence: one JSON file per cache root, written atomically.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::Manifest;
use crate::error::{AppError, AppResult};

pub trait ManifestRepository: Send + Sync {
    /// Load the manifest. A missing or unparseable file is replaced by a
    /// freshly persisted default manifest; corruption never propagates.
    fn load(&self) -> AppResult<Manifest>;

    /// Persist the manifest with write-then-rename semantics so a crash
    /// mid-write can never leave a truncated file behind.
    fn save(&self, manifest: &Manifest) -> AppResult<()>;
}

pub struct JsonManifestRepository {
    path: PathBuf,
}

impl JsonManifestRepository {
    pub fn new(cache_root: &Path) -> Self {
        Self {
            path: cache_root.join("manifest.data"),
        }
    }

    /// Read the file as-is. An unparseable file surfaces as CorruptState
    /// so the caller decides whether to reset.
    fn read(&self) -> AppResult<Manifest> {
        let raw = fs::read_to_string(&self.path)?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::CorruptState(format!(
                "manifest at {} is not parseable: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl ManifestRepository for JsonManifestRepository {
    fn load(&self) -> AppResult<Manifest> {
        if self.path.exists() {
            match self.read() {
                Ok(manifest) => return Ok(manifest),
                Err(e) => {
                    log::warn!("resetting manifest to defaults: {}", e);
                }
            }
        }

        let manifest = Manifest::default();
        self.save(&manifest)?;
        Ok(manifest)
    }

    fn save(&self, manifest: &Manifest) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("data.tmp");
        fs::write(&tmp_path, serde_json::to_string(manifest)?)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testutil::sample_event;
    use crate::domain::{CatalogProfile, ModEventType};
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_manifest_round_trip() {
        let dir = TempDir::new().unwrap();
        let repo = JsonManifestRepository::new(dir.path());

        let mut manifest = Manifest::default();
        manifest.last_sync = Utc::now();
        manifest.catalog = CatalogProfile {
            id: 42,
            name: "Test Catalog".to_string(),
            summary: None,
            icon_url: None,
        };
        manifest
            .pending_events
            .push(sample_event(1, 10, ModEventType::ModEdited));

        repo.save(&manifest).unwrap();
        let reloaded = repo.load().unwrap();

        assert_eq!(reloaded, manifest);
    }

    #[test]
    fn test_empty_manifest_round_trip() {
        let dir = TempDir::new().unwrap();
        let repo = JsonManifestRepository::new(dir.path());

        let manifest = Manifest::default();
        repo.save(&manifest).unwrap();
        let reloaded = repo.load().unwrap();

        assert_eq!(reloaded, manifest);
        assert!(reloaded.pending_events.is_empty());
        assert!(reloaded.image_index.is_empty());
    }

    #[test]
    fn test_missing_file_initializes_defaults_and_persists() {
        let dir = TempDir::new().unwrap();
        let repo = JsonManifestRepository::new(dir.path());

        let manifest = repo.load().unwrap();

        assert_eq!(manifest, Manifest::default());
        assert!(dir.path().join("manifest.data").exists());
    }

    #[test]
    fn test_corrupt_file_resets_to_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("manifest.data"), "{not json!").unwrap();

        let repo = JsonManifestRepository::new(dir.path());
        let manifest = repo.load().unwrap();

        assert_eq!(manifest, Manifest::default());
        // The reset state was written back
        let reloaded = repo.load().unwrap();
        assert_eq!(reloaded, Manifest::default());
    }

    #[test]
    fn test_corrupt_file_reads_as_corrupt_state() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("manifest.data"), "{not json!").unwrap();

        let repo = JsonManifestRepository::new(dir.path());
        let err = repo.read().unwrap_err();

        assert!(matches!(err, crate::error::AppError::CorruptState(_)));
    }
}
