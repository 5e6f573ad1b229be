// src/services/mod_cache.rs
//
// In-memory mod_id -> profile map backed by one directory per mod on disk.
// All mutation persists before the in-memory view changes.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::{validate_mod_profile, ModProfile};
use crate::error::{AppError, AppResult};
use crate::repositories::ModRepository;

/// Result of a bulk apply: which profiles were first seen and which
/// replaced an existing entry. Never conflated, so observers can be
/// notified with the right semantics.
#[derive(Debug, Default)]
pub struct BulkApplyOutcome {
    pub added: Vec<ModProfile>,
    pub updated: Vec<ModProfile>,
}

pub struct ModCache {
    repo: Arc<dyn ModRepository>,
    profiles: RwLock<HashMap<u64, ModProfile>>,
}

impl ModCache {
    pub fn new(repo: Arc<dyn ModRepository>) -> Self {
        Self {
            repo,
            profiles: RwLock::new(HashMap::new()),
        }
    }

    /// Rebuild the in-memory map from `mods/*`. Returns how many profiles
    /// were loaded; unparseable records are skipped by the repository.
    pub fn load_from_disk(&self) -> AppResult<usize> {
        let loaded = self.repo.load_all_profiles()?;
        let count = loaded.len();

        let mut profiles = self.profiles.write().unwrap();
        profiles.clear();
        for profile in loaded {
            profiles.insert(profile.id, profile);
        }
        Ok(count)
    }

    pub fn get(&self, mod_id: u64) -> Option<ModProfile> {
        self.profiles.read().unwrap().get(&mod_id).cloned()
    }

    pub fn contains(&self, mod_id: u64) -> bool {
        self.profiles.read().unwrap().contains_key(&mod_id)
    }

    pub fn all(&self) -> Vec<ModProfile> {
        self.profiles.read().unwrap().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.read().unwrap().is_empty()
    }

    /// Upsert: overwrite the cache entry and the on-disk record.
    pub fn put(&self, profile: ModProfile) -> AppResult<()> {
        validate_mod_profile(&profile).map_err(AppError::Domain)?;
        self.repo.save_profile(&profile)?;
        self.profiles.write().unwrap().insert(profile.id, profile);
        Ok(())
    }

    /// Delete the in-memory entry and the mod's directory tree.
    /// Irreversible; callers check retention first.
    pub fn remove(&self, mod_id: u64) -> AppResult<()> {
        self.repo.delete_mod(mod_id)?;
        self.profiles.write().unwrap().remove(&mod_id);
        Ok(())
    }

    /// Upsert a batch, classifying each profile as added or updated by
    /// whether its id was already cached.
    pub fn apply_bulk(&self, incoming: Vec<ModProfile>) -> AppResult<BulkApplyOutcome> {
        let mut outcome = BulkApplyOutcome::default();

        for profile in incoming {
            let existed = self.contains(profile.id);
            self.put(profile.clone())?;
            if existed {
                outcome.updated.push(profile);
            } else {
                outcome.added.push(profile);
            }
        }

        log::debug!(
            "bulk apply: {} added, {} updated",
            outcome.added.len(),
            outcome.updated.len()
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testutil::sample_profile;
    use crate::repositories::DiskModRepository;
    use tempfile::TempDir;

    fn cache(dir: &TempDir) -> (ModCache, Arc<DiskModRepository>) {
        let repo = Arc::new(DiskModRepository::new(dir.path()));
        (ModCache::new(Arc::clone(&repo) as Arc<dyn ModRepository>), repo)
    }

    #[test]
    fn test_apply_bulk_classifies_added_and_updated() {
        let dir = TempDir::new().unwrap();
        let (cache, _) = cache(&dir);

        cache.put(sample_profile(1)).unwrap();
        cache.put(sample_profile(2)).unwrap();

        let outcome = cache
            .apply_bulk(vec![sample_profile(2), sample_profile(3)])
            .unwrap();

        let added: Vec<u64> = outcome.added.iter().map(|p| p.id).collect();
        let updated: Vec<u64> = outcome.updated.iter().map(|p| p.id).collect();
        assert_eq!(added, vec![3]);
        assert_eq!(updated, vec![2]);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_put_persists_and_get_returns_clone() {
        let dir = TempDir::new().unwrap();
        let (cache, repo) = cache(&dir);

        let profile = sample_profile(5);
        cache.put(profile.clone()).unwrap();

        assert_eq!(cache.get(5), Some(profile.clone()));
        assert_eq!(repo.load_profile(5).unwrap(), Some(profile));
    }

    #[test]
    fn test_put_rejects_invalid_profile() {
        let dir = TempDir::new().unwrap();
        let (cache, _) = cache(&dir);

        let mut profile = sample_profile(5);
        profile.name = String::new();

        assert!(matches!(cache.put(profile), Err(AppError::Domain(_))));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove_deletes_directory() {
        let dir = TempDir::new().unwrap();
        let (cache, repo) = cache(&dir);

        cache.put(sample_profile(6)).unwrap();
        assert!(repo.mod_dir(6).exists());

        cache.remove(6).unwrap();

        assert!(cache.get(6).is_none());
        assert!(!repo.mod_dir(6).exists());
    }

    #[test]
    fn test_load_from_disk_rebuilds_map() {
        let dir = TempDir::new().unwrap();
        let (cache, repo) = cache(&dir);

        repo.save_profile(&sample_profile(1)).unwrap();
        repo.save_profile(&sample_profile(2)).unwrap();

        let count = cache.load_from_disk().unwrap();

        assert_eq!(count, 2);
        assert!(cache.contains(1));
        assert!(cache.contains(2));
    }
}
