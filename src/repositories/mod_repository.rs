// src/repositories/mod_repository.rs
//
// Per-mod persistence. Each mod owns one directory under `mods/`:
//
//   mods/<id>/mod_profile.data        serialized ModProfile
//   mods/<id>/modfile_<fid>.data      serialized Modfile record
//   mods/<id>/modfile_<fid>.zip       downloaded binary artifact
//   mods/<id>/logo/<version>.png      cached logo images
//   mods/<id>/gallery/<version>_<file>.png  cached gallery images

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{GalleryImageVersion, LogoVersion, ModBinaryStatus, ModProfile, Modfile};
use crate::error::AppResult;

pub trait ModRepository: Send + Sync {
    fn save_profile(&self, profile: &ModProfile) -> AppResult<()>;
    fn load_profile(&self, mod_id: u64) -> AppResult<Option<ModProfile>>;
    /// Load every parseable profile under `mods/`. Unreadable records are
    /// logged and skipped rather than failing the whole reload.
    fn load_all_profiles(&self) -> AppResult<Vec<ModProfile>>;
    /// Delete the mod's entire directory tree. Irreversible; callers must
    /// first confirm the mod is not locally retained.
    fn delete_mod(&self, mod_id: u64) -> AppResult<()>;

    fn save_modfile(&self, modfile: &Modfile) -> AppResult<()>;
    fn load_modfile(&self, mod_id: u64, modfile_id: u64) -> AppResult<Option<Modfile>>;

    fn mod_dir(&self, mod_id: u64) -> PathBuf;
    fn binary_path(&self, mod_id: u64, modfile_id: u64) -> PathBuf;
    fn logo_path(&self, mod_id: u64, version: LogoVersion) -> PathBuf;
    fn gallery_path(&self, mod_id: u64, version: GalleryImageVersion, file_name: &str) -> PathBuf;

    /// Compare on-disk artifacts against the profile's primary modfile.
    fn binary_status(&self, profile: &ModProfile) -> ModBinaryStatus;
    /// Path of the best available artifact: the primary one if present,
    /// otherwise any older artifact still on disk.
    fn current_binary_path(&self, profile: &ModProfile) -> Option<PathBuf>;
    /// True when at least one downloaded artifact exists for the mod.
    fn has_binaries(&self, mod_id: u64) -> bool;
    /// Remove every downloaded artifact for the mod, keeping its records.
    fn delete_binaries(&self, mod_id: u64) -> AppResult<()>;
}

pub struct DiskModRepository {
    root: PathBuf,
}

impl DiskModRepository {
    pub fn new(cache_root: &Path) -> Self {
        Self {
            root: cache_root.join("mods"),
        }
    }

    fn profile_path(&self, mod_id: u64) -> PathBuf {
        self.mod_dir(mod_id).join("mod_profile.data")
    }

    fn modfile_record_path(&self, mod_id: u64, modfile_id: u64) -> PathBuf {
        self.mod_dir(mod_id)
            .join(format!("modfile_{}.data", modfile_id))
    }

    fn binary_paths(&self, mod_id: u64) -> Vec<PathBuf> {
        let dir = self.mod_dir(mod_id);
        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };
        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.starts_with("modfile_") && name.ends_with(".zip"))
                    .unwrap_or(false)
            })
            .collect()
    }

    fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> AppResult<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }
}

impl ModRepository for DiskModRepository {
    fn save_profile(&self, profile: &ModProfile) -> AppResult<()> {
        let dir = self.mod_dir(profile.id);
        fs::create_dir_all(&dir)?;
        fs::write(self.profile_path(profile.id), serde_json::to_string(profile)?)?;
        Ok(())
    }

    fn load_profile(&self, mod_id: u64) -> AppResult<Option<ModProfile>> {
        Self::read_json(&self.profile_path(mod_id))
    }

    fn load_all_profiles(&self) -> AppResult<Vec<ModProfile>> {
        fs::create_dir_all(&self.root)?;

        let mut profiles = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let profile_path = entry.path().join("mod_profile.data");
            match Self::read_json::<ModProfile>(&profile_path) {
                Ok(Some(profile)) => profiles.push(profile),
                Ok(None) => {
                    log::warn!("mod directory without profile: {}", entry.path().display());
                }
                Err(e) => {
                    log::warn!(
                        "unable to parse mod profile at {}: {}",
                        profile_path.display(),
                        e
                    );
                }
            }
        }
        Ok(profiles)
    }

    fn delete_mod(&self, mod_id: u64) -> AppResult<()> {
        let dir = self.mod_dir(mod_id);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }

    fn save_modfile(&self, modfile: &Modfile) -> AppResult<()> {
        let dir = self.mod_dir(modfile.mod_id);
        fs::create_dir_all(&dir)?;
        fs::write(
            self.modfile_record_path(modfile.mod_id, modfile.id),
            serde_json::to_string(modfile)?,
        )?;
        Ok(())
    }

    fn load_modfile(&self, mod_id: u64, modfile_id: u64) -> AppResult<Option<Modfile>> {
        Self::read_json(&self.modfile_record_path(mod_id, modfile_id))
    }

    fn mod_dir(&self, mod_id: u64) -> PathBuf {
        self.root.join(mod_id.to_string())
    }

    fn binary_path(&self, mod_id: u64, modfile_id: u64) -> PathBuf {
        self.mod_dir(mod_id).join(format!("modfile_{}.zip", modfile_id))
    }

    fn logo_path(&self, mod_id: u64, version: LogoVersion) -> PathBuf {
        self.mod_dir(mod_id)
            .join("logo")
            .join(format!("{}.png", version))
    }

    fn gallery_path(&self, mod_id: u64, version: GalleryImageVersion, file_name: &str) -> PathBuf {
        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name);
        self.mod_dir(mod_id)
            .join("gallery")
            .join(format!("{}_{}.png", version, stem))
    }

    fn binary_status(&self, profile: &ModProfile) -> ModBinaryStatus {
        if self
            .binary_path(profile.id, profile.primary_modfile_id)
            .exists()
        {
            ModBinaryStatus::UpToDate
        } else if !self.binary_paths(profile.id).is_empty() {
            ModBinaryStatus::RequiresUpdate
        } else {
            ModBinaryStatus::Missing
        }
    }

    fn current_binary_path(&self, profile: &ModProfile) -> Option<PathBuf> {
        let primary = self.binary_path(profile.id, profile.primary_modfile_id);
        if primary.exists() {
            return Some(primary);
        }
        self.binary_paths(profile.id).into_iter().next()
    }

    fn has_binaries(&self, mod_id: u64) -> bool {
        !self.binary_paths(mod_id).is_empty()
    }

    fn delete_binaries(&self, mod_id: u64) -> AppResult<()> {
        for path in self.binary_paths(mod_id) {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testutil::{sample_modfile, sample_profile};
    use tempfile::TempDir;

    fn repo(dir: &TempDir) -> DiskModRepository {
        DiskModRepository::new(dir.path())
    }

    #[test]
    fn test_profile_round_trip() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);

        let profile = sample_profile(7);
        repo.save_profile(&profile).unwrap();

        let loaded = repo.load_profile(7).unwrap().unwrap();
        assert_eq!(loaded, profile);
        assert!(repo.load_profile(8).unwrap().is_none());
    }

    #[test]
    fn test_load_all_skips_unparseable_profiles() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);

        repo.save_profile(&sample_profile(1)).unwrap();
        repo.save_profile(&sample_profile(2)).unwrap();

        let broken_dir = dir.path().join("mods").join("3");
        std::fs::create_dir_all(&broken_dir).unwrap();
        std::fs::write(broken_dir.join("mod_profile.data"), "garbage").unwrap();

        let mut ids: Vec<u64> = repo
            .load_all_profiles()
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_modfile_record_round_trip() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);

        let modfile = sample_modfile(5, 50);
        repo.save_modfile(&modfile).unwrap();

        let loaded = repo.load_modfile(5, 50).unwrap().unwrap();
        assert_eq!(loaded, modfile);
        assert!(repo.load_modfile(5, 51).unwrap().is_none());
    }

    #[test]
    fn test_binary_status_transitions() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);

        let profile = sample_profile(4); // primary_modfile_id = 40
        repo.save_profile(&profile).unwrap();
        assert_eq!(repo.binary_status(&profile), ModBinaryStatus::Missing);

        // An older artifact only
        std::fs::write(repo.binary_path(4, 39), b"old").unwrap();
        assert_eq!(repo.binary_status(&profile), ModBinaryStatus::RequiresUpdate);
        assert_eq!(repo.current_binary_path(&profile), Some(repo.binary_path(4, 39)));

        // The primary artifact
        std::fs::write(repo.binary_path(4, 40), b"new").unwrap();
        assert_eq!(repo.binary_status(&profile), ModBinaryStatus::UpToDate);
        assert_eq!(repo.current_binary_path(&profile), Some(repo.binary_path(4, 40)));
    }

    #[test]
    fn test_delete_binaries_keeps_records() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);

        let profile = sample_profile(4);
        repo.save_profile(&profile).unwrap();
        repo.save_modfile(&sample_modfile(4, 40)).unwrap();
        std::fs::write(repo.binary_path(4, 40), b"zip").unwrap();
        assert!(repo.has_binaries(4));

        repo.delete_binaries(4).unwrap();

        assert!(!repo.has_binaries(4));
        assert!(repo.load_profile(4).unwrap().is_some());
        assert!(repo.load_modfile(4, 40).unwrap().is_some());
    }

    #[test]
    fn test_gallery_path_uses_version_and_file_stem() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);

        let path = repo.gallery_path(7, GalleryImageVersion::Thumb320x180, "screenshot.jpg");
        assert_eq!(
            path,
            repo.mod_dir(7).join("gallery").join("320x180_screenshot.png")
        );

        let path = repo.gallery_path(7, GalleryImageVersion::Original, "screenshot.jpg");
        assert_eq!(
            path,
            repo.mod_dir(7).join("gallery").join("original_screenshot.png")
        );
    }

    #[test]
    fn test_delete_mod_removes_directory_tree() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);

        let profile = sample_profile(9);
        repo.save_profile(&profile).unwrap();
        std::fs::write(repo.binary_path(9, 90), b"zip").unwrap();

        repo.delete_mod(9).unwrap();

        assert!(!repo.mod_dir(9).exists());
        // Deleting again is a no-op
        repo.delete_mod(9).unwrap();
    }
}
