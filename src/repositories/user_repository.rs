// src/repositories/user_repository.rs
//
// Authenticated-session persistence: `user.data`, absent when logged out.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::AuthenticatedUser;
use crate::error::{AppError, AppResult};

pub trait UserRepository: Send + Sync {
    /// Load the persisted session, if any. An unparseable file is treated
    /// as logged out.
    fn load(&self) -> AppResult<Option<AuthenticatedUser>>;
    fn save(&self, user: &AuthenticatedUser) -> AppResult<()>;
    fn delete(&self) -> AppResult<()>;
}

pub struct JsonUserRepository {
    path: PathBuf,
}

impl JsonUserRepository {
    pub fn new(cache_root: &Path) -> Self {
        Self {
            path: cache_root.join("user.data"),
        }
    }

    /// Read the file as-is. An unparseable file surfaces as CorruptState
    /// so the caller decides whether to discard the session.
    fn read(&self) -> AppResult<AuthenticatedUser> {
        let raw = fs::read_to_string(&self.path)?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::CorruptState(format!(
                "session at {} is not parseable: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl UserRepository for JsonUserRepository {
    fn load(&self) -> AppResult<Option<AuthenticatedUser>> {
        if !self.path.exists() {
            return Ok(None);
        }
        match self.read() {
            Ok(user) => Ok(Some(user)),
            Err(AppError::CorruptState(e)) => {
                log::warn!("treating session as logged out: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn save(&self, user: &AuthenticatedUser) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("data.tmp");
        fs::write(&tmp_path, serde_json::to_string(user)?)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn delete(&self) -> AppResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserProfile;
    use tempfile::TempDir;

    #[test]
    fn test_session_round_trip_and_delete() {
        let dir = TempDir::new().unwrap();
        let repo = JsonUserRepository::new(dir.path());

        assert!(repo.load().unwrap().is_none());

        let mut user = AuthenticatedUser::new(
            "token-abc".to_string(),
            UserProfile {
                id: 11,
                username: "someone".to_string(),
            },
        );
        user.subscribed_mod_ids.insert(3);
        user.subscribed_mod_ids.insert(5);

        repo.save(&user).unwrap();
        assert_eq!(repo.load().unwrap().unwrap(), user);

        repo.delete().unwrap();
        assert!(repo.load().unwrap().is_none());
        // Deleting again is a no-op
        repo.delete().unwrap();
    }

    #[test]
    fn test_corrupt_session_treated_as_logged_out() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("user.data"), "???").unwrap();

        let repo = JsonUserRepository::new(dir.path());
        assert!(repo.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_session_reads_as_corrupt_state() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("user.data"), "???").unwrap();

        let repo = JsonUserRepository::new(dir.path());
        let err = repo.read().unwrap_err();

        assert!(matches!(err, AppError::CorruptState(_)));
    }
}
