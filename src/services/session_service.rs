// src/services/session_service.rs
//
// Owns the authenticated session. Login validates the token against the
// remote; any later 401/403 anywhere in the engine invalidates the
// session locally rather than retrying.

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use crate::domain::{AuthenticatedUser, UserProfile};
use crate::error::{AppError, AppResult};
use crate::events::{EventBus, UserLoggedOut};
use crate::integrations::CatalogClient;
use crate::repositories::UserRepository;

pub struct SessionService {
    client: Arc<dyn CatalogClient>,
    repo: Arc<dyn UserRepository>,
    bus: Arc<EventBus>,
    user: RwLock<Option<AuthenticatedUser>>,
}

impl SessionService {
    /// Create the service, restoring any persisted session from disk.
    pub fn load(
        client: Arc<dyn CatalogClient>,
        repo: Arc<dyn UserRepository>,
        bus: Arc<EventBus>,
    ) -> AppResult<Self> {
        let user = repo.load()?;
        if let Some(ref user) = user {
            log::info!("restored session for user {}", user.profile.username);
        }
        Ok(Self {
            client,
            repo,
            bus,
            user: RwLock::new(user),
        })
    }

    pub fn authenticated_user(&self) -> Option<AuthenticatedUser> {
        self.user.read().unwrap().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.user.read().unwrap().as_ref().map(|u| u.token.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.read().unwrap().is_some()
    }

    pub fn is_subscribed(&self, mod_id: u64) -> bool {
        self.user
            .read()
            .unwrap()
            .as_ref()
            .map(|u| u.is_subscribed(mod_id))
            .unwrap_or(false)
    }

    /// Current subscribed-id set, or None when logged out.
    pub fn subscribed_ids(&self) -> Option<BTreeSet<u64>> {
        self.user
            .read()
            .unwrap()
            .as_ref()
            .map(|u| u.subscribed_mod_ids.clone())
    }

    /// Replace the subscribed-id set and persist. No-op when logged out.
    pub fn set_subscribed_ids(&self, ids: BTreeSet<u64>) -> AppResult<()> {
        let mut guard = self.user.write().unwrap();
        let Some(user) = guard.as_mut() else {
            return Ok(());
        };
        user.subscribed_mod_ids = ids;
        self.repo.save(user)
    }

    pub fn add_subscription(&self, mod_id: u64) -> AppResult<()> {
        let mut guard = self.user.write().unwrap();
        let Some(user) = guard.as_mut() else {
            return Ok(());
        };
        user.subscribed_mod_ids.insert(mod_id);
        self.repo.save(user)
    }

    pub fn remove_subscription(&self, mod_id: u64) -> AppResult<()> {
        let mut guard = self.user.write().unwrap();
        let Some(user) = guard.as_mut() else {
            return Ok(());
        };
        user.subscribed_mod_ids.remove(&mod_id);
        self.repo.save(user)
    }

    /// Validate a token against the remote and open a session.
    pub async fn log_in(&self, token: String) -> AppResult<UserProfile> {
        let profile = self.client.get_authenticated_user(&token).await?;
        log::info!("logged in as {}", profile.username);

        let user = AuthenticatedUser::new(token, profile.clone());
        self.repo.save(&user)?;
        *self.user.write().unwrap() = Some(user);

        Ok(profile)
    }

    /// Drop the session locally: clear memory, delete `user.data`, notify.
    pub fn log_out(&self) -> AppResult<()> {
        let had_session = self.user.write().unwrap().take().is_some();
        self.repo.delete()?;
        if had_session {
            log::info!("user logged out");
            self.bus.emit(UserLoggedOut::new());
        }
        Ok(())
    }

    /// Log out if the given failure was an authentication rejection.
    pub fn invalidate_on_auth_error(&self, error: &AppError) {
        if error.is_auth() && self.is_logged_in() {
            log::warn!("authenticated call rejected ({}), logging out", error);
            if let Err(e) = self.log_out() {
                log::error!("unable to clear session: {}", e);
            }
        }
    }

    /// Re-check a restored session against the remote. Called once at
    /// bootstrap; a 401/403 clears the stale session, transient failures
    /// leave it in place.
    pub async fn validate_persisted(&self) {
        let Some(token) = self.token() else {
            return;
        };
        match self.client.get_authenticated_user(&token).await {
            Ok(profile) => {
                log::debug!("persisted session still valid for {}", profile.username);
            }
            Err(e) => {
                self.invalidate_on_auth_error(&e);
                if !e.is_auth() {
                    log::warn!("unable to validate persisted session: {}", e);
                }
            }
        }
    }
}
