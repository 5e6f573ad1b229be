// src/services/subscription_service.rs
//
// Reconciles the locally stored subscribed-id set against the freshly
// fetched one, and forwards explicit subscribe/unsubscribe calls.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::events::{EventBus, SubscriptionAdded, SubscriptionRemoved};
use crate::integrations::CatalogClient;
use crate::services::session_service::SessionService;

pub struct SubscriptionService {
    client: Arc<dyn CatalogClient>,
    session: Arc<SessionService>,
    bus: Arc<EventBus>,
}

impl SubscriptionService {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        session: Arc<SessionService>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            client,
            session,
            bus,
        }
    }

    /// Diff the stored set against `current`, replace it, persist, then
    /// notify added and removed ids separately. Short-circuits without
    /// error when no session is open.
    pub fn reconcile(&self, current: impl IntoIterator<Item = u64>) -> AppResult<()> {
        let Some(previous) = self.session.subscribed_ids() else {
            log::debug!("no authenticated session, skipping subscription reconcile");
            return Ok(());
        };

        let current: BTreeSet<u64> = current.into_iter().collect();
        let added: Vec<u64> = current.difference(&previous).copied().collect();
        let removed: Vec<u64> = previous.difference(&current).copied().collect();

        self.session.set_subscribed_ids(current)?;

        if !added.is_empty() || !removed.is_empty() {
            log::info!(
                "subscriptions reconciled: {} added, {} removed",
                added.len(),
                removed.len()
            );
        }
        for mod_id in added {
            self.bus.emit(SubscriptionAdded::new(mod_id));
        }
        for mod_id in removed {
            self.bus.emit(SubscriptionRemoved::new(mod_id));
        }
        Ok(())
    }

    pub fn is_subscribed(&self, mod_id: u64) -> bool {
        self.session.is_subscribed(mod_id)
    }

    /// Subscribe remotely, then record locally.
    pub async fn subscribe(&self, mod_id: u64) -> AppResult<()> {
        let token = self
            .session
            .token()
            .ok_or_else(|| AppError::Other("no authenticated session".to_string()))?;

        if let Err(e) = self.client.subscribe(&token, mod_id).await {
            self.session.invalidate_on_auth_error(&e);
            return Err(e);
        }

        self.session.add_subscription(mod_id)?;
        self.bus.emit(SubscriptionAdded::new(mod_id));
        Ok(())
    }

    /// Unsubscribe remotely, then record locally.
    pub async fn unsubscribe(&self, mod_id: u64) -> AppResult<()> {
        let token = self
            .session
            .token()
            .ok_or_else(|| AppError::Other("no authenticated session".to_string()))?;

        if let Err(e) = self.client.unsubscribe(&token, mod_id).await {
            self.session.invalidate_on_auth_error(&e);
            return Err(e);
        }

        self.session.remove_subscription(mod_id)?;
        self.bus.emit(SubscriptionRemoved::new(mod_id));
        Ok(())
    }
}
