// src/events/mod.rs
//
// Notification layer: a synchronous typed bus plus the event set the
// sync engine publishes on it.

pub mod bus;
pub mod types;

pub use bus::{EventBus, EventLogEntry};
pub use types::{
    BinaryDownloaded, CatalogProfileRefreshed, DomainEvent, ModAdded, ModGalleryImageUpdated,
    ModLogoUpdated, ModRemoved, ModUpdated, ModfileChanged, SubscriptionAdded, SubscriptionRemoved,
    UserLoggedOut,
};

use std::sync::Arc;

/// Create a shared event bus
pub fn create_event_bus() -> Arc<EventBus> {
    Arc::new(EventBus::new())
}
