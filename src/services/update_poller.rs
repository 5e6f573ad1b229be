// src/services/update_poller.rs
//
// Background polling loop driving the sync engine.
//
// - Runs in a background task
// - Calls SyncService::poll_once every interval
// - Does NOT hold any state of its own; the manifest cursor decides
//   whether a wakeup actually syncs

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::services::sync_service::SyncService;

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub poll_interval_ms: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 15_000,
        }
    }
}

pub struct UpdatePoller {
    sync: Arc<SyncService>,
    config: PollerConfig,
    task_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl UpdatePoller {
    pub fn new(sync: Arc<SyncService>, config: PollerConfig) -> Self {
        Self {
            sync,
            config,
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the loop. Calling this while already enabled restarts the
    /// interval rather than stacking a second task.
    pub fn enable(&self) {
        self.disable();
        self.spawn_poll_task();
    }

    /// Stop the loop. Idempotent; a pass already in flight is aborted.
    pub fn disable(&self) {
        let mut handle = self.task_handle.lock().unwrap();
        if let Some(task) = handle.take() {
            task.abort();
            log::debug!("update polling disabled");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.task_handle.lock().unwrap().is_some()
    }

    fn spawn_poll_task(&self) {
        let sync = Arc::clone(&self.sync);
        let interval = Duration::from_millis(self.config.poll_interval_ms);

        let task = tokio::spawn(async move {
            log::info!("update polling enabled ({:?} interval)", interval);
            loop {
                tokio::time::sleep(interval).await;

                if let Err(e) = sync.poll_once(Utc::now()).await {
                    // Left to the next wakeup; the cursor did not advance
                    log::warn!("sync pass failed: {}", e);
                }
            }
        });

        let mut handle = self.task_handle.lock().unwrap();
        *handle = Some(task);
    }
}

impl Drop for UpdatePoller {
    fn drop(&mut self) {
        self.disable();
    }
}
