use crate::browser::driver::{BrowserDriver, ListenerId, NetworkEvent};
use crate::error::Result;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Network activity subscription scoped to one condition wait.
///
/// Call [`NetworkMonitor::stop`] on every exit path. If the owning future is
/// dropped first, `Drop` schedules the same teardown on the current runtime.
pub struct NetworkMonitor {
    driver: Arc<dyn BrowserDriver>,
    listener: ListenerId,
    last_activity: Arc<Mutex<Instant>>,
    stopped: bool,
}

impl NetworkMonitor {
    /// Register the activity listener. Monitoring is not yet enabled.
    pub async fn attach(driver: Arc<dyn BrowserDriver>) -> Result<Self> {
        let last_activity = Arc::new(Mutex::new(Instant::now()));

        let activity = last_activity.clone();
        let listener = driver
            .add_network_listener(Arc::new(move |event: NetworkEvent| {
                log::trace!("Network activity: {:?}", event);
                if let Ok(mut last) = activity.lock() {
                    *last = Instant::now();
                }
            }))
            .await?;

        Ok(Self { driver, listener, last_activity, stopped: false })
    }

    pub async fn enable(&self) -> Result<()> {
        self.driver.enable_network_monitoring().await
    }

    /// Time since the last request started or finished (or since attach)
    pub fn idle_for(&self) -> Duration {
        let last = *self.last_activity.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Instant::now().saturating_duration_since(last)
    }

    /// Remove the listener and disable monitoring. Faults are logged, not returned.
    pub async fn stop(mut self) {
        self.stopped = true;
        teardown(self.driver.clone(), self.listener).await;
    }
}

async fn teardown(driver: Arc<dyn BrowserDriver>, listener: ListenerId) {
    if let Err(e) = driver.remove_network_listener(listener).await {
        log::warn!("Failed to remove network listener: {}", e);
    }
    if let Err(e) = driver.disable_network_monitoring().await {
        log::warn!("Failed to disable network monitoring: {}", e);
    }
}

impl Drop for NetworkMonitor {
    fn drop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                log::debug!("Network monitor dropped mid-wait, scheduling teardown");
                handle.spawn(teardown(self.driver.clone(), self.listener));
            }
            Err(_) => log::warn!("Network monitor dropped outside a runtime; listener leaked"),
        }
    }
}
