//! Ownership of the single live control channel.
//!
//! [`ConnectionManager`] is the only place a driver handle is created or dropped.
//! Everything else asks for one through [`ConnectionManager::ensure_connected`].

use crate::browser::config::ReconnectPolicy;
use crate::browser::driver::{BrowserDriver, Connector};
use crate::error::{BrowserError, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Observable lifecycle of the control channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Failed,
}

struct LiveHandle {
    driver: Arc<dyn BrowserDriver>,
    generation: u64,
}

#[derive(Default)]
struct Shared {
    live: Mutex<Option<LiveHandle>>,
    reconnecting: AtomicBool,
    ever_connected: AtomicBool,
    failed: AtomicBool,
    generation: AtomicU64,
    /// Bumped once per exhausted attempt sequence
    failed_sequences: AtomicU64,
    last_failure: Mutex<Option<(u32, String)>>,
}

impl Shared {
    fn live(&self) -> MutexGuard<'_, Option<LiveHandle>> {
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn last_failure(&self) -> MutexGuard<'_, Option<(u32, String)>> {
        self.last_failure.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn exhausted_error(&self) -> BrowserError {
        let (attempts, last_error) = self
            .last_failure()
            .clone()
            .unwrap_or_else(|| (0, "reconnect failed".to_string()));
        BrowserError::ReconnectExhausted { attempts, last_error }
    }
}

/// Clears the in-flight flag however the attempt sequence ends, including cancellation.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owns the live driver handle and serializes reconnect attempts
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    policy: ReconnectPolicy,
    shared: Arc<Shared>,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self::with_policy(connector, ReconnectPolicy::default())
    }

    pub fn with_policy(connector: Arc<dyn Connector>, policy: ReconnectPolicy) -> Self {
        Self { connector, policy, shared: Arc::new(Shared::default()) }
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        if self.shared.live().is_some() {
            ConnectionState::Connected
        } else if self.shared.reconnecting.load(Ordering::SeqCst) {
            if self.shared.ever_connected.load(Ordering::SeqCst) {
                ConnectionState::Reconnecting
            } else {
                ConnectionState::Connecting
            }
        } else if self.shared.failed.load(Ordering::SeqCst) {
            ConnectionState::Failed
        } else {
            ConnectionState::Disconnected
        }
    }

    /// The live handle, if any, without attempting to connect
    pub fn current(&self) -> Option<Arc<dyn BrowserDriver>> {
        self.shared.live().as_ref().map(|live| live.driver.clone())
    }

    /// Return the live handle, establishing one if needed.
    ///
    /// Concurrent callers share a single attempt sequence: while one is in flight,
    /// others sleep one backoff interval and look again, and report the sequence's
    /// failure rather than starting their own.
    pub async fn ensure_connected(&self) -> Result<Arc<dyn BrowserDriver>> {
        loop {
            if let Some(driver) = self.current() {
                return Ok(driver);
            }

            let failures_seen = self.shared.failed_sequences.load(Ordering::SeqCst);

            if self
                .shared
                .reconnecting
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                let _in_flight = InFlight(&self.shared.reconnecting);
                return self.run_attempts().await;
            }

            log::debug!("Connection attempt already in flight, waiting {}ms", self.policy.backoff_ms);
            tokio::time::sleep(self.policy.backoff()).await;

            if self.current().is_none()
                && self.shared.failed_sequences.load(Ordering::SeqCst) != failures_seen
            {
                return Err(self.shared.exhausted_error());
            }
        }
    }

    async fn run_attempts(&self) -> Result<Arc<dyn BrowserDriver>> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match self.connector.connect().await {
                Ok(driver) => {
                    self.install(driver.clone());
                    log::info!("Control channel connected on attempt {}/{}", attempt, max_attempts);
                    return Ok(driver);
                }
                Err(e) => {
                    log::warn!("Connection attempt {}/{} failed: {}", attempt, max_attempts, e);
                    last_error = e.to_string();
                    if attempt < max_attempts {
                        tokio::time::sleep(self.policy.backoff()).await;
                    }
                }
            }
        }

        *self.shared.last_failure() = Some((max_attempts, last_error));
        self.shared.failed.store(true, Ordering::SeqCst);
        self.shared.failed_sequences.fetch_add(1, Ordering::SeqCst);

        Err(self.shared.exhausted_error())
    }

    fn install(&self, driver: Arc<dyn BrowserDriver>) {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.shared.live() = Some(LiveHandle { driver: driver.clone(), generation });
        self.shared.ever_connected.store(true, Ordering::SeqCst);
        self.shared.failed.store(false, Ordering::SeqCst);

        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        driver.on_disconnect(Arc::new(move || {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let mut live = shared.live();
            if live.as_ref().is_some_and(|handle| handle.generation == generation) {
                *live = None;
                log::info!("Control channel disconnected");
            }
        }));
    }

    /// Drop and close the live handle, if any
    pub async fn disconnect(&self) -> Result<()> {
        let handle = self.shared.live().take();
        match handle {
            Some(handle) => handle.driver.close().await,
            None => Ok(()),
        }
    }
}
