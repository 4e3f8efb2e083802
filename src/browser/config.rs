use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Options for launching a new browser instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchOptions {
    /// Run the browser without a visible window (default: true)
    pub headless: bool,

    /// Window width in pixels
    pub window_width: u32,

    /// Window height in pixels
    pub window_height: u32,

    /// Custom Chrome/Chromium executable
    pub chrome_path: Option<PathBuf>,

    /// Persistent profile directory
    pub user_data_dir: Option<PathBuf>,

    /// Enable the Chrome sandbox (default: true)
    pub sandbox: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1280,
            window_height: 800,
            chrome_path: None,
            user_data_dir: None,
            sandbox: true,
        }
    }
}

impl LaunchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Builder method: set window size
    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Builder method: set Chrome binary path
    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    /// Builder method: set user data directory
    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    /// Builder method: set sandbox mode
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }
}

/// Options for attaching to a running browser over its DevTools WebSocket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionOptions {
    /// e.g. `ws://127.0.0.1:9222/devtools/browser/<id>`
    pub ws_url: String,

    /// How long the attached connection may stay idle before it is dropped, in milliseconds
    #[serde(default = "default_connection_timeout")]
    pub timeout: u64,
}

fn default_connection_timeout() -> u64 {
    30_000
}

impl ConnectionOptions {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self { ws_url: ws_url.into(), timeout: default_connection_timeout() }
    }

    /// Builder method: set connection timeout in milliseconds
    pub fn timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }
}

/// Retry policy applied when the control channel must be (re)established
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReconnectPolicy {
    /// Maximum `connect()` attempts per sequence
    pub max_attempts: u32,

    /// Fixed delay between attempts, in milliseconds
    pub backoff_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_attempts: 5, backoff_ms: 2_000 }
    }
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, backoff_ms: u64) -> Self {
        Self { max_attempts: max_attempts.max(1), backoff_ms }
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Tuning constants for readiness and condition polling.
///
/// The defaults are empirical: a 1px stability tolerance, a 100ms settle window
/// between position samples and a 50ms settle after simulated hover/focus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Timings {
    /// Delay between the two bounding box samples of a stability check
    pub stability_window_ms: u64,

    /// Maximum per-edge movement still considered stable
    pub stability_tolerance_px: f64,

    /// Readiness poll interval
    pub readiness_poll_ms: u64,

    /// Default readiness timeout
    pub readiness_timeout_ms: u64,

    /// Condition wait poll interval
    pub condition_poll_ms: u64,

    /// Default condition wait timeout
    pub condition_timeout_ms: u64,

    /// Hard ceiling for any condition wait timeout
    pub condition_timeout_cap_ms: u64,

    /// Settle delay after hover and focus when `ensure_interactive` is set
    pub interaction_settle_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            stability_window_ms: 100,
            stability_tolerance_px: 1.0,
            readiness_poll_ms: 50,
            readiness_timeout_ms: 5_000,
            condition_poll_ms: 100,
            condition_timeout_ms: 5_000,
            condition_timeout_cap_ms: 30_000,
            interaction_settle_ms: 50,
        }
    }
}

impl Timings {
    pub fn stability_window(&self) -> Duration {
        Duration::from_millis(self.stability_window_ms)
    }

    pub fn readiness_poll(&self) -> Duration {
        Duration::from_millis(self.readiness_poll_ms)
    }

    pub fn condition_poll(&self) -> Duration {
        Duration::from_millis(self.condition_poll_ms)
    }

    pub fn interaction_settle(&self) -> Duration {
        Duration::from_millis(self.interaction_settle_ms)
    }

    /// Effective condition wait timeout: the default when absent, clamped to the ceiling
    pub fn condition_timeout(&self, requested_ms: Option<u64>) -> Duration {
        let ms = requested_ms.unwrap_or(self.condition_timeout_ms).min(self.condition_timeout_cap_ms);
        Duration::from_millis(ms)
    }
}
