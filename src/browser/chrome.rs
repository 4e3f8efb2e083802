//! [`BrowserDriver`] over `headless_chrome`.
//!
//! `headless_chrome` is synchronous, so every CDP round trip runs on the blocking
//! pool. Element lookups go through page scripts with the selector bound as a JSON
//! literal.

use crate::browser::config::{ConnectionOptions, LaunchOptions};
use crate::browser::driver::{
    BrowserDriver, Connector, DisconnectCallback, ElementHandle, KeyEventKind, ListenerId, MouseButton,
    NetworkCallback, NetworkEvent, PointerEventKind,
};
use crate::dom::{BoundingBox, Script};
use crate::error::{BrowserError, Result};
use async_trait::async_trait;
use headless_chrome::browser::tab::EventListener;
use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::protocol::cdp::{Input, Network};
use headless_chrome::{Browser, Tab};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

type ChromeListener = dyn EventListener<Event> + Send + Sync;

/// How to obtain a browser for each connection attempt
#[derive(Debug, Clone)]
pub enum ChromeConnector {
    /// Launch a local Chrome/Chromium
    Launch(LaunchOptions),
    /// Attach to a running browser's DevTools WebSocket
    Connect(ConnectionOptions),
}

#[async_trait]
impl Connector for ChromeConnector {
    async fn connect(&self) -> Result<Arc<dyn BrowserDriver>> {
        let target = self.clone();
        let driver = tokio::task::spawn_blocking(move || match target {
            ChromeConnector::Launch(options) => ChromeDriver::launch(options),
            ChromeConnector::Connect(options) => ChromeDriver::attach(options),
        })
        .await
        .map_err(|e| BrowserError::ConnectionFailed(format!("Connection task failed: {}", e)))??;

        Ok(Arc::new(driver))
    }
}

/// One page of a Chrome instance driven over CDP
///
/// `headless_chrome` exposes no hook for transport closure, so a lost
/// connection is only noticed when a CDP call fails with a closed-connection
/// error. The disconnect callbacks then fire once. A channel that drops while
/// the driver is idle is reported on the next call, not when it happens.
pub struct ChromeDriver {
    /// Keeps the browser (and, when launched, its process) alive
    _browser: Browser,
    tab: Arc<Tab>,
    listeners: Mutex<HashMap<ListenerId, Weak<ChromeListener>>>,
    next_listener: AtomicU64,
    disconnect_callbacks: Mutex<Vec<DisconnectCallback>>,
    disconnected: AtomicBool,
}

impl ChromeDriver {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // Keep the browser alive for an hour of inactivity instead of 30 seconds
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.path = options.chrome_path;
        launch_opts.user_data_dir = options.user_data_dir;
        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        log::info!("Launched browser (headless: {})", options.headless);
        Ok(Self::with_tab(browser, tab))
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn attach(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url.clone(), options.idle_timeout())
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;
        let tab = active_tab(&browser)?;

        log::info!("Attached to browser at {}", options.ws_url);
        Ok(Self::with_tab(browser, tab))
    }

    fn with_tab(browser: Browser, tab: Arc<Tab>) -> Self {
        Self {
            _browser: browser,
            tab,
            listeners: Mutex::new(HashMap::new()),
            next_listener: AtomicU64::new(1),
            disconnect_callbacks: Mutex::new(Vec::new()),
            disconnected: AtomicBool::new(false),
        }
    }

    /// Run a blocking CDP call on the blocking pool, classifying its failure
    async fn run<T, E, F>(&self, wrap: fn(String) -> BrowserError, f: F) -> Result<T>
    where
        T: Send + 'static,
        E: Display + Send + 'static,
        F: FnOnce(&Tab) -> std::result::Result<T, E> + Send + 'static,
    {
        let tab = self.tab.clone();
        let outcome = tokio::task::spawn_blocking(move || f(&tab))
            .await
            .map_err(|e| BrowserError::Driver(format!("CDP task failed: {}", e)))?;

        outcome.map_err(|e| {
            let message = e.to_string();
            if looks_disconnected(&message) {
                self.signal_disconnect();
                BrowserError::ConnectionLost(message)
            } else {
                wrap(message)
            }
        })
    }

    async fn eval_script(&self, script: Script) -> Result<Value> {
        self.evaluate(&script.to_expression()).await
    }

    fn signal_disconnect(&self) {
        if self.disconnected.swap(true, Ordering::SeqCst) {
            return;
        }
        log::warn!("CDP connection closed");
        let callbacks = self.disconnect_callbacks.lock().map(|cbs| cbs.clone()).unwrap_or_default();
        for callback in callbacks {
            callback();
        }
    }
}

/// Pick the visible, focused tab, falling back to the first one
fn active_tab(browser: &Browser) -> Result<Arc<Tab>> {
    let tabs = browser
        .get_tabs()
        .lock()
        .map_err(|e| BrowserError::ConnectionFailed(format!("Failed to get tabs: {}", e)))?
        .clone();

    for tab in &tabs {
        match tab.evaluate("document.visibilityState === 'visible' && document.hasFocus()", false) {
            Ok(remote_object) => {
                if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                    return Ok(tab.clone());
                }
            }
            Err(e) => {
                log::debug!("Failed to check tab status: {}", e);
            }
        }
    }

    match tabs.into_iter().next() {
        Some(tab) => Ok(tab),
        None => browser
            .new_tab()
            .map_err(|e| BrowserError::ConnectionFailed(format!("Failed to create tab: {}", e))),
    }
}

fn looks_disconnected(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["connection is closed", "connection closed", "connectionclosed", "channel closed", "broken pipe"]
        .iter()
        .any(|needle| lower.contains(needle))
}

fn looks_like_bad_selector(message: &str) -> bool {
    message.contains("SyntaxError") || message.contains("is not a valid selector")
}

/// Build CDP method params from their wire JSON, leaving optional fields unset
fn cdp_params<T: DeserializeOwned>(params: Value) -> Result<T> {
    serde_json::from_value(params).map_err(|e| BrowserError::Driver(format!("Malformed CDP params: {}", e)))
}

fn button_name(button: MouseButton) -> &'static str {
    match button {
        MouseButton::Left => "left",
        MouseButton::Middle => "middle",
        MouseButton::Right => "right",
    }
}

/// CDP key name and inserted text for one character
fn key_for(c: char) -> (String, String) {
    match c {
        '\n' | '\r' => ("Enter".to_string(), "\r".to_string()),
        '\t' => ("Tab".to_string(), "\t".to_string()),
        other => (other.to_string(), other.to_string()),
    }
}

#[async_trait]
impl BrowserDriver for ChromeDriver {
    async fn query_element(&self, selector: &str) -> Result<Option<ElementHandle>> {
        let found = match self.eval_script(Script::query_element(selector)).await {
            Ok(value) => value.as_bool().unwrap_or(false),
            Err(BrowserError::EvaluationFailed(reason)) if looks_like_bad_selector(&reason) => {
                return Err(BrowserError::InvalidSelector { selector: selector.to_string(), reason });
            }
            Err(e) => return Err(e),
        };

        Ok(found.then(|| ElementHandle::new(selector)))
    }

    async fn bounding_box(&self, handle: &ElementHandle) -> Result<BoundingBox> {
        let value = self.eval_script(Script::bounding_box(handle.selector())).await?;
        if value.is_null() {
            return Err(BrowserError::ElementNotFound { selector: handle.selector().to_string() });
        }
        serde_json::from_value(value)
            .map_err(|e| BrowserError::EvaluationFailed(format!("Malformed bounding box: {}", e)))
    }

    async fn dispatch_pointer_event(
        &self,
        kind: PointerEventKind,
        x: f64,
        y: f64,
        button: MouseButton,
    ) -> Result<()> {
        let event_type = match kind {
            PointerEventKind::Move => "mouseMoved",
            PointerEventKind::Press => "mousePressed",
            PointerEventKind::Release => "mouseReleased",
        };
        let mut params = json!({ "type": event_type, "x": x, "y": y });
        if kind != PointerEventKind::Move {
            params["button"] = json!(button_name(button));
            params["clickCount"] = json!(1);
        }
        let method: Input::DispatchMouseEvent = cdp_params(params)?;

        self.run(BrowserError::Driver, move |tab| tab.call_method(method).map(|_| ())).await
    }

    async fn dispatch_key_event(&self, kind: KeyEventKind, key: char) -> Result<()> {
        let (key_name, text) = key_for(key);
        let mut params = match kind {
            KeyEventKind::Down => json!({ "type": "keyDown", "key": key_name }),
            KeyEventKind::Up => json!({ "type": "keyUp", "key": key_name }),
        };
        if kind == KeyEventKind::Down {
            params["text"] = json!(text);
        }
        let method: Input::DispatchKeyEvent = cdp_params(params)?;

        self.run(BrowserError::Driver, move |tab| tab.call_method(method).map(|_| ())).await
    }

    async fn focus(&self, handle: &ElementHandle) -> Result<()> {
        let focused = self.eval_script(Script::focus(handle.selector())).await?;
        if focused.as_bool().unwrap_or(false) {
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound { selector: handle.selector().to_string() })
        }
    }

    async fn evaluate(&self, expression: &str) -> Result<Value> {
        let expression = expression.to_string();
        let remote_object = self
            .run(BrowserError::EvaluationFailed, move |tab| tab.evaluate(&expression, true))
            .await?;
        Ok(remote_object.value.unwrap_or(Value::Null))
    }

    async fn current_url(&self) -> Result<String> {
        self.run(BrowserError::Driver, |tab| Ok::<_, anyhow::Error>(tab.get_url())).await
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        let url = url.to_string();
        self.run(BrowserError::NavigationFailed, move |tab| {
            tab.navigate_to(&url)?.wait_until_navigated()?;
            Ok::<_, anyhow::Error>(())
        })
        .await
    }

    async fn add_network_listener(&self, callback: NetworkCallback) -> Result<ListenerId> {
        let listener: Arc<ChromeListener> = Arc::new(move |event: &Event| match event {
            Event::NetworkRequestWillBeSent(_) => callback(NetworkEvent::RequestStarted),
            Event::NetworkLoadingFinished(_) | Event::NetworkLoadingFailed(_) => {
                callback(NetworkEvent::RequestFinished)
            }
            _ => {}
        });

        let weak = self.run(BrowserError::Driver, move |tab| tab.add_event_listener(listener)).await?;

        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::SeqCst));
        self.listeners
            .lock()
            .map_err(|e| BrowserError::Driver(format!("Listener registry poisoned: {}", e)))?
            .insert(id, weak);
        Ok(id)
    }

    async fn remove_network_listener(&self, id: ListenerId) -> Result<()> {
        let weak = self
            .listeners
            .lock()
            .map_err(|e| BrowserError::Driver(format!("Listener registry poisoned: {}", e)))?
            .remove(&id);

        match weak {
            Some(weak) => self.run(BrowserError::Driver, move |tab| tab.remove_event_listener(&weak)).await,
            None => Ok(()),
        }
    }

    async fn enable_network_monitoring(&self) -> Result<()> {
        let method: Network::Enable = cdp_params(json!({}))?;
        self.run(BrowserError::Driver, move |tab| tab.call_method(method).map(|_| ())).await
    }

    async fn disable_network_monitoring(&self) -> Result<()> {
        self.run(BrowserError::Driver, |tab| tab.call_method(Network::Disable(None)).map(|_| ())).await
    }

    fn on_disconnect(&self, callback: DisconnectCallback) {
        if self.disconnected.load(Ordering::SeqCst) {
            callback();
            return;
        }
        if let Ok(mut callbacks) = self.disconnect_callbacks.lock() {
            callbacks.push(callback);
        }
    }

    async fn close(&self) -> Result<()> {
        self.run(BrowserError::Driver, |tab| tab.close(false).map(|_| ())).await
    }
}
