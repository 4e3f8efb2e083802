//! Scripted driver and connector for integration tests.
//!
//! Each integration test file compiles common/ as its own module, so not
//! every helper is used in every file.
#![allow(dead_code)]

use async_trait::async_trait;
use browser_readiness::browser::{
    BrowserDriver, Connector, DisconnectCallback, ElementHandle, KeyEventKind, ListenerId, MouseButton,
    NetworkCallback, NetworkEvent, PointerEventKind,
};
use browser_readiness::dom::sources;
use browser_readiness::{BoundingBox, BrowserError, Result};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Something the page was asked to do, in dispatch order
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    PointerMove(f64, f64),
    PointerPress(f64, f64),
    PointerRelease(f64, f64),
    KeyDown(char),
    KeyUp(char),
    Focus(String),
}

/// One element's scripted geometry. Each bounding box read consumes the front
/// sample; the last sample repeats forever. `None` means "not in the DOM".
struct MockElement {
    samples: VecDeque<Option<BoundingBox>>,
    visible: bool,
    enabled: bool,
}

impl MockElement {
    fn current(&self) -> Option<BoundingBox> {
        self.samples.front().copied().flatten()
    }

    fn take(&mut self) -> Option<BoundingBox> {
        if self.samples.len() > 1 {
            self.samples.pop_front().flatten()
        } else {
            self.current()
        }
    }
}

#[derive(Default)]
pub struct MockDriver {
    elements: Mutex<HashMap<String, MockElement>>,
    page_text: Mutex<String>,
    url: Mutex<String>,
    recorded: Mutex<Vec<Recorded>>,
    listeners: Mutex<HashMap<u64, NetworkCallback>>,
    next_listener: AtomicU64,
    disconnect_callbacks: Mutex<Vec<DisconnectCallback>>,

    pub fail_evaluate: AtomicBool,
    pub fail_current_url: AtomicBool,
    pub fail_enable_network: AtomicBool,
    connection_lost: AtomicBool,

    pub enable_network_calls: AtomicU32,
    pub disable_network_calls: AtomicU32,
    pub listeners_added: AtomicU32,
    pub listeners_removed: AtomicU32,
    pub close_calls: AtomicU32,
}

impl MockDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A visible, enabled element that never moves
    pub fn add_element(&self, selector: &str, bbox: BoundingBox) {
        self.add_element_with(selector, vec![Some(bbox)], true, true);
    }

    pub fn add_element_with(
        &self,
        selector: &str,
        samples: Vec<Option<BoundingBox>>,
        visible: bool,
        enabled: bool,
    ) {
        self.elements
            .lock()
            .unwrap()
            .insert(selector.to_string(), MockElement { samples: samples.into(), visible, enabled });
    }

    pub fn remove_element(&self, selector: &str) {
        self.elements.lock().unwrap().remove(selector);
    }

    pub fn set_enabled(&self, selector: &str, enabled: bool) {
        if let Some(element) = self.elements.lock().unwrap().get_mut(selector) {
            element.enabled = enabled;
        }
    }

    pub fn set_page_text(&self, text: &str) {
        *self.page_text.lock().unwrap() = text.to_string();
    }

    pub fn set_url(&self, url: &str) {
        *self.url.lock().unwrap() = url.to_string();
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn active_listeners(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    pub fn emit_network(&self, event: NetworkEvent) {
        let callbacks: Vec<NetworkCallback> = self.listeners.lock().unwrap().values().cloned().collect();
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn trigger_disconnect(&self) {
        let callbacks = self.disconnect_callbacks.lock().unwrap().clone();
        for callback in callbacks {
            callback();
        }
    }

    /// Every later page call fails as a closed channel; disconnect callbacks fire once
    pub fn lose_connection(&self) {
        if !self.connection_lost.swap(true, Ordering::SeqCst) {
            self.trigger_disconnect();
        }
    }

    fn check_connected(&self) -> Result<()> {
        if self.connection_lost.load(Ordering::SeqCst) {
            return Err(BrowserError::ConnectionLost("connection is closed".to_string()));
        }
        Ok(())
    }

    fn record(&self, event: Recorded) {
        self.recorded.lock().unwrap().push(event);
    }

    fn current_box(&self, selector: &str) -> Option<BoundingBox> {
        self.elements.lock().unwrap().get(selector).and_then(MockElement::current)
    }
}

/// Extract the single JSON argument of a `(function ...)(arg)` expression
fn script_arg(expression: &str, source: &str) -> Option<Value> {
    let prefix = format!("({})(", source.trim());
    let rest = expression.strip_prefix(&prefix)?.strip_suffix(')')?;
    serde_json::from_str(rest).ok()
}

#[async_trait]
impl BrowserDriver for MockDriver {
    async fn query_element(&self, selector: &str) -> Result<Option<ElementHandle>> {
        self.check_connected()?;
        if selector.starts_with("##") {
            return Err(BrowserError::InvalidSelector {
                selector: selector.to_string(),
                reason: "SyntaxError".to_string(),
            });
        }
        Ok(self.current_box(selector).map(|_| ElementHandle::new(selector)))
    }

    async fn bounding_box(&self, handle: &ElementHandle) -> Result<BoundingBox> {
        self.check_connected()?;
        self.elements
            .lock()
            .unwrap()
            .get_mut(handle.selector())
            .and_then(MockElement::take)
            .ok_or_else(|| BrowserError::ElementNotFound { selector: handle.selector().to_string() })
    }

    async fn dispatch_pointer_event(
        &self,
        kind: PointerEventKind,
        x: f64,
        y: f64,
        _button: MouseButton,
    ) -> Result<()> {
        self.record(match kind {
            PointerEventKind::Move => Recorded::PointerMove(x, y),
            PointerEventKind::Press => Recorded::PointerPress(x, y),
            PointerEventKind::Release => Recorded::PointerRelease(x, y),
        });
        Ok(())
    }

    async fn dispatch_key_event(&self, kind: KeyEventKind, key: char) -> Result<()> {
        self.record(match kind {
            KeyEventKind::Down => Recorded::KeyDown(key),
            KeyEventKind::Up => Recorded::KeyUp(key),
        });
        Ok(())
    }

    async fn focus(&self, handle: &ElementHandle) -> Result<()> {
        self.record(Recorded::Focus(handle.selector().to_string()));
        Ok(())
    }

    async fn evaluate(&self, expression: &str) -> Result<Value> {
        self.check_connected()?;
        if self.fail_evaluate.load(Ordering::SeqCst) {
            return Err(BrowserError::EvaluationFailed("Execution context was destroyed".to_string()));
        }

        if let Some(Value::String(selector)) = script_arg(expression, sources::INTERACTABILITY) {
            let elements = self.elements.lock().unwrap();
            return Ok(match elements.get(&selector).filter(|e| e.current().is_some()) {
                Some(element) => json!({ "found": true, "visible": element.visible, "enabled": element.enabled }),
                None => json!({ "found": false, "visible": false, "enabled": false }),
            });
        }

        if let Some(Value::String(needle)) = script_arg(expression, sources::TEXT_SEARCH) {
            let haystack = self.page_text.lock().unwrap().to_lowercase();
            return Ok(Value::Bool(haystack.contains(&needle.to_lowercase())));
        }

        Err(BrowserError::EvaluationFailed(format!("unexpected script: {}", expression)))
    }

    async fn current_url(&self) -> Result<String> {
        self.check_connected()?;
        if self.fail_current_url.load(Ordering::SeqCst) {
            return Err(BrowserError::Driver("Target closed".to_string()));
        }
        Ok(self.url.lock().unwrap().clone())
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.set_url(url);
        Ok(())
    }

    async fn add_network_listener(&self, callback: NetworkCallback) -> Result<ListenerId> {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().unwrap().insert(id, callback);
        self.listeners_added.fetch_add(1, Ordering::SeqCst);
        Ok(ListenerId(id))
    }

    async fn remove_network_listener(&self, id: ListenerId) -> Result<()> {
        self.listeners.lock().unwrap().remove(&id.0);
        self.listeners_removed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn enable_network_monitoring(&self) -> Result<()> {
        self.enable_network_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_enable_network.load(Ordering::SeqCst) {
            return Err(BrowserError::Driver("Network.enable failed".to_string()));
        }
        Ok(())
    }

    async fn disable_network_monitoring(&self) -> Result<()> {
        self.disable_network_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_disconnect(&self, callback: DisconnectCallback) {
        self.disconnect_callbacks.lock().unwrap().push(callback);
    }

    async fn close(&self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Connector that fails a configurable number of times before handing out drivers
#[derive(Default)]
pub struct MockConnector {
    failures_remaining: AtomicU32,
    always_fail: AtomicBool,
    pub connect_calls: AtomicU32,
    drivers: Mutex<Vec<Arc<MockDriver>>>,
    setup: Option<Box<dyn Fn(&MockDriver) + Send + Sync>>,
}

impl MockConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail the first `failures` attempts, then succeed
    pub fn failing(failures: u32) -> Arc<Self> {
        Arc::new(Self { failures_remaining: AtomicU32::new(failures), ..Self::default() })
    }

    pub fn always_failing() -> Arc<Self> {
        Arc::new(Self { always_fail: AtomicBool::new(true), ..Self::default() })
    }

    /// Every driver handed out is first prepared by `setup`
    pub fn with_setup(setup: impl Fn(&MockDriver) + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self { setup: Some(Box::new(setup)), ..Self::default() })
    }

    pub fn calls(&self) -> u32 {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn set_always_fail(&self, fail: bool) {
        self.always_fail.store(fail, Ordering::SeqCst);
    }

    /// Most recently created driver
    pub fn last_driver(&self) -> Option<Arc<MockDriver>> {
        self.drivers.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self) -> Result<Arc<dyn BrowserDriver>> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);

        if self.always_fail.load(Ordering::SeqCst) {
            return Err(BrowserError::ConnectionFailed("connection refused".to_string()));
        }
        let pending = self.failures_remaining.load(Ordering::SeqCst);
        if pending > 0 {
            self.failures_remaining.store(pending - 1, Ordering::SeqCst);
            return Err(BrowserError::ConnectionFailed("connection refused".to_string()));
        }

        let driver = MockDriver::new();
        if let Some(setup) = &self.setup {
            setup(&driver);
        }
        self.drivers.lock().unwrap().push(driver.clone());
        Ok(driver)
    }
}

pub fn bbox(x: f64, y: f64, width: f64, height: f64) -> BoundingBox {
    BoundingBox::new(x, y, width, height)
}
