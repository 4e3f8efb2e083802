//! The seam between the readiness engine and a concrete CDP client.

use crate::dom::BoundingBox;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// A resolved element. Handles are re-resolved by selector on every use, so a
/// handle never pins a node that the page has since replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    selector: String,
}

impl ElementHandle {
    pub fn new(selector: impl Into<String>) -> Self {
        Self { selector: selector.into() }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Move,
    Press,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Down,
    Up,
}

/// Network activity relevant to idle detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEvent {
    RequestStarted,
    RequestFinished,
}

/// Identifies one registered network listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

pub type NetworkCallback = Arc<dyn Fn(NetworkEvent) + Send + Sync>;
pub type DisconnectCallback = Arc<dyn Fn() + Send + Sync>;

/// Asynchronous control-channel operations against one page.
///
/// Implementations must pass caller-provided strings into page scripts as
/// serialized literals (see [`crate::dom::Script`]).
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Resolve a selector against the current document
    async fn query_element(&self, selector: &str) -> Result<Option<ElementHandle>>;

    /// Current viewport box of a resolved element
    async fn bounding_box(&self, handle: &ElementHandle) -> Result<BoundingBox>;

    async fn dispatch_pointer_event(
        &self,
        kind: PointerEventKind,
        x: f64,
        y: f64,
        button: MouseButton,
    ) -> Result<()>;

    async fn dispatch_key_event(&self, kind: KeyEventKind, key: char) -> Result<()>;

    async fn focus(&self, handle: &ElementHandle) -> Result<()>;

    /// Evaluate an expression in the page and return its JSON value
    async fn evaluate(&self, expression: &str) -> Result<Value>;

    async fn current_url(&self) -> Result<String>;

    async fn navigate(&self, url: &str) -> Result<()>;

    /// Register a network activity listener; events arrive only while monitoring is enabled
    async fn add_network_listener(&self, callback: NetworkCallback) -> Result<ListenerId>;

    async fn remove_network_listener(&self, id: ListenerId) -> Result<()>;

    async fn enable_network_monitoring(&self) -> Result<()>;

    async fn disable_network_monitoring(&self) -> Result<()>;

    /// Register a callback fired once when the control channel drops
    fn on_disconnect(&self, callback: DisconnectCallback);

    async fn close(&self) -> Result<()>;
}

/// Produces live driver handles; one call is one connection attempt.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn BrowserDriver>>;
}
