//! Intent-level interactions: click and type, gated on element readiness
//!
//! Both interactions resolve the target and its center point before waiting,
//! since some pages only wire up their handlers after a hover. With
//! `ensure_interactive` the pointer is moved onto the element and the element
//! is focused before readiness is awaited.

pub mod click;
pub mod input;
pub mod utils;

pub use click::{ClickOptions, ClickOutcome};
pub use input::{TypeOptions, TypeOutcome};

use crate::browser::config::Timings;
use crate::browser::driver::{BrowserDriver, ElementHandle, MouseButton, PointerEventKind};
use crate::error::{BrowserError, Result};
use crate::readiness::{ReadinessChecker, ReadinessResult};
use std::sync::Arc;
use std::time::Duration;

/// Runs click and type sequences against one driver
#[derive(Clone)]
pub struct Interactor {
    driver: Arc<dyn BrowserDriver>,
    timings: Timings,
}

/// A resolved element and the point interactions aim at
struct Target {
    handle: ElementHandle,
    center: (f64, f64),
}

impl Interactor {
    pub fn new(driver: Arc<dyn BrowserDriver>, timings: Timings) -> Self {
        Self { driver, timings }
    }

    /// Resolve the selector and its center. Not found is surfaced immediately.
    async fn resolve(&self, selector: &str) -> Result<Target> {
        let handle = self
            .driver
            .query_element(selector)
            .await?
            .ok_or_else(|| BrowserError::ElementNotFound { selector: selector.to_string() })?;
        let center = self.driver.bounding_box(&handle).await?.center();
        Ok(Target { handle, center })
    }

    /// Hover, focus, then give the page a moment to attach its handlers
    async fn pre_activate(&self, target: &Target) -> Result<()> {
        let (x, y) = target.center;
        self.driver.dispatch_pointer_event(PointerEventKind::Move, x, y, MouseButton::Left).await?;
        self.driver.focus(&target.handle).await?;
        tokio::time::sleep(self.timings.interaction_settle()).await;
        Ok(())
    }

    /// Wait for readiness, converting a timeout into a structured `NotReady`
    async fn await_ready(&self, selector: &str, timeout_ms: Option<u64>) -> Result<ReadinessResult> {
        let checker = ReadinessChecker::new(self.driver.clone(), self.timings.clone());
        let result = checker.wait_for_ready(selector, timeout_ms.map(Duration::from_millis)).await?;

        if result.ready {
            return Ok(result);
        }

        if !result.state.is_found() {
            log::debug!("'{}' vanished while waiting for readiness", selector);
        }
        Err(BrowserError::NotReady {
            selector: selector.to_string(),
            reasons: result.state.blocking_reasons(),
            state: result.state,
            elapsed_ms: result.elapsed_ms,
        })
    }
}
