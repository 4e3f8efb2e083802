//! Element readiness: visible, enabled and positionally stable.

use crate::browser::config::Timings;
use crate::browser::driver::BrowserDriver;
use crate::dom::{BoundingBox, ElementState, Script};
use crate::error::{BrowserError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout_at};

/// Final verdict of one [`ReadinessChecker::wait_for_ready`] call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadinessResult {
    /// `visible && enabled && stable` of `state`
    pub ready: bool,

    /// Last observed state (the ready one, or the last sample before the deadline)
    pub state: ElementState,

    pub elapsed_ms: u64,
}

/// Visibility and enablement flags reported by the page-side probe
#[derive(Debug, Deserialize)]
struct InteractabilityProbe {
    found: bool,
    visible: bool,
    enabled: bool,
}

/// Checks and waits for element readiness against one driver
#[derive(Clone)]
pub struct ReadinessChecker {
    driver: Arc<dyn BrowserDriver>,
    timings: Timings,
}

impl ReadinessChecker {
    pub fn new(driver: Arc<dyn BrowserDriver>, timings: Timings) -> Self {
        Self { driver, timings }
    }

    /// Sample the element's readiness once.
    ///
    /// Takes one stability window. Never fails: unresolvable selectors and
    /// driver faults both yield the all-false state.
    pub async fn check_state(&self, selector: &str) -> ElementState {
        self.sample(selector).await.unwrap_or_else(|e| {
            log::debug!("Readiness probe for '{}' failed: {}", selector, e);
            ElementState::not_found()
        })
    }

    /// Like [`check_state`](Self::check_state), but a lost control channel is an error
    async fn sample(&self, selector: &str) -> Result<ElementState> {
        match self.probe(selector).await {
            Ok(state) => Ok(state),
            Err(e) if e.is_connection_error() => Err(e),
            Err(e) => {
                log::debug!("Readiness probe for '{}' failed: {}", selector, e);
                Ok(ElementState::not_found())
            }
        }
    }

    async fn probe(&self, selector: &str) -> Result<ElementState> {
        let Some(handle) = self.driver.query_element(selector).await? else {
            return Ok(ElementState::not_found());
        };
        let first = self.driver.bounding_box(&handle).await?;

        let value = self.driver.evaluate(&Script::interactability(selector).to_expression()).await?;
        let flags: InteractabilityProbe = serde_json::from_value(value)
            .map_err(|e| BrowserError::EvaluationFailed(format!("Malformed readiness probe: {}", e)))?;
        if !flags.found {
            return Ok(ElementState::not_found());
        }

        sleep(self.timings.stability_window()).await;
        let second = self.resample(selector).await?;

        let stable = second.is_some_and(|b| first.approx_eq(&b, self.timings.stability_tolerance_px));

        Ok(ElementState {
            visible: flags.visible && first.is_visible(),
            enabled: flags.enabled,
            stable,
            bounding_box: Some(second.unwrap_or(first)),
        })
    }

    /// Second stability sample; `None` when the element has gone away
    async fn resample(&self, selector: &str) -> Result<Option<BoundingBox>> {
        let Some(handle) = self.driver.query_element(selector).await? else {
            return Ok(None);
        };
        match self.driver.bounding_box(&handle).await {
            Ok(bbox) => Ok(Some(bbox)),
            Err(BrowserError::ElementNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Wait until the element is ready or `timeout` (default from [`Timings`]) passes.
    ///
    /// A ready first sample returns immediately. Otherwise the element is polled
    /// every poll interval against a deadline fixed at call time; on timeout the
    /// last observed state is returned with `ready: false`. Losing the control
    /// channel ends the wait with the connection error.
    pub async fn wait_for_ready(&self, selector: &str, timeout: Option<Duration>) -> Result<ReadinessResult> {
        let start = Instant::now();
        let deadline =
            start + timeout.unwrap_or_else(|| Duration::from_millis(self.timings.readiness_timeout_ms));

        let mut last = self.sample(selector).await?;
        if last.is_ready() {
            log::debug!("'{}' ready on first probe", selector);
            return Ok(finish(true, last, start));
        }

        let polled = timeout_at(deadline, async {
            loop {
                sleep(self.timings.readiness_poll()).await;
                let state = self.sample(selector).await?;
                if state.is_ready() {
                    return Ok::<_, BrowserError>(state);
                }
                last = state;
            }
        })
        .await;

        match polled {
            Ok(Ok(state)) => {
                log::debug!("'{}' became ready after {:?}", selector, start.elapsed());
                Ok(finish(true, state, start))
            }
            Ok(Err(e)) => {
                log::warn!("Readiness wait for '{}' aborted: {}", selector, e);
                Err(e)
            }
            Err(_) => {
                log::debug!("'{}' not ready before deadline: {:?}", selector, last.blocking_reasons());
                Ok(finish(false, last, start))
            }
        }
    }
}

fn finish(ready: bool, state: ElementState, start: Instant) -> ReadinessResult {
    ReadinessResult { ready, state, elapsed_ms: start.elapsed().as_millis() as u64 }
}
