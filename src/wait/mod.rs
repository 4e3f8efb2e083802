//! Waiting for a conjunction of page conditions under one deadline
//!
//! This module provides:
//! - WaitConditions: the requested element / text / url / network-idle conditions
//! - ConditionWaiter: polls all requested conditions concurrently until they hold
//! - NetworkMonitor: the per-call network activity subscription

pub mod conditions;
pub mod network;

pub use conditions::{ActualState, ConditionSet, WaitConditions, WaitOutcome};
pub use network::NetworkMonitor;

use crate::browser::config::Timings;
use crate::browser::driver::BrowserDriver;
use crate::dom::Script;
use crate::error::{BrowserError, Result};
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep_until, timeout_at};

/// Evaluates [`WaitConditions`] against one driver
#[derive(Clone)]
pub struct ConditionWaiter {
    driver: Arc<dyn BrowserDriver>,
    timings: Timings,
}

impl ConditionWaiter {
    pub fn new(driver: Arc<dyn BrowserDriver>, timings: Timings) -> Self {
        Self { driver, timings }
    }

    /// Wait until every requested condition holds or the deadline passes.
    ///
    /// Timing out is not an error: the outcome reports `success: false` with the
    /// per-condition verdicts. Errors are reserved for an invalid URL pattern and
    /// driver faults outside the polling loop.
    pub async fn wait_for(&self, request: &WaitConditions) -> Result<WaitOutcome> {
        let start = Instant::now();
        let deadline = start + self.timings.condition_timeout(request.timeout_ms);

        let url_pattern = request
            .url
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| BrowserError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let monitor = match request.network_idle_ms {
            Some(_) => Some(NetworkMonitor::attach(self.driver.clone()).await?),
            None => None,
        };

        let outcome = self.run(request, url_pattern.as_ref(), monitor.as_ref(), start, deadline).await;

        if let Some(monitor) = monitor {
            monitor.stop().await;
        }

        outcome
    }

    async fn run(
        &self,
        request: &WaitConditions,
        url_pattern: Option<&Regex>,
        monitor: Option<&NetworkMonitor>,
        start: Instant,
        deadline: Instant,
    ) -> Result<WaitOutcome> {
        if let Some(monitor) = monitor {
            monitor.enable().await?;
        }

        let mut conditions = ConditionSet::from_request(request);
        let poll = self.timings.condition_poll();

        loop {
            let probes = async {
                tokio::join!(
                    async {
                        match request.element.as_deref() {
                            Some(selector) => Some(self.element_present(selector).await),
                            None => None,
                        }
                    },
                    async {
                        match request.text.as_deref() {
                            Some(needle) => Some(self.text_present(needle).await),
                            None => None,
                        }
                    },
                    async {
                        match url_pattern {
                            Some(pattern) => Some(self.url_matches(pattern).await),
                            None => None,
                        }
                    },
                )
            };

            let Ok((element, text, url)) = timeout_at(deadline, probes).await else {
                break;
            };

            // every requested condition must hold in the same iteration
            conditions.element = element;
            conditions.text = text;
            conditions.url = url;
            if let (Some(idle_ms), Some(monitor)) = (request.network_idle_ms, monitor) {
                conditions.network_idle = Some(monitor.idle_for() >= Duration::from_millis(idle_ms));
            }

            if conditions.all_satisfied() {
                break;
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            log::trace!("Still waiting for {:?}", conditions.pending());
            sleep_until((now + poll).min(deadline)).await;
        }

        let actual_state = self.observe(request).await?;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        let success = conditions.all_satisfied();

        if success {
            log::debug!("Conditions met after {}ms", elapsed_ms);
        } else {
            log::debug!("Condition wait timed out after {}ms, pending: {:?}", elapsed_ms, conditions.pending());
        }

        Ok(WaitOutcome { success, conditions, actual_state, elapsed_ms })
    }

    /// One read pass describing the page at the end of the wait
    async fn observe(&self, request: &WaitConditions) -> Result<ActualState> {
        let (current_url, element_found, text_found) = tokio::join!(
            self.driver.current_url(),
            async {
                match request.element.as_deref() {
                    Some(selector) => Some(self.element_present(selector).await),
                    None => None,
                }
            },
            async {
                match request.text.as_deref() {
                    Some(needle) => Some(self.text_present(needle).await),
                    None => None,
                }
            },
        );

        Ok(ActualState { current_url: current_url?, element_found, text_found })
    }

    async fn element_present(&self, selector: &str) -> bool {
        match self.driver.query_element(selector).await {
            Ok(handle) => handle.is_some(),
            Err(e) => {
                log::debug!("Element probe for '{}' failed: {}", selector, e);
                false
            }
        }
    }

    async fn text_present(&self, needle: &str) -> bool {
        match self.driver.evaluate(&Script::text_search(needle).to_expression()).await {
            Ok(value) => value.as_bool().unwrap_or(false),
            Err(e) => {
                log::debug!("Text probe failed: {}", e);
                false
            }
        }
    }

    async fn url_matches(&self, pattern: &Regex) -> bool {
        match self.driver.current_url().await {
            Ok(url) => pattern.is_match(&url),
            Err(e) => {
                log::debug!("URL probe failed: {}", e);
                false
            }
        }
    }
}
