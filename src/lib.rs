//! # browser-readiness
//!
//! Readiness checks, condition waits and resilient connections for browser automation
//! via Chrome DevTools Protocol (CDP).
//!
//! ## Features
//!
//! - **Readiness**: an element is actionable when it is visible, enabled and has stopped moving
//! - **Condition waits**: element presence, page text, URL pattern and network idle, under one deadline
//! - **Interactions**: click and type that wait for readiness first, with optional hover/focus pre-activation
//! - **Connection lifecycle**: one live control channel, reconnected with bounded fixed-backoff retries
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use browser_readiness::{BrowserSession, ClickOptions, LaunchOptions, WaitConditions};
//!
//! # async fn run() -> browser_readiness::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default());
//! session.navigate("https://example.com").await?;
//!
//! // Wait for the page to settle
//! let outcome = session
//!     .wait_for(&WaitConditions::new().element("h1").network_idle_ms(500))
//!     .await?;
//! println!("settled: {} after {}ms", outcome.success, outcome.elapsed_ms);
//!
//! // Click once the link is visible, enabled and stable
//! session.click("a", &ClickOptions::new().ensure_interactive(true)).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Custom drivers
//!
//! The engine only talks to [`BrowserDriver`]; implement it and a [`Connector`] to run the
//! same waits over another CDP client:
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use browser_readiness::{BrowserSession, Connector};
//! # fn build(connector: Arc<dyn Connector>) {
//! let session = BrowserSession::new(connector);
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: driver abstraction, Chrome adapter, connection lifecycle and the session facade
//! - [`dom`]: bounding boxes, element state and page-side probe scripts
//! - [`readiness`]: single readiness checks and the readiness wait loop
//! - [`wait`]: multi-condition waits and network idle tracking
//! - [`tools`]: click and type interactions
//! - [`error`]: error types, structured error reports and result aliases

pub mod browser;
pub mod dom;
pub mod error;
pub mod readiness;
pub mod tools;
pub mod wait;

pub use browser::{
    BrowserDriver, BrowserSession, ConnectionManager, ConnectionOptions, ConnectionState, Connector,
    LaunchOptions, ReconnectPolicy, Timings,
};
pub use dom::{BlockingReason, BoundingBox, ElementState};
pub use error::{BrowserError, ErrorReport, Result};
pub use readiness::{ReadinessChecker, ReadinessResult};
pub use tools::{ClickOptions, ClickOutcome, Interactor, TypeOptions, TypeOutcome};
pub use wait::{ConditionSet, ConditionWaiter, WaitConditions, WaitOutcome};
