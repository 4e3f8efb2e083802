use crate::browser::chrome::ChromeConnector;
use crate::browser::config::{ConnectionOptions, LaunchOptions, ReconnectPolicy, Timings};
use crate::browser::connection::{ConnectionManager, ConnectionState};
use crate::browser::driver::{BrowserDriver, Connector};
use crate::dom::ElementState;
use crate::error::Result;
use crate::readiness::{ReadinessChecker, ReadinessResult};
use crate::tools::utils::normalize_url;
use crate::tools::{ClickOptions, ClickOutcome, Interactor, TypeOptions, TypeOutcome};
use crate::wait::{ConditionWaiter, WaitConditions, WaitOutcome};
use std::sync::Arc;
use std::time::Duration;

/// Entry point for callers: every operation first makes sure the control
/// channel is live, then runs against the current driver handle.
pub struct BrowserSession {
    connection: ConnectionManager,
    timings: Timings,
}

impl BrowserSession {
    /// Create a session over any connector, with default timings and retry policy
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self::with_config(connector, Timings::default(), ReconnectPolicy::default())
    }

    pub fn with_config(connector: Arc<dyn Connector>, timings: Timings, policy: ReconnectPolicy) -> Self {
        Self { connection: ConnectionManager::with_policy(connector, policy), timings }
    }

    /// Session that launches a local browser on first use (and on every reconnect)
    pub fn launch(options: LaunchOptions) -> Self {
        Self::new(Arc::new(ChromeConnector::Launch(options)))
    }

    /// Session that attaches to a running browser on first use (and on every reconnect)
    pub fn connect(options: ConnectionOptions) -> Self {
        Self::new(Arc::new(ChromeConnector::Connect(options)))
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Make sure the control channel is live, reconnecting if needed
    pub async fn ensure_connected(&self) -> Result<Arc<dyn BrowserDriver>> {
        self.connection.ensure_connected().await
    }

    /// Sample an element's readiness once
    pub async fn check_state(&self, selector: &str) -> Result<ElementState> {
        let driver = self.ensure_connected().await?;
        Ok(ReadinessChecker::new(driver, self.timings.clone()).check_state(selector).await)
    }

    /// Wait for an element to become visible, enabled and stable
    pub async fn wait_for_ready(&self, selector: &str, timeout_ms: Option<u64>) -> Result<ReadinessResult> {
        let driver = self.ensure_connected().await?;
        let checker = ReadinessChecker::new(driver, self.timings.clone());
        checker.wait_for_ready(selector, timeout_ms.map(Duration::from_millis)).await
    }

    /// Wait for every requested condition to hold
    pub async fn wait_for(&self, conditions: &WaitConditions) -> Result<WaitOutcome> {
        let driver = self.ensure_connected().await?;
        ConditionWaiter::new(driver, self.timings.clone()).wait_for(conditions).await
    }

    /// Click an element once it is ready
    pub async fn click(&self, selector: &str, options: &ClickOptions) -> Result<ClickOutcome> {
        let driver = self.ensure_connected().await?;
        Interactor::new(driver, self.timings.clone()).click(selector, options).await
    }

    /// Type into an element once it is ready
    pub async fn type_text(&self, selector: &str, text: &str, options: &TypeOptions) -> Result<TypeOutcome> {
        let driver = self.ensure_connected().await?;
        Interactor::new(driver, self.timings.clone()).type_text(selector, text, options).await
    }

    /// Navigate to a URL, adding a missing scheme first. Returns the URL actually loaded.
    pub async fn navigate(&self, url: &str) -> Result<String> {
        let driver = self.ensure_connected().await?;
        let normalized_url = normalize_url(url);
        driver.navigate(&normalized_url).await?;
        Ok(normalized_url)
    }

    /// Close the current control channel. A later call reconnects.
    pub async fn disconnect(&self) -> Result<()> {
        self.connection.disconnect().await
    }
}
