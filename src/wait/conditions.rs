use serde::{Deserialize, Serialize};

/// What a condition wait should wait for. Every field is optional; absent
/// conditions are not evaluated and do not take part in the verdict.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WaitConditions {
    /// CSS selector that must resolve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,

    /// Text that must appear on the page (case-insensitive substring)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Regular expression the current URL must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Quiet period without network activity, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_idle_ms: Option<u64>,

    /// Overall deadline in milliseconds (default 5000, capped at 30000)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl WaitConditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: wait for an element
    pub fn element(mut self, selector: impl Into<String>) -> Self {
        self.element = Some(selector.into());
        self
    }

    /// Builder method: wait for page text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder method: wait for the URL to match a pattern
    pub fn url(mut self, pattern: impl Into<String>) -> Self {
        self.url = Some(pattern.into());
        self
    }

    /// Builder method: wait for a quiet network
    pub fn network_idle_ms(mut self, idle_ms: u64) -> Self {
        self.network_idle_ms = Some(idle_ms);
        self
    }

    /// Builder method: set the overall timeout
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

/// Per-condition verdicts. `None` means "not requested" and never counts
/// against success.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConditionSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_idle: Option<bool>,
}

impl ConditionSet {
    /// Every requested condition starts unsatisfied
    pub fn from_request(request: &WaitConditions) -> Self {
        Self {
            element: request.element.as_ref().map(|_| false),
            text: request.text.as_ref().map(|_| false),
            url: request.url.as_ref().map(|_| false),
            network_idle: request.network_idle_ms.map(|_| false),
        }
    }

    fn entries(&self) -> [Option<bool>; 4] {
        [self.element, self.text, self.url, self.network_idle]
    }

    /// Conjunction over requested conditions; vacuously true when none were requested
    pub fn all_satisfied(&self) -> bool {
        self.entries().iter().flatten().all(|satisfied| *satisfied)
    }

    pub fn is_empty(&self) -> bool {
        self.entries().iter().all(Option::is_none)
    }

    /// Names of requested conditions that are still unsatisfied
    pub fn pending(&self) -> Vec<&'static str> {
        let names = ["element", "text", "url", "network_idle"];
        names
            .iter()
            .zip(self.entries())
            .filter(|(_, entry)| *entry == Some(false))
            .map(|(name, _)| *name)
            .collect()
    }
}

/// What the page looked like when the wait ended
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActualState {
    pub current_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_found: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_found: Option<bool>,
}

/// Result of a condition wait. A timeout is reported here with
/// `success: false`, never as an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WaitOutcome {
    pub success: bool,
    pub conditions: ConditionSet,
    pub actual_state: ActualState,
    pub elapsed_ms: u64,
}
