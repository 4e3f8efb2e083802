use crate::browser::driver::{MouseButton, PointerEventKind};
use crate::error::Result;
use crate::tools::Interactor;
use serde::{Deserialize, Serialize};

/// Options for the click interaction
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClickOptions {
    /// Readiness timeout in milliseconds (default: 5000)
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Hover and focus the element before waiting for readiness (default: false)
    #[serde(default)]
    pub ensure_interactive: bool,
}

impl ClickOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set readiness timeout
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Builder method: request hover/focus pre-activation
    pub fn ensure_interactive(mut self, ensure_interactive: bool) -> Self {
        self.ensure_interactive = ensure_interactive;
        self
    }
}

/// Where the click landed and how long readiness took
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClickOutcome {
    pub selector: String,
    pub x: f64,
    pub y: f64,
    pub waited_ms: u64,
}

impl Interactor {
    /// Click the element's center once it is ready
    pub async fn click(&self, selector: &str, options: &ClickOptions) -> Result<ClickOutcome> {
        let target = self.resolve(selector).await?;

        if options.ensure_interactive {
            self.pre_activate(&target).await?;
        }

        let readiness = self.await_ready(selector, options.timeout_ms).await?;

        // aim at where the element settled, not where it was first seen
        let (x, y) = readiness.state.bounding_box.map(|b| b.center()).unwrap_or(target.center);

        self.driver.dispatch_pointer_event(PointerEventKind::Press, x, y, MouseButton::Left).await?;
        self.driver.dispatch_pointer_event(PointerEventKind::Release, x, y, MouseButton::Left).await?;

        log::debug!("Clicked '{}' at ({}, {})", selector, x, y);

        Ok(ClickOutcome { selector: selector.to_string(), x, y, waited_ms: readiness.elapsed_ms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_options_default() {
        let options: ClickOptions = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(options.timeout_ms, None);
        assert!(!options.ensure_interactive);
    }

    #[test]
    fn test_click_options_explicit() {
        let json = serde_json::json!({
            "timeout_ms": 1500,
            "ensure_interactive": true
        });

        let options: ClickOptions = serde_json::from_value(json).unwrap();
        assert_eq!(options, ClickOptions::new().timeout_ms(1500).ensure_interactive(true));
    }
}
