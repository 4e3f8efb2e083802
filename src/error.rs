//! Error types and the structured report handed to callers

use crate::dom::{BlockingReason, ElementState};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while driving the browser
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("connection lost: {0}")]
    ConnectionLost(String),

    #[error("failed to reconnect after {attempts} attempts: {last_error}")]
    ReconnectExhausted { attempts: u32, last_error: String },

    #[error("element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("element '{selector}' not ready after {elapsed_ms}ms: {}", format_reasons(.reasons))]
    NotReady {
        selector: String,
        state: ElementState,
        reasons: Vec<BlockingReason>,
        elapsed_ms: u64,
    },

    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid URL pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    #[error("driver error: {0}")]
    Driver(String),
}

fn format_reasons(reasons: &[BlockingReason]) -> String {
    reasons.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

pub type Result<T> = std::result::Result<T, BrowserError>;

/// Serializable description of a failure, with context and next steps
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub code: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ElementState>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,

    pub suggestions: Vec<String>,
}

impl BrowserError {
    /// Stable machine-readable code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            BrowserError::LaunchFailed(_) => "LAUNCH_FAILED",
            BrowserError::ConnectionFailed(_) => "CONNECTION_FAILED",
            BrowserError::ConnectionLost(_) => "CONNECTION_LOST",
            BrowserError::ReconnectExhausted { .. } => "RECONNECT_EXHAUSTED",
            BrowserError::ElementNotFound { .. } => "ELEMENT_NOT_FOUND",
            BrowserError::NotReady { .. } => "ELEMENT_NOT_READY",
            BrowserError::InvalidSelector { .. } => "INVALID_SELECTOR",
            BrowserError::InvalidPattern { .. } => "INVALID_PATTERN",
            BrowserError::EvaluationFailed(_) => "EVALUATION_FAILED",
            BrowserError::NavigationFailed(_) => "NAVIGATION_FAILED",
            BrowserError::Driver(_) => "DRIVER_ERROR",
        }
    }

    /// Whether a fresh connection might make this error go away
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            BrowserError::ConnectionFailed(_)
                | BrowserError::ConnectionLost(_)
                | BrowserError::ReconnectExhausted { .. }
        )
    }

    /// Suggested next actions for the caller
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            BrowserError::ElementNotFound { selector } => vec![
                format!("Wait for the element first with wait_for {{ element: {:?} }}", selector),
                "Check the selector against the current page structure".to_string(),
            ],
            BrowserError::NotReady { reasons, .. } => {
                let mut out: Vec<String> = reasons
                    .iter()
                    .map(|reason| match reason {
                        BlockingReason::NotVisible => {
                            "Scroll the element into view or wait for it to be shown".to_string()
                        }
                        BlockingReason::Disabled => {
                            "Complete the inputs that enable this element first".to_string()
                        }
                        BlockingReason::Unstable => {
                            "Wait for animations or layout shifts to finish".to_string()
                        }
                    })
                    .collect();
                out.push("Retry with a longer timeout_ms or with ensure_interactive".to_string());
                out
            }
            BrowserError::ReconnectExhausted { .. } | BrowserError::ConnectionLost(_) => vec![
                "Check that the browser process is still running".to_string(),
                "Retry the operation; the next call starts a fresh reconnect".to_string(),
            ],
            BrowserError::ConnectionFailed(_) | BrowserError::LaunchFailed(_) => {
                vec!["Check the DevTools endpoint or the browser executable path".to_string()]
            }
            BrowserError::InvalidSelector { .. } => {
                vec!["Use a valid CSS selector".to_string()]
            }
            BrowserError::InvalidPattern { .. } => {
                vec!["Use a valid regular expression for the URL condition".to_string()]
            }
            BrowserError::EvaluationFailed(_)
            | BrowserError::NavigationFailed(_)
            | BrowserError::Driver(_) => Vec::new(),
        }
    }

    /// Build the structured report for this error
    pub fn report(&self) -> ErrorReport {
        let (target, state, elapsed_ms) = match self {
            BrowserError::ElementNotFound { selector } => (Some(selector.clone()), None, None),
            BrowserError::NotReady { selector, state, elapsed_ms, .. } => {
                (Some(selector.clone()), Some(state.clone()), Some(*elapsed_ms))
            }
            BrowserError::InvalidSelector { selector, .. } => (Some(selector.clone()), None, None),
            BrowserError::InvalidPattern { pattern, .. } => (Some(pattern.clone()), None, None),
            _ => (None, None, None),
        };

        ErrorReport {
            code: self.code(),
            target,
            message: self.to_string(),
            state,
            elapsed_ms,
            suggestions: self.suggestions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::BoundingBox;

    #[test]
    fn test_not_ready_message_lists_reasons() {
        let err = BrowserError::NotReady {
            selector: "#btn".to_string(),
            state: ElementState::default(),
            reasons: vec![BlockingReason::NotVisible, BlockingReason::Disabled],
            elapsed_ms: 5000,
        };
        assert_eq!(err.to_string(), "element '#btn' not ready after 5000ms: not visible, disabled");
    }

    #[test]
    fn test_report_carries_state_and_suggestions() {
        let state = ElementState {
            visible: true,
            enabled: false,
            stable: true,
            bounding_box: Some(BoundingBox::new(1.0, 2.0, 3.0, 4.0)),
        };
        let err = BrowserError::NotReady {
            selector: "#save".to_string(),
            state: state.clone(),
            reasons: state.blocking_reasons(),
            elapsed_ms: 1200,
        };

        let report = err.report();
        assert_eq!(report.code, "ELEMENT_NOT_READY");
        assert_eq!(report.target.as_deref(), Some("#save"));
        assert_eq!(report.state, Some(state));
        assert_eq!(report.elapsed_ms, Some(1200));
        assert_eq!(report.suggestions.len(), 2);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["code"], "ELEMENT_NOT_READY");
        assert_eq!(json["state"]["enabled"], false);
    }

    #[test]
    fn test_not_found_report() {
        let report = BrowserError::ElementNotFound { selector: "#missing".to_string() }.report();
        assert_eq!(report.code, "ELEMENT_NOT_FOUND");
        assert!(report.state.is_none());
        assert!(report.suggestions[0].contains("#missing"));
    }

    #[test]
    fn test_connection_errors() {
        let err = BrowserError::ReconnectExhausted { attempts: 5, last_error: "refused".to_string() };
        assert!(err.is_connection_error());
        assert_eq!(err.to_string(), "failed to reconnect after 5 attempts: refused");
        assert!(!BrowserError::Driver("boom".to_string()).is_connection_error());
    }
}
