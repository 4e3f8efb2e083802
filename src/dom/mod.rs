//! Element geometry, readiness state and the page-side probe scripts
//!
//! This module provides the data the readiness engine reasons about:
//! - BoundingBox: viewport rectangle with a tolerance-based equality
//! - ElementState: visible / enabled / stable snapshot of one element
//! - Script: page-side probes with caller strings bound as JSON literals

pub mod element;

pub use element::{BlockingReason, BoundingBox, ElementState};

use serde_json::Value;

/// Page-side function sources, each an anonymous `function (...) { ... }`
pub mod sources {
    pub const QUERY_ELEMENT: &str = include_str!("query_element.js");
    pub const BOUNDING_BOX: &str = include_str!("bounding_box.js");
    pub const INTERACTABILITY: &str = include_str!("interactability.js");
    pub const FOCUS: &str = include_str!("focus.js");
    pub const TEXT_SEARCH: &str = include_str!("text_search.js");
}

/// A page-side function invocation whose arguments are serialized, never spliced
#[derive(Debug, Clone)]
pub struct Script {
    function: &'static str,
    args: Vec<Value>,
}

impl Script {
    /// Create an invocation of one of the [`sources`] functions
    pub fn new(function: &'static str) -> Self {
        Self { function, args: Vec::new() }
    }

    /// Builder method: append an argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Render the immediately-invoked expression sent to the driver
    pub fn to_expression(&self) -> String {
        let args = self.args.iter().map(Value::to_string).collect::<Vec<_>>().join(", ");
        format!("({})({})", self.function.trim(), args)
    }

    pub fn query_element(selector: &str) -> Self {
        Self::new(sources::QUERY_ELEMENT).arg(selector)
    }

    pub fn bounding_box(selector: &str) -> Self {
        Self::new(sources::BOUNDING_BOX).arg(selector)
    }

    pub fn interactability(selector: &str) -> Self {
        Self::new(sources::INTERACTABILITY).arg(selector)
    }

    pub fn focus(selector: &str) -> Self {
        Self::new(sources::FOCUS).arg(selector)
    }

    pub fn text_search(needle: &str) -> Self {
        Self::new(sources::TEXT_SEARCH).arg(needle)
    }
}
