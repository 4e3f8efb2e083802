use serde::{Deserialize, Serialize};
use std::fmt;

/// Bounding box coordinates for an element, in viewport pixels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Create a new BoundingBox
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Check if the bounding box is visible (has non-zero dimensions)
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Calculate the area of the bounding box
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Center point of the box, used as the pointer target
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether every edge of `other` lies strictly within `tolerance` of this box.
    pub fn approx_eq(&self, other: &BoundingBox, tolerance: f64) -> bool {
        (self.x - other.x).abs() < tolerance
            && (self.y - other.y).abs() < tolerance
            && (self.width - other.width).abs() < tolerance
            && (self.height - other.height).abs() < tolerance
    }
}

/// Snapshot of an element's interactability, taken fresh on every check
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ElementState {
    /// Element has a non-empty box and is not hidden by CSS
    pub visible: bool,

    /// Element is not disabled, read-only, aria-disabled or pointer-inert
    pub enabled: bool,

    /// Element did not move between two samples one settle window apart
    pub stable: bool,

    /// Most recent bounding box sample
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

impl ElementState {
    /// State reported when the selector does not resolve
    pub fn not_found() -> Self {
        Self::default()
    }

    /// Visible, enabled and stable
    pub fn is_ready(&self) -> bool {
        self.visible && self.enabled && self.stable
    }

    /// Whether any sample located the element at all
    pub fn is_found(&self) -> bool {
        self.bounding_box.is_some()
    }

    /// Reasons this element is not ready, in a fixed order
    pub fn blocking_reasons(&self) -> Vec<BlockingReason> {
        let mut reasons = Vec::new();
        if !self.visible {
            reasons.push(BlockingReason::NotVisible);
        }
        if !self.enabled {
            reasons.push(BlockingReason::Disabled);
        }
        if !self.stable {
            reasons.push(BlockingReason::Unstable);
        }
        reasons
    }
}

/// One reason an element failed its readiness check
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlockingReason {
    NotVisible,
    Disabled,
    Unstable,
}

impl fmt::Display for BlockingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BlockingReason::NotVisible => "not visible",
            BlockingReason::Disabled => "disabled",
            BlockingReason::Unstable => "still moving",
        };
        f.write_str(text)
    }
}
