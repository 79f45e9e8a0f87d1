//! Shared UI element types for accessibility-based automation.
//!
//! This module defines the snapshot types the helpers work on. Drivers
//! report their hierarchy as a tree of [`UIElement`]s, and matchers and
//! handles are evaluated against these snapshots, independent of any
//! specific backend implementation.

use serde::{Deserialize, Serialize};

/// Represents a UI element from the accessibility hierarchy.
///
/// This struct contains accessibility information about a UI element as
/// reported by an automation backend. Elements form a tree structure
/// via the `children` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UIElement {
    /// The unique accessibility identifier for this element (AXUniqueId).
    #[serde(rename = "AXUniqueId", default)]
    pub identifier: Option<String>,

    /// The accessibility label (AXLabel), typically the user-visible text.
    #[serde(rename = "AXLabel", default)]
    pub label: Option<String>,

    /// The current value of the element (AXValue), e.g., text field contents.
    #[serde(rename = "AXValue", default)]
    pub value: Option<String>,

    /// The type of UI element (e.g., "Button", "TextField", "ScrollView").
    #[serde(rename = "type", default)]
    pub element_type: Option<String>,

    /// The element's frame (position and size) in screen coordinates.
    #[serde(default)]
    pub frame: Option<ElementFrame>,

    /// Child elements nested within this element.
    #[serde(default)]
    pub children: Vec<UIElement>,

    /// The accessibility role of this element.
    #[serde(default)]
    pub role: Option<String>,

    /// Whether the element accepts touches. `None` if the backend does not say.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hittable: Option<bool>,

    /// Whether any part of the element is on screen. `None` if the backend
    /// does not say.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl UIElement {
    /// Treats an unreported visibility as visible.
    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(true)
    }

    /// Treats an unreported hittability as hittable.
    pub fn is_hittable(&self) -> bool {
        self.hittable.unwrap_or(true)
    }

    /// Short human-readable name for log lines and error messages.
    pub fn describe(&self) -> String {
        match (&self.identifier, &self.label) {
            (Some(id), _) => format!("#{}", id),
            (None, Some(label)) => format!("'{}'", label),
            (None, None) => self
                .element_type
                .clone()
                .unwrap_or_else(|| "<anonymous>".to_string()),
        }
    }
}

/// The frame (position and dimensions) of a UI element.
///
/// Coordinates are in screen points, with the origin at the top-left
/// corner of the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementFrame {
    /// The x-coordinate of the element's top-left corner.
    pub x: f64,
    /// The y-coordinate of the element's top-left corner.
    pub y: f64,
    /// The width of the element in points.
    pub width: f64,
    /// The height of the element in points.
    pub height: f64,
}

impl ElementFrame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Returns the same frame moved by `(dx, dy)`.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Centre point, where taps land.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True if the two frames overlap with positive area. Frames that only
    /// share an edge do not intersect.
    pub fn intersects(&self, other: &ElementFrame) -> bool {
        let left = self.x.max(other.x);
        let right = (self.x + self.width).min(other.x + other.width);
        let top = self.y.max(other.y);
        let bottom = (self.y + self.height).min(other.y + other.height);
        right > left && bottom > top
    }
}
