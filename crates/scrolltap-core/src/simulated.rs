//! In-memory screen that implements [`ScrollDriver`].
//!
//! A [`SimulatedScreen`] is built from a [`ScreenFixture`]: a viewport, some
//! fixed elements in screen coordinates, and scroll views whose content is
//! laid out in content coordinates. Scrolling moves the content offset, and
//! [`dump_tree`](ScrollDriver::dump_tree) reports every element translated to
//! screen coordinates with its visibility worked out from the geometry.
//! Every gesture is recorded so tests can count swipes and taps.
//!
//! Fixtures deserialize from JSON, which is what the `scrolltap` binary
//! feeds it:
//!
//! ```
//! use scrolltap_core::simulated::ScreenFixture;
//!
//! let fixture: ScreenFixture = serde_json::from_str(r#"{
//!     "viewport": { "width": 390, "height": 800 },
//!     "scroll_views": [{
//!         "identifier": "feed",
//!         "frame": { "x": 0, "y": 0, "width": 390, "height": 800 },
//!         "content": [
//!             { "AXUniqueId": "post-1", "frame": { "x": 0, "y": 0, "width": 390, "height": 100 } }
//!         ]
//!     }]
//! }"#).unwrap();
//! assert_eq!(fixture.scroll_views[0].content.len(), 1);
//! ```

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::driver::{DriverError, ElementHandle, ScrollDriver, SearchPolicy};
use crate::element::{ElementFrame, UIElement};
use crate::gesture::{Axis, Direction, Gesture, ScrollDistance, ScrollOutcome, Viewport};
use crate::matcher;

/// Element type reported for simulated scroll views.
pub const SCROLL_VIEW_TYPE: &str = "ScrollView";

/// Static description of a screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenFixture {
    pub viewport: Viewport,
    /// Elements that do not scroll, in screen coordinates.
    #[serde(default)]
    pub elements: Vec<UIElement>,
    #[serde(default)]
    pub scroll_views: Vec<ScrollViewFixture>,
}

impl ScreenFixture {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            elements: Vec::new(),
            scroll_views: Vec::new(),
        }
    }

    pub fn with_element(mut self, element: UIElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn with_scroll_view(mut self, scroll_view: ScrollViewFixture) -> Self {
        self.scroll_views.push(scroll_view);
        self
    }
}

/// A scroll view and its content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollViewFixture {
    pub identifier: String,
    #[serde(default)]
    pub label: Option<String>,
    /// On-screen frame of the scroll view.
    pub frame: ElementFrame,
    /// Scrollable content width. Defaults to the larger of the frame width
    /// and the right edge of the content.
    #[serde(default)]
    pub content_width: Option<f64>,
    /// Scrollable content height. Defaults to the larger of the frame height
    /// and the bottom edge of the content.
    #[serde(default)]
    pub content_height: Option<f64>,
    /// Content elements, positioned relative to the content origin.
    #[serde(default)]
    pub content: Vec<UIElement>,
}

impl ScrollViewFixture {
    pub fn new(identifier: impl Into<String>, frame: ElementFrame) -> Self {
        Self {
            identifier: identifier.into(),
            label: None,
            frame,
            content_width: None,
            content_height: None,
            content: Vec::new(),
        }
    }

    pub fn with_content(mut self, element: UIElement) -> Self {
        self.content.push(element);
        self
    }

    pub fn with_content_height(mut self, height: f64) -> Self {
        self.content_height = Some(height);
        self
    }

    pub fn with_content_width(mut self, width: f64) -> Self {
        self.content_width = Some(width);
        self
    }

    fn content_extent(&self, axis: Axis) -> f64 {
        let (declared, frame_extent) = match axis {
            Axis::Vertical => (self.content_height, self.frame.height),
            Axis::Horizontal => (self.content_width, self.frame.width),
        };
        declared.unwrap_or_else(|| {
            self.content
                .iter()
                .filter_map(|e| e.frame)
                .map(|f| match axis {
                    Axis::Vertical => f.y + f.height,
                    Axis::Horizontal => f.x + f.width,
                })
                .fold(frame_extent, f64::max)
        })
    }

    /// Largest offset along `axis`; zero when the content fits.
    fn max_offset(&self, axis: Axis) -> f64 {
        let frame_extent = match axis {
            Axis::Vertical => self.frame.height,
            Axis::Horizontal => self.frame.width,
        };
        (self.content_extent(axis) - frame_extent).max(0.0)
    }
}

/// One recorded interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureRecord {
    Scroll {
        container: String,
        direction: Direction,
        requested: f64,
        travelled: f64,
    },
    Gesture {
        gesture: Gesture,
        target: String,
    },
}

#[derive(Debug, Default)]
struct ScreenState {
    /// `(x, y)` content offset per scroll view, by index.
    offsets: Vec<(f64, f64)>,
    gestures: Vec<GestureRecord>,
}

/// A [`ScrollDriver`] backed by a [`ScreenFixture`].
#[derive(Debug)]
pub struct SimulatedScreen {
    fixture: ScreenFixture,
    policy: SearchPolicy,
    state: Mutex<ScreenState>,
}

impl SimulatedScreen {
    pub fn new(fixture: ScreenFixture) -> Self {
        let offsets = vec![(0.0, 0.0); fixture.scroll_views.len()];
        Self {
            fixture,
            policy: SearchPolicy::default(),
            state: Mutex::new(ScreenState {
                offsets,
                gestures: Vec::new(),
            }),
        }
    }

    /// Load a fixture from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DriverError> {
        let json = std::fs::read_to_string(path)?;
        let fixture: ScreenFixture =
            serde_json::from_str(&json).map_err(|e| DriverError::JsonParse(e.to_string()))?;
        Ok(Self::new(fixture))
    }

    pub fn with_policy(mut self, policy: SearchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn fixture(&self) -> &ScreenFixture {
        &self.fixture
    }

    /// Everything delivered so far, in order.
    pub fn gestures(&self) -> Vec<GestureRecord> {
        self.state().gestures.clone()
    }

    pub fn swipe_count(&self) -> usize {
        self.state()
            .gestures
            .iter()
            .filter(|g| matches!(g, GestureRecord::Scroll { .. }))
            .count()
    }

    pub fn tap_count(&self) -> usize {
        self.state()
            .gestures
            .iter()
            .filter(|g| matches!(g, GestureRecord::Gesture { gesture: Gesture::Tap, .. }))
            .count()
    }

    /// Current `(x, y)` content offset of the named scroll view.
    pub fn offset(&self, scroll_view: &str) -> Option<(f64, f64)> {
        let index = self.scroll_view_index(scroll_view)?;
        self.state().offsets.get(index).copied()
    }

    fn state(&self) -> MutexGuard<'_, ScreenState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn scroll_view_index(&self, identifier: &str) -> Option<usize> {
        self.fixture
            .scroll_views
            .iter()
            .position(|sv| sv.identifier == identifier)
    }

    fn screen_frame(&self) -> ElementFrame {
        ElementFrame::new(0.0, 0.0, self.fixture.viewport.width, self.fixture.viewport.height)
    }

    fn render(&self) -> Vec<UIElement> {
        let screen = self.screen_frame();
        let offsets = self.state().offsets.clone();

        let mut tree: Vec<UIElement> = self
            .fixture
            .elements
            .iter()
            .map(|e| place(e, 0.0, 0.0, &screen))
            .collect();

        for (sv, (off_x, off_y)) in self.fixture.scroll_views.iter().zip(offsets) {
            let clip = intersection(&sv.frame, &screen);
            let children = sv
                .content
                .iter()
                .map(|e| match clip {
                    Some(clip) => place(e, sv.frame.x - off_x, sv.frame.y - off_y, &clip),
                    None => hide(place(e, sv.frame.x - off_x, sv.frame.y - off_y, &screen)),
                })
                .collect();
            tree.push(UIElement {
                identifier: Some(sv.identifier.clone()),
                label: sv.label.clone(),
                element_type: Some(SCROLL_VIEW_TYPE.to_string()),
                frame: Some(sv.frame),
                children,
                visible: Some(clip.is_some()),
                ..Default::default()
            });
        }
        tree
    }
}

/// Translate an element subtree by `(dx, dy)` and mark each node visible if
/// it overlaps `clip`. An element the fixture marks hidden stays hidden.
fn place(element: &UIElement, dx: f64, dy: f64, clip: &ElementFrame) -> UIElement {
    let frame = element.frame.map(|f| f.offset(dx, dy));
    let on_screen = frame.map_or(true, |f| f.intersects(clip));
    UIElement {
        frame,
        visible: Some(element.is_visible() && on_screen),
        children: element
            .children
            .iter()
            .map(|child| place(child, dx, dy, clip))
            .collect(),
        ..element.clone()
    }
}

fn hide(mut element: UIElement) -> UIElement {
    element.visible = Some(false);
    element.children = element.children.into_iter().map(hide).collect();
    element
}

fn intersection(a: &ElementFrame, b: &ElementFrame) -> Option<ElementFrame> {
    if !a.intersects(b) {
        return None;
    }
    let x = a.x.max(b.x);
    let y = a.y.max(b.y);
    let right = (a.x + a.width).min(b.x + b.width);
    let bottom = (a.y + a.height).min(b.y + b.height);
    Some(ElementFrame::new(x, y, right - x, bottom - y))
}

#[async_trait]
impl ScrollDriver for SimulatedScreen {
    async fn dump_tree(&self) -> Result<Vec<UIElement>, DriverError> {
        Ok(self.render())
    }

    async fn viewport(&self) -> Result<Viewport, DriverError> {
        Ok(self.fixture.viewport)
    }

    async fn scroll(
        &self,
        container: &ElementHandle,
        direction: Direction,
        distance: ScrollDistance,
    ) -> Result<ScrollOutcome, DriverError> {
        let name = container.element().identifier.clone().unwrap_or_default();
        let index = self.scroll_view_index(&name).ok_or_else(|| {
            DriverError::CommandFailed(format!(
                "{} is not a scroll view",
                container.element().describe()
            ))
        })?;
        let sv = &self.fixture.scroll_views[index];
        let axis = direction.axis();
        let max = sv.max_offset(axis);

        let mut state = self.state();
        let (x, y) = state.offsets[index];
        let current = match axis {
            Axis::Vertical => y,
            Axis::Horizontal => x,
        };
        let next = (current + direction.sign() * distance.points()).clamp(0.0, max);
        state.offsets[index] = match axis {
            Axis::Vertical => (x, next),
            Axis::Horizontal => (next, y),
        };
        let travelled = (next - current).abs();
        state.gestures.push(GestureRecord::Scroll {
            container: name.clone(),
            direction,
            requested: distance.points(),
            travelled,
        });
        debug!(scroll_view = %name, offset = next, travelled, "simulated scroll");

        Ok(ScrollOutcome { travelled })
    }

    async fn perform(&self, element: &ElementHandle, gesture: Gesture) -> Result<(), DriverError> {
        let wanted = element.element();
        let tree = self.render();
        let copies: Vec<UIElement> = matcher::find_all(&tree, element.matcher())
            .into_iter()
            .filter(|e| e.identifier == wanted.identifier && e.label == wanted.label)
            .collect();
        // Duplicates are told apart by frame; nothing has moved since the
        // handle resolved unless a scroll happened in between.
        let current = copies
            .iter()
            .position(|e| e.frame == wanted.frame)
            .or_else(|| copies.iter().position(UIElement::is_visible))
            .map(|i| copies[i].clone());

        let failure = |reason: &str| DriverError::GestureFailed {
            gesture: gesture.name().to_string(),
            reason: format!("{} {}", wanted.describe(), reason),
        };
        let current = match current {
            Some(e) if e.is_visible() => e,
            _ => return Err(failure("is no longer on screen")),
        };
        if !current.is_hittable() {
            return Err(failure("is not hittable"));
        }

        self.state().gestures.push(GestureRecord::Gesture {
            gesture,
            target: current.describe(),
        });
        Ok(())
    }

    fn search_policy(&self) -> SearchPolicy {
        self.policy
    }
}
