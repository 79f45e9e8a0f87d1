//! Shared test helpers for scrolltap-core integration tests.
//!
//! Provides a scripted mock driver whose target appears after a fixed number
//! of swipes, plus fixture builders for the simulated screen.

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use scrolltap_core::driver::{DriverError, ElementHandle, ScrollDriver, SearchPolicy};
use scrolltap_core::element::{ElementFrame, UIElement};
use scrolltap_core::gesture::{Direction, Gesture, ScrollDistance, ScrollOutcome, Viewport};
use scrolltap_core::simulated::{ScreenFixture, ScrollViewFixture, SimulatedScreen};

pub const SCROLLER: &str = "scroller";
pub const TARGET: &str = "target";

// ---------------------------------------------------------------------------
// Scripted mock driver
// ---------------------------------------------------------------------------

/// Everything the mock was asked to do, in order.
#[derive(Debug, Default)]
pub struct Calls {
    pub swipes: Vec<(Direction, f64)>,
    pub gestures: Vec<Gesture>,
}

/// A driver with one scroll container and `copies` target elements that
/// become visible once `reveal_after` swipes have been made.
pub struct ScriptedDriver {
    pub viewport: Viewport,
    pub policy: SearchPolicy,
    /// `None` means the target never appears.
    pub reveal_after: Option<u32>,
    pub copies: usize,
    /// Simulated time each swipe takes.
    pub swipe_delay: Duration,
    /// When set, every gesture is rejected with this reason.
    pub reject_gestures: Option<String>,
    pub calls: Mutex<Calls>,
}

impl ScriptedDriver {
    pub fn new(reveal_after: Option<u32>) -> Self {
        Self {
            viewport: Viewport { width: 400.0, height: 1000.0 },
            policy: SearchPolicy::default(),
            reveal_after,
            copies: 1,
            swipe_delay: Duration::ZERO,
            reject_gestures: None,
            calls: Mutex::new(Calls::default()),
        }
    }

    pub fn swipes(&self) -> Vec<(Direction, f64)> {
        self.calls.lock().unwrap().swipes.clone()
    }

    pub fn gestures(&self) -> Vec<Gesture> {
        self.calls.lock().unwrap().gestures.clone()
    }

    fn target_visible(&self) -> bool {
        let swipes = self.calls.lock().unwrap().swipes.len() as u32;
        self.reveal_after.map_or(false, |n| swipes >= n)
    }
}

#[async_trait]
impl ScrollDriver for ScriptedDriver {
    async fn dump_tree(&self) -> Result<Vec<UIElement>, DriverError> {
        let visible = self.target_visible();
        let targets = (0..self.copies)
            .map(|_| UIElement {
                identifier: Some(TARGET.to_string()),
                visible: Some(visible),
                ..Default::default()
            })
            .collect();
        Ok(vec![UIElement {
            identifier: Some(SCROLLER.to_string()),
            element_type: Some("ScrollView".to_string()),
            visible: Some(true),
            children: targets,
            ..Default::default()
        }])
    }

    async fn viewport(&self) -> Result<Viewport, DriverError> {
        Ok(self.viewport)
    }

    async fn scroll(
        &self,
        _container: &ElementHandle,
        direction: Direction,
        distance: ScrollDistance,
    ) -> Result<ScrollOutcome, DriverError> {
        if !self.swipe_delay.is_zero() {
            tokio::time::sleep(self.swipe_delay).await;
        }
        self.calls
            .lock()
            .unwrap()
            .swipes
            .push((direction, distance.points()));
        Ok(ScrollOutcome {
            travelled: distance.points(),
        })
    }

    async fn perform(&self, _element: &ElementHandle, gesture: Gesture) -> Result<(), DriverError> {
        self.calls.lock().unwrap().gestures.push(gesture);
        match &self.reject_gestures {
            Some(reason) => Err(DriverError::GestureFailed {
                gesture: gesture.name().to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn search_policy(&self) -> SearchPolicy {
        self.policy
    }
}

// ---------------------------------------------------------------------------
// Simulated screen fixtures
// ---------------------------------------------------------------------------

pub const SCREEN_WIDTH: f64 = 390.0;
pub const SCREEN_HEIGHT: f64 = 800.0;

pub fn cell(id: &str, y: f64, height: f64) -> UIElement {
    UIElement {
        identifier: Some(id.to_string()),
        label: Some(id.replace('-', " ")),
        element_type: Some("Cell".to_string()),
        frame: Some(ElementFrame::new(0.0, y, SCREEN_WIDTH, height)),
        ..Default::default()
    }
}

/// A full-screen vertical list called `list` holding `cells`, with the given
/// content height.
pub fn list_screen(cells: Vec<UIElement>, content_height: f64) -> SimulatedScreen {
    let mut list = ScrollViewFixture::new("list", ElementFrame::new(0.0, 0.0, SCREEN_WIDTH, SCREEN_HEIGHT))
        .with_content_height(content_height);
    for cell in cells {
        list = list.with_content(cell);
    }
    SimulatedScreen::new(
        ScreenFixture::new(Viewport {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
        })
        .with_scroll_view(list),
    )
}
