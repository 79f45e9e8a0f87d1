//! Automation driver trait for backend-agnostic UI automation.
//!
//! This module defines the [`ScrollDriver`] trait, the seam between the
//! helpers and whatever engine actually talks to the application under test.
//! Backends supply four primitives (hierarchy dump, viewport size, a single
//! scroll, gesture delivery); element location and the scroll-search retry
//! loop are provided on top of them and can be overridden by backends that
//! search server-side.
//!
//! # Retry budget
//!
//! How long a scroll search keeps going is owned by the driver through
//! [`ScrollDriver::search_policy`]. The helpers never add a timeout of their
//! own.
//!
//! ```
//! use scrolltap_core::driver::SearchPolicy;
//!
//! let policy = SearchPolicy::default();
//! assert_eq!(policy.timeout_ms, 30_000);
//! assert!(policy.strict);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use crate::element::UIElement;
use crate::gesture::{Direction, Gesture, ScrollDistance, ScrollOutcome, Viewport};
use crate::matcher::{self, Matcher};

/// Errors that can occur during automation driver operations.
///
/// This enum unifies errors from all backends behind a single type,
/// allowing consumers to handle errors uniformly regardless of the
/// underlying automation backend.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Nothing satisfied the matcher within the retry budget.
    #[error("No element matching {matcher} found after {swipes} swipe(s)")]
    ElementNotFound { matcher: String, swipes: u32 },

    /// More than one element satisfied the matcher at once.
    #[error("{count} elements match {matcher}; expected exactly one")]
    AmbiguousMatch { matcher: String, count: usize },

    /// The resolved element rejected a gesture.
    #[error("Could not {gesture}: {reason}")]
    GestureFailed { gesture: String, reason: String },

    /// The time budget ran out during a scroll search.
    #[error("Timed out after {elapsed_ms}ms searching for {matcher}")]
    Timeout { matcher: String, elapsed_ms: u64 },

    /// A caller-supplied value was out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A command or operation failed with the given message.
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// The backend is not available or not connected.
    #[error("Not connected to automation backend")]
    NotConnected,

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    JsonParse(String),
}

/// Coarse classification of a [`DriverError`], for callers that branch on
/// the failure rather than print it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ElementNotFound,
    AmbiguousMatch,
    GestureFailed,
    Timeout,
    Other,
}

impl DriverError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DriverError::ElementNotFound { .. } => ErrorKind::ElementNotFound,
            DriverError::AmbiguousMatch { .. } => ErrorKind::AmbiguousMatch,
            DriverError::GestureFailed { .. } => ErrorKind::GestureFailed,
            DriverError::Timeout { .. } => ErrorKind::Timeout,
            _ => ErrorKind::Other,
        }
    }

    pub(crate) fn not_found(matcher: &Matcher, swipes: u32) -> Self {
        DriverError::ElementNotFound {
            matcher: matcher.to_string(),
            swipes,
        }
    }
}

/// Retry budget for scroll searches.
///
/// A search stops at whichever limit is hit first. `strict` decides what
/// happens when more than one element satisfies the target matcher: strict
/// searches fail with [`DriverError::AmbiguousMatch`], non-strict ones take
/// the first visible match in hierarchy order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPolicy {
    /// Wall-clock budget for one search, in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of swipes in one search.
    pub max_swipes: u32,
    /// Fail on more than one match instead of picking the first.
    pub strict: bool,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_swipes: 100,
            strict: true,
        }
    }
}

impl SearchPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// A resolved element: the snapshot taken when the matcher resolved, plus
/// the matcher itself so later failures can name it.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementHandle {
    element: UIElement,
    matcher: Matcher,
}

impl ElementHandle {
    pub fn new(element: UIElement, matcher: Matcher) -> Self {
        Self { element, matcher }
    }

    pub fn element(&self) -> &UIElement {
        &self.element
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn into_element(self) -> UIElement {
        self.element
    }
}

/// Trait for backend-agnostic UI automation with scroll search.
///
/// # Required Methods
///
/// Implementors must provide: [`dump_tree`](ScrollDriver::dump_tree),
/// [`viewport`](ScrollDriver::viewport), [`scroll`](ScrollDriver::scroll)
/// and [`perform`](ScrollDriver::perform).
///
/// Everything else has a default built on those primitives.
#[async_trait]
pub trait ScrollDriver: Send + Sync {
    /// Dump the current accessibility hierarchy.
    async fn dump_tree(&self) -> Result<Vec<UIElement>, DriverError>;

    /// Size of the visible screen.
    async fn viewport(&self) -> Result<Viewport, DriverError>;

    /// Swipe once inside `container`, moving its content by `distance` in
    /// `direction`.
    ///
    /// Returns how far the content actually moved; zero means the content
    /// edge had already been reached.
    async fn scroll(
        &self,
        container: &ElementHandle,
        direction: Direction,
        distance: ScrollDistance,
    ) -> Result<ScrollOutcome, DriverError>;

    /// Deliver a gesture to a resolved element.
    async fn perform(&self, element: &ElementHandle, gesture: Gesture) -> Result<(), DriverError>;

    /// The retry budget for [`locate_within_scrollable`](Self::locate_within_scrollable).
    fn search_policy(&self) -> SearchPolicy {
        SearchPolicy::default()
    }

    /// Every element in the hierarchy satisfying `matcher`, visible or not.
    async fn find_all(&self, matcher: &Matcher) -> Result<Vec<UIElement>, DriverError> {
        let tree = self.dump_tree().await?;
        Ok(matcher::find_all(&tree, matcher))
    }

    /// Resolve `matcher` against the current screen without waiting.
    ///
    /// Returns `Ok(None)` when nothing matches or the match is off screen.
    /// Under a strict policy more than one match is an
    /// [`AmbiguousMatch`](DriverError::AmbiguousMatch), whether or not the
    /// matches are visible.
    async fn try_locate(&self, matcher: &Matcher) -> Result<Option<ElementHandle>, DriverError> {
        let matches = self.find_all(matcher).await?;
        if self.search_policy().strict && matches.len() > 1 {
            return Err(DriverError::AmbiguousMatch {
                matcher: matcher.to_string(),
                count: matches.len(),
            });
        }
        Ok(matches
            .into_iter()
            .find(UIElement::is_visible)
            .map(|element| ElementHandle::new(element, matcher.clone())))
    }

    /// Resolve `matcher` to exactly one visible element, or fail.
    async fn locate(&self, matcher: &Matcher) -> Result<ElementHandle, DriverError> {
        self.try_locate(matcher)
            .await?
            .ok_or_else(|| DriverError::not_found(matcher, 0))
    }

    /// Swipe inside the visible container matching `container` until
    /// `matcher` resolves to a visible element.
    ///
    /// The target is evaluated before the first swipe, so an element that is
    /// already on screen costs no gestures. The search ends with
    /// [`ElementNotFound`](DriverError::ElementNotFound) when a swipe no
    /// longer moves the content or the swipe budget is spent, and with
    /// [`Timeout`](DriverError::Timeout) when the time budget is spent.
    async fn locate_within_scrollable(
        &self,
        matcher: &Matcher,
        container: &Matcher,
        direction: Direction,
        distance: ScrollDistance,
    ) -> Result<ElementHandle, DriverError> {
        let policy = self.search_policy();
        let visible_container = container.clone().and(Matcher::visible());
        let start = Instant::now();
        let mut swipes: u32 = 0;

        loop {
            if let Some(handle) = self.try_locate(matcher).await? {
                debug!(%matcher, swipes, "target resolved");
                return Ok(handle);
            }

            if swipes >= policy.max_swipes {
                return Err(DriverError::not_found(matcher, swipes));
            }
            let elapsed = start.elapsed();
            if elapsed >= policy.timeout() {
                return Err(DriverError::Timeout {
                    matcher: matcher.to_string(),
                    elapsed_ms: elapsed.as_millis() as u64,
                });
            }

            let scroll_view = self.locate(&visible_container).await?;
            let outcome = self.scroll(&scroll_view, direction, distance).await?;
            swipes += 1;
            debug!(
                swipes,
                %direction,
                travelled = outcome.travelled,
                container = %scroll_view.element().describe(),
                "swiped"
            );

            if outcome.reached_edge() {
                return Err(DriverError::not_found(matcher, swipes));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::ElementNotFound {
            matcher: r#"id("row-9")"#.to_string(),
            swipes: 4,
        };
        assert!(err.to_string().contains(r#"id("row-9")"#));
        assert!(err.to_string().contains("4 swipe"));

        let err = DriverError::AmbiguousMatch {
            matcher: "visible".to_string(),
            count: 3,
        };
        assert!(err.to_string().starts_with("3 elements"));

        let err = DriverError::GestureFailed {
            gesture: "tap".to_string(),
            reason: "element is disabled".to_string(),
        };
        assert!(err.to_string().contains("element is disabled"));

        let err = DriverError::NotConnected;
        assert!(err.to_string().contains("Not connected"));
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            DriverError::not_found(&Matcher::id("x"), 0).kind(),
            ErrorKind::ElementNotFound
        );
        assert_eq!(
            DriverError::Timeout { matcher: String::new(), elapsed_ms: 1 }.kind(),
            ErrorKind::Timeout
        );
        assert_eq!(DriverError::JsonParse("x".into()).kind(), ErrorKind::Other);
    }

    #[test]
    fn test_search_policy_partial_json_keeps_defaults() {
        let policy: SearchPolicy = serde_json::from_str(r#"{"max_swipes": 7}"#).unwrap();
        assert_eq!(policy.max_swipes, 7);
        assert_eq!(policy.timeout_ms, 30_000);
        assert!(policy.strict);
        assert_eq!(policy.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_element_handle_accessors() {
        let element = UIElement {
            identifier: Some("row-1".into()),
            ..Default::default()
        };
        let handle = ElementHandle::new(element.clone(), Matcher::id("row-1"));
        assert_eq!(handle.element(), &element);
        assert_eq!(handle.matcher(), &Matcher::id("row-1"));
        assert_eq!(handle.into_element(), element);
    }
}
