//! Scroll-into-view and tap-after-scrolling helpers.
//!
//! [`ScrollAndTapHelper`] composes the primitives of any [`ScrollDriver`]
//! into the two actions UI tests reach for most often when content lives
//! inside a scroll view: bring an element on screen, and tap it once it is
//! there. The helper holds nothing but the injected driver; retries and time
//! limits are the driver's business.
//!
//! Failures carry the [`SourceLocation`] of the helper call, so a failing
//! test points at the test line rather than at driver internals.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use scrolltap_core::helper::{ScrollAndTapHelper, ScrollOptions};
//! use scrolltap_core::gesture::{Direction, ScrollDistance};
//! use scrolltap_core::matcher::Matcher;
//! use scrolltap_core::simulated::SimulatedScreen;
//!
//! # async fn run(screen: SimulatedScreen) -> Result<(), Box<dyn std::error::Error>> {
//! let helper = ScrollAndTapHelper::new(Arc::new(screen));
//! let list = Matcher::id("settings-list");
//!
//! // Half-screen swipes, downwards.
//! helper.tap_after_scrolling_into_view(&Matcher::label("Privacy"), &list).await?;
//!
//! // Explicit distance and direction.
//! let options = ScrollOptions::default()
//!     .with_distance(ScrollDistance::new(120.0)?)
//!     .with_direction(Direction::Up);
//! helper.scroll_into_view_with(&Matcher::id("header"), &list, options).await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info_span, Instrument};

use crate::driver::{DriverError, ElementHandle, ErrorKind, ScrollDriver};
use crate::gesture::{Direction, Gesture, ScrollDistance};
use crate::location::SourceLocation;
use crate::matcher::Matcher;

/// A driver failure attributed to the helper call that triggered it.
#[derive(Error, Debug)]
#[error("{location}: {source}")]
pub struct HelperError {
    /// Where the helper was called from.
    pub location: SourceLocation,
    /// The driver's error, unchanged.
    #[source]
    pub source: DriverError,
}

impl HelperError {
    pub fn new(location: SourceLocation, source: DriverError) -> Self {
        Self { location, source }
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

/// Parameters of the generalized helper forms.
///
/// | field       | default                                          |
/// |-------------|--------------------------------------------------|
/// | `distance`  | half the viewport extent along the scroll axis   |
/// | `direction` | [`Direction::Down`]                              |
/// | `location`  | the call site of the helper method               |
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollOptions {
    pub distance: Option<ScrollDistance>,
    pub direction: Direction,
    pub location: Option<SourceLocation>,
}

impl ScrollOptions {
    pub fn with_distance(mut self, distance: ScrollDistance) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Report failures against `location` instead of the helper call site.
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// Scroll-and-tap actions over an injected [`ScrollDriver`].
#[derive(Clone)]
pub struct ScrollAndTapHelper {
    driver: Arc<dyn ScrollDriver>,
}

impl ScrollAndTapHelper {
    pub fn new(driver: Arc<dyn ScrollDriver>) -> Self {
        Self { driver }
    }

    /// Returns a reference to the underlying driver.
    pub fn driver(&self) -> &Arc<dyn ScrollDriver> {
        &self.driver
    }

    /// Swipe down inside `within` in half-viewport steps until `target` is
    /// on screen, and return it.
    #[track_caller]
    pub fn scroll_into_view<'a>(
        &'a self,
        target: &'a Matcher,
        within: &'a Matcher,
    ) -> impl Future<Output = Result<ElementHandle, HelperError>> + Send + 'a {
        let location = SourceLocation::caller();
        self.run_scroll(target, within, ScrollOptions::default(), location)
    }

    /// Like [`scroll_into_view`](Self::scroll_into_view) with explicit
    /// distance, direction or call site.
    #[track_caller]
    pub fn scroll_into_view_with<'a>(
        &'a self,
        target: &'a Matcher,
        within: &'a Matcher,
        options: ScrollOptions,
    ) -> impl Future<Output = Result<ElementHandle, HelperError>> + Send + 'a {
        let caller = SourceLocation::caller();
        let location = options.location.unwrap_or(caller);
        self.run_scroll(target, within, options, location)
    }

    /// Scroll `target` into view inside `within`, then tap it once.
    ///
    /// No tap is attempted when the scroll step fails.
    #[track_caller]
    pub fn tap_after_scrolling_into_view<'a>(
        &'a self,
        target: &'a Matcher,
        within: &'a Matcher,
    ) -> impl Future<Output = Result<(), HelperError>> + Send + 'a {
        let location = SourceLocation::caller();
        self.run_tap(target, within, ScrollOptions::default(), location)
    }

    /// Like [`tap_after_scrolling_into_view`](Self::tap_after_scrolling_into_view)
    /// with explicit distance, direction or call site.
    #[track_caller]
    pub fn tap_after_scrolling_into_view_with<'a>(
        &'a self,
        target: &'a Matcher,
        within: &'a Matcher,
        options: ScrollOptions,
    ) -> impl Future<Output = Result<(), HelperError>> + Send + 'a {
        let caller = SourceLocation::caller();
        let location = options.location.unwrap_or(caller);
        self.run_tap(target, within, options, location)
    }

    /// Half the viewport extent along the axis `direction` scrolls on.
    pub async fn default_distance(&self, direction: Direction) -> Result<ScrollDistance, DriverError> {
        let viewport = self.driver.viewport().await?;
        ScrollDistance::half_of(viewport.extent(direction.axis()))
    }

    async fn run_scroll(
        &self,
        target: &Matcher,
        within: &Matcher,
        options: ScrollOptions,
        location: SourceLocation,
    ) -> Result<ElementHandle, HelperError> {
        let span = info_span!(
            "scroll_into_view",
            target = %target,
            within = %within,
            at = %location
        );
        async {
            let start = Instant::now();
            let result = self.scroll_inner(target, within, &options).await;
            debug!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                success = result.is_ok(),
                "scroll into view complete"
            );
            result.map_err(|source| HelperError::new(location, source))
        }
        .instrument(span)
        .await
    }

    async fn run_tap(
        &self,
        target: &Matcher,
        within: &Matcher,
        options: ScrollOptions,
        location: SourceLocation,
    ) -> Result<(), HelperError> {
        let span = info_span!(
            "tap_after_scrolling_into_view",
            target = %target,
            within = %within,
            at = %location
        );
        async {
            let start = Instant::now();
            let result = async {
                let handle = self.scroll_inner(target, within, &options).await?;
                self.driver.perform(&handle, Gesture::Tap).await
            }
            .await;
            debug!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                success = result.is_ok(),
                "tap after scrolling complete"
            );
            result.map_err(|source| HelperError::new(location, source))
        }
        .instrument(span)
        .await
    }

    async fn scroll_inner(
        &self,
        target: &Matcher,
        within: &Matcher,
        options: &ScrollOptions,
    ) -> Result<ElementHandle, DriverError> {
        let distance = match options.distance {
            Some(distance) => distance,
            None => self.default_distance(options.direction).await?,
        };
        debug!(%distance, direction = %options.direction, "searching");
        self.driver
            .locate_within_scrollable(target, within, options.direction, distance)
            .await
    }
}
