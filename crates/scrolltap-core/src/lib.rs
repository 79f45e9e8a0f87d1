//! # scrolltap-core
//!
//! Scroll-into-view and tap helpers layered over any UI-automation driver.
//!
//! The crate is built around the [`driver::ScrollDriver`] trait. A backend
//! implements four primitives (hierarchy dump, viewport size, a single
//! scroll, gesture delivery) and gets element location and scroll search on
//! top. [`helper::ScrollAndTapHelper`] wraps any such driver with the two
//! everyday actions:
//!
//! - scroll an element into view inside a scrollable container, and
//! - tap an element after scrolling it into view.
//!
//! ## Modules
//!
//! - [`element`] - Accessibility snapshot types
//! - [`matcher`] - Element predicates with glob patterns
//! - [`gesture`] - Directions, scroll distances and gestures
//! - [`location`] - Call-site attribution for failures
//! - [`driver`] - The driver trait, its errors and the search budget
//! - [`helper`] - The scroll-and-tap helper
//! - [`simulated`] - An in-memory screen implementing the driver
//! - [`config`] - Persistent settings in `~/.scrolltap/config.json`
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use scrolltap_core::helper::ScrollAndTapHelper;
//! use scrolltap_core::matcher::Matcher;
//! use scrolltap_core::simulated::SimulatedScreen;
//!
//! #[tokio::main]
//! async fn main() {
//!     let screen = SimulatedScreen::load("screen.json").expect("fixture");
//!     let helper = ScrollAndTapHelper::new(Arc::new(screen));
//!
//!     helper
//!         .tap_after_scrolling_into_view(&Matcher::label("Sign Out"), &Matcher::id("settings"))
//!         .await
//!         .expect("sign out row");
//! }
//! ```

pub mod config;
pub mod driver;
pub mod element;
pub mod gesture;
pub mod helper;
pub mod location;
pub mod matcher;
pub mod simulated;
