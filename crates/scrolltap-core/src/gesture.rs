//! Gesture vocabulary shared by the driver and the helpers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::driver::DriverError;

/// Scroll direction, named after the content being revealed: `Down` brings
/// content further down into view (the content offset grows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Down,
    Up,
    Left,
    Right,
}

/// The axis a direction scrolls along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Vertical,
    Horizontal,
}

impl Direction {
    pub fn axis(self) -> Axis {
        match self {
            Direction::Down | Direction::Up => Axis::Vertical,
            Direction::Left | Direction::Right => Axis::Horizontal,
        }
    }

    /// +1 when scrolling grows the content offset, -1 when it shrinks it.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Down | Direction::Right => 1.0,
            Direction::Up | Direction::Left => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Up => "up",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "down" => Ok(Direction::Down),
            "up" => Ok(Direction::Up),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(DriverError::InvalidArgument(format!(
                "Invalid scroll direction '{}'. Use: up, down, left, right",
                s
            ))),
        }
    }
}

/// How far a single swipe moves the content, in screen points. Always
/// finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ScrollDistance(f64);

impl ScrollDistance {
    pub fn new(points: f64) -> Result<Self, DriverError> {
        if points.is_finite() && points > 0.0 {
            Ok(Self(points))
        } else {
            Err(DriverError::InvalidArgument(format!(
                "Scroll distance must be a positive number of points (got {})",
                points
            )))
        }
    }

    /// Half of a viewport extent, the default swipe size.
    pub fn half_of(extent: f64) -> Result<Self, DriverError> {
        Self::new(extent / 2.0)
    }

    pub fn points(self) -> f64 {
        self.0
    }
}

impl fmt::Display for ScrollDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}pt", self.0)
    }
}

/// Size of the visible screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Vertical => self.height,
            Axis::Horizontal => self.width,
        }
    }
}

/// A synthesized interaction delivered to a resolved element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Tap,
    DoubleTap,
    /// Press and hold for `duration` seconds.
    LongPress { duration: f64 },
}

impl Gesture {
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Tap => "tap",
            Gesture::DoubleTap => "double_tap",
            Gesture::LongPress { .. } => "long_press",
        }
    }
}

/// What a single scroll achieved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollOutcome {
    /// Points the content actually moved. Less than requested near the end
    /// of the content, zero once the edge is reached.
    pub travelled: f64,
}

impl ScrollOutcome {
    pub fn reached_edge(&self) -> bool {
        self.travelled <= 0.0
    }
}
