//! Pitch Geometry
//!
//! Event coordinates are percentages of the pitch (0..100 on both axes) in
//! the perspective of the team performing the action: that team always
//! attacks toward x = 100.
//!
//! Only axis-aligned zones and straight-line distances are needed by the
//! boundary rules, so this stays a handful of plain functions.

use serde::{Deserialize, Serialize};

pub mod pitch {
    /// Length/width of the normalized pitch
    pub const EXTENT: f64 = 100.0;
    /// x of the halfway line
    pub const MIDLINE_X: f64 = 50.0;
}

/// A point on the normalized pitch.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct FieldPoint {
    pub x: f64,
    pub y: f64,
}

impl FieldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &FieldPoint) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether the point sits in the half the acting team attacks.
    pub fn beyond_midline(&self, midline_x: f64) -> bool {
        self.x > midline_x
    }
}

/// Straight-line movement between the start and end of an action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Displacement {
    /// Progress toward the attacked goal (negative = backward)
    pub forward: f64,
    /// Euclidean length
    pub total: f64,
}

impl Displacement {
    pub fn between(start: FieldPoint, end: FieldPoint) -> Self {
        Self {
            forward: end.x - start.x,
            total: start.distance_to(&end),
        }
    }

    pub fn is_backward(&self) -> bool {
        self.forward < 0.0
    }
}

/// Axis-aligned rectangle on the normalized pitch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Zone {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Zone {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// Own half plus a strip past the halfway line, full width.
    pub fn own_half_to_back_third() -> Self {
        Self::new(0.0, 0.0, 55.0, pitch::EXTENT)
    }

    /// Strict interior test: points on the edge are outside.
    pub fn contains(&self, point: &FieldPoint) -> bool {
        point.x > self.min_x && point.x < self.max_x && point.y > self.min_y && point.y < self.max_y
    }
}
