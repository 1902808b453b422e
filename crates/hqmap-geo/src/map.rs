//! Map coordinate space

use serde::Serialize;

/// Drawable extent of a map in its own coordinate units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapExtent {
    /// Width in map units
    pub width: f64,
    /// Height in map units
    pub height: f64,
}

/// The 959×593 United States vector map
pub const US_MAP: MapExtent = MapExtent {
    width: 959.0,
    height: 593.0,
};

impl MapExtent {
    /// Whether a point lies inside the drawable extent (edges included)
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Point2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }

    /// Point as fractions of width/height, each clamped to [0, 1]
    #[must_use]
    pub fn relative(&self, point: Point2) -> (f64, f64) {
        (
            (point.x / self.width).clamp(0.0, 1.0),
            (point.y / self.height).clamp(0.0, 1.0),
        )
    }
}

/// Point in map coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point2 {
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
}

impl Point2 {
    /// Create new point
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
