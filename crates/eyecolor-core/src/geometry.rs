//! Axis-aligned rectangles in image or view space.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Rectangle with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: DVec2,
    pub size: DVec2,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: DVec2::new(x, y),
            size: DVec2::new(width, height),
        }
    }

    /// Rectangle of `size` centred on `center`.
    pub fn from_center(center: DVec2, size: DVec2) -> Self {
        Self {
            origin: center - size / 2.0,
            size,
        }
    }

    pub fn center(&self) -> DVec2 {
        self.origin + self.size / 2.0
    }

    pub fn width(&self) -> f64 {
        self.size.x
    }

    pub fn height(&self) -> f64 {
        self.size.y
    }

    pub fn contains(&self, point: DVec2) -> bool {
        let max = self.origin + self.size;
        point.x >= self.origin.x && point.y >= self.origin.y && point.x <= max.x && point.y <= max.y
    }

    /// Mirror vertically inside a space of the given height
    /// (bottom-left origin to top-left origin and back).
    pub fn flip_y(&self, space_height: f64) -> Self {
        Self {
            origin: DVec2::new(self.origin.x, space_height - self.origin.y - self.size.y),
            size: self.size,
        }
    }
}
