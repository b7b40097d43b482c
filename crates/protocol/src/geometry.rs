use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle describing a drawable coordinate space.
///
/// A flamegraph's config space is `Rect::new(0.0, 0.0, width, depth)`:
/// the X axis carries profile-unit positions, the Y axis stack depth.
/// Renderers map their pixel geometry into this rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Zero-sized rectangle at the origin.
    pub fn empty() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0.0 || self.h == 0.0
    }
}
