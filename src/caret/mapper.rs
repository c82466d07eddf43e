use serde::{Deserialize, Serialize};

use super::types::CaretObservation;

/// Logical-space rectangle of a display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Squared distance from a point to the nearest edge (0 when inside).
    pub fn distance_sq(&self, x: f64, y: f64) -> f64 {
        let dx = (self.x - x).max(0.0).max(x - (self.x + self.width));
        let dy = (self.y - y).max(0.0).max(y - (self.y + self.height));
        dx * dx + dy * dy
    }
}

/// Scale and bounds of the display nearest a point. Queried live, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayMetrics {
    pub scale_factor: f64,
    pub bounds: Rect,
}

impl DisplayMetrics {
    pub fn new(scale_factor: f64, bounds: Rect) -> Self {
        Self { scale_factor, bounds }
    }

    /// Scale factor actually used for division. Non-positive or non-finite
    /// values are treated as 1.0.
    pub fn effective_scale(&self) -> f64 {
        if self.scale_factor.is_finite() && self.scale_factor > 0.0 {
            self.scale_factor
        } else {
            1.0
        }
    }
}

/// Live lookup of the display owning a physical point.
pub trait DisplayLookup {
    fn display_nearest_point(&self, x: i32, y: i32) -> DisplayMetrics;
}

/// Clamped overlay position derived from one observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalPosition {
    pub x: f64,
    pub y: f64,
    pub height: f64,
    pub text: Option<String>,
}

/// Physical → logical conversion with edge clearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    edge_clearance: f64,
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::new(Self::DEFAULT_EDGE_CLEARANCE)
    }
}

impl CoordinateMapper {
    /// Space reserved at the right/bottom edge so the widget never renders flush.
    pub const DEFAULT_EDGE_CLEARANCE: f64 = 50.0;

    pub fn new(edge_clearance: f64) -> Self {
        Self { edge_clearance }
    }

    pub fn edge_clearance(&self) -> f64 {
        self.edge_clearance
    }

    /// Pure mapping: Observation + Display -> LogicalPosition.
    /// The only side effect is the display query itself.
    pub fn map(&self, observation: &CaretObservation, displays: &impl DisplayLookup) -> LogicalPosition {
        // 1. Which display owns the caret
        let display = displays.display_nearest_point(observation.physical_x, observation.physical_y);
        let scale = display.effective_scale();

        // 2. Physical -> Logical
        let mut x = f64::from(observation.physical_x) / scale;
        let mut y = f64::from(observation.physical_y) / scale;
        let height = f64::from(observation.physical_height) / scale;

        // 3. Clamp. Right/bottom first so a degenerate display narrower than
        // the clearance resolves to its left/top edge.
        let bounds = display.bounds;
        let max_x = bounds.x + bounds.width - self.edge_clearance;
        let max_y = bounds.y + bounds.height - self.edge_clearance;
        if x > max_x {
            x = max_x;
        }
        if y > max_y {
            y = max_y;
        }
        if x < bounds.x {
            x = bounds.x;
        }
        if y < bounds.y {
            y = bounds.y;
        }

        LogicalPosition {
            x,
            y,
            height,
            text: observation.text.clone(),
        }
    }
}
