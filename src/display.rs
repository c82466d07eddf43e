use serde::{Deserialize, Serialize};

use crate::caret::mapper::{DisplayLookup, DisplayMetrics, Rect};

/// One monitor as described in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale_factor: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1920.0,
            height: 1080.0,
            scale_factor: 1.0,
        }
    }
}

impl From<DisplayConfig> for DisplayMetrics {
    fn from(cfg: DisplayConfig) -> Self {
        DisplayMetrics::new(cfg.scale_factor, Rect::new(cfg.x, cfg.y, cfg.width, cfg.height))
    }
}

/// The monitor set the overlay spans.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayLayout {
    displays: Vec<DisplayMetrics>,
}

impl DisplayLayout {
    pub fn new(displays: Vec<DisplayMetrics>) -> Self {
        Self { displays }
    }

    pub fn from_config(displays: &[DisplayConfig]) -> Self {
        Self::new(displays.iter().copied().map(DisplayMetrics::from).collect())
    }

    pub fn displays(&self) -> &[DisplayMetrics] {
        &self.displays
    }

    pub fn primary(&self) -> DisplayMetrics {
        self.displays
            .first()
            .copied()
            .unwrap_or_else(|| DisplayConfig::default().into())
    }
}

impl DisplayLookup for DisplayLayout {
    /// Containing display first, otherwise the one with the closest edge.
    /// The point is compared against logical bounds as-is.
    fn display_nearest_point(&self, x: i32, y: i32) -> DisplayMetrics {
        let (px, py) = (f64::from(x), f64::from(y));

        if let Some(found) = self.displays.iter().find(|d| d.bounds.contains(px, py)) {
            return *found;
        }

        self.displays
            .iter()
            .min_by(|a, b| {
                a.bounds
                    .distance_sq(px, py)
                    .total_cmp(&b.bounds.distance_sq(px, py))
            })
            .copied()
            .unwrap_or_else(|| self.primary())
    }
}
