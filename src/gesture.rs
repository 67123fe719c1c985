//! Gesture input types.
//!
//! The host delivers pointer samples in surface coordinates (origin top-left,
//! y growing downward) with a timestamp in seconds. Rates may be irregular and
//! timestamps may repeat.

/// A single pointer-motion sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub x: f64,
    pub y: f64,
    /// Seconds on the host's gesture timeline.
    pub timestamp: f64,
}

impl GestureSample {
    pub fn new(x: f64, y: f64, timestamp: f64) -> Self {
        Self { x, y, timestamp }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.timestamp.is_finite()
    }
}

/// Extent of the interaction surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Vertical center, the line swipes have to cross.
    #[inline]
    pub fn midline(&self) -> f64 {
        self.height / 2.0
    }

    /// True when `y` lies in the bottom one-sixth of the surface, where
    /// horizontal position sets the modulation depth.
    #[inline]
    pub fn in_depth_zone(&self, y: f64) -> bool {
        y > self.height * 5.0 / 6.0
    }

    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}
