//! Per-pixel background classification.
//!
//! A pixel belongs to the backdrop when it is fully transparent (and the
//! transparent rule is enabled) or when its red, green and blue channels
//! all reach the white threshold:
//! `background = (transparent && a == 0) || min(r, g, b) >= threshold`

use image::Rgba;

/// Default white threshold for the RGB test.
pub const DEFAULT_THRESHOLD: u8 = 240;

/// Parameters of the background test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundRule {
    /// Each of R, G and B must be `>=` this value for a white pixel.
    pub threshold: u8,
    /// Treat pixels with alpha exactly 0 as background regardless of color.
    pub transparent_is_background: bool,
}

impl Default for BackgroundRule {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            transparent_is_background: true,
        }
    }
}

impl BackgroundRule {
    /// Classify a single pixel.
    ///
    /// Partially transparent pixels (alpha 1..=254) only count as background
    /// when they also pass the RGB threshold.
    #[must_use]
    pub fn is_background(&self, pixel: &Rgba<u8>) -> bool {
        let [r, g, b, a] = pixel.0;
        if self.transparent_is_background && a == 0 {
            return true;
        }
        r >= self.threshold && g >= self.threshold && b >= self.threshold
    }
}
