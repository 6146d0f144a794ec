//! Border detection by four independent line scans.
//!
//! Each edge is scanned inward until a row or column is found that is not
//! entirely background:
//! 1. **top**: rows from 0 downward
//! 2. **bottom**: rows from `height - 1` upward
//! 3. **left**: columns from 0 rightward
//! 4. **right**: columns from `width - 1` leftward
//!
//! A scan that runs off the image keeps the sentinel it reached, so an
//! all-background image yields crossed borders.

use image::RgbaImage;
use tracing::debug;

use crate::classify::BackgroundRule;

/// Raw scan results, inclusive indices of the outermost content lines.
///
/// Fields are signed so an exhausted scan can hold `-1` (bottom, right)
/// or the image extent (top, left).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Borders {
    /// First row containing content, or `height` if none.
    pub top: i64,
    /// Last row containing content, or `-1` if none.
    pub bottom: i64,
    /// First column containing content, or `width` if none.
    pub left: i64,
    /// Last column containing content, or `-1` if none.
    pub right: i64,
}

/// Half-open rectangle of image content: `left..right`, `top..bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    /// Left edge (inclusive).
    pub left: u32,
    /// Top edge (inclusive).
    pub top: u32,
    /// Right edge (exclusive).
    pub right: u32,
    /// Bottom edge (exclusive).
    pub bottom: u32,
}

impl CropBox {
    /// Width of the box in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    /// Height of the box in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Whether the box spans the whole `width` x `height` image.
    #[must_use]
    pub fn covers(&self, width: u32, height: u32) -> bool {
        self.left == 0 && self.top == 0 && self.right == width && self.bottom == height
    }
}

impl Borders {
    /// Convert to a crop box, or `None` when the borders meet or cross.
    ///
    /// Content that is a single row or column thick counts as degenerate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn crop_box(&self) -> Option<CropBox> {
        if self.top >= self.bottom || self.left >= self.right {
            return None;
        }
        // Non-crossed borders lie inside the image, so the casts are lossless.
        Some(CropBox {
            left: self.left as u32,
            top: self.top as u32,
            right: (self.right + 1) as u32,
            bottom: (self.bottom + 1) as u32,
        })
    }
}

fn row_is_background(img: &RgbaImage, y: u32, rule: &BackgroundRule) -> bool {
    (0..img.width()).all(|x| rule.is_background(img.get_pixel(x, y)))
}

fn column_is_background(img: &RgbaImage, x: u32, rule: &BackgroundRule) -> bool {
    (0..img.height()).all(|y| rule.is_background(img.get_pixel(x, y)))
}

/// Scan all four edges of `img` and return the raw borders.
#[must_use]
pub fn find_borders(img: &RgbaImage, rule: &BackgroundRule) -> Borders {
    let (width, height) = img.dimensions();

    let top = (0..height)
        .find(|&y| !row_is_background(img, y, rule))
        .map_or(i64::from(height), i64::from);

    let bottom = (0..height)
        .rev()
        .find(|&y| !row_is_background(img, y, rule))
        .map_or(-1, i64::from);

    let left = (0..width)
        .find(|&x| !column_is_background(img, x, rule))
        .map_or(i64::from(width), i64::from);

    let right = (0..width)
        .rev()
        .find(|&x| !column_is_background(img, x, rule))
        .map_or(-1, i64::from);

    let borders = Borders {
        top,
        bottom,
        left,
        right,
    };
    debug!(?borders, width, height, "border scan finished");
    borders
}
