//! Core border cropping engine.

use image::{imageops, Rgba, RgbaImage};
use tracing::{debug, warn};

use crate::classify::BackgroundRule;
use crate::detection::{self, CropBox};
use crate::error::{Error, Result};

/// Default padding for single-image crops.
pub const DEFAULT_PADDING: u32 = 200;

/// Options controlling how an image is cropped and reframed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropOptions {
    /// Background classification parameters.
    pub rule: BackgroundRule,
    /// Re-pad the cropped content onto a centered square canvas.
    pub square: bool,
    /// Transparent pixels added on every side of the larger dimension.
    pub padding: u32,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            rule: BackgroundRule::default(),
            square: true,
            padding: DEFAULT_PADDING,
        }
    }
}

/// Outcome of [`crop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CropResult {
    /// A border was removed; the image is cropped and optionally squared.
    Cropped(RgbaImage),
    /// No border was found; the input buffer is returned untouched.
    Unchanged(RgbaImage),
}

impl CropResult {
    /// Borrow the resulting image.
    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        match self {
            Self::Cropped(img) | Self::Unchanged(img) => img,
        }
    }

    /// Take ownership of the resulting image.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        match self {
            Self::Cropped(img) | Self::Unchanged(img) => img,
        }
    }

    /// Whether a crop took place.
    #[must_use]
    pub fn is_cropped(&self) -> bool {
        matches!(self, Self::Cropped(_))
    }
}

/// Detect the background border of `image` and remove it.
///
/// Returns [`CropResult::Unchanged`] with the original buffer when the
/// detected borders meet or cross (e.g. the whole image is background), or
/// when there is no border to remove and `square` is off.
///
/// # Errors
///
/// Returns [`Error::InvalidImage`] if `image` has a zero dimension and
/// [`Error::CanvasTooLarge`] if the square canvas does not fit in `u32`.
pub fn crop(image: RgbaImage, options: &CropOptions) -> Result<CropResult> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::InvalidImage { width, height });
    }

    let Some(crop_box) = detection::find_borders(&image, &options.rule).crop_box() else {
        warn!(width, height, "no clear borders detected, image may be all background");
        return Ok(CropResult::Unchanged(image));
    };

    if crop_box.covers(width, height) && !options.square {
        debug!(width, height, "content touches every edge, nothing to crop");
        return Ok(CropResult::Unchanged(image));
    }

    let cropped = extract(&image, crop_box);
    if !options.square {
        return Ok(CropResult::Cropped(cropped));
    }

    pad_to_square(&cropped, options.padding).map(CropResult::Cropped)
}

/// Copy the pixels inside `crop_box` into a new buffer.
#[must_use]
pub fn extract(image: &RgbaImage, crop_box: CropBox) -> RgbaImage {
    imageops::crop_imm(
        image,
        crop_box.left,
        crop_box.top,
        crop_box.width(),
        crop_box.height(),
    )
    .to_image()
}

/// Offset of a `dim`-long side centered within `max_dim`, plus `padding`.
#[must_use]
pub fn centered_offset(max_dim: u32, dim: u32, padding: u32) -> u32 {
    padding + (max_dim - dim) / 2
}

/// Center `content` on a transparent square canvas.
///
/// The canvas side is `max(width, height) + 2 * padding`; content is pasted
/// over the transparent pixels without blending.
///
/// # Errors
///
/// Returns [`Error::CanvasTooLarge`] if the side length overflows `u32` or
/// the RGBA buffer would exceed the default `image` allocation limit.
pub fn pad_to_square(content: &RgbaImage, padding: u32) -> Result<RgbaImage> {
    let (width, height) = content.dimensions();
    let max_dim = width.max(height);
    let wide_size = u64::from(max_dim) + 2 * u64::from(padding);
    let size = u32::try_from(wide_size).map_err(|_| Error::CanvasTooLarge { size: wide_size })?;

    // Allocation cap shared with the decoder's default limits.
    let max_alloc = image::Limits::default().max_alloc.unwrap_or(u64::MAX);
    let bytes = wide_size
        .checked_mul(wide_size)
        .and_then(|px| px.checked_mul(4))
        .filter(|&b| b <= max_alloc && usize::try_from(b).is_ok());
    if bytes.is_none() {
        return Err(Error::CanvasTooLarge { size: wide_size });
    }

    let mut canvas = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));
    let x = centered_offset(max_dim, width, padding);
    let y = centered_offset(max_dim, height, padding);
    imageops::replace(&mut canvas, content, i64::from(x), i64::from(y));

    debug!(
        content_width = width,
        content_height = height,
        size,
        x,
        y,
        "padded to square canvas"
    );
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn framed_block() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(10, 10, WHITE);
        for y in 3..=6 {
            for x in 3..=6 {
                img.put_pixel(x, y, BLACK);
            }
        }
        img
    }

    fn no_square() -> CropOptions {
        CropOptions {
            square: false,
            ..CropOptions::default()
        }
    }

    #[test]
    fn crops_framed_block_to_content() {
        let result = crop(framed_block(), &no_square()).unwrap();
        assert!(result.is_cropped());
        let img = result.into_image();
        assert_eq!(img.dimensions(), (4, 4));
        assert!(img.pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn squares_framed_block_with_padding() {
        let opts = CropOptions {
            padding: 2,
            ..CropOptions::default()
        };
        let img = crop(framed_block(), &opts).unwrap().into_image();
        assert_eq!(img.dimensions(), (8, 8));
        for (x, y, p) in img.enumerate_pixels() {
            let inside = (2..6).contains(&x) && (2..6).contains(&y);
            assert_eq!(*p, if inside { BLACK } else { CLEAR }, "pixel ({x},{y})");
        }
    }

    #[test]
    fn all_background_is_returned_unchanged() {
        let mut img = RgbaImage::from_pixel(5, 4, WHITE);
        img.put_pixel(1, 1, Rgba([9, 200, 30, 0]));
        let result = crop(img.clone(), &CropOptions::default()).unwrap();
        assert_eq!(result, CropResult::Unchanged(img));
    }

    #[test]
    fn single_pixel_content_is_degenerate() {
        let mut img = RgbaImage::from_pixel(8, 8, WHITE);
        img.put_pixel(5, 2, BLACK);
        let result = crop(img.clone(), &CropOptions::default()).unwrap();
        assert_eq!(result, CropResult::Unchanged(img));
    }

    #[test]
    fn recrop_of_cropped_output_is_unchanged() {
        let first = crop(framed_block(), &no_square()).unwrap().into_image();
        let second = crop(first.clone(), &no_square()).unwrap();
        assert_eq!(second, CropResult::Unchanged(first));
    }

    #[test]
    fn borderless_image_is_still_squared() {
        let img = RgbaImage::from_pixel(3, 2, BLACK);
        let opts = CropOptions {
            padding: 1,
            ..CropOptions::default()
        };
        let result = crop(img, &opts).unwrap();
        assert!(result.is_cropped());
        assert_eq!(result.image().dimensions(), (5, 5));
    }

    #[test]
    fn zero_sized_image_is_rejected() {
        let err = crop(RgbaImage::new(0, 3), &CropOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidImage {
                width: 0,
                height: 3
            }
        ));
    }

    #[test]
    fn square_canvas_centers_each_axis_independently() {
        let content = RgbaImage::from_pixel(7, 2, BLACK);
        for padding in [0, 1, 5] {
            let canvas = pad_to_square(&content, padding).unwrap();
            assert_eq!(canvas.dimensions(), (7 + 2 * padding, 7 + 2 * padding));

            let x0 = padding;
            let y0 = padding + (7 - 2) / 2;
            assert_eq!(*canvas.get_pixel(x0, y0), BLACK);
            assert_eq!(*canvas.get_pixel(x0 + 6, y0 + 1), BLACK);
            assert_eq!(*canvas.get_pixel(x0, y0 - 1), CLEAR);
            assert_eq!(*canvas.get_pixel(x0, y0 + 2), CLEAR);
        }
    }

    #[test]
    fn odd_difference_rounds_offset_down() {
        assert_eq!(centered_offset(5, 2, 0), 1);
        assert_eq!(centered_offset(5, 5, 3), 3);
        assert_eq!(centered_offset(8, 1, 10), 13);
    }

    #[test]
    fn transparent_content_pixels_overwrite_canvas() {
        let mut content = RgbaImage::from_pixel(2, 2, BLACK);
        content.put_pixel(0, 0, Rgba([200, 10, 10, 0]));
        let canvas = pad_to_square(&content, 1).unwrap();
        assert_eq!(*canvas.get_pixel(1, 1), Rgba([200, 10, 10, 0]));
    }

    #[test]
    fn oversized_canvas_is_an_error() {
        let content = RgbaImage::from_pixel(2, 2, BLACK);
        let err = pad_to_square(&content, u32::MAX / 2).unwrap_err();
        assert!(matches!(err, Error::CanvasTooLarge { .. }));
    }

    #[test]
    fn canvas_side_fitting_u32_but_not_memory_is_an_error() {
        let content = RgbaImage::from_pixel(2, 2, BLACK);
        let err = pad_to_square(&content, 1 << 30).unwrap_err();
        assert!(matches!(
            err,
            Error::CanvasTooLarge {
                size: 2_147_483_650
            }
        ));

        let opts = CropOptions {
            padding: 1 << 30,
            ..CropOptions::default()
        };
        let err = crop(framed_block(), &opts).unwrap_err();
        assert!(matches!(err, Error::CanvasTooLarge { .. }));
    }

    #[test]
    fn transparent_border_is_cropped_from_rgba_source() {
        let mut img = RgbaImage::from_pixel(6, 4, Rgba([255, 0, 0, 0]));
        img.put_pixel(1, 1, BLACK);
        img.put_pixel(3, 2, Rgba([120, 120, 120, 255]));
        let img = crop(img, &no_square()).unwrap().into_image();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(*img.get_pixel(0, 0), BLACK);
        assert_eq!(*img.get_pixel(2, 1), Rgba([120, 120, 120, 255]));
    }
}
