//! Cropping a layer's pixels to a stage-space rectangle.
//!
//! The crop rectangle is mapped into the layer's source pixel space by
//! inverting its translation and scale:
//!
//! ```text
//! src = (crop - layer_origin) / scale
//! ```
//!
//! The result is sized to the crop rectangle's stage dimensions, so a layer
//! shown at scale 2 yields a buffer twice the size of the source region and
//! can be placed back at scale 1 without any visual change. Parts of the
//! rectangle that fall outside the source image become transparent.
//!
//! A rotated layer is cropped as it appears on screen: each output pixel is
//! mapped back through the rotation about the layer center, so the result
//! is upright and can be placed back with rotation 0.

use super::sample::{sample, InterpolationFilter};
use crate::decode::PixelBuffer;
use crate::geometry::Rect;
use crate::layer::LayerTransform;

/// Largest output a crop may allocate, in pixels.
pub const MAX_CROP_PIXELS: u64 = 64 * 1024 * 1024;

/// Copy an integer pixel region out of `image`.
///
/// The output is always `width x height`; pixels outside the source are
/// transparent. Rows are copied directly, so values are preserved exactly.
pub fn crop_pixels(image: &PixelBuffer, left: i64, top: i64, width: u32, height: u32) -> PixelBuffer {
    let mut output = PixelBuffer::transparent(width, height);

    let src_w = i64::from(image.width);
    let src_h = i64::from(image.height);

    // Overlap of [left, left + width) with [0, src_w), in source coordinates
    let x_start = left.max(0);
    let x_end = (left + i64::from(width)).min(src_w);
    if x_start >= x_end {
        return output;
    }
    let run = ((x_end - x_start) * 4) as usize;

    for y in 0..height {
        let src_y = top + i64::from(y);
        if src_y < 0 || src_y >= src_h {
            continue;
        }

        let src_idx = ((src_y * src_w + x_start) * 4) as usize;
        let dst_idx = ((i64::from(y) * i64::from(width) + (x_start - left)) * 4) as usize;
        output.pixels[dst_idx..dst_idx + run]
            .copy_from_slice(&image.pixels[src_idx..src_idx + run]);
    }

    output
}

/// Resample the source-space region `src` into a `width x height` buffer.
pub fn resample_region(
    image: &PixelBuffer,
    src: &Rect,
    width: u32,
    height: u32,
    filter: InterpolationFilter,
) -> PixelBuffer {
    let mut output = PixelBuffer::transparent(width, height);
    let step_x = src.width / f64::from(width);
    let step_y = src.height / f64::from(height);

    for oy in 0..height {
        let v = src.y + (f64::from(oy) + 0.5) * step_y;
        for ox in 0..width {
            let u = src.x + (f64::from(ox) + 0.5) * step_x;
            output.set_pixel(ox, oy, sample(image, u, v, filter));
        }
    }

    output
}

/// Rasterize the part of a layer covered by a stage-space crop rectangle.
///
/// # Arguments
///
/// * `image` - The layer's current pixels
/// * `transform` - The layer's current transform
/// * `crop` - Crop rectangle in stage coordinates
/// * `filter` - Interpolation used when the layer is scaled or sub-pixel offset
///
/// # Returns
///
/// `None` when the rectangle is degenerate (non-finite, or smaller than one
/// pixel after rounding), the output would exceed [`MAX_CROP_PIXELS`], or the
/// layer scale is not positive.
pub fn crop_to_rect(
    image: &PixelBuffer,
    transform: &LayerTransform,
    crop: &Rect,
    filter: InterpolationFilter,
) -> Option<PixelBuffer> {
    if !crop.is_finite() {
        return None;
    }
    let (sx, sy) = (transform.scale_x, transform.scale_y);
    if !(sx.is_finite() && sy.is_finite() && sx > 0.0 && sy > 0.0 && transform.rotation.is_finite()) {
        return None;
    }

    let out_w = crop.width.round();
    let out_h = crop.height.round();
    if out_w < 1.0 || out_h < 1.0 || out_w > f64::from(u32::MAX) || out_h > f64::from(u32::MAX) {
        return None;
    }
    let (out_w, out_h) = (out_w as u32, out_h as u32);
    match u64::from(out_w).checked_mul(u64::from(out_h)) {
        Some(count) if count <= MAX_CROP_PIXELS => {}
        _ => return None,
    }

    if transform.rotation != 0.0 {
        return Some(resample_rotated(image, transform, crop, out_w, out_h, filter));
    }

    let src = Rect::new(
        (crop.x - transform.x) / sx,
        (crop.y - transform.y) / sy,
        crop.width / sx,
        crop.height / sy,
    );

    // Fast path: unscaled layer on the pixel grid is a plain copy
    let unscaled = sx == 1.0 && sy == 1.0;
    let on_grid = src.x.fract() == 0.0
        && src.y.fract() == 0.0
        && f64::from(out_w) == crop.width
        && f64::from(out_h) == crop.height;
    if unscaled && on_grid {
        return Some(crop_pixels(image, src.x as i64, src.y as i64, out_w, out_h));
    }

    Some(resample_region(image, &src, out_w, out_h, filter))
}

/// Sample the on-screen appearance of a rotated layer inside `crop`.
fn resample_rotated(
    image: &PixelBuffer,
    transform: &LayerTransform,
    crop: &Rect,
    width: u32,
    height: u32,
    filter: InterpolationFilter,
) -> PixelBuffer {
    let mut output = PixelBuffer::transparent(width, height);
    let half_w = f64::from(image.width) / 2.0;
    let half_h = f64::from(image.height) / 2.0;
    let cx = transform.x + half_w * transform.scale_x;
    let cy = transform.y + half_h * transform.scale_y;
    let (sin, cos) = transform.rotation.to_radians().sin_cos();
    let step_x = crop.width / f64::from(width);
    let step_y = crop.height / f64::from(height);

    for oy in 0..height {
        let dy = crop.y + (f64::from(oy) + 0.5) * step_y - cy;
        for ox in 0..width {
            let dx = crop.x + (f64::from(ox) + 0.5) * step_x - cx;
            let u = (dx * cos + dy * sin) / transform.scale_x + half_w;
            let v = (-dx * sin + dy * cos) / transform.scale_y + half_h;
            output.set_pixel(ox, oy, sample(image, u, v, filter));
        }
    }

    output
}


// ============================================================================
// Property-Based Tests
// ============================================================================
