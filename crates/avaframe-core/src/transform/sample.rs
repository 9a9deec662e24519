//! Pixel sampling with bilinear and Lanczos3 interpolation.
//!
//! Used by inverse mapping: for each output pixel, the renderer and the crop
//! engine compute a continuous source coordinate and ask this module for the
//! color there.
//!
//! # Conventions
//!
//! - Source pixel `i` covers `[i, i + 1)`, so its center is `i + 0.5`
//! - Sampling at a pixel center returns that pixel exactly
//! - Coordinates outside the image are fully transparent
//! - Interpolation is done on premultiplied values so transparent pixels do
//!   not bleed their (meaningless) color into neighbors

use serde::{Deserialize, Serialize};

use crate::decode::PixelBuffer;

/// Interpolation filter for resampling layer pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationFilter {
    /// Fast bilinear interpolation.
    #[default]
    Bilinear,
    /// High-quality Lanczos3 interpolation.
    Lanczos3,
}

/// Sample `image` at continuous coordinates `(u, v)`.
#[inline]
pub fn sample(image: &PixelBuffer, u: f64, v: f64, filter: InterpolationFilter) -> [u8; 4] {
    let (w, h) = (f64::from(image.width), f64::from(image.height));
    if !(u >= 0.0 && v >= 0.0 && u < w && v < h) {
        return [0, 0, 0, 0];
    }

    match filter {
        InterpolationFilter::Bilinear => sample_bilinear(image, u - 0.5, v - 0.5),
        InterpolationFilter::Lanczos3 => sample_lanczos3(image, u - 0.5, v - 0.5),
    }
}

/// Weighted premultiplied accumulator.
struct Accum {
    color: [f64; 3],
    alpha: f64,
    weight: f64,
}

impl Accum {
    fn new() -> Self {
        Self {
            color: [0.0; 3],
            alpha: 0.0,
            weight: 0.0,
        }
    }

    #[inline]
    fn add(&mut self, px: [u8; 4], weight: f64) {
        let a = f64::from(px[3]);
        for i in 0..3 {
            self.color[i] += f64::from(px[i]) * a * weight;
        }
        self.alpha += a * weight;
        self.weight += weight;
    }

    fn finish(self) -> [u8; 4] {
        if self.weight <= 0.0 || self.alpha <= 0.0 {
            return [0, 0, 0, 0];
        }
        let mut out = [0u8; 4];
        for i in 0..3 {
            out[i] = (self.color[i] / self.alpha).clamp(0.0, 255.0).round() as u8;
        }
        out[3] = (self.alpha / self.weight).clamp(0.0, 255.0).round() as u8;
        out
    }
}

#[inline]
fn clamp_index(i: i64, len: u32) -> u32 {
    i.clamp(0, i64::from(len) - 1) as u32
}

/// Bilinear interpolation between the 4 nearest pixel centers.
/// Edge pixels are extended outwards.
fn sample_bilinear(image: &PixelBuffer, x: f64, y: f64) -> [u8; 4] {
    let x0f = x.floor();
    let y0f = y.floor();
    let fx = x - x0f;
    let fy = y - y0f;

    let x0 = clamp_index(x0f as i64, image.width);
    let y0 = clamp_index(y0f as i64, image.height);
    let x1 = clamp_index(x0f as i64 + 1, image.width);
    let y1 = clamp_index(y0f as i64 + 1, image.height);

    let mut acc = Accum::new();
    acc.add(image.pixel(x0, y0), (1.0 - fx) * (1.0 - fy));
    acc.add(image.pixel(x1, y0), fx * (1.0 - fy));
    acc.add(image.pixel(x0, y1), (1.0 - fx) * fy);
    acc.add(image.pixel(x1, y1), fx * fy);
    acc.finish()
}

/// Lanczos3 interpolation over a 6x6 neighborhood with clamped edges.
fn sample_lanczos3(image: &PixelBuffer, x: f64, y: f64) -> [u8; 4] {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut acc = Accum::new();
    for ky in -2..=3 {
        let py = y0 + ky;
        let wy = lanczos_weight(y - py as f64, 3.0);
        if wy == 0.0 {
            continue;
        }
        for kx in -2..=3 {
            let px = x0 + kx;
            let wx = lanczos_weight(x - px as f64, 3.0);
            if wx == 0.0 {
                continue;
            }
            let pixel = image.pixel(clamp_index(px, image.width), clamp_index(py, image.height));
            acc.add(pixel, wx * wy);
        }
    }
    acc.finish()
}

/// Lanczos kernel weight function.
///
/// ```text
/// L(x) = sinc(x) * sinc(x/a)  for |x| < a
/// L(x) = 0                     for |x| >= a
/// ```
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;

    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Image where each pixel encodes its position.
    fn test_image(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x * 10) as u8, (y * 10) as u8, 7, 255]);
            }
        }
        PixelBuffer::new(width, height, pixels)
    }

    #[test]
    fn test_pixel_centers_are_exact() {
        let img = test_image(6, 5);
        for filter in [InterpolationFilter::Bilinear, InterpolationFilter::Lanczos3] {
            for y in 0..5 {
                for x in 0..6 {
                    let got = sample(&img, x as f64 + 0.5, y as f64 + 0.5, filter);
                    assert_eq!(got, img.pixel(x, y), "{:?} at ({}, {})", filter, x, y);
                }
            }
        }
    }

    #[test]
    fn test_outside_is_transparent() {
        let img = test_image(4, 4);
        for (u, v) in [(-0.1, 1.0), (1.0, -0.1), (4.0, 1.0), (1.0, 4.0), (f64::NAN, 1.0)] {
            assert_eq!(
                sample(&img, u, v, InterpolationFilter::Bilinear),
                [0, 0, 0, 0]
            );
        }
    }

    #[test]
    fn test_bilinear_midpoint() {
        // Two opaque pixels, 0 and 100 in red
        let img = PixelBuffer::new(2, 1, vec![0, 0, 0, 255, 100, 0, 0, 255]);
        let mid = sample(&img, 1.0, 0.5, InterpolationFilter::Bilinear);
        assert_eq!(mid, [50, 0, 0, 255]);
    }

    #[test]
    fn test_transparent_neighbor_does_not_bleed() {
        // Opaque red next to transparent green
        let img = PixelBuffer::new(2, 1, vec![255, 0, 0, 255, 0, 255, 0, 0]);
        let mid = sample(&img, 1.0, 0.5, InterpolationFilter::Bilinear);
        assert_eq!(&mid[0..3], &[255, 0, 0]);
        assert!((127..=128).contains(&mid[3]));
    }

    #[test]
    fn test_edges_extend() {
        let img = test_image(3, 3);
        // Within the first half pixel the edge value is repeated
        let got = sample(&img, 0.1, 0.1, InterpolationFilter::Bilinear);
        assert_eq!(got, img.pixel(0, 0));
    }

    #[test]
    fn test_single_pixel_image() {
        let img = PixelBuffer::filled(1, 1, [9, 8, 7, 6]);
        for filter in [InterpolationFilter::Bilinear, InterpolationFilter::Lanczos3] {
            assert_eq!(sample(&img, 0.3, 0.9, filter), [9, 8, 7, 6]);
        }
    }

    #[test]
    fn test_lanczos_weight_at_zero() {
        let w = lanczos_weight(0.0, 3.0);
        assert!((w - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lanczos_weight_at_boundary() {
        let w = lanczos_weight(3.0, 3.0);
        assert!(w.abs() < f64::EPSILON);
    }

    #[test]
    fn test_lanczos_weight_symmetry() {
        let w1 = lanczos_weight(1.5, 3.0);
        let w2 = lanczos_weight(-1.5, 3.0);
        assert!((w1 - w2).abs() < 1e-10);
    }

    #[test]
    fn test_lanczos_flat_color_is_stable() {
        let img = PixelBuffer::filled(10, 10, [40, 80, 120, 255]);
        let got = sample(&img, 4.3, 5.7, InterpolationFilter::Lanczos3);
        assert_eq!(got, [40, 80, 120, 255]);
    }
}
