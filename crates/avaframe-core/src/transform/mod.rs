//! Pixel-level transform operations: sampling and cropping.
//!
//! Stage-space math (fitting, pivots, rotation steps) lives in
//! [`crate::geometry`]; this module only touches pixels.
//!
//! # Coordinate System
//!
//! - Source pixel `(i, j)` covers `[i, i + 1) x [j, j + 1)`
//! - Crop rectangles are given in stage coordinates and mapped through the
//!   layer's transform
//! - Origin is top-left corner

mod crop;
mod sample;

pub use crop::{crop_pixels, crop_to_rect, resample_region, MAX_CROP_PIXELS};
pub use sample::{sample, InterpolationFilter};
