//! Image decoding for frame and avatar uploads.
//!
//! This module provides functionality for:
//! - Decoding PNG/JPEG bytes into RGBA pixel buffers
//! - Correcting EXIF orientation of camera photos
//! - Resizing buffers (used to downsample supersampled exports)
//!
//! # Architecture
//!
//! Decoding is synchronous. The editor session calls it through the
//! [`crate::backend::ImageBackend`] capability so hosts can substitute their
//! own decoder (for example the browser's).

mod reader;
mod resize;
mod types;

pub use reader::{decode_image, get_orientation};
pub use resize::resize;
pub use types::{DecodeError, FilterType, Orientation, PixelBuffer};
