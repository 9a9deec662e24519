//! Image encoding for export.
//!
//! This module provides functionality for:
//! - Encoding RGBA buffers to PNG (alpha preserved)
//! - Encoding RGBA buffers to JPEG with configurable quality (alpha flattened)
//!
//! All operations are synchronous and single-threaded.

mod jpeg;
mod png;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::PixelBuffer;

pub use jpeg::{encode_jpeg, encode_jpeg_rgba, flatten_rgba, JPEG_BACKGROUND};
pub use png::encode_png;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The format name is not one we can produce
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// The underlying encoder failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    /// Name used in file extensions and MIME subtypes.
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            other => Err(EncodeError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Encode an RGBA buffer in the requested format.
///
/// `quality` only affects JPEG output.
pub fn encode_image(
    image: &PixelBuffer,
    format: ExportFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    match format {
        ExportFormat::Png => encode_png(image),
        ExportFormat::Jpeg => encode_jpeg_rgba(image, quality),
    }
}
