//! Platform capabilities the editor needs: decoding uploads, rasterizing
//! export scenes, and encoding the result.
//!
//! The session is generic over [`ImageBackend`] so a host can plug in its own
//! codecs. [`CpuBackend`] is the portable implementation built on the
//! `image` crate and the software rasterizer in [`crate::render`].

use crate::decode::{self, DecodeError, PixelBuffer};
use crate::encode::{self, EncodeError, ExportFormat};
use crate::render::{self, Scene};

/// Image capabilities required by an editor session.
pub trait ImageBackend {
    /// Decode encoded image bytes into an upright RGBA buffer.
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, DecodeError>;

    /// Rasterize a scene onto a fresh transparent canvas.
    fn render(&self, scene: &Scene<'_>) -> PixelBuffer;

    /// Encode an RGBA buffer. `quality` only matters for lossy formats.
    fn encode(
        &self,
        image: &PixelBuffer,
        format: ExportFormat,
        quality: u8,
    ) -> Result<Vec<u8>, EncodeError>;
}

/// Portable software backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl ImageBackend for CpuBackend {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
        decode::decode_image(bytes)
    }

    fn render(&self, scene: &Scene<'_>) -> PixelBuffer {
        render::rasterize(scene)
    }

    fn encode(
        &self,
        image: &PixelBuffer,
        format: ExportFormat,
        quality: u8,
    ) -> Result<Vec<u8>, EncodeError> {
        encode::encode_image(image, format, quality)
    }
}
