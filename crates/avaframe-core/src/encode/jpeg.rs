//! JPEG encoding for export.
//!
//! JPEG has no alpha channel, so RGBA exports are flattened onto an opaque
//! background before reaching the encoder.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::EncodeError;
use crate::decode::PixelBuffer;

/// Background used when flattening transparent pixels for JPEG output.
pub const JPEG_BACKGROUND: [u8; 3] = [255, 255, 255];

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
///
/// # Returns
///
/// JPEG-encoded bytes on success, or an error if encoding fails.
///
/// # Quality Guidelines
///
/// * 90-100: High quality, suitable for archival or further editing
/// * 80-90: Good quality, recommended for most uses
/// * 60-80: Medium quality, acceptable for web/social media
/// * Below 60: Low quality, visible artifacts
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    // Validate dimensions
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    // Validate pixel data length
    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    // Clamp quality to valid range (1-100)
    let quality = quality.clamp(1, 100);

    // Create output buffer
    let mut buffer = Cursor::new(Vec::new());

    // Create JPEG encoder with specified quality
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    // Encode the image
    encoder
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Composite RGBA pixels over `background` and drop the alpha channel.
pub fn flatten_rgba(image: &PixelBuffer, background: [u8; 3]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(image.pixels.len() / 4 * 3);
    for px in image.pixels.chunks_exact(4) {
        let a = u32::from(px[3]);
        let inv = 255 - a;
        for i in 0..3 {
            let v = u32::from(px[i]) * a + u32::from(background[i]) * inv;
            rgb.push(((v + 127) / 255) as u8);
        }
    }
    rgb
}

/// Encode an RGBA buffer as JPEG, flattening it onto [`JPEG_BACKGROUND`].
pub fn encode_jpeg_rgba(image: &PixelBuffer, quality: u8) -> Result<Vec<u8>, EncodeError> {
    if !image.is_consistent() {
        return Err(EncodeError::InvalidPixelData {
            expected: image.expected_len(),
            actual: image.pixels.len(),
        });
    }
    let rgb = flatten_rgba(image, JPEG_BACKGROUND);
    encode_jpeg(&rgb, image.width, image.height, quality)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: any consistent RGBA buffer encodes to a well-formed JPEG.
        #[test]
        fn prop_rgba_always_encodes(
            (width, height) in (1u32..=40, 1u32..=40),
            rgba in any::<[u8; 4]>(),
            quality in 0u8..=255,
        ) {
            let image = PixelBuffer::filled(width, height, rgba);
            let jpeg = encode_jpeg_rgba(&image, quality);
            prop_assert!(jpeg.is_ok());

            let jpeg = jpeg.unwrap();
            prop_assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
            prop_assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
        }

        /// Property: flattening opaque pixels only drops the alpha channel.
        #[test]
        fn prop_flatten_opaque_is_lossless(
            colors in prop::collection::vec(any::<[u8; 3]>(), 1..64),
            background in any::<[u8; 3]>(),
        ) {
            let rgb: Vec<u8> = colors.iter().flatten().copied().collect();
            let image = PixelBuffer::from_rgb(colors.len() as u32, 1, &rgb);
            prop_assert_eq!(flatten_rgba(&image, background), rgb);
        }
    }
}
