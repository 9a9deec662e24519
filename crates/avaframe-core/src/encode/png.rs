//! PNG encoding for export. Keeps the alpha channel.

use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;

use super::EncodeError;
use crate::decode::PixelBuffer;

/// Encode an RGBA buffer as PNG.
pub fn encode_png(image: &PixelBuffer) -> Result<Vec<u8>, EncodeError> {
    if image.width == 0 || image.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: image.width,
            height: image.height,
        });
    }
    if !image.is_consistent() {
        return Err(EncodeError::InvalidPixelData {
            expected: image.expected_len(),
            actual: image.pixels.len(),
        });
    }

    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_encode_png_signature() {
        let image = PixelBuffer::filled(8, 4, [1, 2, 3, 4]);
        let png = encode_png(&image).unwrap();
        assert_eq!(&png[0..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_encode_png_is_lossless() {
        let mut image = PixelBuffer::transparent(5, 5);
        image.set_pixel(2, 3, [200, 100, 50, 25]);

        let png = encode_png(&image).unwrap();
        let decoded = crate::decode::decode_image(&png).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_encode_png_zero_dimensions() {
        let image = PixelBuffer::new(0, 0, vec![]);
        assert!(matches!(
            encode_png(&image),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_encode_png_inconsistent_buffer() {
        let image = PixelBuffer {
            width: 2,
            height: 2,
            pixels: vec![0u8; 15],
        };
        assert!(matches!(
            encode_png(&image),
            Err(EncodeError::InvalidPixelData { .. })
        ));
    }
}
