//! Image decoding WASM bindings.
//!
//! Hosts that prefer to decode outside the editor (for a preview, say) can use
//! these directly and hand the result to `JsEditor.uploadFrameImage` /
//! `JsEditor.uploadAvatarImage`.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, resize } from '@avaframe/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! const thumb = resize(image, 150, 150, 1);
//! ```

use crate::types::{filter_from_u8, JsPixelBuffer};
use avaframe_core::decode;
use wasm_bindgen::prelude::*;

/// Decode a PNG or JPEG image into RGBA pixels.
///
/// EXIF orientation is applied, so camera photos come out upright.
///
/// # Errors
///
/// Returns an error if the bytes are empty, in an unsupported format, or
/// corrupted.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsPixelBuffer, JsValue> {
    decode::decode_image(bytes)
        .map(JsPixelBuffer::from_buffer)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Resize an image to exact dimensions.
///
/// # Arguments
///
/// * `image` - The source image to resize
/// * `width` - Target width in pixels
/// * `height` - Target height in pixels
/// * `filter` - Resize algorithm: 0=Nearest (fastest), 1=Bilinear (default), 2=Lanczos3 (best quality)
///
/// # Errors
///
/// Returns an error if width or height is zero.
#[wasm_bindgen]
pub fn resize(
    image: &JsPixelBuffer,
    width: u32,
    height: u32,
    filter: u8,
) -> Result<JsPixelBuffer, JsValue> {
    let buffer = image.to_buffer();
    let filter_type = filter_from_u8(filter);

    decode::resize(&buffer, width, height, filter_type)
        .map(JsPixelBuffer::from_buffer)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}


/// WASM-specific tests that require JsValue.
///
/// Use `wasm-pack test` to run these.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use avaframe_core::decode::PixelBuffer;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_decode_image_invalid() {
        assert!(decode_image(&[0, 1, 2, 3]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_decode_image_empty() {
        assert!(decode_image(&[]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_decode_png() {
        let png = avaframe_core::encode::encode_png(&PixelBuffer::filled(6, 4, [1, 2, 3, 255])).unwrap();
        let img = decode_image(&png).unwrap();
        assert_eq!((img.width(), img.height()), (6, 4));
    }

    #[wasm_bindgen_test]
    fn test_resize_creates_new_image() {
        let img = JsPixelBuffer::from_buffer(PixelBuffer::filled(100, 50, [128, 128, 128, 255]));

        let resized = resize(&img, 50, 25, 1).unwrap();
        assert_eq!(resized.width(), 50);
        assert_eq!(resized.height(), 25);
        assert_eq!(resized.byte_length(), 50 * 25 * 4);
    }

    #[wasm_bindgen_test]
    fn test_resize_zero_dimensions() {
        let img = JsPixelBuffer::from_buffer(PixelBuffer::filled(10, 10, [0, 0, 0, 255]));
        assert!(resize(&img, 0, 10, 1).is_err());
    }
}
