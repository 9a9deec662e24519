//! Image encoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { encode_image } from '@avaframe/wasm';
//!
//! const png = encode_image(image, 'png', 92);
//! const jpeg = encode_image(image, 'jpeg', 92);
//! ```

use crate::types::JsPixelBuffer;
use avaframe_core::encode::{self, ExportFormat};
use wasm_bindgen::prelude::*;

/// Encode an RGBA image as `"png"` or `"jpeg"`.
///
/// JPEG output is flattened onto white; `quality` (1-100) only affects JPEG.
///
/// # Errors
///
/// Returns an error for an unknown format name, a pixel buffer whose length
/// does not match its dimensions, or zero dimensions.
#[wasm_bindgen]
pub fn encode_image(image: &JsPixelBuffer, format: &str, quality: u8) -> Result<Vec<u8>, JsValue> {
    let format: ExportFormat = format
        .parse()
        .map_err(|e: encode::EncodeError| JsValue::from_str(&e.to_string()))?;

    encode::encode_image(&image.to_buffer(), format, quality)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode RGB pixel data (3 bytes per pixel) to JPEG bytes.
///
/// # Quality Guidelines
///
/// * 90-100: High quality
/// * 80-90: Good quality, recommended for most uses
/// * 60-80: Medium quality, acceptable for web/social media
/// * Below 60: Low quality, visible artifacts
#[wasm_bindgen]
pub fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(pixels, width, height, quality).map_err(|e| JsValue::from_str(&e.to_string()))
}
