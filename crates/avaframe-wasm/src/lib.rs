//! Avaframe WASM - WebAssembly bindings for Avaframe
//!
//! This crate exposes the avaframe-core editor to JavaScript/TypeScript.
//!
//! # Module Structure
//!
//! - `editor` - `JsEditor` session handle and `JsExportedImage`
//! - `catalog` - `JsFrameCatalog` for the frame picker
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Standalone decode/resize helpers
//! - `encode` - Standalone PNG/JPEG encoding
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditor } from '@avaframe/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const editor = new JsEditor(500, undefined);
//! editor.uploadFrame(frameFile.type, new Uint8Array(await frameFile.arrayBuffer()));
//! editor.uploadAvatar(avatarFile.type, new Uint8Array(await avatarFile.arrayBuffer()));
//! const exported = editor.export('png');
//! ```

use wasm_bindgen::prelude::*;

mod catalog;
mod decode;
mod editor;
mod encode;
mod types;

// Re-export public types
pub use catalog::JsFrameCatalog;
pub use decode::{decode_image, resize};
pub use editor::{JsEditor, JsExportedImage};
pub use encode::{encode_image, encode_jpeg};
pub use types::JsPixelBuffer;

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
