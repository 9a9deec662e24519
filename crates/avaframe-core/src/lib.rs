//! Avaframe Core - frame + avatar compositing engine
//!
//! This crate provides the platform-independent part of the avatar frame
//! editor: the two-layer scene model, interactive transforms, cropping, and
//! export to a fixed-size image.
//!
//! # Module Structure
//!
//! - `geometry` - Rectangles, fitting, scale-about-pivot, rotation steps
//! - `layer` - Frame and avatar layers with their transforms
//! - `stage` - Stage size, safe area, resize-box constraint
//! - `editor` - The session: uploads, interaction, crop
//! - `export` - Framing, device-space remap, compositing
//! - `render` - Software rasterizer
//! - `backend` - Decode/render/encode capability trait
//! - `decode` / `encode` - Image codecs
//! - `catalog` - Frame catalog and category filtering
//!
//! # Example
//!
//! ```ignore
//! use avaframe_core::{EditorConfig, EditorSession, ExportFormat, Upload};
//!
//! let mut session = EditorSession::new(500.0, EditorConfig::default())?;
//! session.upload_frame(Upload::file("image/png", frame_bytes))?;
//! session.upload_avatar(Upload::file("image/jpeg", avatar_bytes))?;
//! session.on_scale_slider_change(1.2);
//!
//! if let Some(image) = session.export(ExportFormat::Png)? {
//!     std::fs::write(image.file_name(now_ms), &image.bytes)?;
//! }
//! ```

pub mod backend;
pub mod catalog;
pub mod config;
pub mod decode;
pub mod editor;
pub mod encode;
pub mod error;
pub mod export;
pub mod geometry;
pub mod layer;
pub mod render;
pub mod stage;
pub mod transform;

pub use backend::{CpuBackend, ImageBackend};
pub use catalog::{Category, FrameCatalog, FrameRecord};
pub use config::EditorConfig;
pub use decode::PixelBuffer;
pub use editor::{CropState, EditorSession, LayerOrderUpdate, TransformEnd, Upload};
pub use encode::ExportFormat;
pub use error::{EditorError, EditorResult};
pub use export::{ExportFraming, ExportedImage};
pub use geometry::{Point, Rect, RotateDirection};
pub use layer::{Layer, LayerId, LayerTransform, Stroke, TransformPatch};
pub use stage::{compute_safe_area, SafeArea, StageConfig};
