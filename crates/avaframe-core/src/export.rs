//! Flattening both layers into a fixed-size output image.
//!
//! # Pipeline
//!
//! 1. Pick the square stage region that maps onto the output
//! 2. Remap each layer into device space:
//!    `k = canonical / region.side`, `x' = (x - region.x) * k * ratio`,
//!    `scale' = scale * k * ratio`
//! 3. Rasterize by ascending z-order (ties: frame above avatar) onto a
//!    transparent `canonical * ratio` canvas
//! 4. Downsample to exactly `canonical x canonical`
//! 5. Encode
//!
//! The output size never depends on the on-screen stage size.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::backend::ImageBackend;
use crate::config::EditorConfig;
use crate::decode::{self, PixelBuffer};
use crate::encode::{EncodeError, ExportFormat};
use crate::error::{EditorError, EditorResult};
use crate::geometry::Rect;
use crate::layer::{Layer, LayerId, LayerTransform};
use crate::render::Scene;
use crate::stage::StageConfig;

/// Which part of the stage becomes the exported image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFraming {
    /// The safe area, so exports match what the user framed.
    SafeArea,
    /// The padded union of both layers' on-screen bounds, squared.
    #[default]
    ContentBounds,
}

/// An encoded export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
}

impl ExportedImage {
    /// Download name, e.g. `avatar-frame-1700000000000.png`.
    pub fn file_name(&self, timestamp: u64) -> String {
        format!("avatar-frame-{}.{}", timestamp, self.format)
    }

    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            STANDARD.encode(&self.bytes)
        )
    }
}

/// Square stage region mapped onto the output.
///
/// Content-bounds framing falls back to the safe area when no layer has
/// visible extent on the stage.
pub fn export_region(
    framing: ExportFraming,
    layers: &[&Layer],
    safe_area: &Rect,
    stage: &StageConfig,
    padding: f64,
) -> Rect {
    match framing {
        ExportFraming::SafeArea => *safe_area,
        ExportFraming::ContentBounds => {
            let union = layers
                .iter()
                .filter_map(|layer| layer.visual_bounds())
                .reduce(|acc, b| acc.union(&b));
            let Some(union) = union else {
                return *safe_area;
            };

            let stage_rect = stage.rect();
            let clamped = union.pad(padding).clamp_to(&stage_rect);
            if !(clamped.width > 0.0 && clamped.height > 0.0) {
                return *safe_area;
            }

            // Square around the clamped center, shifted back inside the stage
            let side = clamped
                .width
                .max(clamped.height)
                .min(stage_rect.width.min(stage_rect.height));
            let center = clamped.center();
            let x = (center.x - side / 2.0).clamp(stage_rect.x, stage_rect.right() - side);
            let y = (center.y - side / 2.0).clamp(stage_rect.y, stage_rect.bottom() - side);
            Rect::new(x, y, side, side)
        }
    }
}

/// Map a stage-space transform into device space for `region`.
pub fn to_device_space(transform: &LayerTransform, region: &Rect, factor: f64) -> LayerTransform {
    LayerTransform {
        x: (transform.x - region.x) * factor,
        y: (transform.y - region.y) * factor,
        scale_x: transform.scale_x * factor,
        scale_y: transform.scale_y * factor,
        rotation: transform.rotation,
    }
}

/// Layers in paint order: ascending z-order, frame above avatar on ties.
pub fn paint_order<'a>(frame: &'a Layer, avatar: &'a Layer) -> [&'a Layer; 2] {
    let mut layers = [avatar, frame];
    // Stable sort keeps the avatar first when z-orders are equal
    layers.sort_by_key(|layer| layer.z_order());
    layers
}

/// Composite and encode both layers.
///
/// # Errors
///
/// * `PreconditionNotMet` if either layer has no image or the framing region
///   is empty
/// * `Encode` if downsampling or encoding fails
#[tracing::instrument(skip(backend, config, frame, avatar))]
pub fn compose<B: ImageBackend + ?Sized>(
    backend: &B,
    config: &EditorConfig,
    stage: &StageConfig,
    safe_area: &Rect,
    frame: &Layer,
    avatar: &Layer,
    format: ExportFormat,
) -> EditorResult<ExportedImage> {
    for layer in [frame, avatar] {
        if !layer.has_image() {
            return Err(EditorError::precondition(format!(
                "{} layer has no image",
                layer.id()
            )));
        }
    }

    let region = export_region(
        config.framing,
        &[frame, avatar],
        safe_area,
        stage,
        config.export_padding,
    );
    if !(region.is_finite() && region.width > 0.0) {
        return Err(EditorError::precondition("export region is empty"));
    }

    let canonical = config.canonical_size;
    let render_size = config.render_size();
    let factor = f64::from(canonical) / region.width * f64::from(config.pixel_ratio);

    let mut scene = Scene::new(render_size, render_size, config.sample_filter);
    for layer in paint_order(frame, avatar) {
        if let Some(image) = layer.image() {
            scene.push(image, to_device_space(layer.transform(), &region, factor));
        }
    }

    let canvas = backend.render(&scene);
    drop(scene);

    let output = downsample(&canvas, canonical, config)?;
    let bytes = backend.encode(&output, format, config.jpeg_quality)?;

    tracing::debug!(
        format = %format,
        bytes = bytes.len(),
        "export composed"
    );

    Ok(ExportedImage {
        bytes,
        format,
        width: output.width,
        height: output.height,
    })
}

fn downsample(canvas: &PixelBuffer, size: u32, config: &EditorConfig) -> EditorResult<PixelBuffer> {
    decode::resize(canvas, size, size, config.downsample_filter)
        .map_err(|e| EditorError::Encode(EncodeError::EncodingFailed(e.to_string())))
}

/// Ids in paint order, for diagnostics and bindings.
pub fn paint_order_ids(frame: &Layer, avatar: &Layer) -> [LayerId; 2] {
    let [bottom, top] = paint_order(frame, avatar);
    [bottom.id(), top.id()]
}
