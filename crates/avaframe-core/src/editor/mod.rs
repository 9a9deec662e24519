//! The editor session: two layers on a stage, plus everything the user can
//! do to them.
//!
//! A session is an explicit value owned by the caller. All operations are
//! synchronous `&mut self` state transitions, so no two mutations interleave.
//!
//! # Error policy
//!
//! - Invalid uploads and decode failures are returned as errors and leave
//!   the session untouched
//! - Operations attempted without the state they need (no selection, no
//!   image, wrong crop state, non-finite input) are silent no-ops that
//!   return `false` and log at debug level

mod crop;
mod interaction;

use serde::{Deserialize, Serialize};

pub use crop::CropState;
pub use interaction::TransformEnd;

use crate::backend::{CpuBackend, ImageBackend};
use crate::config::EditorConfig;
use crate::decode::{DecodeError, PixelBuffer};
use crate::encode::ExportFormat;
use crate::error::{EditorError, EditorResult};
use crate::export::{self, ExportedImage};
use crate::geometry::{avatar_fit_scale, center_in, fit_scale, Rect};
use crate::layer::{Layer, LayerId, LayerTransform, TransformPatch};
use crate::stage::{compute_safe_area, SafeArea, StageConfig};

/// Image supplied for a layer.
#[derive(Debug, Clone)]
pub enum Upload {
    /// Raw file contents. Validated against MIME type and size, then decoded.
    File { mime: String, bytes: Vec<u8> },
    /// An image the host already decoded. Not validated.
    Decoded(PixelBuffer),
}

impl Upload {
    pub fn file(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Upload::File {
            mime: mime.into(),
            bytes,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Upload::File { .. } => "file",
            Upload::Decoded(_) => "decoded",
        }
    }
}

/// Partial z-order update; `None` keeps the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerOrderUpdate {
    pub frame: Option<i32>,
    pub avatar: Option<i32>,
}

/// Check a raw upload's MIME type and size.
pub fn validate_file(mime: &str, len: usize, max_bytes: u64) -> EditorResult<()> {
    if !mime.starts_with("image/") {
        return Err(EditorError::invalid_input(format!(
            "expected an image file, got '{mime}'"
        )));
    }
    let len = len as u64;
    if len > max_bytes {
        return Err(EditorError::invalid_input(format!(
            "file is {len} bytes, the limit is {max_bytes}"
        )));
    }
    Ok(())
}

/// An interactive frame + avatar composition.
#[derive(Debug)]
pub struct EditorSession<B: ImageBackend = CpuBackend> {
    config: EditorConfig,
    backend: B,
    stage: StageConfig,
    frame: Layer,
    avatar: Layer,
    safe_area: SafeArea,
    selection: Option<LayerId>,
    crop: CropState,
    transformer_visible: bool,
}

impl EditorSession<CpuBackend> {
    /// Session on a square stage of `stage_size` pixels using the CPU backend.
    pub fn new(stage_size: f64, config: EditorConfig) -> EditorResult<Self> {
        Self::with_backend(stage_size, config, CpuBackend)
    }
}

impl<B: ImageBackend> EditorSession<B> {
    pub fn with_backend(stage_size: f64, config: EditorConfig, backend: B) -> EditorResult<Self> {
        config.validate()?;
        if !(stage_size.is_finite() && stage_size > 0.0) {
            return Err(EditorError::invalid_input(format!(
                "stage size must be positive, got {stage_size}"
            )));
        }

        let stage = StageConfig::square(stage_size);
        Ok(Self {
            config,
            backend,
            stage,
            frame: Layer::frame(),
            avatar: Layer::avatar(),
            safe_area: compute_safe_area(&stage),
            selection: None,
            crop: CropState::Idle,
            transformer_visible: true,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn stage(&self) -> &StageConfig {
        &self.stage
    }

    pub fn safe_area(&self) -> &SafeArea {
        &self.safe_area
    }

    pub fn selection(&self) -> Option<LayerId> {
        self.selection
    }

    /// Whether resize handles are shown for the selected layer.
    pub fn is_transformer_visible(&self) -> bool {
        self.transformer_visible
    }

    pub fn layer(&self, id: LayerId) -> &Layer {
        match id {
            LayerId::Frame => &self.frame,
            LayerId::Avatar => &self.avatar,
        }
    }

    fn layer_mut(&mut self, id: LayerId) -> &mut Layer {
        match id {
            LayerId::Frame => &mut self.frame,
            LayerId::Avatar => &mut self.avatar,
        }
    }

    pub fn frame(&self) -> &Layer {
        &self.frame
    }

    pub fn avatar(&self) -> &Layer {
        &self.avatar
    }

    // ===== Uploads =====

    /// Load the frame, fit it to the stage, center it, and recompute the
    /// safe area.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a rejected file, `DecodeFailure` for undecodable
    /// bytes. The frame is unchanged on error.
    #[tracing::instrument(skip(self, upload), fields(kind = upload.kind()))]
    pub fn upload_frame(&mut self, upload: Upload) -> EditorResult<()> {
        let image = self.load(upload)?;
        let (w, h) = (f64::from(image.width), f64::from(image.height));

        let scale = fit_scale(w, h, self.stage.width, self.stage.height);
        let (x, y) = center_in(&self.stage.rect(), w * scale, h * scale);

        self.frame.set_image(image);
        self.frame.replace_transform(LayerTransform::at(x, y, scale));
        self.safe_area = compute_safe_area(&self.stage);

        tracing::debug!(scale, x, y, "frame placed");
        Ok(())
    }

    /// Load the avatar, scale its longer side to a fraction of the safe area,
    /// and center it there.
    ///
    /// # Errors
    ///
    /// Same as [`EditorSession::upload_frame`]; the avatar is unchanged on
    /// error.
    #[tracing::instrument(skip(self, upload), fields(kind = upload.kind()))]
    pub fn upload_avatar(&mut self, upload: Upload) -> EditorResult<()> {
        let image = self.load(upload)?;
        let (w, h) = (f64::from(image.width), f64::from(image.height));

        let scale = avatar_fit_scale(w, h, &self.safe_area, self.config.avatar_fit_fraction);
        let (x, y) = center_in(&self.safe_area, w * scale, h * scale);

        self.avatar.set_image(image);
        self.avatar.replace_transform(LayerTransform::at(x, y, scale));

        tracing::debug!(scale, x, y, "avatar placed");
        Ok(())
    }

    fn load(&self, upload: Upload) -> EditorResult<PixelBuffer> {
        let image = match upload {
            Upload::File { mime, bytes } => {
                if let Err(err) = validate_file(&mime, bytes.len(), self.config.max_upload_bytes) {
                    tracing::warn!(%mime, len = bytes.len(), "upload rejected");
                    return Err(err);
                }
                self.backend.decode(&bytes)?
            }
            Upload::Decoded(image) => image,
        };

        if image.is_empty() {
            return Err(DecodeError::EmptyImage.into());
        }
        if !image.is_consistent() {
            return Err(DecodeError::CorruptedFile(format!(
                "expected {} bytes of pixel data, got {}",
                image.expected_len(),
                image.pixels.len()
            ))
            .into());
        }
        Ok(image)
    }

    // ===== Layer model =====

    /// Replace a layer's pixels without touching its transform.
    pub fn set_image(&mut self, id: LayerId, image: PixelBuffer) {
        self.layer_mut(id).set_image(image);
    }

    /// Merge a partial transform into a layer. Rejects non-finite values and
    /// scales that are not positive.
    pub fn set_transform(&mut self, id: LayerId, patch: &TransformPatch) -> bool {
        if !patch.is_finite() {
            tracing::debug!(layer = %id, "ignoring non-finite transform patch");
            return false;
        }
        if [patch.scale_x, patch.scale_y].iter().flatten().any(|&s| s <= 0.0) {
            tracing::debug!(layer = %id, "ignoring non-positive scale");
            return false;
        }
        self.layer_mut(id).set_transform(patch);
        true
    }

    /// Apply a partial z-order update.
    pub fn set_layer_order(&mut self, update: LayerOrderUpdate) {
        if let Some(z) = update.frame {
            self.frame.set_z_order(z);
        }
        if let Some(z) = update.avatar {
            self.avatar.set_z_order(z);
        }
    }

    /// Resize the square stage, scaling layer placement and any pending crop
    /// rectangle proportionally.
    pub fn resize_stage(&mut self, width: f64) -> bool {
        if !(width.is_finite() && width > 0.0) {
            tracing::debug!(width, "ignoring invalid stage size");
            return false;
        }

        let ratio = width / self.stage.width;
        for id in LayerId::ALL {
            let layer = self.layer_mut(id);
            let t = *layer.transform();
            layer.replace_transform(LayerTransform {
                x: t.x * ratio,
                y: t.y * ratio,
                scale_x: t.scale_x * ratio,
                scale_y: t.scale_y * ratio,
                rotation: t.rotation,
            });
        }
        self.crop.scale(ratio);

        self.stage = StageConfig::square(width);
        self.safe_area = compute_safe_area(&self.stage);
        true
    }

    // ===== Export =====

    /// Composite both layers into a `canonical_size` square image.
    ///
    /// Returns `Ok(None)` when a layer has no image yet.
    ///
    /// # Errors
    ///
    /// `Encode` if the backend fails to encode the result.
    #[tracing::instrument(skip(self))]
    pub fn export(&self, format: ExportFormat) -> EditorResult<Option<ExportedImage>> {
        match export::compose(
            &self.backend,
            &self.config,
            &self.stage,
            &self.safe_area,
            &self.frame,
            &self.avatar,
            format,
        ) {
            Ok(image) => Ok(Some(image)),
            Err(EditorError::PreconditionNotMet(reason)) => {
                tracing::debug!(%reason, "export skipped");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Stage-space rectangle that the next export maps onto the output.
    pub fn export_region(&self) -> Rect {
        export::export_region(
            self.config.framing,
            &[&self.frame, &self.avatar],
            &self.safe_area,
            &self.stage,
            self.config.export_padding,
        )
    }
}
