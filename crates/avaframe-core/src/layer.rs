//! The two composited layers: the decorative frame and the user's avatar.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decode::PixelBuffer;
use crate::error::EditorError;
use crate::geometry::{normalize_degrees, rotated_bounds, Point, Rect};

/// Stable identifier of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerId {
    /// The decorative frame (background image).
    Frame,
    /// The user's avatar (foreground image).
    Avatar,
}

impl LayerId {
    pub const ALL: [LayerId; 2] = [LayerId::Frame, LayerId::Avatar];

    pub fn as_str(self) -> &'static str {
        match self {
            LayerId::Frame => "frame",
            LayerId::Avatar => "avatar",
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerId {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frame" => Ok(LayerId::Frame),
            "avatar" => Ok(LayerId::Avatar),
            other => Err(EditorError::invalid_input(format!(
                "unknown layer id: {other}"
            ))),
        }
    }
}

/// Placement of a layer in stage space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerTransform {
    /// Left edge of the scaled, unrotated image.
    pub x: f64,
    /// Top edge of the scaled, unrotated image.
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Rotation about the layer center in degrees, within `[0, 360)`.
    pub rotation: f64,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
        }
    }
}

impl LayerTransform {
    /// Uniformly scaled transform at the given position.
    pub fn at(x: f64, y: f64, scale: f64) -> Self {
        Self {
            x,
            y,
            scale_x: scale,
            scale_y: scale,
            rotation: 0.0,
        }
    }
}

/// Partial update of a [`LayerTransform`]; `None` fields keep their value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub rotation: Option<f64>,
}

impl TransformPatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Merge into `transform`. Rotation is normalized into `[0, 360)`.
    pub fn apply_to(&self, transform: &mut LayerTransform) {
        if let Some(x) = self.x {
            transform.x = x;
        }
        if let Some(y) = self.y {
            transform.y = y;
        }
        if let Some(scale_x) = self.scale_x {
            transform.scale_x = scale_x;
        }
        if let Some(scale_y) = self.scale_y {
            transform.scale_y = scale_y;
        }
        if let Some(rotation) = self.rotation {
            transform.rotation = normalize_degrees(rotation);
        }
    }

    /// True if every provided field is a finite number.
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.scale_x, self.scale_y, self.rotation]
            .iter()
            .flatten()
            .all(|v| v.is_finite())
    }
}

/// Selection highlight drawn around a layer on screen. Never exported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// RGBA color.
    pub color: [u8; 4],
    pub width: f64,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            color: [0x4F, 0x46, 0xE5, 0xFF],
            width: 2.0,
        }
    }
}

/// One composited image with its placement and interaction flags.
#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    image: Option<PixelBuffer>,
    transform: LayerTransform,
    z_order: i32,
    selectable: bool,
    draggable: bool,
    stroke: Option<Stroke>,
}

impl Layer {
    /// Empty frame layer: rendered on top, selectable, not draggable.
    pub fn frame() -> Self {
        Self {
            id: LayerId::Frame,
            image: None,
            transform: LayerTransform::default(),
            z_order: 1,
            selectable: true,
            draggable: false,
            stroke: None,
        }
    }

    /// Empty avatar layer: rendered behind the frame, selectable, draggable.
    pub fn avatar() -> Self {
        Self {
            id: LayerId::Avatar,
            image: None,
            transform: LayerTransform::default(),
            z_order: 0,
            selectable: true,
            draggable: true,
            stroke: None,
        }
    }

    pub fn new(id: LayerId) -> Self {
        match id {
            LayerId::Frame => Self::frame(),
            LayerId::Avatar => Self::avatar(),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn image(&self) -> Option<&PixelBuffer> {
        self.image.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn transform(&self) -> &LayerTransform {
        &self.transform
    }

    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    pub fn is_draggable(&self) -> bool {
        self.draggable
    }

    pub fn stroke(&self) -> Option<&Stroke> {
        self.stroke.as_ref()
    }

    /// Replace the pixel buffer. The transform is left untouched.
    pub fn set_image(&mut self, image: PixelBuffer) {
        self.image = Some(image);
    }

    pub fn set_transform(&mut self, patch: &TransformPatch) {
        patch.apply_to(&mut self.transform);
    }

    pub fn replace_transform(&mut self, transform: LayerTransform) {
        self.transform = transform;
    }

    pub fn set_z_order(&mut self, z_order: i32) {
        self.z_order = z_order;
    }

    pub fn set_selectable(&mut self, selectable: bool) {
        self.selectable = selectable;
    }

    pub fn set_draggable(&mut self, draggable: bool) {
        self.draggable = draggable;
    }

    pub(crate) fn set_stroke(&mut self, stroke: Option<Stroke>) {
        self.stroke = stroke;
    }

    /// Intrinsic image size, if an image is loaded.
    pub fn natural_size(&self) -> Option<(f64, f64)> {
        self.image
            .as_ref()
            .map(|img| (f64::from(img.width), f64::from(img.height)))
    }

    /// Scaled extent of the image, ignoring rotation.
    pub fn bounds(&self) -> Option<Rect> {
        let (w, h) = self.natural_size()?;
        Some(Rect::new(
            self.transform.x,
            self.transform.y,
            w * self.transform.scale_x,
            h * self.transform.scale_y,
        ))
    }

    /// Axis-aligned box of the layer as it appears on screen, rotation included.
    pub fn visual_bounds(&self) -> Option<Rect> {
        self.bounds()
            .map(|b| rotated_bounds(&b, self.transform.rotation))
    }

    pub fn center(&self) -> Option<Point> {
        self.bounds().map(|b| b.center())
    }
}
