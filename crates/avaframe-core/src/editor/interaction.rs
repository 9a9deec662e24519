//! Pointer and toolbar events: drag, resize handles, the scale slider,
//! selection, and the rotate buttons.
//!
//! Each handler returns whether it changed anything.

use serde::{Deserialize, Serialize};

use super::EditorSession;
use crate::backend::ImageBackend;
use crate::geometry::{normalize_degrees, rotate_step, scale_about_point, Rect, RotateDirection};
use crate::layer::{LayerId, LayerTransform};
use crate::stage::BoxConstraint;

/// Node attributes reported when a resize/rotate gesture ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformEnd {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation: f64,
}

impl TransformEnd {
    fn is_valid(&self) -> bool {
        [self.x, self.y, self.scale_x, self.scale_y, self.rotation]
            .iter()
            .all(|v| v.is_finite())
            && self.scale_x > 0.0
            && self.scale_y > 0.0
    }
}

impl<B: ImageBackend> EditorSession<B> {
    /// Store the position a drag ended at. Positions are not clamped, so a
    /// layer may be dragged fully off the stage.
    pub fn on_drag_end(&mut self, id: LayerId, x: f64, y: f64) -> bool {
        let layer = self.layer(id);
        if !layer.is_draggable() || !layer.has_image() {
            tracing::debug!(layer = %id, "drag ignored");
            return false;
        }
        if !(x.is_finite() && y.is_finite()) {
            tracing::debug!(layer = %id, x, y, "drag ignored: non-finite position");
            return false;
        }

        let t = *layer.transform();
        self.layer_mut(id)
            .replace_transform(LayerTransform { x, y, ..t });
        true
    }

    /// Store scale, rotation and position after a handle gesture. Resize
    /// handles can move the top-left corner, so position is re-read too.
    pub fn on_transform_end(&mut self, id: LayerId, attrs: TransformEnd) -> bool {
        let layer = self.layer(id);
        if !layer.is_selectable() || !layer.has_image() {
            tracing::debug!(layer = %id, "transform ignored");
            return false;
        }
        if !attrs.is_valid() {
            tracing::debug!(layer = %id, ?attrs, "transform ignored: invalid attributes");
            return false;
        }

        self.layer_mut(id).replace_transform(LayerTransform {
            x: attrs.x,
            y: attrs.y,
            scale_x: attrs.scale_x,
            scale_y: attrs.scale_y,
            rotation: normalize_degrees(attrs.rotation),
        });
        true
    }

    /// Zoom the avatar about the safe-area center.
    pub fn on_scale_slider_change(&mut self, scale: f64) -> bool {
        if !(scale.is_finite() && scale > 0.0) {
            tracing::debug!(scale, "scale ignored");
            return false;
        }
        let Some(natural) = self.avatar.natural_size() else {
            tracing::debug!("scale ignored: no avatar");
            return false;
        };

        let current = *self.avatar.transform();
        if !(current.scale_x > 0.0 && current.scale_y > 0.0) {
            tracing::debug!(
                scale_x = current.scale_x,
                scale_y = current.scale_y,
                "scale ignored: layer scale not positive"
            );
            return false;
        }

        let pivot = self.safe_area.center();
        self.avatar
            .replace_transform(scale_about_point(&current, natural, scale, pivot));
        true
    }

    /// Change the selection and refresh highlight strokes.
    ///
    /// Only the frame is ever outlined; the avatar is manipulated through its
    /// handles instead.
    pub fn on_select(&mut self, id: Option<LayerId>) -> bool {
        if let Some(id) = id {
            if !self.layer(id).is_selectable() {
                tracing::debug!(layer = %id, "selection ignored: not selectable");
                return false;
            }
        }

        self.selection = id;
        self.refresh_styles();
        true
    }

    fn refresh_styles(&mut self) {
        let highlight = match self.selection {
            Some(LayerId::Frame) => Some(self.config.highlight),
            _ => None,
        };
        self.frame.set_stroke(highlight);
        self.avatar.set_stroke(None);
    }

    /// Quarter-turn the avatar. The frame cannot be rotated by the user.
    pub fn on_rotate_button(&mut self, direction: RotateDirection) -> bool {
        if !self.avatar.has_image() {
            tracing::debug!("rotate ignored: no avatar");
            return false;
        }

        let t = *self.avatar.transform();
        self.avatar.replace_transform(LayerTransform {
            rotation: rotate_step(t.rotation, direction),
            ..t
        });
        true
    }

    /// Filter a box proposed by a resize handle: returns `proposed` when it
    /// passes the size and stage limits, otherwise `old`.
    pub fn propose_resize_box(&self, old: Rect, proposed: Rect) -> Rect {
        self.box_constraint().constrain(old, proposed, &self.stage)
    }

    pub(super) fn box_constraint(&self) -> BoxConstraint {
        BoxConstraint::new(self.config.min_box_size, self.config.max_box_ratio)
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
