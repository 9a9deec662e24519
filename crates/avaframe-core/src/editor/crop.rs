//! Interactive crop: `idle -> cropping -> idle`.
//!
//! Starting a crop captures the visible part of the selected layer's
//! on-screen box as the crop rectangle and hides the resize handles.
//! Applying it renders the layer's current appearance inside the rectangle
//! into a new buffer, and only then moves the layer to the rectangle's origin
//! at scale 1 with no rotation.
//!
//! Calls made in the wrong state, or without a selection, do nothing.

use super::EditorSession;
use crate::backend::ImageBackend;
use crate::geometry::Rect;
use crate::layer::{LayerId, LayerTransform};
use crate::transform::crop_to_rect;

/// Crop state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CropState {
    #[default]
    Idle,
    /// A crop rectangle (stage space) is pending for `layer`.
    Cropping { layer: LayerId, rect: Rect },
}

impl CropState {
    pub fn is_cropping(&self) -> bool {
        matches!(self, CropState::Cropping { .. })
    }

    pub fn rect(&self) -> Option<Rect> {
        match self {
            CropState::Idle => None,
            CropState::Cropping { rect, .. } => Some(*rect),
        }
    }

    pub(super) fn scale(&mut self, ratio: f64) {
        if let CropState::Cropping { rect, .. } = self {
            *rect = Rect::new(
                rect.x * ratio,
                rect.y * ratio,
                rect.width * ratio,
                rect.height * ratio,
            );
        }
    }
}

impl<B: ImageBackend> EditorSession<B> {
    pub fn crop_state(&self) -> &CropState {
        &self.crop
    }

    /// Enter cropping for the selected layer.
    pub fn start_crop(&mut self) -> bool {
        if self.crop.is_cropping() {
            tracing::debug!("crop already in progress");
            return false;
        }
        let Some(id) = self.selection else {
            tracing::debug!("crop ignored: nothing selected");
            return false;
        };
        let Some(bounds) = self.layer(id).visual_bounds() else {
            tracing::debug!(layer = %id, "crop ignored: layer has no image");
            return false;
        };
        let rect = bounds.clamp_to(&self.stage.rect());
        if !self.box_constraint().accepts(&rect, &self.stage) {
            tracing::debug!(layer = %id, ?rect, "crop ignored: visible part too small");
            return false;
        }

        self.crop = CropState::Cropping { layer: id, rect };
        self.transformer_visible = false;
        true
    }

    /// Move or resize the pending crop rectangle. Boxes that fail the resize
    /// constraint keep the previous rectangle.
    pub fn update_crop_rect(&mut self, proposed: Rect) -> bool {
        let CropState::Cropping { layer, rect } = self.crop else {
            tracing::debug!("crop update ignored: not cropping");
            return false;
        };

        let next = self.box_constraint().constrain(rect, proposed, &self.stage);
        self.crop = CropState::Cropping { layer, rect: next };
        next == proposed
    }

    /// Replace the layer's pixels with the pending rectangle's content.
    ///
    /// The new buffer holds the rectangle's on-screen content, sized in stage
    /// units. The layer is placed at the rectangle's origin with scale 1 and
    /// rotation 0, so nothing moves on screen.
    #[tracing::instrument(skip(self))]
    pub fn apply_crop(&mut self) -> bool {
        let CropState::Cropping { layer: id, rect } = self.crop else {
            tracing::debug!("apply ignored: not cropping");
            return false;
        };

        let layer = self.layer(id);
        let cropped = layer
            .image()
            .and_then(|image| crop_to_rect(image, layer.transform(), &rect, self.config.sample_filter));

        let Some(cropped) = cropped else {
            tracing::debug!(layer = %id, ?rect, "apply ignored: empty crop");
            return false;
        };

        let layer = self.layer_mut(id);
        layer.set_image(cropped);
        layer.replace_transform(LayerTransform::at(rect.x, rect.y, 1.0));

        self.finish_crop();
        true
    }

    /// Leave cropping without touching the layer.
    pub fn cancel_crop(&mut self) -> bool {
        if !self.crop.is_cropping() {
            tracing::debug!("cancel ignored: not cropping");
            return false;
        }
        self.finish_crop();
        true
    }

    fn finish_crop(&mut self) {
        self.crop = CropState::Idle;
        self.transformer_visible = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::decode::{decode_image, PixelBuffer};
    use crate::editor::Upload;
    use crate::encode::ExportFormat;
    use crate::export::ExportFraming;
    use crate::geometry::RotateDirection;
    use crate::layer::TransformPatch;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x * 17) as u8, (y * 23) as u8, ((x + y) * 5) as u8, 255]);
            }
        }
        PixelBuffer::new(width, height, pixels)
    }

    /// Stage, safe area and output all 10px so stage pixels map 1:1 to output.
    fn unit_session() -> EditorSession {
        let config = EditorConfig {
            canonical_size: 10,
            pixel_ratio: 1,
            min_box_size: 1.0,
            framing: ExportFraming::SafeArea,
            ..EditorConfig::default()
        };
        let mut s = EditorSession::new(10.0, config).unwrap();
        s.upload_frame(Upload::Decoded(PixelBuffer::transparent(10, 10)))
            .unwrap();
        s.upload_avatar(Upload::Decoded(gradient(10, 10))).unwrap();
        s.set_transform(
            LayerId::Avatar,
            &TransformPatch {
                x: Some(0.0),
                y: Some(0.0),
                scale_x: Some(1.0),
                scale_y: Some(1.0),
                rotation: None,
            },
        );
        s
    }

    #[test]
    fn test_start_requires_selection() {
        let mut s = unit_session();
        assert!(!s.start_crop());
        assert_eq!(*s.crop_state(), CropState::Idle);
        assert!(s.is_transformer_visible());
    }

    #[test]
    fn test_start_captures_bounds_and_hides_handles() {
        let mut s = unit_session();
        s.on_select(Some(LayerId::Avatar));
        assert!(s.start_crop());
        assert_eq!(s.crop_state().rect(), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert!(!s.is_transformer_visible());

        // A second start is ignored
        assert!(!s.start_crop());
    }

    #[test]
    fn test_update_outside_cropping_is_noop() {
        let mut s = unit_session();
        assert!(!s.update_crop_rect(Rect::new(1.0, 1.0, 2.0, 2.0)));
        assert!(!s.apply_crop());
        assert!(!s.cancel_crop());
    }

    #[test]
    fn test_update_rejects_out_of_stage_box() {
        let mut s = unit_session();
        s.on_select(Some(LayerId::Avatar));
        s.start_crop();

        assert!(!s.update_crop_rect(Rect::new(5.0, 5.0, 8.0, 8.0)));
        assert_eq!(s.crop_state().rect(), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_cancel_leaves_layer_untouched() {
        let mut s = unit_session();
        let before = s.avatar().image().cloned();
        s.on_select(Some(LayerId::Avatar));
        s.start_crop();
        s.update_crop_rect(Rect::new(2.0, 2.0, 3.0, 3.0));

        assert!(s.cancel_crop());
        assert_eq!(*s.crop_state(), CropState::Idle);
        assert!(s.is_transformer_visible());
        assert_eq!(s.avatar().image().cloned(), before);
    }

    #[test]
    fn test_apply_replaces_pixels_and_transform() {
        let mut s = unit_session();
        let source = s.avatar().image().cloned().unwrap();
        s.on_select(Some(LayerId::Avatar));
        s.start_crop();
        assert!(s.update_crop_rect(Rect::new(2.0, 3.0, 5.0, 4.0)));
        assert!(s.apply_crop());

        let avatar = s.avatar();
        let img = avatar.image().unwrap();
        assert_eq!((img.width, img.height), (5, 4));
        assert_eq!(*avatar.transform(), LayerTransform::at(2.0, 3.0, 1.0));
        assert_eq!(img.pixel(0, 0), source.pixel(2, 3));
        assert_eq!(img.pixel(4, 3), source.pixel(6, 6));
        assert!(s.is_transformer_visible());
        assert!(!s.crop_state().is_cropping());
    }

    #[test]
    fn test_apply_on_scaled_layer_keeps_visual_size() {
        let mut s = unit_session();
        s.set_transform(
            LayerId::Avatar,
            &TransformPatch {
                scale_x: Some(0.5),
                scale_y: Some(0.5),
                ..TransformPatch::default()
            },
        );
        s.on_select(Some(LayerId::Avatar));
        s.start_crop();
        assert_eq!(s.crop_state().rect(), Some(Rect::new(0.0, 0.0, 5.0, 5.0)));
        assert!(s.apply_crop());

        let avatar = s.avatar();
        assert_eq!(avatar.bounds(), Some(Rect::new(0.0, 0.0, 5.0, 5.0)));
        assert_eq!(avatar.transform().scale_x, 1.0);
    }

    #[test]
    fn test_crop_then_export_reproduces_source() {
        let mut s = unit_session();
        let source = s.avatar().image().cloned().unwrap();
        s.on_select(Some(LayerId::Avatar));
        s.start_crop();
        s.update_crop_rect(Rect::new(2.0, 3.0, 5.0, 4.0));
        s.apply_crop();

        let exported = s.export(ExportFormat::Png).unwrap().unwrap();
        let out = decode_image(&exported.bytes).unwrap();
        assert_eq!((out.width, out.height), (10, 10));

        for y in 0..10 {
            for x in 0..10 {
                let inside = (2..7).contains(&x) && (3..7).contains(&y);
                let expected = if inside { source.pixel(x, y) } else { [0, 0, 0, 0] };
                assert_eq!(out.pixel(x, y), expected, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_frame_can_be_cropped_too() {
        let mut s = unit_session();
        s.on_select(Some(LayerId::Frame));
        assert!(s.start_crop());
        assert!(s.update_crop_rect(Rect::new(1.0, 1.0, 4.0, 4.0)));
        assert!(s.apply_crop());
        assert_eq!(s.frame().natural_size(), Some((4.0, 4.0)));
        assert_eq!(s.avatar().natural_size(), Some((10.0, 10.0)));
    }

    #[test]
    fn test_resize_stage_scales_pending_rect() {
        let mut s = unit_session();
        s.on_select(Some(LayerId::Avatar));
        s.start_crop();
        s.resize_stage(20.0);
        assert_eq!(s.crop_state().rect(), Some(Rect::new(0.0, 0.0, 20.0, 20.0)));
    }

    #[test]
    fn test_start_limits_rect_to_stage() {
        let mut s = EditorSession::new(500.0, EditorConfig::default()).unwrap();
        s.upload_avatar(Upload::Decoded(gradient(200, 200))).unwrap();
        assert!(s.on_scale_slider_change(1e7));
        s.on_select(Some(LayerId::Avatar));

        assert!(s.start_crop());
        assert_eq!(s.crop_state().rect(), Some(Rect::new(0.0, 0.0, 500.0, 500.0)));
        assert!(s.apply_crop());
        assert_eq!(s.avatar().natural_size(), Some((500.0, 500.0)));
    }

    #[test]
    fn test_start_ignores_layer_off_stage() {
        let mut s = unit_session();
        s.set_transform(LayerId::Avatar, &TransformPatch::position(50.0, 50.0));
        s.on_select(Some(LayerId::Avatar));
        assert!(!s.start_crop());
        assert!(s.is_transformer_visible());
    }

    #[test]
    fn test_apply_on_rotated_layer_keeps_appearance() {
        const RED: [u8; 4] = [255, 0, 0, 255];
        const GREEN: [u8; 4] = [0, 255, 0, 255];

        // Left half red, right half green
        let mut image = PixelBuffer::filled(200, 100, RED);
        for y in 0..100 {
            for x in 100..200 {
                image.set_pixel(x, y, GREEN);
            }
        }

        let mut s = EditorSession::new(500.0, EditorConfig::default()).unwrap();
        s.upload_avatar(Upload::Decoded(image)).unwrap();
        assert!(s.on_rotate_button(RotateDirection::Right));
        let before = s.avatar().visual_bounds().unwrap();

        s.on_select(Some(LayerId::Avatar));
        assert!(s.start_crop());
        assert!(s.apply_crop());

        let avatar = s.avatar();
        assert_eq!(avatar.transform().rotation, 0.0);
        assert_eq!(avatar.natural_size(), Some((175.0, 350.0)));
        let after = avatar.visual_bounds().unwrap();
        assert!((after.x - before.x).abs() < 1e-9 && (after.y - before.y).abs() < 1e-9);
        assert!((after.width - before.width).abs() < 1e-9);
        assert!((after.height - before.height).abs() < 1e-9);

        // Turned clockwise: the left half is now on top, nothing is lost
        let img = avatar.image().unwrap();
        assert!(img.pixels.chunks_exact(4).all(|p| p[3] == 255));
        assert_eq!(img.pixel(87, 10), RED);
        assert_eq!(img.pixel(87, 340), GREEN);
    }
}
