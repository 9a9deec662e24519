//! Editor session bindings.
//!
//! `JsEditor` owns one [`EditorSession`]. The UI forwards pointer and toolbar
//! events to it and reads back a plain-object snapshot to position its canvas
//! nodes.
//!
//! # Example
//!
//! ```typescript
//! import { JsEditor } from '@avaframe/wasm';
//!
//! const editor = new JsEditor(500, { pixel_ratio: 2 });
//! editor.uploadFrame(file.type, new Uint8Array(await file.arrayBuffer()));
//! editor.onScaleSliderChange(1.4);
//!
//! const exported = editor.export('png');
//! if (exported) {
//!   link.download = exported.fileName();
//!   link.href = exported.dataUrl();
//! }
//! ```

use avaframe_core::{
    EditorConfig, EditorSession, ExportFormat, ExportedImage, Layer, LayerId, LayerOrderUpdate,
    LayerTransform, Rect, RotateDirection, Stroke, TransformEnd, Upload,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::types::JsPixelBuffer;

fn js_err(e: impl ToString) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_layer(id: &str) -> Result<LayerId, JsValue> {
    id.parse().map_err(js_err)
}

fn parse_direction(direction: &str) -> Option<RotateDirection> {
    match direction {
        "left" => Some(RotateDirection::Left),
        "right" => Some(RotateDirection::Right),
        _ => None,
    }
}

/// Read `key` from a JS object as an integer, ignoring anything non-numeric.
fn numeric_field(obj: &JsValue, key: &str) -> Option<i32> {
    let value = js_sys::Reflect::get(obj, &JsValue::from_str(key)).ok()?;
    order_value(value.as_f64())
}

fn order_value(value: Option<f64>) -> Option<i32> {
    value.filter(|v| v.is_finite()).map(|v| v.round() as i32)
}

/// Serializable view of one layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LayerSnapshot {
    id: LayerId,
    has_image: bool,
    natural_width: Option<u32>,
    natural_height: Option<u32>,
    transform: LayerTransform,
    z_order: i32,
    selectable: bool,
    draggable: bool,
    stroke: Option<Stroke>,
}

impl LayerSnapshot {
    fn of(layer: &Layer) -> Self {
        Self {
            id: layer.id(),
            has_image: layer.has_image(),
            natural_width: layer.image().map(|img| img.width),
            natural_height: layer.image().map(|img| img.height),
            transform: *layer.transform(),
            z_order: layer.z_order(),
            selectable: layer.is_selectable(),
            draggable: layer.is_draggable(),
            stroke: layer.stroke().copied(),
        }
    }
}

/// Serializable view of the whole session.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EditorSnapshot {
    stage_size: f64,
    safe_area: Rect,
    selection: Option<LayerId>,
    crop_rect: Option<Rect>,
    transformer_visible: bool,
    /// Layer ids bottom to top.
    paint_order: [LayerId; 2],
    frame: LayerSnapshot,
    avatar: LayerSnapshot,
}

impl EditorSnapshot {
    fn of(session: &EditorSession) -> Self {
        Self {
            stage_size: session.stage().width,
            safe_area: *session.safe_area(),
            selection: session.selection(),
            crop_rect: session.crop_state().rect(),
            transformer_visible: session.is_transformer_visible(),
            paint_order: avaframe_core::export::paint_order_ids(session.frame(), session.avatar()),
            frame: LayerSnapshot::of(session.frame()),
            avatar: LayerSnapshot::of(session.avatar()),
        }
    }
}

/// An encoded export ready to download.
#[wasm_bindgen]
pub struct JsExportedImage {
    inner: ExportedImage,
}

#[wasm_bindgen]
impl JsExportedImage {
    /// Encoded bytes as Uint8Array (copied).
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// `"png"` or `"jpeg"`.
    #[wasm_bindgen(getter)]
    pub fn format(&self) -> String {
        self.inner.format.to_string()
    }

    #[wasm_bindgen(getter, js_name = mimeType)]
    pub fn mime_type(&self) -> String {
        self.inner.format.mime_type().to_string()
    }

    /// `avatar-frame-<now>.<format>`, timestamped with `Date.now()`.
    #[wasm_bindgen(js_name = fileName)]
    pub fn file_name(&self) -> String {
        self.inner.file_name(js_sys::Date::now() as u64)
    }

    #[wasm_bindgen(js_name = dataUrl)]
    pub fn data_url(&self) -> String {
        self.inner.to_data_url()
    }
}

/// Handle to one editing session.
#[wasm_bindgen]
pub struct JsEditor {
    inner: EditorSession,
}

#[wasm_bindgen]
impl JsEditor {
    /// Create a session on a square stage.
    ///
    /// `config` is an optional plain object with any subset of the
    /// `EditorConfig` fields; omitted fields keep their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(stage_size: f64, config: JsValue) -> Result<JsEditor, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(js_err)?
        };
        let inner = EditorSession::new(stage_size, config).map_err(js_err)?;
        Ok(Self { inner })
    }

    /// Snapshot of the stage, safe area, selection, crop and both layers.
    pub fn state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&EditorSnapshot::of(&self.inner)).map_err(js_err)
    }

    /// Current pixels of a layer, if loaded.
    #[wasm_bindgen(js_name = layerPixels)]
    pub fn layer_pixels(&self, layer: &str) -> Result<Option<JsPixelBuffer>, JsValue> {
        let id = parse_layer(layer)?;
        Ok(self
            .inner
            .layer(id)
            .image()
            .cloned()
            .map(JsPixelBuffer::from_buffer))
    }

    // ===== Uploads =====

    /// Upload raw frame file bytes. Rejects non-image MIME types and files
    /// over the size limit.
    #[wasm_bindgen(js_name = uploadFrame)]
    pub fn upload_frame(&mut self, mime: &str, bytes: Vec<u8>) -> Result<(), JsValue> {
        self.inner
            .upload_frame(Upload::file(mime, bytes))
            .map_err(js_err)
    }

    #[wasm_bindgen(js_name = uploadAvatar)]
    pub fn upload_avatar(&mut self, mime: &str, bytes: Vec<u8>) -> Result<(), JsValue> {
        self.inner
            .upload_avatar(Upload::file(mime, bytes))
            .map_err(js_err)
    }

    /// Upload an already decoded frame image (no file validation).
    #[wasm_bindgen(js_name = uploadFrameImage)]
    pub fn upload_frame_image(&mut self, image: &JsPixelBuffer) -> Result<(), JsValue> {
        self.inner
            .upload_frame(Upload::Decoded(image.to_buffer()))
            .map_err(js_err)
    }

    #[wasm_bindgen(js_name = uploadAvatarImage)]
    pub fn upload_avatar_image(&mut self, image: &JsPixelBuffer) -> Result<(), JsValue> {
        self.inner
            .upload_avatar(Upload::Decoded(image.to_buffer()))
            .map_err(js_err)
    }

    // ===== Interaction =====

    #[wasm_bindgen(js_name = onDragEnd)]
    pub fn on_drag_end(&mut self, layer: &str, x: f64, y: f64) -> Result<bool, JsValue> {
        let id = parse_layer(layer)?;
        Ok(self.inner.on_drag_end(id, x, y))
    }

    /// `attrs` is `{x, y, scale_x, scale_y, rotation}` read from the node.
    #[wasm_bindgen(js_name = onTransformEnd)]
    pub fn on_transform_end(&mut self, layer: &str, attrs: JsValue) -> Result<bool, JsValue> {
        let id = parse_layer(layer)?;
        let attrs: TransformEnd = serde_wasm_bindgen::from_value(attrs).map_err(js_err)?;
        Ok(self.inner.on_transform_end(id, attrs))
    }

    #[wasm_bindgen(js_name = onScaleSliderChange)]
    pub fn on_scale_slider_change(&mut self, scale: f64) -> bool {
        self.inner.on_scale_slider_change(scale)
    }

    /// Select `"frame"`, `"avatar"`, or nothing (`null`/`undefined`).
    #[wasm_bindgen(js_name = onSelect)]
    pub fn on_select(&mut self, layer: Option<String>) -> Result<bool, JsValue> {
        let id = layer.as_deref().map(parse_layer).transpose()?;
        Ok(self.inner.on_select(id))
    }

    /// Quarter-turn the avatar, `"left"` or `"right"`.
    #[wasm_bindgen(js_name = onRotateButton)]
    pub fn on_rotate_button(&mut self, direction: &str) -> Result<bool, JsValue> {
        let direction = parse_direction(direction)
            .ok_or_else(|| js_err(format!("unknown rotate direction: {direction}")))?;
        Ok(self.inner.on_rotate_button(direction))
    }

    /// Resize-handle bound function: returns the box to use.
    #[wasm_bindgen(js_name = proposeResizeBox)]
    pub fn propose_resize_box(&self, old: JsValue, proposed: JsValue) -> Result<JsValue, JsValue> {
        let old: Rect = serde_wasm_bindgen::from_value(old).map_err(js_err)?;
        let proposed: Rect = serde_wasm_bindgen::from_value(proposed).map_err(js_err)?;
        let result = self.inner.propose_resize_box(old, proposed);
        serde_wasm_bindgen::to_value(&result).map_err(js_err)
    }

    /// Partial z-order update `{frame?, avatar?}`. Non-numeric fields are
    /// ignored.
    #[wasm_bindgen(js_name = setLayerOrder)]
    pub fn set_layer_order(&mut self, order: JsValue) {
        if !order.is_object() {
            return;
        }
        self.inner.set_layer_order(LayerOrderUpdate {
            frame: numeric_field(&order, "frame"),
            avatar: numeric_field(&order, "avatar"),
        });
    }

    #[wasm_bindgen(js_name = resizeStage)]
    pub fn resize_stage(&mut self, width: f64) -> bool {
        self.inner.resize_stage(width)
    }

    // ===== Crop =====

    #[wasm_bindgen(js_name = startCrop)]
    pub fn start_crop(&mut self) -> bool {
        self.inner.start_crop()
    }

    /// `rect` is `{x, y, width, height}` in stage coordinates.
    #[wasm_bindgen(js_name = updateCropRect)]
    pub fn update_crop_rect(&mut self, rect: JsValue) -> Result<bool, JsValue> {
        let rect: Rect = serde_wasm_bindgen::from_value(rect).map_err(js_err)?;
        Ok(self.inner.update_crop_rect(rect))
    }

    #[wasm_bindgen(js_name = applyCrop)]
    pub fn apply_crop(&mut self) -> bool {
        self.inner.apply_crop()
    }

    #[wasm_bindgen(js_name = cancelCrop)]
    pub fn cancel_crop(&mut self) -> bool {
        self.inner.cancel_crop()
    }

    // ===== Export =====

    /// Export as `"png"` or `"jpeg"`. Returns `undefined` until both layers
    /// have an image.
    pub fn export(&self, format: &str) -> Result<Option<JsExportedImage>, JsValue> {
        let format: ExportFormat = format.parse().map_err(js_err)?;
        let exported = self.inner.export(format).map_err(js_err)?;
        Ok(exported.map(|inner| JsExportedImage { inner }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direction() {
        assert_eq!(parse_direction("left"), Some(RotateDirection::Left));
        assert_eq!(parse_direction("right"), Some(RotateDirection::Right));
        assert_eq!(parse_direction("up"), None);
    }

    #[test]
    fn test_order_value_ignores_non_numbers() {
        assert_eq!(order_value(Some(3.0)), Some(3));
        assert_eq!(order_value(Some(2.6)), Some(3));
        assert_eq!(order_value(Some(f64::NAN)), None);
        assert_eq!(order_value(None), None);
    }

    #[test]
    fn test_snapshot_of_new_session() {
        let session = EditorSession::new(400.0, EditorConfig::default()).unwrap();
        let snapshot = EditorSnapshot::of(&session);
        assert_eq!(snapshot.stage_size, 400.0);
        assert_eq!(snapshot.paint_order, [LayerId::Avatar, LayerId::Frame]);
        assert!(!snapshot.frame.has_image);
        assert!(snapshot.avatar.draggable);
        assert!(!snapshot.frame.draggable);
        assert!(snapshot.crop_rect.is_none());
    }
}

/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use avaframe_core::decode::PixelBuffer;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn loaded_editor() -> JsEditor {
        let mut editor = JsEditor::new(500.0, JsValue::UNDEFINED).unwrap();
        let frame = JsPixelBuffer::from_buffer(PixelBuffer::filled(800, 600, [0, 0, 0, 0]));
        let avatar = JsPixelBuffer::from_buffer(PixelBuffer::filled(200, 200, [200, 10, 10, 255]));
        editor.upload_frame_image(&frame).unwrap();
        editor.upload_avatar_image(&avatar).unwrap();
        editor
    }

    #[wasm_bindgen_test]
    fn test_partial_config() {
        #[derive(Serialize)]
        struct Partial {
            canonical_size: u32,
        }
        let config = serde_wasm_bindgen::to_value(&Partial { canonical_size: 64 }).unwrap();
        let mut editor = JsEditor::new(300.0, config).unwrap();
        let img = JsPixelBuffer::from_buffer(PixelBuffer::filled(10, 10, [1, 2, 3, 255]));
        editor.upload_frame_image(&img).unwrap();
        editor.upload_avatar_image(&img).unwrap();

        let exported = editor.export("png").unwrap().unwrap();
        assert_eq!((exported.width(), exported.height()), (64, 64));
    }

    #[wasm_bindgen_test]
    fn test_export_requires_layers() {
        let editor = JsEditor::new(500.0, JsValue::NULL).unwrap();
        assert!(editor.export("png").unwrap().is_none());
        assert!(editor.export("bmp").is_err());
    }

    #[wasm_bindgen_test]
    fn test_export_file_name_and_data_url() {
        let editor = loaded_editor();
        let exported = editor.export("jpeg").unwrap().unwrap();
        assert!(exported.file_name().starts_with("avatar-frame-"));
        assert!(exported.file_name().ends_with(".jpeg"));
        assert!(exported.data_url().starts_with("data:image/jpeg;base64,"));
        assert_eq!((exported.width(), exported.height()), (500, 500));
    }

    #[wasm_bindgen_test]
    fn test_oversized_upload_rejected() {
        let mut editor = loaded_editor();
        let result = editor.upload_avatar("image/png", vec![0u8; 25 * 1024 * 1024]);
        assert!(result.is_err());
        assert!(editor.layer_pixels("avatar").unwrap().is_some());
    }

    #[wasm_bindgen_test]
    fn test_set_layer_order_ignores_non_numeric() {
        let mut editor = loaded_editor();
        let order = js_sys::Object::new();
        js_sys::Reflect::set(&order, &"frame".into(), &"high".into()).unwrap();
        js_sys::Reflect::set(&order, &"avatar".into(), &JsValue::from_f64(5.0)).unwrap();
        editor.set_layer_order(order.into());

        assert_eq!(editor.inner.frame().z_order(), 1);
        assert_eq!(editor.inner.avatar().z_order(), 5);
    }

    #[wasm_bindgen_test]
    fn test_interaction_round_trip() {
        let mut editor = loaded_editor();
        assert!(editor.on_scale_slider_change(2.0));
        assert!(!editor.on_drag_end("frame", 1.0, 1.0).unwrap());
        assert!(editor.on_drag_end("avatar", 10.0, 20.0).unwrap());
        assert!(editor.on_select(Some("avatar".to_string())).unwrap());
        assert!(editor.on_select(None).unwrap());
        assert!(editor.on_select(Some("background".to_string())).is_err());
        assert!(editor.on_rotate_button("left").unwrap());
        assert!(editor.on_rotate_button("sideways").is_err());
        assert!(editor.state().unwrap().is_object());
    }

    #[wasm_bindgen_test]
    fn test_crop_flow() {
        let mut editor = loaded_editor();
        editor.on_select(Some("avatar".to_string())).unwrap();
        assert!(editor.start_crop());

        let rect = serde_wasm_bindgen::to_value(&Rect::new(100.0, 100.0, 200.0, 150.0)).unwrap();
        assert!(editor.update_crop_rect(rect).unwrap());
        assert!(editor.apply_crop());

        let pixels = editor.layer_pixels("avatar").unwrap().unwrap();
        assert_eq!((pixels.width(), pixels.height()), (200, 150));
    }
}
