//! Frame catalog bindings.
//!
//! Records cross the boundary as plain objects
//! `{id, name, thumbnail, src, category}`.

use avaframe_core::{FrameCatalog, FrameRecord};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

#[wasm_bindgen]
pub struct JsFrameCatalog {
    inner: FrameCatalog,
}

#[wasm_bindgen]
impl JsFrameCatalog {
    /// Build a catalog from an array of frame records (or nothing).
    #[wasm_bindgen(constructor)]
    pub fn new(frames: JsValue) -> Result<JsFrameCatalog, JsValue> {
        let frames: Vec<FrameRecord> = if frames.is_undefined() || frames.is_null() {
            Vec::new()
        } else {
            serde_wasm_bindgen::from_value(frames).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        Ok(Self {
            inner: FrameCatalog::new(frames),
        })
    }

    /// Catalog preloaded with the starter frames.
    #[wasm_bindgen(js_name = withSamples)]
    pub fn with_samples() -> JsFrameCatalog {
        Self {
            inner: FrameCatalog::with_samples(),
        }
    }

    pub fn frames(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.frames())
    }

    pub fn categories(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.categories())
    }

    /// Frames in the selected category.
    pub fn filtered(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.filtered())
    }

    #[wasm_bindgen(getter, js_name = selectedCategory)]
    pub fn selected_category(&self) -> String {
        self.inner.selected_category().to_string()
    }

    #[wasm_bindgen(js_name = setCategory)]
    pub fn set_category(&mut self, id: &str) -> Result<(), JsValue> {
        self.inner
            .set_category(id)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Select a frame by id; returns its record or `undefined`.
    #[wasm_bindgen(js_name = selectFrame)]
    pub fn select_frame(&mut self, id: &str) -> Result<JsValue, JsValue> {
        match self.inner.select_frame(id) {
            Some(record) => to_js(record),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen(js_name = addCustomFrame)]
    pub fn add_custom_frame(&mut self, src: &str) -> Result<JsValue, JsValue> {
        to_js(self.inner.add_custom_frame(src, now_ms()))
    }

    /// Add a frame by URL. Only `http(s)` URLs are accepted.
    #[wasm_bindgen(js_name = addFrameFromUrl)]
    pub fn add_frame_from_url(&mut self, url: &str) -> Result<JsValue, JsValue> {
        let record = self
            .inner
            .add_frame_from_url(url, now_ms())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(record)
    }
}
