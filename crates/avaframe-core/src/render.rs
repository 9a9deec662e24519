//! Software rasterizer for export scenes.
//!
//! A [`Scene`] is a list of images placed with [`LayerTransform`]s in device
//! space, drawn in order onto a transparent canvas. Every destination pixel
//! inside an item's footprint is inverse-mapped into the item's source pixels:
//!
//! ```text
//! d = p - center
//! q = rotate(d, -rotation)
//! u = q.x / scale_x + width / 2
//! v = q.y / scale_y + height / 2
//! ```
//!
//! and the sampled color is blended over the canvas with straight-alpha
//! "source over".

use crate::decode::PixelBuffer;
use crate::geometry::{rotated_bounds, Rect};
use crate::layer::LayerTransform;
use crate::transform::{sample, InterpolationFilter};

/// One image placed on the canvas.
#[derive(Debug, Clone, Copy)]
pub struct SceneItem<'a> {
    pub image: &'a PixelBuffer,
    /// Placement in device pixels.
    pub transform: LayerTransform,
}

impl SceneItem<'_> {
    /// Unrotated device-space extent.
    fn extent(&self) -> Rect {
        Rect::new(
            self.transform.x,
            self.transform.y,
            f64::from(self.image.width) * self.transform.scale_x,
            f64::from(self.image.height) * self.transform.scale_y,
        )
    }
}

/// Everything needed to rasterize one export.
#[derive(Debug, Clone)]
pub struct Scene<'a> {
    pub width: u32,
    pub height: u32,
    /// Items in paint order, bottom first.
    pub items: Vec<SceneItem<'a>>,
    pub filter: InterpolationFilter,
}

impl<'a> Scene<'a> {
    pub fn new(width: u32, height: u32, filter: InterpolationFilter) -> Self {
        Self {
            width,
            height,
            items: Vec::new(),
            filter,
        }
    }

    pub fn push(&mut self, image: &'a PixelBuffer, transform: LayerTransform) {
        self.items.push(SceneItem { image, transform });
    }
}

/// Composite `src` over `dst`, both straight-alpha RGBA.
///
/// An opaque source replaces the destination exactly and a fully transparent
/// source leaves it untouched.
#[inline]
pub fn blend_over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let da = u32::from(dst[3]);
    let inv = 255 - sa;
    // Output alpha scaled by 255
    let out_a = sa * 255 + da * inv;
    if out_a == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = u32::from(src[i]) * sa * 255 + u32::from(dst[i]) * da * inv;
        out[i] = ((c + out_a / 2) / out_a).min(255) as u8;
    }
    out[3] = ((out_a + 127) / 255).min(255) as u8;
    out
}

/// Rasterize a scene onto a transparent canvas.
pub fn rasterize(scene: &Scene<'_>) -> PixelBuffer {
    let mut canvas = PixelBuffer::transparent(scene.width, scene.height);
    for item in &scene.items {
        draw_item(&mut canvas, item, scene.filter);
    }
    canvas
}

fn draw_item(canvas: &mut PixelBuffer, item: &SceneItem<'_>, filter: InterpolationFilter) {
    let t = &item.transform;
    if item.image.is_empty()
        || !(t.scale_x.is_finite() && t.scale_y.is_finite() && t.scale_x > 0.0 && t.scale_y > 0.0)
        || !(t.x.is_finite() && t.y.is_finite() && t.rotation.is_finite())
    {
        return;
    }

    let extent = item.extent();
    let footprint = rotated_bounds(&extent, t.rotation)
        .clamp_to(&Rect::new(0.0, 0.0, f64::from(canvas.width), f64::from(canvas.height)));
    if footprint.width <= 0.0 || footprint.height <= 0.0 {
        return;
    }

    let x0 = footprint.x.floor() as u32;
    let y0 = footprint.y.floor() as u32;
    let x1 = (footprint.right().ceil() as u32).min(canvas.width);
    let y1 = (footprint.bottom().ceil() as u32).min(canvas.height);

    let center = extent.center();
    let half_w = f64::from(item.image.width) / 2.0;
    let half_h = f64::from(item.image.height) / 2.0;

    let rotated = t.rotation != 0.0;
    let (sin, cos) = t.rotation.to_radians().sin_cos();

    for py in y0..y1 {
        let dy = f64::from(py) + 0.5 - center.y;
        for px in x0..x1 {
            let dx = f64::from(px) + 0.5 - center.x;

            let (qx, qy) = if rotated {
                (dx * cos + dy * sin, -dx * sin + dy * cos)
            } else {
                (dx, dy)
            };

            let u = qx / t.scale_x + half_w;
            let v = qy / t.scale_y + half_h;

            let color = sample(item.image, u, v, filter);
            if color[3] == 0 {
                continue;
            }
            let dst = canvas.pixel(px, py);
            canvas.set_pixel(px, py, blend_over(dst, color));
        }
    }
}
