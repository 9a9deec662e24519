//! Stage-space geometry: rectangles, fitting, centering, scaling about a
//! pivot, and quarter-turn rotation steps.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner of the stage, y grows downwards
//! - Rotation angles are in degrees, positive = clockwise on screen
//! - Layers rotate about the center of their scaled, unrotated extent

use serde::{Deserialize, Serialize};

/// A point in stage space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Grow the rectangle by `amount` on every side.
    pub fn pad(&self, amount: f64) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    /// Intersect with `bounds`. An empty intersection yields a zero-sized rect.
    pub fn clamp_to(&self, bounds: &Rect) -> Rect {
        let x = self.x.clamp(bounds.x, bounds.right());
        let y = self.y.clamp(bounds.y, bounds.bottom());
        let right = self.right().clamp(bounds.x, bounds.right());
        let bottom = self.bottom().clamp(bounds.y, bounds.bottom());
        Rect::new(x, y, (right - x).max(0.0), (bottom - y).max(0.0))
    }

    /// True if `other` lies entirely inside `self` (edges may touch).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Direction of a quarter-turn rotation button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotateDirection {
    /// Counter-clockwise, -90 degrees.
    Left,
    /// Clockwise, +90 degrees.
    Right,
}

impl RotateDirection {
    pub fn delta_degrees(self) -> f64 {
        match self {
            RotateDirection::Left => -90.0,
            RotateDirection::Right => 90.0,
        }
    }
}

/// Uniform scale that fits an image into a box by its larger dimension.
///
/// `scale = min(box_w, box_h) / max(natural_w, natural_h)`. There is no
/// separate clamp, so small images are upscaled to fill the box.
pub fn fit_scale(natural_w: f64, natural_h: f64, box_w: f64, box_h: f64) -> f64 {
    box_w.min(box_h) / natural_w.max(natural_h)
}

/// Scale that makes an avatar's longer side cover `fraction` of the safe
/// area's shorter side.
pub fn avatar_fit_scale(natural_w: f64, natural_h: f64, safe_area: &Rect, fraction: f64) -> f64 {
    let target = safe_area.width.min(safe_area.height) * fraction;
    fit_scale(natural_w, natural_h, target, target)
}

/// Top-left position that centers an item of the given size inside `container`.
pub fn center_in(container: &Rect, item_w: f64, item_h: f64) -> (f64, f64) {
    (
        container.x + (container.width - item_w) / 2.0,
        container.y + (container.height - item_h) / 2.0,
    )
}

/// Change a layer's uniform scale while keeping `pivot` fixed in stage space.
///
/// The image's center is moved along the line through `pivot` so that its
/// offset from the pivot grows by `new_scale / old_scale`. This keeps the
/// interactive zoom anchored to the safe-area center no matter where the
/// avatar currently sits.
///
/// # Arguments
///
/// * `transform` - Current layer transform (uses `scale_x` as the old scale)
/// * `natural` - Intrinsic image size `(width, height)`
/// * `new_scale` - Target uniform scale
/// * `pivot` - Stage point that must not move
///
/// Returns the transform unchanged when either scale is not a positive finite
/// number.
pub fn scale_about_point(
    transform: &crate::layer::LayerTransform,
    natural: (f64, f64),
    new_scale: f64,
    pivot: Point,
) -> crate::layer::LayerTransform {
    let old_scale = transform.scale_x;
    if !(new_scale.is_finite() && new_scale > 0.0 && old_scale.is_finite() && old_scale > 0.0) {
        return *transform;
    }

    let (natural_w, natural_h) = natural;
    let old_w = natural_w * transform.scale_x;
    let old_h = natural_h * transform.scale_y;
    let center = Point::new(transform.x + old_w / 2.0, transform.y + old_h / 2.0);

    let ratio = new_scale / old_scale;
    let new_center = Point::new(
        pivot.x + (center.x - pivot.x) * ratio,
        pivot.y + (center.y - pivot.y) * ratio,
    );

    let new_w = natural_w * new_scale;
    let new_h = natural_h * new_scale;

    crate::layer::LayerTransform {
        x: new_center.x - new_w / 2.0,
        y: new_center.y - new_h / 2.0,
        scale_x: new_scale,
        scale_y: new_scale,
        rotation: transform.rotation,
    }
}

/// Normalize an angle into `[0, 360)`.
#[inline]
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Apply one quarter-turn and normalize the result into `[0, 360)`.
pub fn rotate_step(current_degrees: f64, direction: RotateDirection) -> f64 {
    normalize_degrees(current_degrees + direction.delta_degrees())
}

/// Axis-aligned bounding box of `rect` rotated about its own center.
///
/// Uses the same extent formula as rotated canvas expansion:
/// `w' = |w cos| + |h sin|`, `h' = |w sin| + |h cos|`.
pub fn rotated_bounds(rect: &Rect, degrees: f64) -> Rect {
    let angle = normalize_degrees(degrees);
    if angle.abs() < 1e-9 {
        return *rect;
    }

    let radians = angle.to_radians();
    let cos = radians.cos().abs();
    let sin = radians.sin().abs();

    let width = rect.width * cos + rect.height * sin;
    let height = rect.width * sin + rect.height * cos;
    let center = rect.center();

    Rect::new(
        center.x - width / 2.0,
        center.y - height / 2.0,
        width,
        height,
    )
}


// ============================================================================
// Property-Based Tests
// ============================================================================
