//! Stage size, the safe area, and the resize-handle constraint.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// On-screen rendering surface. Kept square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub width: f64,
    pub height: f64,
}

impl StageConfig {
    /// Square stage with the given edge length.
    pub fn square(size: f64) -> Self {
        Self {
            width: size,
            height: size,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Square region of the stage where the avatar counts as "on-frame".
pub type SafeArea = Rect;

/// Centered square of side `min(stage.width, stage.height)`.
///
/// Always contained in `[0, stage.width] x [0, stage.height]`.
pub fn compute_safe_area(stage: &StageConfig) -> SafeArea {
    let size = stage.width.min(stage.height).max(0.0);
    Rect::new(
        (stage.width - size) / 2.0,
        (stage.height - size) / 2.0,
        size,
        size,
    )
}

/// Limits applied to boxes proposed while dragging resize handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxConstraint {
    pub min_size: f64,
    pub max_ratio: f64,
}

impl BoxConstraint {
    pub fn new(min_size: f64, max_ratio: f64) -> Self {
        Self {
            min_size,
            max_ratio,
        }
    }

    /// Whether `proposed` is acceptable on `stage`.
    pub fn accepts(&self, proposed: &Rect, stage: &StageConfig) -> bool {
        if !proposed.is_finite() {
            return false;
        }
        if proposed.width < self.min_size || proposed.height < self.min_size {
            return false;
        }
        if proposed.width > stage.width * self.max_ratio
            || proposed.height > stage.height * self.max_ratio
        {
            return false;
        }
        stage.rect().contains_rect(proposed)
    }

    /// Return `proposed` if acceptable, otherwise the previous box.
    pub fn constrain(&self, old: Rect, proposed: Rect, stage: &StageConfig) -> Rect {
        if self.accepts(&proposed, stage) {
            proposed
        } else {
            old
        }
    }
}

impl Default for BoxConstraint {
    fn default() -> Self {
        Self::new(10.0, 1.2)
    }
}
