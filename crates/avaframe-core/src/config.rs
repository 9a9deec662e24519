//! Editor configuration.
//!
//! Every field has a default, so callers (typically JavaScript passing a plain
//! object through `serde-wasm-bindgen`) only need to supply what they change.

use serde::{Deserialize, Serialize};

use crate::decode::FilterType;
use crate::error::{EditorError, EditorResult};
use crate::export::ExportFraming;
use crate::layer::Stroke;
use crate::transform::InterpolationFilter;

/// Facebook avatar edge length in pixels.
pub const DEFAULT_CANONICAL_SIZE: u32 = 500;

/// Upload limit for raw files (20 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

/// Tunable parameters of an editor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Edge length of the exported square image.
    pub canonical_size: u32,
    /// Supersampling factor used while rasterizing an export.
    pub pixel_ratio: u32,
    /// Fraction of the safe area the avatar's longer side fills on upload.
    pub avatar_fit_fraction: f64,
    /// Largest accepted raw upload in bytes.
    pub max_upload_bytes: u64,
    /// Padding around the layer union for content-bounds framing.
    pub export_padding: f64,
    /// Smallest resize box side the transformer accepts.
    pub min_box_size: f64,
    /// Largest resize box side, relative to the stage.
    pub max_box_ratio: f64,
    /// JPEG export quality (1-100).
    pub jpeg_quality: u8,
    /// Region of the stage mapped onto the exported image.
    pub framing: ExportFraming,
    /// Filter used when sampling layer pixels during rasterization and crop.
    pub sample_filter: InterpolationFilter,
    /// Filter used to downsample the supersampled render.
    pub downsample_filter: FilterType,
    /// Highlight applied to the frame when it is selected.
    pub highlight: Stroke,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canonical_size: DEFAULT_CANONICAL_SIZE,
            pixel_ratio: 2,
            avatar_fit_fraction: 0.7,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            export_padding: 10.0,
            min_box_size: 10.0,
            max_box_ratio: 1.2,
            jpeg_quality: 92,
            framing: ExportFraming::default(),
            sample_filter: InterpolationFilter::default(),
            downsample_filter: FilterType::Lanczos3,
            highlight: Stroke::default(),
        }
    }
}

impl EditorConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that the values describe a usable session.
    pub fn validate(&self) -> EditorResult<()> {
        if self.canonical_size == 0 {
            return Err(EditorError::invalid_input("canonical_size must be non-zero"));
        }
        if self.pixel_ratio == 0 {
            return Err(EditorError::invalid_input("pixel_ratio must be non-zero"));
        }
        if !(self.avatar_fit_fraction > 0.0 && self.avatar_fit_fraction <= 1.0) {
            return Err(EditorError::invalid_input(format!(
                "avatar_fit_fraction must be in (0, 1], got {}",
                self.avatar_fit_fraction
            )));
        }
        if !self.export_padding.is_finite() || self.export_padding < 0.0 {
            return Err(EditorError::invalid_input(
                "export_padding must be a non-negative number",
            ));
        }
        if !self.min_box_size.is_finite() || self.min_box_size < 0.0 {
            return Err(EditorError::invalid_input(
                "min_box_size must be a non-negative number",
            ));
        }
        if !(self.max_box_ratio.is_finite() && self.max_box_ratio > 0.0) {
            return Err(EditorError::invalid_input("max_box_ratio must be positive"));
        }
        Ok(())
    }

    /// Size of the supersampled render surface.
    pub fn render_size(&self) -> u32 {
        self.canonical_size.saturating_mul(self.pixel_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::new();
        assert_eq!(config.canonical_size, 500);
        assert_eq!(config.pixel_ratio, 2);
        assert_eq!(config.render_size(), 1000);
        assert_eq!(config.max_upload_bytes, 20 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_canonical_size() {
        let mut config = EditorConfig::default();
        config.canonical_size = 0;
        assert!(matches!(
            config.validate(),
            Err(EditorError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_fraction() {
        let mut config = EditorConfig::default();
        config.avatar_fit_fraction = 1.5;
        assert!(config.validate().is_err());

        config.avatar_fit_fraction = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_pixel_ratio() {
        let mut config = EditorConfig::default();
        config.pixel_ratio = 0;
        assert!(config.validate().is_err());
    }
}
