//! Editor tuning: gesture thresholds, hit tolerances, zoom limits.
//!
//! All distances are in world units unless noted. Every field has a
//! default, so a JSON override only needs the keys it changes:
//!
//! ```json
//! { "minShapeSize": 6, "maxZoom": 20 }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid editor config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid editor config: {field} {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Both sides of a dragged shape must exceed this, divided by zoom.
    /// Default: **10**.
    pub min_shape_size: f64,

    /// A dragged arrow must be longer than this, divided by zoom.
    /// Default: **20**.
    pub min_arrow_length: f64,

    /// Freehand samples closer than this to the previous one are dropped.
    /// Default: **2**.
    pub pen_min_spacing: f64,

    /// Margin around a shape's bounds within which a dragged arrow end binds
    /// to it. Default: **30**.
    pub bind_margin: f64,

    /// Max distance from an arrow segment that still hits it. Default: **5**.
    pub arrow_hit_tolerance: f64,

    /// Padding of a path's bounds for the cheap rejection test. Default: **15**.
    pub path_hit_padding: f64,

    /// Max distance from a path segment that still hits it. Default: **20**.
    pub path_hit_distance: f64,

    /// Screen-pixel radius around an anchor dot (or control point) that
    /// grabs it. Default: **8**.
    pub anchor_hit_radius: f64,

    /// Font size at zoom 1; new shapes get `base / zoom`, clamped.
    pub base_font_size: f64,
    pub min_font_size: f64,
    pub max_font_size: f64,

    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Factor for the zoom in/out buttons. Default: **1.2**.
    pub zoom_step: f64,

    /// Wheel events with `|delta_y|` below this (in pixel mode) are treated
    /// as trackpad scrolls. Default: **50**.
    pub trackpad_threshold: f64,
    pub trackpad_pan_speed: f64,
    pub wheel_pan_speed: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_shape_size: 10.0,
            min_arrow_length: 20.0,
            pen_min_spacing: 2.0,
            bind_margin: 30.0,
            arrow_hit_tolerance: 5.0,
            path_hit_padding: 15.0,
            path_hit_distance: 20.0,
            anchor_hit_radius: 8.0,
            base_font_size: eu_core::BASE_FONT_SIZE,
            min_font_size: 8.0,
            max_font_size: 72.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
            zoom_step: 1.2,
            trackpad_threshold: 50.0,
            trackpad_pan_speed: 1.0,
            wheel_pan_speed: 0.5,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON override on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0) {
            return Err(ConfigError::Invalid {
                field: "minZoom",
                reason: "must be positive",
            });
        }
        if self.max_zoom < self.min_zoom {
            return Err(ConfigError::Invalid {
                field: "maxZoom",
                reason: "must not be below minZoom",
            });
        }
        if self.max_font_size < self.min_font_size {
            return Err(ConfigError::Invalid {
                field: "maxFontSize",
                reason: "must not be below minFontSize",
            });
        }
        if !(self.zoom_step > 1.0) {
            return Err(ConfigError::Invalid {
                field: "zoomStep",
                reason: "must be greater than 1",
            });
        }
        Ok(())
    }

    /// Font size for a shape created at `zoom`, so it reads the same on
    /// screen whatever the zoom level was.
    pub fn font_size_for_zoom(&self, zoom: f64) -> f64 {
        (self.base_font_size / zoom).clamp(self.min_font_size, self.max_font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EditorConfig::from_json(r#"{"minShapeSize": 6, "maxZoom": 20}"#).unwrap();
        assert_eq!(cfg.min_shape_size, 6.0);
        assert_eq!(cfg.max_zoom, 20.0);
        assert_eq!(cfg.bind_margin, 30.0);
    }

    #[test]
    fn inverted_zoom_range_is_rejected() {
        let err = EditorConfig::from_json(r#"{"minZoom": 5, "maxZoom": 2}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "maxZoom", .. }));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            EditorConfig::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn font_size_compensates_for_zoom() {
        let cfg = EditorConfig::default();
        assert_eq!(cfg.font_size_for_zoom(1.0), 14.0);
        assert_eq!(cfg.font_size_for_zoom(2.0), 8.0);
        assert_eq!(cfg.font_size_for_zoom(0.5), 28.0);
        assert_eq!(cfg.font_size_for_zoom(0.1), 72.0);
    }
}
