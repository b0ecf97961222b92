//! Whiteboard configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Colors are hex strings (`#rrggbb`).

use crate::shapes::SerializableColor;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Tunables for a whiteboard session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WhiteboardConfig {
    /// Lower zoom bound.
    pub min_zoom: f64,
    /// Upper zoom bound.
    pub max_zoom: f64,
    /// Maximum number of history snapshots kept.
    pub history_limit: usize,
    /// Drawing surface size in pixels.
    pub surface_width: u32,
    pub surface_height: u32,
    /// Background of a new or cleared scene.
    pub background_color: String,
    /// Initial active color.
    pub default_color: String,
    /// Initial brush width.
    pub default_stroke_width: u32,
    /// Upper bound of the brush width slider.
    pub max_stroke_width: u32,
    /// World position where a newly activated insert tool places its shape.
    pub insert_x: f64,
    pub insert_y: f64,
    /// Size of inserted rectangles.
    pub rectangle_width: f64,
    pub rectangle_height: f64,
    /// Radius of inserted ellipses.
    pub ellipse_radius: f64,
    /// Width of inserted text boxes.
    pub text_width: f64,
    /// Content of inserted text boxes.
    pub placeholder_text: String,
    /// Font size of inserted text boxes.
    pub font_size: f64,
    /// Wheel zoom factor per unit of `delta_y`.
    pub wheel_zoom_base: f64,
    /// Hit-test tolerance in screen pixels.
    pub hit_tolerance: f64,
    /// Drop freehand strokes that never received a move event.
    pub discard_single_point_strokes: bool,
}

impl Default for WhiteboardConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 5.0,
            history_limit: 20,
            surface_width: 800,
            surface_height: 600,
            background_color: "#ffffff".to_string(),
            default_color: "#000000".to_string(),
            default_stroke_width: 2,
            max_stroke_width: 20,
            insert_x: 100.0,
            insert_y: 100.0,
            rectangle_width: 100.0,
            rectangle_height: 100.0,
            ellipse_radius: 50.0,
            text_width: 200.0,
            placeholder_text: "Texte".to_string(),
            font_size: 20.0,
            wheel_zoom_base: 0.999,
            hit_tolerance: 4.0,
            discard_single_point_strokes: false,
        }
    }
}

impl WhiteboardConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Check every value for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if !(self.min_zoom.is_finite() && self.min_zoom > 0.0) {
            return invalid("minZoom must be > 0");
        }
        if !(self.max_zoom.is_finite() && self.max_zoom >= self.min_zoom) {
            return invalid("maxZoom must be >= minZoom");
        }
        if self.history_limit == 0 {
            return invalid("historyLimit must be > 0");
        }
        if self.surface_width == 0 || self.surface_height == 0 {
            return invalid("surface dimensions must be > 0");
        }
        self.background()?;
        self.color()?;
        if self.max_stroke_width == 0 {
            return invalid("maxStrokeWidth must be > 0");
        }
        if self.default_stroke_width == 0 || self.default_stroke_width > self.max_stroke_width {
            return invalid("defaultStrokeWidth must be within 1..=maxStrokeWidth");
        }
        let extents = [
            self.rectangle_width,
            self.rectangle_height,
            self.ellipse_radius,
            self.text_width,
        ];
        if !extents.iter().all(|v| v.is_finite() && *v >= 0.0) {
            return invalid("insert sizes must be finite and non-negative");
        }
        if !(self.insert_x.is_finite() && self.insert_y.is_finite()) {
            return invalid("insert origin must be finite");
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return invalid("fontSize must be > 0");
        }
        if !(self.wheel_zoom_base.is_finite() && self.wheel_zoom_base > 0.0) {
            return invalid("wheelZoomBase must be > 0");
        }
        if !(self.hit_tolerance.is_finite() && self.hit_tolerance >= 0.0) {
            return invalid("hitTolerance must be >= 0");
        }
        Ok(())
    }

    /// Parsed background color.
    pub fn background(&self) -> Result<SerializableColor, ConfigError> {
        SerializableColor::from_hex(&self.background_color).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "backgroundColor {:?} is not a hex color",
                self.background_color
            ))
        })
    }

    /// Parsed initial active color.
    pub fn color(&self) -> Result<SerializableColor, ConfigError> {
        SerializableColor::from_hex(&self.default_color).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "defaultColor {:?} is not a hex color",
                self.default_color
            ))
        })
    }
}
