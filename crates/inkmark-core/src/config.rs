//! Annotator settings.

use crate::error::CoreResult;
use crate::shapes::{SerializableColor, ShapeStyle};
use serde::{Deserialize, Serialize};

/// Tunables for the annotation controller. Every field has a default, so a
/// partial JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Eraser reach around the pointer, in natural-space units.
    pub erase_radius: f64,
    /// Color for new strokes and labels.
    pub stroke_color: SerializableColor,
    /// Width of new strokes.
    pub stroke_width: f64,
    /// Font size for new labels.
    pub font_size: f64,
    /// Baseline spacing for new labels.
    pub line_height: f64,
    /// Offset added to the clicked y position to get the label baseline.
    pub text_baseline_offset: f64,
    /// Drop strokes that never received a second point.
    pub drop_degenerate_strokes: bool,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            erase_radius: 10.0,
            stroke_color: SerializableColor::neon_red(),
            stroke_width: 2.0,
            font_size: 20.0,
            line_height: 20.0,
            text_baseline_offset: 5.0,
            drop_degenerate_strokes: true,
        }
    }
}

impl AnnotatorConfig {
    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Style applied to new strokes.
    pub fn stroke_style(&self) -> ShapeStyle {
        ShapeStyle {
            color: self.stroke_color,
            stroke_width: self.stroke_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json() {
        let config = AnnotatorConfig::from_json(r#"{ "erase_radius": 4.5 }"#).unwrap();
        assert!((config.erase_radius - 4.5).abs() < f64::EPSILON);
        assert_eq!(config.stroke_color, SerializableColor::neon_red());
        assert!(config.drop_degenerate_strokes);
    }

    #[test]
    fn test_invalid_json() {
        assert!(AnnotatorConfig::from_json("{ erase_radius: }").is_err());
    }
}
