//! Annotation entities drawn over the background image.

mod stroke;
mod text;

pub use stroke::Stroke;
pub use text::TextLabel;

use kurbo::Point;
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// The neon red used for every annotation by default (`#FF0044`).
    pub fn neon_red() -> Self {
        Self::new(0xFF, 0x00, 0x44, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Paint properties shared by strokes and text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke (and text fill) color.
    pub color: SerializableColor,
    /// Line width in natural-space units.
    pub stroke_width: f64,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            color: SerializableColor::neon_red(),
            stroke_width: 2.0,
        }
    }
}

/// Unique identifier for annotations.
pub type ShapeId = Uuid;

/// A committed annotation entity.
///
/// Entities are stored in natural (image pixel) space. Once appended to the
/// store they are never edited in place; erasing and re-adding is the only
/// way to change one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    Stroke(Stroke),
    Text(TextLabel),
}

impl Annotation {
    pub fn id(&self) -> ShapeId {
        match self {
            Annotation::Stroke(s) => s.id(),
            Annotation::Text(t) => t.id(),
        }
    }

    /// Check whether an eraser at `point` with the given radius removes this entity.
    pub fn hit_by_eraser(
        &self,
        point: Point,
        radius: f64,
        measure: &dyn crate::geometry::TextMeasure,
    ) -> bool {
        match self {
            Annotation::Stroke(s) => {
                crate::geometry::distance_point_to_polyline(point, &s.points) <= radius
            }
            Annotation::Text(t) => crate::geometry::point_in_text_bounds(point, t, measure),
        }
    }

    pub fn as_stroke(&self) -> Option<&Stroke> {
        match self {
            Annotation::Stroke(s) => Some(s),
            Annotation::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextLabel> {
        match self {
            Annotation::Text(t) => Some(t),
            Annotation::Stroke(_) => None,
        }
    }
}
