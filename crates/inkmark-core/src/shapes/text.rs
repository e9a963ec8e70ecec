//! Text label shape.

use super::{SerializableColor, ShapeId, ShapeStyle};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A committed, possibly multi-line text label.
///
/// `anchor` is the left end of the first line's baseline; line `i` sits on
/// the baseline `anchor.y + i * line_height`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub(crate) id: ShapeId,
    /// Lines of text (at least one, any of which may be empty).
    pub lines: Vec<String>,
    /// Left-baseline position of the first line.
    pub anchor: Point,
    /// Vertical distance between consecutive baselines.
    pub line_height: f64,
    /// Font size in pixels.
    pub font_size: f64,
    /// Style properties (only the color applies to text).
    pub style: ShapeStyle,
}

impl TextLabel {
    /// Default font size.
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    /// Create a new label. An empty `lines` vector is stored as one empty line.
    pub fn new(anchor: Point, mut lines: Vec<String>, line_height: f64) -> Self {
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            id: Uuid::new_v4(),
            lines,
            anchor,
            line_height,
            font_size: Self::DEFAULT_FONT_SIZE,
            style: ShapeStyle::default(),
        }
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.style.color = color;
        self
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Baseline start of line `index`.
    pub fn baseline(&self, index: usize) -> Point {
        Point::new(self.anchor.x, self.anchor.y + index as f64 * self.line_height)
    }

    /// Iterate lines with their baseline positions.
    pub fn positioned_lines(&self) -> impl Iterator<Item = (Point, &str)> {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| (self.baseline(i), line.as_str()))
    }

    /// True when every line is empty.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(String::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_creation() {
        let label = TextLabel::new(Point::new(100.0, 100.0), vec!["Hello".to_string()], 20.0);
        assert_eq!(label.lines, vec!["Hello".to_string()]);
        assert!((label.font_size - TextLabel::DEFAULT_FONT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_lines_become_one_line() {
        let label = TextLabel::new(Point::ZERO, Vec::new(), 20.0);
        assert_eq!(label.lines.len(), 1);
        assert!(label.is_blank());
    }

    #[test]
    fn test_baselines() {
        let label = TextLabel::new(
            Point::new(10.0, 50.0),
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            24.0,
        );
        let baselines: Vec<Point> = label.positioned_lines().map(|(p, _)| p).collect();
        assert_eq!(baselines[0], Point::new(10.0, 50.0));
        assert_eq!(baselines[2], Point::new(10.0, 98.0));
    }

    #[test]
    fn test_with_font_size() {
        let label = TextLabel::new(Point::ZERO, vec!["x".to_string()], 20.0).with_font_size(32.0);
        assert!((label.font_size - 32.0).abs() < f64::EPSILON);
    }
}
