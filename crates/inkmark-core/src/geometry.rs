//! Distance and containment tests used by the eraser.

use crate::shapes::TextLabel;
use kurbo::{Point, Rect, Vec2};

/// Width of a single line of text at a given font size.
///
/// Text bounds depend on the font the renderer draws with, so the renderer
/// supplies the real implementation.
pub trait TextMeasure {
    fn line_width(&self, text: &str, font_size: f64) -> f64;
}

/// Fixed-advance approximation used when no font is loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproximateMeasure {
    /// Average glyph advance as a fraction of the font size.
    pub advance_factor: f64,
}

impl Default for ApproximateMeasure {
    fn default() -> Self {
        Self { advance_factor: 0.55 }
    }
}

impl TextMeasure for ApproximateMeasure {
    fn line_width(&self, text: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * self.advance_factor
    }
}

/// Distance from a point to the finite segment `a`→`b`.
pub fn distance_point_to_segment(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    (point - proj).hypot()
}

/// Minimum distance from a point to a polyline.
///
/// A single point degenerates to point distance; an empty polyline is
/// infinitely far away.
pub fn distance_point_to_polyline(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|w| distance_point_to_segment(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Axis-aligned box covering all lines of a label.
///
/// Spans from one line height above the first baseline down to the last
/// baseline, and as wide as the widest line.
pub fn text_bounds(label: &TextLabel, measure: &dyn TextMeasure) -> Rect {
    let width = label
        .lines
        .iter()
        .map(|line| measure.line_width(line, label.font_size))
        .fold(0.0, f64::max);
    let extra_lines = label.lines.len().saturating_sub(1) as f64;
    Rect::new(
        label.anchor.x,
        label.anchor.y - label.line_height,
        label.anchor.x + width,
        label.anchor.y + extra_lines * label.line_height,
    )
}

/// Edge-inclusive containment test against [`text_bounds`].
pub fn point_in_text_bounds(point: Point, label: &TextLabel, measure: &dyn TextMeasure) -> bool {
    let bounds = text_bounds(label, measure);
    point.x >= bounds.x0 && point.x <= bounds.x1 && point.y >= bounds.y0 && point.y <= bounds.y1
}
