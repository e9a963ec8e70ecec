//! Freehand stroke.

use super::{ShapeId, ShapeStyle};
use kurbo::{BezPath, Point};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand stroke (connected polyline in natural space).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub(crate) id: ShapeId,
    /// Points in the order they were recorded.
    pub points: Vec<Point>,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Stroke {
    /// Start a stroke at its first point.
    pub fn new(start: Point, style: ShapeStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: vec![start],
            style,
        }
    }

    /// Create from existing points with the default style.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            style: ShapeStyle::default(),
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Add a point to the path.
    pub(crate) fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A stroke needs two points to form a segment.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2
    }

    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();

        let Some(first) = self.points.first() else {
            return path;
        };

        path.move_to(*first);
        for point in self.points.iter().skip(1) {
            path.line_to(*point);
        }

        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_starts_with_one_point() {
        let stroke = Stroke::new(Point::new(3.0, 4.0), ShapeStyle::default());
        assert_eq!(stroke.len(), 1);
        assert!(stroke.is_degenerate());
    }

    #[test]
    fn test_add_points() {
        let mut stroke = Stroke::new(Point::new(0.0, 0.0), ShapeStyle::default());
        stroke.add_point(Point::new(10.0, 10.0));
        assert_eq!(stroke.len(), 2);
        assert!(!stroke.is_degenerate());
    }

    #[test]
    fn test_path_elements() {
        let stroke = Stroke::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 5.0),
        ]);
        assert_eq!(stroke.to_path().elements().len(), 3);
    }
}
