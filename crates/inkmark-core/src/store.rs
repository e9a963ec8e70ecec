//! Background image and the ordered annotation list.

use crate::error::{CoreError, CoreResult};
use crate::shapes::{Annotation, ShapeId, ShapeStyle, Stroke};
use kurbo::{Point, Size};
use std::sync::Arc;
use uuid::Uuid;

/// A decoded raster image the annotations are drawn over.
///
/// Pixels are straight (non-premultiplied) RGBA8, row-major. Cloning is
/// cheap; the pixel buffer is shared.
#[derive(Debug, Clone)]
pub struct Background {
    id: Uuid,
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl Background {
    /// Wrap a decoded RGBA8 buffer.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> CoreResult<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::EmptyBackground { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(CoreError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            width,
            height,
            pixels: pixels.into(),
        })
    }

    /// Identity of this decoded image; renderers key caches on it.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Natural size in image pixels.
    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// The authoritative scene: background plus entities in paint order.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    background: Option<Background>,
    entities: Vec<Annotation>,
    /// Stroke currently receiving points, if any.
    open_stroke: Option<ShapeId>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the background and drop every entity.
    ///
    /// Entities are positioned in the old image's coordinate space, so none
    /// may survive a background change.
    pub fn set_background(&mut self, background: Background) {
        log::info!(
            "Background set ({}x{}), discarding {} annotation(s)",
            background.width(),
            background.height(),
            self.entities.len()
        );
        self.background = Some(background);
        self.entities.clear();
        self.open_stroke = None;
    }

    /// Drop the background and every entity.
    pub fn clear_background(&mut self) {
        self.background = None;
        self.entities.clear();
        self.open_stroke = None;
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    /// Natural size of the current background.
    pub fn natural_size(&self) -> Option<Size> {
        self.background.as_ref().map(Background::size)
    }

    /// Add an entity on top of all others.
    pub fn append(&mut self, entity: Annotation) {
        self.entities.push(entity);
    }

    /// Remove every entity matching `predicate`, keeping the order of the rest.
    /// Returns how many were removed.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Annotation) -> bool,
    {
        let before = self.entities.len();
        self.entities.retain(|entity| !predicate(entity));
        let removed = before - self.entities.len();
        if let Some(id) = self.open_stroke {
            if !self.entities.iter().any(|e| e.id() == id) {
                self.open_stroke = None;
            }
        }
        removed
    }

    /// Empty the entity list, keeping the background.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.open_stroke = None;
    }

    /// Entities in paint order (back to front).
    pub fn entities(&self) -> &[Annotation] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Append a new stroke holding its first point and mark it open.
    ///
    /// A previously open stroke stays in the store but stops accepting points.
    pub fn begin_stroke(&mut self, start: Point, style: ShapeStyle) -> ShapeId {
        let stroke = Stroke::new(start, style);
        let id = stroke.id();
        self.entities.push(Annotation::Stroke(stroke));
        self.open_stroke = Some(id);
        id
    }

    /// Push a point onto the open stroke.
    ///
    /// Returns the previous last point, i.e. the start of the new segment.
    /// Only the open stroke accepts points; anything else returns `None`.
    pub fn extend_stroke(&mut self, id: ShapeId, point: Point) -> Option<Point> {
        if self.open_stroke != Some(id) {
            return None;
        }
        let stroke = self.open_stroke_mut(id)?;
        let previous = stroke.points.last().copied();
        stroke.add_point(point);
        previous
    }

    /// Close the open stroke.
    ///
    /// With `drop_degenerate`, a stroke of fewer than two points is removed.
    /// Returns whether the stroke remains in the store.
    pub fn finish_stroke(&mut self, id: ShapeId, drop_degenerate: bool) -> bool {
        if self.open_stroke != Some(id) {
            return false;
        }
        self.open_stroke = None;
        let degenerate = self
            .entities
            .iter()
            .rev()
            .find_map(|e| e.as_stroke().filter(|s| s.id() == id))
            .is_some_and(Stroke::is_degenerate);
        if degenerate && drop_degenerate {
            log::debug!("Dropping single-point stroke {id}");
            self.entities.retain(|e| e.id() != id);
            return false;
        }
        true
    }

    /// Remove the open stroke entirely. Returns whether one was removed.
    pub fn discard_stroke(&mut self, id: ShapeId) -> bool {
        if self.open_stroke != Some(id) {
            return false;
        }
        self.open_stroke = None;
        let before = self.entities.len();
        self.entities.retain(|e| e.id() != id);
        before != self.entities.len()
    }

    pub fn open_stroke(&self) -> Option<ShapeId> {
        self.open_stroke
    }

    fn open_stroke_mut(&mut self, id: ShapeId) -> Option<&mut Stroke> {
        // The open stroke is almost always the last entity.
        self.entities.iter_mut().rev().find_map(|e| match e {
            Annotation::Stroke(s) if s.id() == id => Some(s),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::TextLabel;

    fn background(width: u32, height: u32) -> Background {
        Background::from_rgba8(width, height, vec![255; (width * height * 4) as usize]).unwrap()
    }

    fn label(text: &str) -> Annotation {
        Annotation::Text(TextLabel::new(Point::ZERO, vec![text.to_string()], 20.0))
    }

    #[test]
    fn test_background_validation() {
        assert!(matches!(
            Background::from_rgba8(0, 10, Vec::new()),
            Err(CoreError::EmptyBackground { .. })
        ));
        assert!(matches!(
            Background::from_rgba8(2, 2, vec![0; 15]),
            Err(CoreError::BufferSize { expected: 16, actual: 15 })
        ));
        let bg = background(4, 3);
        assert_eq!(bg.size(), Size::new(4.0, 3.0));
    }

    #[test]
    fn test_set_background_clears_entities() {
        let mut store = AnnotationStore::new();
        store.append(label("a"));
        store.append(label("b"));
        store.set_background(background(2, 2));
        assert!(store.is_empty());
        assert!(store.background().is_some());
    }

    #[test]
    fn test_clear_keeps_background() {
        let mut store = AnnotationStore::new();
        store.set_background(background(2, 2));
        store.append(label("a"));
        store.clear();
        assert!(store.is_empty());
        assert!(store.background().is_some());

        store.clear_background();
        assert!(store.background().is_none());
    }

    #[test]
    fn test_remove_where_preserves_order() {
        let mut store = AnnotationStore::new();
        for text in ["a", "b", "c", "d"] {
            store.append(label(text));
        }
        let removed = store.remove_where(|e| {
            e.as_text().is_some_and(|t| t.lines[0] == "b" || t.lines[0] == "d")
        });
        assert_eq!(removed, 2);
        let remaining: Vec<&str> = store
            .entities()
            .iter()
            .filter_map(|e| e.as_text())
            .map(|t| t.lines[0].as_str())
            .collect();
        assert_eq!(remaining, vec!["a", "c"]);
    }

    #[test]
    fn test_stroke_commit_as_you_go() {
        let mut store = AnnotationStore::new();
        let id = store.begin_stroke(Point::new(1.0, 1.0), ShapeStyle::default());
        // The stroke is in the store from its first point.
        assert_eq!(store.len(), 1);

        let prev = store.extend_stroke(id, Point::new(2.0, 2.0));
        assert_eq!(prev, Some(Point::new(1.0, 1.0)));
        assert!(store.finish_stroke(id, true));
        assert_eq!(store.open_stroke(), None);

        // Finished strokes no longer accept points.
        assert_eq!(store.extend_stroke(id, Point::new(3.0, 3.0)), None);
        assert_eq!(store.entities()[0].as_stroke().unwrap().len(), 2);
    }

    #[test]
    fn test_degenerate_stroke_dropped() {
        let mut store = AnnotationStore::new();
        let id = store.begin_stroke(Point::new(1.0, 1.0), ShapeStyle::default());
        assert!(!store.finish_stroke(id, true));
        assert!(store.is_empty());

        let id = store.begin_stroke(Point::new(1.0, 1.0), ShapeStyle::default());
        assert!(store.finish_stroke(id, false));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_discard_open_stroke() {
        let mut store = AnnotationStore::new();
        store.append(label("keep"));
        let id = store.begin_stroke(Point::new(1.0, 1.0), ShapeStyle::default());
        store.extend_stroke(id, Point::new(5.0, 5.0));
        assert!(store.discard_stroke(id));
        assert_eq!(store.len(), 1);
        assert!(!store.discard_stroke(id));
    }
}
