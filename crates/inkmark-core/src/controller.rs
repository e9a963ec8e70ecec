//! Input mode controller.
//!
//! [`Annotator`] owns the whole editing context (store, mode, drag, text
//! session, viewport) and turns pointer and keyboard events into store
//! mutations. Every event goes through a single dispatch keyed on the
//! active mode and the event kind.

use crate::config::AnnotatorConfig;
use crate::error::GestureError;
use crate::geometry::{ApproximateMeasure, TextMeasure};
use crate::input::{InputEvent, Key, PointerEvent};
use crate::mode::Mode;
use crate::shapes::{Annotation, ShapeId, ShapeStyle};
use crate::store::{AnnotationStore, Background};
use crate::text_session::{TextCompositionSession, TextEditResult};
use crate::viewport::ViewportTransform;
use kurbo::{Point, Size, Vec2};
use std::sync::Arc;

/// What the surface must repaint after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Redraw {
    /// Nothing visible changed.
    None,
    /// One new stroke segment, in natural coordinates.
    Segment {
        from: Point,
        to: Point,
        style: ShapeStyle,
    },
    /// Only the text draft changed; the store is untouched.
    Draft,
    /// The store changed; rebuild the whole frame.
    Full,
}

/// Pointer-held interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Drag {
    #[default]
    Released,
    Drawing {
        stroke: ShapeId,
    },
    Erasing,
}

/// The annotation editing context.
pub struct Annotator {
    config: AnnotatorConfig,
    store: AnnotationStore,
    mode: Mode,
    drag: Drag,
    session: Option<TextCompositionSession>,
    viewport: ViewportTransform,
    /// Last display budget handed in by the host.
    budget: Size,
    measure: Arc<dyn TextMeasure + Send + Sync>,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(AnnotatorConfig::default())
    }
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("mode", &self.mode)
            .field("drag", &self.drag)
            .field("entities", &self.store.len())
            .field("session", &self.session)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

impl Annotator {
    pub fn new(config: AnnotatorConfig) -> Self {
        Self {
            config,
            store: AnnotationStore::new(),
            mode: Mode::default(),
            drag: Drag::default(),
            session: None,
            viewport: ViewportTransform::default(),
            budget: Size::ZERO,
            measure: Arc::new(ApproximateMeasure::default()),
        }
    }

    /// Use the renderer's text measurement for eraser hit-testing.
    pub fn with_measure(mut self, measure: Arc<dyn TextMeasure + Send + Sync>) -> Self {
        self.measure = measure;
        self
    }

    pub fn set_measure(&mut self, measure: Arc<dyn TextMeasure + Send + Sync>) {
        self.measure = measure;
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn session(&self) -> Option<&TextCompositionSession> {
        self.session.as_ref()
    }

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    pub fn measure(&self) -> &(dyn TextMeasure + Send + Sync) {
        self.measure.as_ref()
    }

    /// Whether a pointer-held gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag != Drag::Released
    }

    /// The uncommitted text label, if a session is open.
    pub fn draft(&self) -> Option<Annotation> {
        self.session
            .as_ref()
            .map(|session| Annotation::Text(session.draft_label()))
    }

    /// Size of an exported frame: the background's natural size, or the
    /// current surface when nothing is loaded.
    pub fn export_size(&self) -> Size {
        self.store
            .natural_size()
            .unwrap_or(self.viewport.display_size)
    }

    /// Switch tools. Any unfinished stroke or text is discarded.
    pub fn select_mode(&mut self, mode: Mode) -> Redraw {
        let discarded = self.discard_drafts();
        if self.mode != mode {
            log::debug!("Mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
        if discarded { Redraw::Full } else { Redraw::None }
    }

    /// Replace the background, clearing all entities and drafts, and fit the
    /// viewport to `budget`.
    pub fn load_background(&mut self, background: Background, budget: Size) -> Redraw {
        self.discard_drafts();
        self.budget = budget;
        self.store.set_background(background);
        self.refit();
        Redraw::Full
    }

    /// Drop the background and every annotation.
    pub fn reset(&mut self) -> Redraw {
        self.discard_drafts();
        self.store.clear_background();
        self.refit();
        Redraw::Full
    }

    /// Recompute the viewport for a new display budget. Entities are untouched.
    pub fn resize(&mut self, budget: Size) -> Redraw {
        self.budget = budget;
        self.refit();
        Redraw::Full
    }

    /// Dispatch one event, logging anything that was rejected.
    pub fn handle(&mut self, event: impl Into<InputEvent>) -> Redraw {
        let result = self.dispatch(event.into());
        settle(result)
    }

    pub fn pointer_down(&mut self, position: Point) -> Redraw {
        self.handle(PointerEvent::Down { position })
    }

    pub fn pointer_move(&mut self, position: Point) -> Redraw {
        self.handle(PointerEvent::Move { position })
    }

    pub fn pointer_up(&mut self, position: Point) -> Redraw {
        self.handle(PointerEvent::Up { position })
    }

    pub fn pointer_leave(&mut self) -> Redraw {
        self.handle(PointerEvent::Leave)
    }

    pub fn key(&mut self, key: Key) -> Redraw {
        self.handle(key)
    }

    /// Commit the open text session (the "OK" action).
    pub fn commit_text(&mut self) -> Redraw {
        let result = self.try_commit_text();
        settle(result)
    }

    /// Discard the open text session (the "Cancel" action).
    pub fn cancel_text(&mut self) -> Redraw {
        let result = match self.session.take() {
            Some(session) => {
                session.cancel();
                Ok(Redraw::Full)
            }
            None => Err(GestureError::InvalidGesture("cancel without an open text session")),
        };
        settle(result)
    }

    fn dispatch(&mut self, event: InputEvent) -> Result<Redraw, GestureError> {
        // A new press while a drag is still attached means its release was
        // lost; end it before starting another.
        if matches!(event, InputEvent::Pointer(PointerEvent::Down { .. })) && self.is_dragging() {
            log::debug!("Detaching stale drag {:?}", self.drag);
            self.end_drag();
        }

        match (self.mode, event) {
            (Mode::Idle, _) => Ok(Redraw::None),

            (Mode::Drawing, InputEvent::Pointer(PointerEvent::Down { position })) => {
                self.begin_stroke(position)
            }
            (Mode::Drawing, InputEvent::Pointer(PointerEvent::Move { position })) => {
                self.extend_stroke(position)
            }

            (Mode::Erasing, InputEvent::Pointer(PointerEvent::Down { position })) => {
                self.drag = Drag::Erasing;
                Ok(self.erase_at(position))
            }
            (Mode::Erasing, InputEvent::Pointer(PointerEvent::Move { position })) => {
                if self.drag == Drag::Erasing {
                    Ok(self.erase_at(position))
                } else {
                    Ok(Redraw::None)
                }
            }

            (
                Mode::Drawing | Mode::Erasing,
                InputEvent::Pointer(PointerEvent::Up { .. } | PointerEvent::Leave),
            ) => Ok(self.end_drag()),

            (Mode::Drawing | Mode::Erasing, InputEvent::Key(Key::Escape)) => {
                Ok(if self.discard_drafts() { Redraw::Full } else { Redraw::None })
            }
            (Mode::Drawing | Mode::Erasing, InputEvent::Key(_)) => Ok(Redraw::None),

            (Mode::TextEntry, InputEvent::Pointer(PointerEvent::Down { position })) => {
                self.open_session(position)
            }
            (Mode::TextEntry, InputEvent::Pointer(_)) => Ok(Redraw::None),
            (Mode::TextEntry, InputEvent::Key(key)) => self.edit_text(&key),
        }
    }

    fn refit(&mut self) {
        self.viewport = match self.store.natural_size() {
            Some(natural) => ViewportTransform::fit_to_budget(natural, self.budget),
            None => ViewportTransform::identity(self.budget),
        };
    }

    /// Display → natural, noting when there is no image to be relative to.
    fn natural_point(&self, display: Point) -> Point {
        if self.store.background().is_none() {
            log::debug!("{}", GestureError::MissingBackground);
        }
        self.viewport.to_natural(display)
    }

    fn begin_stroke(&mut self, position: Point) -> Result<Redraw, GestureError> {
        let start = self.natural_point(position);
        let stroke = self.store.begin_stroke(start, self.config.stroke_style());
        self.drag = Drag::Drawing { stroke };
        Ok(Redraw::None)
    }

    fn extend_stroke(&mut self, position: Point) -> Result<Redraw, GestureError> {
        // Moves without a held pointer are hover; ignore them.
        let Drag::Drawing { stroke } = self.drag else {
            return Ok(Redraw::None);
        };
        let to = self.natural_point(position);
        let from = self
            .store
            .extend_stroke(stroke, to)
            .ok_or(GestureError::InvalidGesture("stroke is no longer open"))?;
        Ok(Redraw::Segment {
            from,
            to,
            style: self.config.stroke_style(),
        })
    }

    fn end_drag(&mut self) -> Redraw {
        if let Drag::Drawing { stroke } = std::mem::take(&mut self.drag) {
            // A dropped single-point stroke was never painted.
            self.store
                .finish_stroke(stroke, self.config.drop_degenerate_strokes);
        }
        Redraw::None
    }

    fn erase_at(&mut self, position: Point) -> Redraw {
        let point = self.natural_point(position);
        let radius = self.config.erase_radius;
        let measure = Arc::clone(&self.measure);
        let removed = self
            .store
            .remove_where(|entity| entity.hit_by_eraser(point, radius, measure.as_ref()));
        if removed == 0 {
            return Redraw::None;
        }
        log::debug!("Erased {removed} annotation(s) at ({:.1}, {:.1})", point.x, point.y);
        Redraw::Full
    }

    fn open_session(&mut self, position: Point) -> Result<Redraw, GestureError> {
        if self.session.is_some() {
            return Err(GestureError::InvalidGesture("text session already open"));
        }
        let anchor = self.natural_point(position) + Vec2::new(0.0, self.config.text_baseline_offset);
        self.session = Some(TextCompositionSession::open(
            anchor,
            self.config.line_height,
            self.config.font_size,
            self.config.stroke_color,
        ));
        Ok(Redraw::Draft)
    }

    fn edit_text(&mut self, key: &Key) -> Result<Redraw, GestureError> {
        let session = self
            .session
            .as_mut()
            .ok_or(GestureError::InvalidGesture("key press without an open text session"))?;
        match session.handle_key(key) {
            TextEditResult::Handled => Ok(Redraw::Draft),
            TextEditResult::Finalize => self.try_commit_text(),
            TextEditResult::Cancel => {
                self.session = None;
                Ok(Redraw::Full)
            }
            TextEditResult::NotHandled => Ok(Redraw::None),
        }
    }

    fn try_commit_text(&mut self) -> Result<Redraw, GestureError> {
        let session = self
            .session
            .take()
            .ok_or(GestureError::InvalidGesture("commit without an open text session"))?;
        let label = session.commit().ok_or(GestureError::EmptyCommit)?;
        log::debug!("Committed text label with {} line(s)", label.lines.len());
        self.store.append(Annotation::Text(label));
        Ok(Redraw::Full)
    }

    /// Drop the open stroke, text session and drag. Returns whether anything
    /// visible was discarded.
    fn discard_drafts(&mut self) -> bool {
        let mut discarded = false;
        if let Drag::Drawing { stroke } = std::mem::take(&mut self.drag) {
            discarded |= self.store.discard_stroke(stroke);
        }
        if let Some(session) = self.session.take() {
            session.cancel();
            discarded = true;
        }
        discarded
    }
}

/// Turn a rejected gesture into a redraw decision.
fn settle(result: Result<Redraw, GestureError>) -> Redraw {
    match result {
        Ok(redraw) => redraw,
        // The draft was on screen; repaint without it.
        Err(GestureError::EmptyCommit) => {
            log::debug!("{}", GestureError::EmptyCommit);
            Redraw::Full
        }
        Err(err) => {
            log::debug!("Ignored: {err}");
            Redraw::None
        }
    }
}
