//! Renderer trait abstraction.

use inkmark_core::{Annotation, AnnotationStore, Annotator, Redraw, ShapeStyle, ViewportTransform};
use kurbo::Point;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Font error: {0}")]
    Font(String),
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Trait for rendering backends.
///
/// A frame is a pure function of the background, the entity list and the
/// viewport; backends hold no annotation state of their own.
pub trait Renderer {
    /// Rebuild the whole frame: clear, background, then every entity in order.
    fn render_frame(&mut self, store: &AnnotationStore, viewport: &ViewportTransform) -> RenderResult<()>;

    /// Paint an uncommitted entity over the current frame.
    fn render_draft(&mut self, draft: &Annotation, viewport: &ViewportTransform) -> RenderResult<()>;

    /// Paint a single stroke segment (natural coordinates) over the current frame.
    fn render_segment(
        &mut self,
        from: Point,
        to: Point,
        style: &ShapeStyle,
        viewport: &ViewportTransform,
    ) -> RenderResult<()>;

    /// Carry out the repaint a controller event asked for.
    fn apply(&mut self, redraw: &Redraw, annotator: &Annotator) -> RenderResult<()> {
        let viewport = annotator.viewport();
        match redraw {
            Redraw::None => Ok(()),
            Redraw::Segment { from, to, style } => self.render_segment(*from, *to, style, viewport),
            Redraw::Draft | Redraw::Full => {
                self.render_frame(annotator.store(), viewport)?;
                if let Some(draft) = annotator.draft() {
                    self.render_draft(&draft, viewport)?;
                }
                Ok(())
            }
        }
    }
}
