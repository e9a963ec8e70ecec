//! CPU raster renderer built on tiny-skia.

use crate::font::FontBook;
use crate::renderer::{RenderResult, Renderer, RendererError};
use image::RgbaImage;
use inkmark_core::{
    Annotation, AnnotationStore, Background, SerializableColor, ShapeStyle, Stroke, TextLabel,
    ViewportTransform,
};
use kurbo::{BezPath, PathEl, Point, Size};
use peniko::Color;
use std::sync::Arc;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint,
    Transform,
};
use uuid::Uuid;

/// Renders the annotation scene into an in-memory RGBA surface.
pub struct RasterRenderer {
    surface: Option<Pixmap>,
    fonts: Arc<FontBook>,
    clear_color: SerializableColor,
    /// Premultiplied copy of the last background, keyed by its id.
    background_cache: Option<(Uuid, Pixmap)>,
}

impl Default for RasterRenderer {
    fn default() -> Self {
        Self::new(Arc::new(FontBook::none()))
    }
}

impl RasterRenderer {
    /// Create a renderer with a transparent clear color.
    pub fn new(fonts: Arc<FontBook>) -> Self {
        Self {
            surface: None,
            fonts,
            clear_color: SerializableColor::new(0, 0, 0, 0),
            background_cache: None,
        }
    }

    /// Set the color the surface is cleared to before each frame.
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color.into();
        self
    }

    pub fn fonts(&self) -> &Arc<FontBook> {
        &self.fonts
    }

    /// Current surface size in pixels, if a frame has been rendered. This is
    /// the size of every [`Self::snapshot`].
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.surface.as_ref().map(|p| (p.width(), p.height()))
    }

    /// Read the surface back as straight-alpha RGBA.
    pub fn snapshot(&self) -> RenderResult<RgbaImage> {
        let surface = self
            .surface
            .as_ref()
            .ok_or_else(|| RendererError::RenderFailed("nothing rendered yet".to_string()))?;
        let mut data = Vec::with_capacity(surface.data().len());
        for pixel in surface.pixels() {
            let color = pixel.demultiply();
            data.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
        }
        RgbaImage::from_raw(surface.width(), surface.height(), data)
            .ok_or_else(|| RendererError::RenderFailed("surface size mismatch".to_string()))
    }

    /// Draw a line of text with its baseline starting at `origin` (pixels).
    pub fn draw_text(
        &mut self,
        text: &str,
        origin: Point,
        font_size: f64,
        color: SerializableColor,
    ) -> RenderResult<()> {
        let surface = self
            .surface
            .as_mut()
            .ok_or_else(|| RendererError::RenderFailed("nothing rendered yet".to_string()))?;
        draw_line(surface, &self.fonts, text, origin, font_size, color);
        Ok(())
    }

    fn draw_background(&mut self, background: &Background, display: Size) -> RenderResult<()> {
        let stale = self
            .background_cache
            .as_ref()
            .is_none_or(|(id, _)| *id != background.id());
        if stale {
            log::debug!(
                "Caching background {}x{}",
                background.width(),
                background.height()
            );
            self.background_cache = Some((background.id(), premultiplied(background)?));
        }

        let (Some(surface), Some((_, image))) = (self.surface.as_mut(), self.background_cache.as_ref())
        else {
            return Err(RendererError::RenderFailed("surface missing".to_string()));
        };
        let transform = Transform::from_scale(
            (display.width / f64::from(background.width())) as f32,
            (display.height / f64::from(background.height())) as f32,
        );
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        surface.draw_pixmap(0, 0, image.as_ref(), &paint, transform, None);
        Ok(())
    }
}

impl Renderer for RasterRenderer {
    fn render_frame(&mut self, store: &AnnotationStore, viewport: &ViewportTransform) -> RenderResult<()> {
        let clear = skia_color(self.clear_color);
        ensure_surface(&mut self.surface, viewport.display_size)?.fill(clear);

        if let Some(background) = store.background() {
            self.draw_background(background, viewport.display_size)?;
        }

        let surface = ensure_surface(&mut self.surface, viewport.display_size)?;
        for entity in store.entities() {
            draw_annotation(surface, &self.fonts, entity, viewport);
        }
        Ok(())
    }

    fn render_draft(&mut self, draft: &Annotation, viewport: &ViewportTransform) -> RenderResult<()> {
        let surface = ensure_surface(&mut self.surface, viewport.display_size)?;
        draw_annotation(surface, &self.fonts, draft, viewport);
        Ok(())
    }

    fn render_segment(
        &mut self,
        from: Point,
        to: Point,
        style: &ShapeStyle,
        viewport: &ViewportTransform,
    ) -> RenderResult<()> {
        let surface = ensure_surface(&mut self.surface, viewport.display_size)?;
        let from = viewport.to_display(from);
        let to = viewport.to_display(to);
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        let path = pb
            .finish()
            .ok_or_else(|| RendererError::RenderFailed("cannot build segment".to_string()))?;
        surface.stroke_path(
            &path,
            &paint(style.color),
            &stroke_for(style, viewport.scale),
            Transform::identity(),
            None,
        );
        Ok(())
    }
}

/// Reuse the surface when its size matches, otherwise allocate a new one.
fn ensure_surface(slot: &mut Option<Pixmap>, size: Size) -> RenderResult<&mut Pixmap> {
    let (width, height) = ViewportTransform::pixel_size(size);
    let stale = slot
        .as_ref()
        .is_none_or(|p| p.width() != width || p.height() != height);
    if stale {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RendererError::InitFailed(format!("cannot allocate {width}x{height} surface"))
        })?;
        *slot = Some(pixmap);
    }
    slot.as_mut()
        .ok_or_else(|| RendererError::InitFailed("surface missing".to_string()))
}

fn premultiplied(background: &Background) -> RenderResult<Pixmap> {
    let mut pixmap = Pixmap::new(background.width(), background.height()).ok_or_else(|| {
        RendererError::InitFailed(format!(
            "cannot allocate {}x{} background",
            background.width(),
            background.height()
        ))
    })?;
    for (dst, src) in pixmap
        .pixels_mut()
        .iter_mut()
        .zip(background.pixels().chunks_exact(4))
    {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Ok(pixmap)
}

fn draw_annotation(surface: &mut Pixmap, fonts: &FontBook, entity: &Annotation, viewport: &ViewportTransform) {
    match entity {
        Annotation::Stroke(stroke) => draw_stroke(surface, stroke, viewport),
        Annotation::Text(label) => draw_label(surface, fonts, label, viewport),
    }
}

fn draw_stroke(surface: &mut Pixmap, stroke: &Stroke, viewport: &ViewportTransform) {
    let paint = paint(stroke.style.color);
    match stroke.points.as_slice() {
        [] => {}
        [point] => {
            // A lone point renders as a round cap would: a filled dot.
            let center = viewport.to_display(*point);
            let radius = (stroke.style.stroke_width * viewport.scale / 2.0).max(0.5) as f32;
            if let Some(dot) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius) {
                surface.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
            }
        }
        _ => {
            let mut path = stroke.to_path();
            path.apply_affine(viewport.transform());
            if let Some(path) = to_skia_path(&path) {
                surface.stroke_path(
                    &path,
                    &paint,
                    &stroke_for(&stroke.style, viewport.scale),
                    Transform::identity(),
                    None,
                );
            }
        }
    }
}

fn draw_label(surface: &mut Pixmap, fonts: &FontBook, label: &TextLabel, viewport: &ViewportTransform) {
    let size = label.font_size * viewport.scale;
    for (baseline, line) in label.positioned_lines() {
        draw_line(surface, fonts, line, viewport.to_display(baseline), size, label.style.color);
    }
}

fn draw_line(
    surface: &mut Pixmap,
    fonts: &FontBook,
    text: &str,
    origin: Point,
    font_size: f64,
    color: SerializableColor,
) {
    let outlines = fonts.outline_line(text, font_size, origin);
    if let Some(path) = to_skia_path(&outlines) {
        surface.fill_path(&path, &paint(color), FillRule::Winding, Transform::identity(), None);
    }
}

fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for element in path.elements() {
        match *element {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn stroke_for(style: &ShapeStyle, scale: f64) -> tiny_skia::Stroke {
    tiny_skia::Stroke {
        width: (style.stroke_width * scale).max(1.0) as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..tiny_skia::Stroke::default()
    }
}

fn paint(color: SerializableColor) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn skia_color(color: SerializableColor) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkmark_core::geometry::text_bounds;
    use inkmark_core::{Annotator, Key, Mode, Redraw};

    fn solid_background(width: u32, height: u32, rgba: [u8; 4]) -> Background {
        let pixels = rgba.repeat((width * height) as usize);
        Background::from_rgba8(width, height, pixels).unwrap()
    }

    fn annotator_with_background() -> Annotator {
        let mut annotator = Annotator::default();
        annotator.load_background(
            solid_background(40, 40, [255, 255, 255, 255]),
            Size::new(40.0, 40.0),
        );
        annotator
    }

    fn draw(annotator: &mut Annotator, from: Point, to: Point) {
        annotator.select_mode(Mode::Drawing);
        annotator.pointer_down(from);
        annotator.pointer_move(to);
        annotator.pointer_up(to);
    }

    #[test]
    fn test_snapshot_before_render_fails() {
        let renderer = RasterRenderer::default();
        assert!(renderer.snapshot().is_err());
    }

    #[test]
    fn test_empty_frame_uses_clear_color() {
        let mut renderer = RasterRenderer::default().with_clear_color(Color::WHITE);
        let store = AnnotationStore::new();
        renderer
            .render_frame(&store, &ViewportTransform::identity(Size::new(8.0, 6.0)))
            .unwrap();
        let image = renderer.snapshot().unwrap();
        assert_eq!(image.dimensions(), (8, 6));
        assert!(image.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_background_scaled_to_display() {
        let mut store = AnnotationStore::new();
        store.set_background(solid_background(4, 4, [0, 0, 255, 255]));
        let viewport = ViewportTransform::fit_to_budget(Size::new(4.0, 4.0), Size::new(16.0, 10.0));

        let mut renderer = RasterRenderer::default();
        renderer.render_frame(&store, &viewport).unwrap();
        let image = renderer.snapshot().unwrap();
        assert_eq!(image.dimensions(), (10, 10));
        assert_eq!(image.get_pixel(5, 5).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_stroke_is_painted() {
        let mut annotator = annotator_with_background();
        draw(&mut annotator, Point::new(5.0, 20.0), Point::new(35.0, 20.0));

        let mut renderer = RasterRenderer::default();
        renderer.apply(&Redraw::Full, &annotator).unwrap();
        let image = renderer.snapshot().unwrap();
        let on_line = image.get_pixel(20, 20).0;
        assert!(on_line[0] > 200 && on_line[1] < 100, "got {on_line:?}");
        assert_eq!(image.get_pixel(20, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_frame_is_deterministic() {
        let mut annotator = annotator_with_background();
        draw(&mut annotator, Point::new(5.0, 5.0), Point::new(35.0, 35.0));
        draw(&mut annotator, Point::new(5.0, 35.0), Point::new(35.0, 5.0));

        let mut first = RasterRenderer::default();
        first.apply(&Redraw::Full, &annotator).unwrap();
        let mut second = RasterRenderer::default();
        second.apply(&Redraw::Full, &annotator).unwrap();
        // Repainting the same state again on a dirty surface changes nothing.
        second.apply(&Redraw::Full, &annotator).unwrap();

        assert_eq!(first.snapshot().unwrap(), second.snapshot().unwrap());
    }

    #[test]
    fn test_erase_then_redraw_matches_fresh_scene() {
        let mut erased = annotator_with_background();
        draw(&mut erased, Point::new(5.0, 10.0), Point::new(35.0, 10.0));
        draw(&mut erased, Point::new(5.0, 30.0), Point::new(35.0, 30.0));
        erased.select_mode(Mode::Erasing);
        let redraw = erased.pointer_down(Point::new(20.0, 10.0));
        assert_eq!(redraw, Redraw::Full);

        let mut fresh = annotator_with_background();
        draw(&mut fresh, Point::new(5.0, 30.0), Point::new(35.0, 30.0));

        let mut a = RasterRenderer::default();
        a.apply(&Redraw::Full, &erased).unwrap();
        let mut b = RasterRenderer::default();
        b.apply(&Redraw::Full, &fresh).unwrap();
        assert_eq!(a.snapshot().unwrap(), b.snapshot().unwrap());
    }

    #[test]
    fn test_segment_paints_incrementally() {
        let mut annotator = annotator_with_background();
        let mut renderer = RasterRenderer::default();
        renderer.apply(&Redraw::Full, &annotator).unwrap();

        annotator.select_mode(Mode::Drawing);
        annotator.pointer_down(Point::new(5.0, 20.0));
        let redraw = annotator.pointer_move(Point::new(35.0, 20.0));
        assert!(matches!(redraw, Redraw::Segment { .. }));
        renderer.apply(&redraw, &annotator).unwrap();

        let pixel = renderer.snapshot().unwrap().get_pixel(20, 20).0;
        assert!(pixel[0] > 200 && pixel[1] < 100, "got {pixel:?}");
    }

    #[test]
    fn test_redraw_none_leaves_surface() {
        let annotator = annotator_with_background();
        let mut renderer = RasterRenderer::default();
        renderer.apply(&Redraw::Full, &annotator).unwrap();
        let before = renderer.snapshot().unwrap();
        renderer.apply(&Redraw::None, &annotator).unwrap();
        assert_eq!(before, renderer.snapshot().unwrap());
    }

    #[test]
    fn test_single_point_stroke_drawn_as_dot() {
        let mut store = AnnotationStore::new();
        store.set_background(solid_background(20, 20, [255, 255, 255, 255]));
        let id = store.begin_stroke(Point::new(10.0, 10.0), ShapeStyle {
            stroke_width: 6.0,
            ..ShapeStyle::default()
        });
        // Kept open on purpose: a one-point stroke mid-drag.
        assert_eq!(store.open_stroke(), Some(id));

        let mut renderer = RasterRenderer::default();
        renderer
            .render_frame(&store, &ViewportTransform::identity(Size::new(20.0, 20.0)))
            .unwrap();
        let pixel = renderer.snapshot().unwrap().get_pixel(10, 10).0;
        assert!(pixel[0] > 200 && pixel[1] < 100, "got {pixel:?}");
    }

    /// Labels only rasterize with a real font; these tests skip without one.
    fn system_fonts() -> Option<Arc<FontBook>> {
        let fonts = FontBook::system();
        fonts.has_font().then(|| Arc::new(fonts))
    }

    fn annotator_with_label(fonts: &Arc<FontBook>) -> Annotator {
        let mut annotator = Annotator::default().with_measure(fonts.clone());
        annotator.load_background(
            solid_background(120, 60, [255, 255, 255, 255]),
            Size::new(120.0, 60.0),
        );
        annotator.select_mode(Mode::TextEntry);
        annotator.pointer_down(Point::new(10.0, 30.0));
        for c in "Hi".chars() {
            annotator.key(Key::Character(c));
        }
        annotator.key(Key::Enter);
        annotator.key(Key::Enter);
        assert_eq!(annotator.store().len(), 1);
        annotator
    }

    fn render(fonts: &Arc<FontBook>, annotator: &Annotator) -> RgbaImage {
        let mut renderer = RasterRenderer::new(fonts.clone());
        renderer.apply(&Redraw::Full, annotator).unwrap();
        renderer.snapshot().unwrap()
    }

    #[test]
    fn test_label_pixels_inside_text_bounds() {
        let Some(fonts) = system_fonts() else {
            return;
        };
        let annotator = annotator_with_label(&fonts);
        let label = annotator.store().entities()[0].as_text().unwrap();
        let bounds = text_bounds(label, fonts.as_ref()).inflate(1.0, 1.0);

        let image = render(&fonts, &annotator);
        let mut painted = 0;
        for (x, y, pixel) in image.enumerate_pixels() {
            if pixel.0 == [255, 255, 255, 255] {
                continue;
            }
            painted += 1;
            assert!(
                bounds.contains(Point::new(f64::from(x), f64::from(y))),
                "pixel ({x}, {y}) outside {bounds:?}"
            );
        }
        assert!(painted > 20, "only {painted} pixels painted");
    }

    #[test]
    fn test_text_frame_is_deterministic() {
        let Some(fonts) = system_fonts() else {
            return;
        };
        let mut annotator = annotator_with_label(&fonts);
        draw(&mut annotator, Point::new(5.0, 50.0), Point::new(115.0, 10.0));

        let mut renderer = RasterRenderer::new(fonts.clone());
        renderer.apply(&Redraw::Full, &annotator).unwrap();
        let first = renderer.snapshot().unwrap();
        renderer.apply(&Redraw::Full, &annotator).unwrap();
        assert_eq!(first, renderer.snapshot().unwrap());
        assert_eq!(first, render(&fonts, &annotator));
    }

    #[test]
    fn test_erase_label_then_redraw_matches_fresh_scene() {
        let Some(fonts) = system_fonts() else {
            return;
        };
        let mut erased = annotator_with_label(&fonts);
        draw(&mut erased, Point::new(5.0, 55.0), Point::new(115.0, 55.0));
        let with_label = render(&fonts, &erased);

        let label = erased.store().entities()[0].as_text().unwrap();
        let inside = text_bounds(label, fonts.as_ref()).center();
        erased.select_mode(Mode::Erasing);
        assert_eq!(erased.pointer_down(inside), Redraw::Full);
        erased.pointer_up(inside);
        assert_eq!(erased.store().len(), 1);

        let mut fresh = Annotator::default().with_measure(fonts.clone());
        fresh.load_background(
            solid_background(120, 60, [255, 255, 255, 255]),
            Size::new(120.0, 60.0),
        );
        draw(&mut fresh, Point::new(5.0, 55.0), Point::new(115.0, 55.0));

        let after = render(&fonts, &erased);
        assert_ne!(after, with_label);
        assert_eq!(after, render(&fonts, &fresh));
    }
}
