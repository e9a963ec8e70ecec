//! Application state shared by the CLI and the browser bindings.

use crate::config::AppConfig;
use crate::loader::LoadedImage;
use crate::session::SessionEvent;
use anyhow::Context;
use image::RgbaImage;
use inkmark_core::{Annotator, Key, Mode, Redraw, ViewportTransform};
use inkmark_render::{ExportNamer, FontBook, RasterRenderer, Renderer, Stamp, encode, export_frame};
use kurbo::{Point, Size};
use std::sync::Arc;

/// An encoded export ready to be written or downloaded.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// An annotator wired to a raster surface.
///
/// Every input goes to the [`Annotator`], and the redraw it asks for is
/// applied to the surface straight away, so [`App::frame`] always shows the
/// current state.
pub struct App {
    config: AppConfig,
    annotator: Annotator,
    renderer: RasterRenderer,
    fonts: Arc<FontBook>,
    namer: ExportNamer,
    /// File name of the loaded image, used for the stamp and export names.
    source_name: Option<String>,
    /// Date shown in the export stamp; no stamp without one.
    stamp_date: Option<String>,
}

impl App {
    pub fn new(config: AppConfig, fonts: Arc<FontBook>) -> Self {
        let mut annotator = Annotator::new(config.annotator.clone()).with_measure(fonts.clone());
        let mut renderer = RasterRenderer::new(fonts.clone());
        let redraw = annotator.resize(config.budget());
        if let Err(err) = renderer.apply(&redraw, &annotator) {
            log::error!("Cannot paint empty surface: {err}");
        }
        Self {
            config,
            annotator,
            renderer,
            fonts,
            namer: ExportNamer::new(),
            source_name: None,
            stamp_date: None,
        }
    }

    /// Set the date printed in the export stamp (e.g. `03/07/2024`).
    pub fn with_stamp_date(mut self, date: impl Into<String>) -> Self {
        self.stamp_date = Some(date.into());
        self
    }

    pub fn set_stamp_date(&mut self, date: impl Into<String>) {
        self.stamp_date = Some(date.into());
    }

    /// Swap the font used for labels, the stamp and eraser hit-testing.
    pub fn set_fonts(&mut self, fonts: Arc<FontBook>) -> anyhow::Result<()> {
        self.annotator.set_measure(fonts.clone());
        self.renderer = RasterRenderer::new(fonts.clone());
        self.fonts = fonts;
        self.update(|_| Redraw::Full)?;
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Replace the background. Any previous annotations are cleared.
    pub fn load(&mut self, image: LoadedImage) -> anyhow::Result<()> {
        self.source_name = image.file_name;
        let budget = self.config.budget();
        self.update(|a| a.load_background(image.background, budget))?;
        Ok(())
    }

    pub fn select_mode(&mut self, mode: Mode) -> anyhow::Result<bool> {
        self.update(|a| a.select_mode(mode))
    }

    pub fn pointer_down(&mut self, position: Point) -> anyhow::Result<bool> {
        self.update(|a| a.pointer_down(position))
    }

    pub fn pointer_move(&mut self, position: Point) -> anyhow::Result<bool> {
        self.update(|a| a.pointer_move(position))
    }

    pub fn pointer_up(&mut self, position: Point) -> anyhow::Result<bool> {
        self.update(|a| a.pointer_up(position))
    }

    pub fn pointer_leave(&mut self) -> anyhow::Result<bool> {
        self.update(Annotator::pointer_leave)
    }

    pub fn key(&mut self, key: Key) -> anyhow::Result<bool> {
        self.update(|a| a.key(key))
    }

    pub fn type_text(&mut self, text: &str) -> anyhow::Result<bool> {
        let mut changed = false;
        for c in text.chars() {
            changed |= self.key(Key::Character(c))?;
        }
        Ok(changed)
    }

    pub fn commit_text(&mut self) -> anyhow::Result<bool> {
        self.update(Annotator::commit_text)
    }

    pub fn cancel_text(&mut self) -> anyhow::Result<bool> {
        self.update(Annotator::cancel_text)
    }

    /// The restart action: drop the image and every annotation.
    pub fn reset(&mut self) -> anyhow::Result<bool> {
        self.source_name = None;
        self.update(Annotator::reset)
    }

    /// Re-lay out for a new window size.
    pub fn resize_window(&mut self, width: f64, height: f64) -> anyhow::Result<bool> {
        self.config.window_width = width;
        self.config.window_height = height;
        let budget = self.config.budget();
        self.update(|a| a.resize(budget))
    }

    /// The current display surface.
    pub fn frame(&self) -> anyhow::Result<RgbaImage> {
        Ok(self.renderer.snapshot()?)
    }

    pub fn display_size(&self) -> Size {
        self.annotator.viewport().display_size
    }

    /// Pixel dimensions of [`App::frame`].
    pub fn frame_size(&self) -> (u32, u32) {
        self.renderer
            .surface_size()
            .unwrap_or_else(|| ViewportTransform::pixel_size(self.display_size()))
    }

    /// Render the annotated image at natural size and encode it.
    pub fn export(&mut self, file_name: Option<String>) -> anyhow::Result<ExportedFile> {
        let stamp = self
            .stamp_date
            .as_deref()
            .map(|date| Stamp::for_file(self.source_name.as_deref(), date));
        let options = self.config.export_options(stamp);

        let image = export_frame(
            self.annotator.store(),
            self.annotator.export_size(),
            self.fonts.clone(),
            &options,
        )
        .context("rendering export")?;
        let bytes = encode(&image, &options).context("encoding export")?;

        // The counter advances on every export, named or not.
        let generated = self.namer.next_name(self.source_name.as_deref(), options.format);
        Ok(ExportedFile {
            file_name: file_name.unwrap_or(generated),
            mime_type: options.format.mime_type(),
            bytes,
        })
    }

    /// Apply one scripted event. Returns the export it produced, if any.
    pub fn apply(&mut self, event: &SessionEvent) -> anyhow::Result<Option<ExportedFile>> {
        match event {
            SessionEvent::SelectMode { mode } => self.select_mode(*mode)?,
            SessionEvent::PointerDown { x, y } => self.pointer_down(Point::new(*x, *y))?,
            SessionEvent::PointerMove { x, y } => self.pointer_move(Point::new(*x, *y))?,
            SessionEvent::PointerUp { x, y } => self.pointer_up(Point::new(*x, *y))?,
            SessionEvent::PointerLeave => self.pointer_leave()?,
            SessionEvent::Key { key } => self.key(Key::from_dom_key(key))?,
            SessionEvent::TypeText { text } => self.type_text(text)?,
            SessionEvent::Resize { width, height } => self.resize_window(*width, *height)?,
            SessionEvent::CommitText => self.commit_text()?,
            SessionEvent::CancelText => self.cancel_text()?,
            SessionEvent::Reset => self.reset()?,
            SessionEvent::Export { file_name } => return self.export(file_name.clone()).map(Some),
        };
        Ok(None)
    }

    /// Replay a script, collecting every export.
    pub fn replay(&mut self, events: &[SessionEvent]) -> anyhow::Result<Vec<ExportedFile>> {
        let mut exports = Vec::new();
        for (index, event) in events.iter().enumerate() {
            let export = self
                .apply(event)
                .with_context(|| format!("session event {index} ({event:?})"))?;
            exports.extend(export);
        }
        Ok(exports)
    }

    /// Run one controller call and repaint what it reports. Returns whether
    /// anything was repainted.
    fn update<F>(&mut self, f: F) -> anyhow::Result<bool>
    where
        F: FnOnce(&mut Annotator) -> Redraw,
    {
        let redraw = f(&mut self.annotator);
        self.renderer
            .apply(&redraw, &self.annotator)
            .context("repainting surface")?;
        Ok(redraw != Redraw::None)
    }
}
