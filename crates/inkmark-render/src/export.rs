//! Exporting the annotated image at its natural resolution.

use crate::font::FontBook;
use crate::raster::RasterRenderer;
use crate::renderer::{RenderResult, Renderer};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use inkmark_core::{AnnotationStore, SerializableColor, TextMeasure, ViewportTransform};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Base name used when the image did not come from a named file.
pub const DEFAULT_BASE_NAME: &str = "image";

/// Longest base name kept in stamps and file names, in characters.
pub const MAX_BASE_NAME_CHARS: usize = 25;

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Jpeg,
    Png,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Png => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Png => "image/png",
        }
    }
}

/// Caption drawn in the bottom-right corner of an export. Not an annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamp {
    pub text: String,
    pub font_size: f64,
    /// Gap between the text and the right and bottom edges.
    pub padding: f64,
    pub color: SerializableColor,
}

impl Stamp {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: 16.0,
            padding: 20.0,
            color: SerializableColor::neon_red(),
        }
    }

    /// `"<name>.jpg <date> edg"` for the given source file name.
    pub fn for_file(file_name: Option<&str>, date: &str) -> Self {
        Self::new(format!("{}.jpg {date} edg", stamp_base_name(file_name)))
    }

    /// Left end of the baseline, for a frame of `size`.
    pub fn origin(&self, size: Size, measure: &dyn TextMeasure) -> Point {
        let width = measure.line_width(&self.text, self.font_size);
        Point::new(
            size.width - width - self.padding,
            size.height - self.padding,
        )
    }
}

/// Reduce a file name to the part before its first dot, truncated to
/// [`MAX_BASE_NAME_CHARS`] with a trailing `"..."`.
pub fn stamp_base_name(file_name: Option<&str>) -> String {
    let stem = file_name
        .and_then(|name| name.split('.').next())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(DEFAULT_BASE_NAME);
    if stem.chars().count() > MAX_BASE_NAME_CHARS {
        let truncated: String = stem.chars().take(MAX_BASE_NAME_CHARS).collect();
        format!("{truncated}...")
    } else {
        stem.to_string()
    }
}

/// Hands out `<name>-K<n>.<ext>` file names with a counter starting at 1.
#[derive(Debug, Clone)]
pub struct ExportNamer {
    counter: u32,
}

impl Default for ExportNamer {
    fn default() -> Self {
        Self { counter: 1 }
    }
}

impl ExportNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number the next export will get.
    pub fn peek(&self) -> u32 {
        self.counter
    }

    pub fn next_name(&mut self, file_name: Option<&str>, format: ExportFormat) -> String {
        let name = format!(
            "{}-K{}.{}",
            stamp_base_name(file_name),
            self.counter,
            format.extension()
        );
        self.counter += 1;
        name
    }
}

/// Export settings.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
    pub stamp: Option<Stamp>,
    /// Color under the background; shows through transparent pixels.
    pub fill: SerializableColor,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            jpeg_quality: 90,
            stamp: None,
            fill: SerializableColor::white(),
        }
    }
}

/// Render the store at `size` (the natural size) on the fill color and draw
/// the stamp on top.
pub fn export_frame(
    store: &AnnotationStore,
    size: Size,
    fonts: Arc<FontBook>,
    options: &ExportOptions,
) -> RenderResult<RgbaImage> {
    let viewport = ViewportTransform::identity(size);
    let mut renderer = RasterRenderer::new(Arc::clone(&fonts)).with_clear_color(options.fill.into());
    renderer.render_frame(store, &viewport)?;

    if let Some(stamp) = &options.stamp {
        let origin = stamp.origin(size, fonts.as_ref());
        renderer.draw_text(&stamp.text, origin, stamp.font_size, stamp.color)?;
    }

    let image = renderer.snapshot()?;
    log::info!(
        "Exported frame {}x{} with {} annotation(s)",
        image.width(),
        image.height(),
        store.len()
    );
    Ok(image)
}

/// Encode an exported frame.
pub fn encode(image: &RgbaImage, options: &ExportOptions) -> RenderResult<Vec<u8>> {
    let mut bytes = Vec::new();
    match options.format {
        ExportFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut bytes, options.jpeg_quality.clamp(1, 100));
            encoder.encode_image(&rgb)?;
        }
        ExportFormat::Png => {
            let mut encoder = png::Encoder::new(&mut bytes, image.width(), image.height());
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(image.as_raw())?;
            writer.finish()?;
        }
    }
    Ok(bytes)
}
