//! Font loading and text measurement.

use crate::renderer::{RenderResult, RendererError};
use ab_glyph::{Font, FontArc, GlyphId, OutlineCurve, PxScale, PxScaleFont, ScaleFont};
use inkmark_core::{ApproximateMeasure, TextMeasure};
use kurbo::{BezPath, Point};
use std::path::Path;

/// Sans-serif fonts tried in order when no font file is configured.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// The font used for labels and the export stamp.
///
/// Without a font, text is measured with [`ApproximateMeasure`] and not
/// rasterized.
#[derive(Clone, Default)]
pub struct FontBook {
    font: Option<FontArc>,
    fallback: ApproximateMeasure,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("has_font", &self.has_font())
            .finish()
    }
}

impl FontBook {
    /// Load the first available system font.
    pub fn system() -> Self {
        for path in SYSTEM_FONT_CANDIDATES {
            let Ok(bytes) = std::fs::read(path) else {
                continue;
            };
            match FontArc::try_from_vec(bytes) {
                Ok(font) => {
                    log::debug!("Using system font {path}");
                    return Self::with_font(font);
                }
                Err(err) => log::debug!("Skipping {path}: {err}"),
            }
        }
        log::warn!("No system font found; text labels will not be rasterized");
        Self::none()
    }

    /// Load a TrueType/OpenType file.
    pub fn from_file(path: impl AsRef<Path>) -> RenderResult<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> RenderResult<Self> {
        FontArc::try_from_vec(bytes)
            .map(Self::with_font)
            .map_err(|err| RendererError::Font(err.to_string()))
    }

    /// No font: measurement only.
    pub fn none() -> Self {
        Self::default()
    }

    fn with_font(font: FontArc) -> Self {
        Self {
            font: Some(font),
            fallback: ApproximateMeasure::default(),
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn font(&self) -> Option<&FontArc> {
        self.font.as_ref()
    }

    /// Glyph outlines of one line with the pen starting at `origin` (left
    /// end of the baseline, pixel space). Empty without a font.
    pub fn outline_line(&self, text: &str, font_size: f64, origin: Point) -> BezPath {
        let mut path = BezPath::new();
        let Some(font) = &self.font else {
            return path;
        };
        let scaled = font.as_scaled(px_scale(font, font_size));
        let h_scale = f64::from(scaled.h_scale_factor());
        let v_scale = f64::from(scaled.v_scale_factor());
        advance_line(&scaled, text, |id, caret| {
            let Some(outline) = font.outline(id) else {
                return;
            };
            // Outlines are in font units with y pointing up.
            let pen = Point::new(origin.x + f64::from(caret), origin.y);
            let map = |p: ab_glyph::Point| {
                Point::new(pen.x + f64::from(p.x) * h_scale, pen.y - f64::from(p.y) * v_scale)
            };
            let mut current: Option<Point> = None;
            for curve in &outline.curves {
                let (start, end) = match *curve {
                    OutlineCurve::Line(a, b) => (map(a), map(b)),
                    OutlineCurve::Quad(a, _, b) => (map(a), map(b)),
                    OutlineCurve::Cubic(a, _, _, b) => (map(a), map(b)),
                };
                if current != Some(start) {
                    if current.is_some() {
                        path.close_path();
                    }
                    path.move_to(start);
                }
                match *curve {
                    OutlineCurve::Line(..) => path.line_to(end),
                    OutlineCurve::Quad(_, c, _) => path.quad_to(map(c), end),
                    OutlineCurve::Cubic(_, c1, c2, _) => path.curve_to(map(c1), map(c2), end),
                }
                current = Some(end);
            }
            if current.is_some() {
                path.close_path();
            }
        });
        path
    }
}

impl TextMeasure for FontBook {
    fn line_width(&self, text: &str, font_size: f64) -> f64 {
        match &self.font {
            Some(font) => {
                let scaled = font.as_scaled(px_scale(font, font_size));
                advance_line(&scaled, text, |_, _| {}) as f64
            }
            None => self.fallback.line_width(text, font_size),
        }
    }
}

/// Walk a line applying advances and kerning. Calls `place` with each glyph's
/// pen offset and returns the total advance.
fn advance_line<F>(scaled: &PxScaleFont<&FontArc>, text: &str, mut place: F) -> f32
where
    F: FnMut(GlyphId, f32),
{
    let mut caret = 0.0;
    let mut previous = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        place(id, caret);
        caret += scaled.h_advance(id);
        previous = Some(id);
    }
    caret
}

/// CSS font sizes are em sizes; ab_glyph scales by ascent-to-descent height.
fn px_scale(font: &FontArc, font_size: f64) -> PxScale {
    let size = font_size as f32;
    match font.units_per_em() {
        Some(units) if units > 0.0 => PxScale::from(size * font.height_unscaled() / units),
        _ => PxScale::from(size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_uses_approximation() {
        let fonts = FontBook::none();
        assert!(!fonts.has_font());
        let expected = ApproximateMeasure::default().line_width("abcd", 20.0);
        assert!((fonts.line_width("abcd", 20.0) - expected).abs() < f64::EPSILON);
        assert!(fonts.outline_line("abcd", 20.0, Point::ZERO).elements().is_empty());
    }

    #[test]
    fn test_invalid_bytes_rejected() {
        let result = FontBook::from_bytes(vec![0, 1, 2, 3]);
        assert!(matches!(result, Err(RendererError::Font(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = FontBook::from_file("/nonexistent/font.ttf");
        assert!(matches!(result, Err(RendererError::Io(_))));
    }

    #[test]
    fn test_system_font_measures_monotonically() {
        let fonts = FontBook::system();
        if !fonts.has_font() {
            return;
        }
        let short = fonts.line_width("ab", 20.0);
        let long = fonts.line_width("abcdef", 20.0);
        assert!(long > short);
        assert!(fonts.line_width("", 20.0).abs() < f64::EPSILON);
        // A real font, not the fixed-advance fallback.
        let fallback = ApproximateMeasure::default();
        assert!((fonts.line_width("iiii", 20.0) - fallback.line_width("iiii", 20.0)).abs() > 0.5);
    }

    #[test]
    fn test_outline_sits_on_baseline() {
        let fonts = FontBook::system();
        if !fonts.has_font() {
            return;
        }
        let origin = Point::new(10.5, 40.25);
        let path = fonts.outline_line("Hx", 20.0, origin);
        let bounds = kurbo::Shape::bounding_box(&path);
        assert!(bounds.x0 >= origin.x - 1.0);
        assert!(bounds.x1 <= origin.x + fonts.line_width("Hx", 20.0) + 1.0);
        // Neither glyph descends; both reach well above the baseline.
        assert!(bounds.y1 <= origin.y + 0.5, "bottom {}", bounds.y1);
        assert!(bounds.y0 < origin.y - 10.0, "top {}", bounds.y0);
    }
}
