//! Application configuration.

use anyhow::Context;
use inkmark_core::{AnnotatorConfig, window_budget};
use inkmark_render::{ExportFormat, ExportOptions, FontBook, Stamp};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Settings for the annotator shell. Loaded from JSON; missing fields keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Window the surface is laid out in.
    pub window_width: f64,
    pub window_height: f64,
    /// Height taken by the toolbar above the surface.
    pub toolbar_height: f64,
    /// Font for labels and the stamp. System fonts are tried when unset.
    pub font_path: Option<PathBuf>,
    /// Draw the file name and date stamp on exports.
    pub stamp: bool,
    pub format: ExportFormat,
    pub jpeg_quality: u8,
    pub annotator: AnnotatorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_width: 1280.0,
            window_height: 800.0,
            toolbar_height: 60.0,
            font_path: None,
            stamp: true,
            format: ExportFormat::Jpeg,
            jpeg_quality: 90,
            annotator: AnnotatorConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Display budget for the current window.
    pub fn budget(&self) -> Size {
        window_budget(
            Size::new(self.window_width, self.window_height),
            self.toolbar_height,
        )
    }

    /// Configured font, falling back to system fonts when the file is unusable.
    pub fn fonts(&self) -> Arc<FontBook> {
        let fonts = match &self.font_path {
            Some(path) => FontBook::from_file(path).unwrap_or_else(|err| {
                log::warn!("Cannot load font {}: {err}", path.display());
                FontBook::system()
            }),
            None => FontBook::system(),
        };
        Arc::new(fonts)
    }

    pub fn export_options(&self, stamp: Option<Stamp>) -> ExportOptions {
        ExportOptions {
            format: self.format,
            jpeg_quality: self.jpeg_quality,
            stamp: stamp.filter(|_| self.stamp),
            ..ExportOptions::default()
        }
    }
}
