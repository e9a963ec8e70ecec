//! WebAssembly bindings.
//!
//! The page owns the DOM: it forwards pointer and key events here and blits
//! [`WebAnnotator::frame`] into its canvas with `putImageData` whenever a
//! call returns `true`.

use crate::app::App;
use crate::config::AppConfig;
use crate::loader::{LoadedImage, decode_background};
use inkmark_core::{Background, Key, Mode};
use inkmark_render::FontBook;
use kurbo::Point;
use std::sync::Arc;
use wasm_bindgen::prelude::*;

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Fails only when a logger is already installed.
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Starting inkmark (WASM)");
}

/// Browser-facing annotator.
#[wasm_bindgen]
pub struct WebAnnotator {
    app: App,
    last_export_name: Option<String>,
}

#[wasm_bindgen]
impl WebAnnotator {
    /// Create an annotator laid out for the given window.
    #[wasm_bindgen(constructor)]
    pub fn new(window_width: f64, window_height: f64, toolbar_height: f64) -> WebAnnotator {
        let config = AppConfig {
            window_width,
            window_height,
            toolbar_height,
            ..AppConfig::default()
        };
        // No filesystem: text stays unrasterized until a font is supplied.
        WebAnnotator {
            app: App::new(config, Arc::new(FontBook::none())),
            last_export_name: None,
        }
    }

    /// Supply font bytes (TTF/OTF) for labels and the stamp.
    pub fn set_font(&mut self, bytes: Vec<u8>) -> Result<(), JsValue> {
        let fonts = FontBook::from_bytes(bytes).map_err(js_error)?;
        self.app.set_fonts(Arc::new(fonts)).map_err(js_error)
    }

    /// Load an encoded image (file input or paste). Clears all annotations.
    pub fn load_image(&mut self, bytes: &[u8], file_name: Option<String>) -> Result<(), JsValue> {
        let background = decode_background(bytes).map_err(js_error)?;
        self.app
            .load(LoadedImage {
                background,
                file_name,
            })
            .map_err(js_error)
    }

    /// Load raw RGBA pixels, e.g. from `getImageData`.
    pub fn load_rgba(&mut self, width: u32, height: u32, pixels: Vec<u8>, file_name: Option<String>) -> Result<(), JsValue> {
        let background = Background::from_rgba8(width, height, pixels).map_err(js_error)?;
        self.app
            .load(LoadedImage {
                background,
                file_name,
            })
            .map_err(js_error)
    }

    /// Select a tool by toolbar name (`draw`, `erase`, `text`, `idle`).
    pub fn select_mode(&mut self, name: &str) -> Result<bool, JsValue> {
        let mode = Mode::from_name(name).ok_or_else(|| js_error(format!("unknown mode `{name}`")))?;
        self.app.select_mode(mode).map_err(js_error)
    }

    /// CSS cursor for the active mode.
    pub fn cursor(&self) -> String {
        self.app.annotator().mode().cursor().to_string()
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> Result<bool, JsValue> {
        self.app.pointer_down(Point::new(x, y)).map_err(js_error)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<bool, JsValue> {
        self.app.pointer_move(Point::new(x, y)).map_err(js_error)
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> Result<bool, JsValue> {
        self.app.pointer_up(Point::new(x, y)).map_err(js_error)
    }

    pub fn pointer_leave(&mut self) -> Result<bool, JsValue> {
        self.app.pointer_leave().map_err(js_error)
    }

    /// Forward a `KeyboardEvent.key` value.
    pub fn key(&mut self, key: &str) -> Result<bool, JsValue> {
        self.app.key(Key::from_dom_key(key)).map_err(js_error)
    }

    pub fn commit_text(&mut self) -> Result<bool, JsValue> {
        self.app.commit_text().map_err(js_error)
    }

    pub fn cancel_text(&mut self) -> Result<bool, JsValue> {
        self.app.cancel_text().map_err(js_error)
    }

    pub fn reset(&mut self) -> Result<bool, JsValue> {
        self.app.reset().map_err(js_error)
    }

    pub fn resize(&mut self, window_width: f64, window_height: f64) -> Result<bool, JsValue> {
        self.app
            .resize_window(window_width, window_height)
            .map_err(js_error)
    }

    pub fn frame_width(&self) -> u32 {
        self.app.frame_size().0
    }

    pub fn frame_height(&self) -> u32 {
        self.app.frame_size().1
    }

    /// Display surface as RGBA bytes.
    pub fn frame(&self) -> Result<Vec<u8>, JsValue> {
        Ok(self.app.frame().map_err(js_error)?.into_raw())
    }

    /// Encode an export stamped with `date`. Call [`Self::last_export_name`]
    /// for the download name.
    pub fn export(&mut self, date: &str) -> Result<Vec<u8>, JsValue> {
        self.app.set_stamp_date(date);
        let export = self.app.export(None).map_err(js_error)?;
        log::info!("Exported {} ({} bytes)", export.file_name, export.bytes.len());
        self.last_export_name = Some(export.file_name);
        Ok(export.bytes)
    }

    /// Download name of the most recent export, `<name>-K<n>.jpg`.
    pub fn last_export_name(&self) -> Option<String> {
        self.last_export_name.clone()
    }
}
