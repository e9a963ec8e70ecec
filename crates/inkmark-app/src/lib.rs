//! Inkmark Application
//!
//! The shell around the annotator: image loading, configuration, session
//! replay and export for the CLI, and the browser bindings.

mod app;
mod config;
mod loader;
mod session;

pub use app::{App, ExportedFile};
pub use config::AppConfig;
pub use inkmark_render::ExportFormat;
#[cfg(feature = "native")]
pub use loader::load_clipboard;
pub use loader::{LoadError, LoadedImage, decode_background, load_file};
pub use session::{SessionEvent, load_script, parse_script};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::WebAnnotator;
