//! Inkmark Render Library
//!
//! Renderer abstraction and a CPU raster implementation for inkmark, plus
//! the exporter that renders a frame at the image's natural size.

pub mod export;
mod font;
mod raster;
mod renderer;

pub use export::{ExportFormat, ExportNamer, ExportOptions, Stamp, encode, export_frame, stamp_base_name};
pub use font::FontBook;
pub use raster::RasterRenderer;
pub use renderer::{RenderResult, Renderer, RendererError};
