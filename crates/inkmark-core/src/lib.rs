//! Inkmark Core Library
//!
//! Platform-agnostic data structures and logic for annotating a single image:
//! strokes and text labels stored in the image's natural coordinates, an
//! input mode state machine, and the viewport that maps them onto a display.

pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod input;
pub mod mode;
pub mod shapes;
pub mod store;
pub mod text_session;
pub mod viewport;

pub use config::AnnotatorConfig;
pub use controller::{Annotator, Redraw};
pub use error::{CoreError, CoreResult, GestureError};
pub use geometry::{ApproximateMeasure, TextMeasure};
pub use input::{InputEvent, Key, PointerEvent};
pub use mode::Mode;
pub use shapes::{Annotation, SerializableColor, ShapeId, ShapeStyle, Stroke, TextLabel};
pub use store::{AnnotationStore, Background};
pub use text_session::{TextCompositionSession, TextEditResult};
pub use viewport::{ViewportTransform, window_budget};
