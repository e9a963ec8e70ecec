//! Scripted editing sessions.
//!
//! A session script is a JSON array of events replayed against a loaded
//! image, e.g.
//!
//! ```json
//! [
//!   { "event": "select_mode", "mode": "drawing" },
//!   { "event": "pointer_down", "x": 10, "y": 10 },
//!   { "event": "pointer_move", "x": 60, "y": 40 },
//!   { "event": "pointer_up", "x": 60, "y": 40 },
//!   { "event": "export" }
//! ]
//! ```
//!
//! Pointer coordinates are in display space, as a browser would report them.

use inkmark_core::Mode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One recorded user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    SelectMode { mode: Mode },
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    PointerLeave,
    /// A DOM `KeyboardEvent.key` value.
    Key { key: String },
    /// Shorthand for one `Key` per character.
    TypeText { text: String },
    /// Window resize; the surface budget is derived from it.
    Resize { width: f64, height: f64 },
    CommitText,
    CancelText,
    /// Drop the background and all annotations.
    Reset,
    Export {
        #[serde(default)]
        file_name: Option<String>,
    },
}

pub fn parse_script(json: &str) -> serde_json::Result<Vec<SessionEvent>> {
    serde_json::from_str(json)
}

pub fn load_script(path: &Path) -> anyhow::Result<Vec<SessionEvent>> {
    use anyhow::Context;

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading session script {}", path.display()))?;
    parse_script(&json).with_context(|| format!("parsing session script {}", path.display()))
}
