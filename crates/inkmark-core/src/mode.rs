//! Interaction modes selectable from the toolbar.

use serde::{Deserialize, Serialize};

/// The active tool. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Idle,
    Drawing,
    Erasing,
    TextEntry,
}

impl Mode {
    /// CSS cursor shown over the surface in this mode.
    pub fn cursor(self) -> &'static str {
        match self {
            Mode::Idle => "default",
            Mode::Drawing => "crosshair",
            Mode::Erasing => "cell",
            Mode::TextEntry => "text",
        }
    }

    /// Parse a toolbar identifier (`"draw"`, `"erase"`, `"text"`, `"idle"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "idle" | "none" => Some(Mode::Idle),
            "draw" | "drawing" => Some(Mode::Drawing),
            "erase" | "erasing" | "eraser" => Some(Mode::Erasing),
            "text" | "text_entry" => Some(Mode::TextEntry),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(Mode::default(), Mode::Idle);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Mode::from_name("Draw"), Some(Mode::Drawing));
        assert_eq!(Mode::from_name("eraser"), Some(Mode::Erasing));
        assert_eq!(Mode::from_name("text_entry"), Some(Mode::TextEntry));
        assert_eq!(Mode::from_name("lasso"), None);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Mode::TextEntry).unwrap();
        assert_eq!(json, "\"text_entry\"");
    }
}
