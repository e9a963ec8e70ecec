//! Raw pointer and keyboard events, as delivered by the host surface.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
    /// The pointer left the surface; ends any drag like `Up`.
    Leave,
}

impl PointerEvent {
    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down { position }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position } => Some(*position),
            PointerEvent::Leave => None,
        }
    }
}

/// Keyboard key relevant to text entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    /// A printable character.
    Character(char),
    Backspace,
    Enter,
    Escape,
    /// Any other named key (arrows, modifiers, function keys).
    Named(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    ///
    /// Single-character values are printable; everything else is a named key.
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Backspace" => Key::Backspace,
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if !c.is_control() => Key::Character(c),
                    _ => Key::Named(key.to_string()),
                }
            }
        }
    }
}

/// Any event the controller dispatches on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Key(Key),
}

impl From<PointerEvent> for InputEvent {
    fn from(event: PointerEvent) -> Self {
        InputEvent::Pointer(event)
    }
}

impl From<Key> for InputEvent {
    fn from(key: Key) -> Self {
        InputEvent::Key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_keys() {
        assert_eq!(Key::from_dom_key("a"), Key::Character('a'));
        assert_eq!(Key::from_dom_key(" "), Key::Character(' '));
        assert_eq!(Key::from_dom_key("é"), Key::Character('é'));
        assert_eq!(Key::from_dom_key("Enter"), Key::Enter);
        assert_eq!(Key::from_dom_key("Esc"), Key::Escape);
        assert_eq!(Key::from_dom_key("Shift"), Key::Named("Shift".to_string()));
        assert_eq!(Key::from_dom_key("\t"), Key::Named("\t".to_string()));
    }

    #[test]
    fn test_pointer_position() {
        let p = Point::new(1.0, 2.0);
        assert_eq!(PointerEvent::Down { position: p }.position(), Some(p));
        assert_eq!(PointerEvent::Leave.position(), None);
    }
}
