//! In-progress text label, held outside the store until committed.

use crate::input::Key;
use crate::shapes::{SerializableColor, TextLabel};
use kurbo::Point;

/// Result of feeding a key to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEditResult {
    /// Draft content may have changed.
    Handled,
    /// Enter on an empty line: the session should be committed.
    Finalize,
    /// Escape: the session should be discarded.
    Cancel,
    /// Key has no meaning for text entry.
    NotHandled,
}

/// Buffered multi-line text anchored at a chosen position.
///
/// This is a plain value: focus and caret display belong to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCompositionSession {
    anchor: Point,
    lines: Vec<String>,
    current: String,
    line_height: f64,
    font_size: f64,
    color: SerializableColor,
}

impl TextCompositionSession {
    /// Open an empty session.
    pub fn open(anchor: Point, line_height: f64, font_size: f64, color: SerializableColor) -> Self {
        Self {
            anchor,
            lines: Vec::new(),
            current: String::new(),
            line_height,
            font_size,
            color,
        }
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Completed lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The line being typed.
    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn type_char(&mut self, ch: char) -> &Self {
        self.current.push(ch);
        self
    }

    /// Delete the last character, or pull the previous line back for editing
    /// when the current line is empty.
    pub fn backspace(&mut self) -> &Self {
        if self.current.pop().is_none() {
            if let Some(previous) = self.lines.pop() {
                self.current = previous;
            }
        }
        self
    }

    /// Push the current line. Returns `true` when the current line was
    /// already empty, meaning the session should be finalized instead.
    pub fn newline(&mut self) -> bool {
        if self.current.is_empty() {
            return true;
        }
        self.lines.push(std::mem::take(&mut self.current));
        false
    }

    /// Route a key to the matching edit.
    pub fn handle_key(&mut self, key: &Key) -> TextEditResult {
        match key {
            Key::Character(c) => {
                self.type_char(*c);
                TextEditResult::Handled
            }
            Key::Backspace => {
                self.backspace();
                TextEditResult::Handled
            }
            Key::Enter => {
                if self.newline() {
                    TextEditResult::Finalize
                } else {
                    TextEditResult::Handled
                }
            }
            Key::Escape => TextEditResult::Cancel,
            Key::Named(_) => TextEditResult::NotHandled,
        }
    }

    /// Discard the session.
    pub fn cancel(self) {}

    /// Finalize into a label holding the completed lines plus a non-empty
    /// trailing line. Returns `None` when nothing but empty lines was typed.
    pub fn commit(self) -> Option<TextLabel> {
        let mut lines = self.lines;
        if !self.current.is_empty() {
            lines.push(self.current);
        }
        let label = TextLabel::new(self.anchor, lines, self.line_height)
            .with_font_size(self.font_size)
            .with_color(self.color);
        (!label.is_blank()).then_some(label)
    }

    /// View of the session as a label, including the line being typed.
    pub fn draft_label(&self) -> TextLabel {
        let mut lines = self.lines.clone();
        lines.push(self.current.clone());
        TextLabel::new(self.anchor, lines, self.line_height)
            .with_font_size(self.font_size)
            .with_color(self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> TextCompositionSession {
        TextCompositionSession::open(
            Point::new(10.0, 20.0),
            20.0,
            20.0,
            SerializableColor::neon_red(),
        )
    }

    fn type_str(session: &mut TextCompositionSession, text: &str) {
        for c in text.chars() {
            session.type_char(c);
        }
    }

    #[test]
    fn test_double_enter_commits() {
        let mut s = session();
        type_str(&mut s, "hi");
        assert!(!s.newline());
        assert!(s.newline());
        let label = s.commit().expect("label");
        assert_eq!(label.lines, vec!["hi".to_string()]);
        assert_eq!(label.anchor, Point::new(10.0, 20.0));
    }

    #[test]
    fn test_empty_session_commits_nothing() {
        let mut s = session();
        assert!(s.newline());
        assert!(s.commit().is_none());
    }

    #[test]
    fn test_trailing_line_included() {
        let mut s = session();
        type_str(&mut s, "one");
        s.newline();
        type_str(&mut s, "two");
        let label = s.commit().expect("label");
        assert_eq!(label.lines, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_backspace_pops_previous_line() {
        let mut s = session();
        type_str(&mut s, "ab");
        s.newline();
        type_str(&mut s, "cd");
        s.newline();
        assert_eq!(s.current(), "");

        s.backspace();
        assert_eq!(s.current(), "cd");
        assert_eq!(s.lines(), ["ab".to_string()]);

        s.backspace();
        assert_eq!(s.current(), "c");
    }

    #[test]
    fn test_backspace_never_below_zero_lines() {
        let mut s = session();
        s.backspace();
        s.backspace();
        assert_eq!(s.current(), "");
        assert!(s.lines().is_empty());
    }

    #[test]
    fn test_handle_key_results() {
        let mut s = session();
        assert_eq!(s.handle_key(&Key::Character('x')), TextEditResult::Handled);
        assert_eq!(s.handle_key(&Key::Enter), TextEditResult::Handled);
        assert_eq!(s.handle_key(&Key::Enter), TextEditResult::Finalize);
        assert_eq!(s.handle_key(&Key::Escape), TextEditResult::Cancel);
        assert_eq!(
            s.handle_key(&Key::Named("ArrowLeft".to_string())),
            TextEditResult::NotHandled
        );
    }

    #[test]
    fn test_draft_label_shows_current_line() {
        let mut s = session();
        type_str(&mut s, "ab");
        s.newline();
        type_str(&mut s, "c");
        let draft = s.draft_label();
        assert_eq!(draft.lines, vec!["ab".to_string(), "c".to_string()]);
    }
}
