//! Single-line text input
//!
//! The edit buffer is a `tui_textarea::TextArea`, which owns the cursor,
//! insertion, word and line deletion, and undo. `TextField` pins it to one
//! line and decides which keys reach it: Enter, Tab and the vertical arrows
//! belong to the surrounding form.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_textarea::{CursorMove, TextArea};

/// One-line text field
#[derive(Clone, Default)]
pub struct TextField {
    textarea: TextArea<'static>,
    masked: bool,
}

impl TextField {
    /// Field pre-filled with `text`, cursor at the end
    pub fn new(text: impl Into<String>) -> Self {
        let mut textarea = TextArea::new(vec![text.into()]);
        textarea.move_cursor(CursorMove::End);
        Self {
            textarea,
            masked: false,
        }
    }

    /// Empty field whose content is never displayed
    pub fn masked() -> Self {
        Self {
            masked: true,
            ..Self::default()
        }
    }

    pub fn text(&self) -> String {
        self.textarea.lines().concat()
    }

    pub fn is_blank(&self) -> bool {
        self.textarea.lines().iter().all(|line| line.trim().is_empty())
    }

    /// Cursor column, in characters
    pub fn cursor(&self) -> usize {
        self.textarea.cursor().1
    }

    /// Text as shown on screen; masked fields show one `*` per character
    pub fn display(&self) -> String {
        let text = self.text();
        if self.masked {
            "*".repeat(text.chars().count())
        } else {
            text
        }
    }

    /// Apply an editing key
    ///
    /// Returns `false` for keys the field leaves to its form.
    pub fn input(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let textarea = &mut self.textarea;

        match key.code {
            KeyCode::Char(c) if !ctrl && !alt => {
                textarea.insert_char(c);
            }
            KeyCode::Char('a') if ctrl => {
                textarea.move_cursor(CursorMove::Head);
            }
            KeyCode::Char('e') if ctrl => {
                textarea.move_cursor(CursorMove::End);
            }
            KeyCode::Char('u') if ctrl => {
                textarea.delete_line_by_head();
            }
            KeyCode::Char('k') if ctrl => {
                textarea.delete_line_by_end();
            }
            KeyCode::Char('w') if ctrl => {
                textarea.delete_word();
            }
            KeyCode::Char('z') if ctrl => {
                textarea.undo();
            }
            KeyCode::Backspace if ctrl || alt => {
                textarea.delete_word();
            }
            KeyCode::Backspace => {
                textarea.delete_char();
            }
            KeyCode::Delete => {
                textarea.delete_next_char();
            }
            KeyCode::Left if ctrl || alt => {
                textarea.move_cursor(CursorMove::WordBack);
            }
            KeyCode::Left => {
                textarea.move_cursor(CursorMove::Back);
            }
            KeyCode::Right if ctrl || alt => {
                textarea.move_cursor(CursorMove::WordForward);
            }
            KeyCode::Right => {
                textarea.move_cursor(CursorMove::Forward);
            }
            KeyCode::Home => {
                textarea.move_cursor(CursorMove::Head);
            }
            KeyCode::End => {
                textarea.move_cursor(CursorMove::End);
            }
            _ => return false,
        }
        true
    }
}

impl PartialEq for TextField {
    fn eq(&self, other: &Self) -> bool {
        self.masked == other.masked && self.textarea.lines() == other.textarea.lines()
    }
}

impl std::fmt::Debug for TextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.masked {
            f.write_str("\"[REDACTED]\"")
        } else {
            write!(f, "{:?}", self.text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(field: &mut TextField, text: &str) {
        for c in text.chars() {
            field.input(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_insert_in_the_middle() {
        let mut field = TextField::default();
        type_str(&mut field, "Cardiolgy");
        field.input(key(KeyCode::Left));
        field.input(key(KeyCode::Left));
        field.input(key(KeyCode::Char('o')));

        assert_eq!(field.text(), "Cardiology");
        assert_eq!(field.cursor(), 8);
    }

    #[test]
    fn test_home_end_and_delete() {
        let mut field = TextField::new("2024-05-01");
        assert_eq!(field.cursor(), 10);

        field.input(key(KeyCode::Home));
        field.input(key(KeyCode::Delete));
        field.input(key(KeyCode::Char('3')));
        assert_eq!(field.text(), "3024-05-01");

        field.input(key(KeyCode::End));
        field.input(key(KeyCode::Backspace));
        assert_eq!(field.text(), "3024-05-0");
    }

    #[test]
    fn test_line_and_word_deletion() {
        let mut field = TextField::new("chest pain followup");
        field.input(ctrl('w'));
        assert_eq!(field.text().trim_end(), "chest pain");

        field.input(ctrl('u'));
        assert!(field.is_blank());
    }

    #[test]
    fn test_form_keys_are_left_alone() {
        let mut field = TextField::new("one line");
        for code in [KeyCode::Enter, KeyCode::Tab, KeyCode::Up, KeyCode::Down, KeyCode::Esc] {
            assert!(!field.input(key(code)));
        }
        assert_eq!(field.text(), "one line");
    }

    #[test]
    fn test_masked_field_hides_text() {
        let mut field = TextField::masked();
        type_str(&mut field, "hunter2");

        assert_eq!(field.text(), "hunter2");
        assert_eq!(field.display(), "*******");
        assert!(!format!("{:?}", field).contains("hunter2"));
    }
}
