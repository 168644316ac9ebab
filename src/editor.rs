use std::path::{Path, PathBuf};

use crate::engine::{Engine, EngineOptions, Key, KeyCode, TextHost};
use crate::model::buffer::Buffer;
use crate::model::document::{Document, DocumentError, DocumentObserver, SaveOutcome};
use crate::msg::Direction;

/// The editing control: a buffer, the heuristics driving it and the file it
/// belongs to.
pub struct Editor {
    pub buffer: Buffer,
    pub document: Document,
    engine: Engine,
    clipboard: String,
}

impl Editor {
    pub fn new(options: EngineOptions, observer: Box<dyn DocumentObserver>) -> Self {
        Self {
            buffer: Buffer::new(),
            document: Document::new(observer),
            engine: Engine::new(options),
            clipboard: String::new(),
        }
    }

    /// Run one key press through key-down, character-typed and key-up.
    ///
    /// Returns `true` when the text changed.
    pub fn handle_key(&mut self, key: &Key) -> bool {
        let mut changed = false;

        let down = self.engine.key_down(key, &self.buffer);
        if down.is_handled() {
            changed |= self.buffer.apply(&down);
        } else {
            changed |= self.default_key_down(key);
            if let Some(ch) = key.typed_char() {
                changed |= self.type_char(ch);
            }
        }

        let up = self.engine.key_up(key, &self.buffer);
        changed |= self.buffer.apply(&up);

        self.text_changed(changed);
        changed
    }

    /// Insert pasted text verbatim, bypassing completion.
    pub fn paste_text(&mut self, text: &str) -> bool {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let changed = !text.is_empty() || !self.buffer.selection().is_empty();
        self.buffer.replace_selection(&text);
        self.text_changed(changed);
        changed
    }

    fn type_char(&mut self, ch: char) -> bool {
        let decision = self.engine.char_typed(ch, &self.buffer);
        if decision.is_handled() {
            return self.buffer.apply(&decision);
        }

        let mut utf8 = [0; 4];
        self.buffer.replace_selection(ch.encode_utf8(&mut utf8));
        true
    }

    /// What a plain text control does with keys that type no character.
    fn default_key_down(&mut self, key: &Key) -> bool {
        let extend = key.shift;
        match (key.code, key.ctrl) {
            (KeyCode::Backspace, _) => {
                self.engine.char_erased();
                return self.buffer.delete_char_before();
            }
            (KeyCode::Delete, _) => return self.buffer.delete_char_after(),
            (KeyCode::Left, _) => self.buffer.move_caret(Direction::Left, extend),
            (KeyCode::Right, _) => self.buffer.move_caret(Direction::Right, extend),
            (KeyCode::Up, _) => self.buffer.move_caret(Direction::Up, extend),
            (KeyCode::Down, _) => self.buffer.move_caret(Direction::Down, extend),
            (KeyCode::Home, _) => self.buffer.move_caret(Direction::LineStart, extend),
            (KeyCode::End, _) => self.buffer.move_caret(Direction::LineEnd, extend),
            (KeyCode::PageUp, _) => self.buffer.move_caret(Direction::PageUp, extend),
            (KeyCode::PageDown, _) => self.buffer.move_caret(Direction::PageDown, extend),
            (KeyCode::Char('a'), true) => self.buffer.select_all(),
            (KeyCode::Char('c'), true) => self.copy(),
            (KeyCode::Char('x'), true) => {
                self.copy();
                if !self.buffer.selection().is_empty() {
                    self.buffer.replace_selection("");
                    return true;
                }
            }
            (KeyCode::Char('v'), true) => {
                if self.clipboard.is_empty() {
                    return false;
                }
                let text = self.clipboard.clone();
                self.buffer.replace_selection(&text);
                return true;
            }
            _ => {}
        }
        false
    }

    fn copy(&mut self) {
        if !self.buffer.selection().is_empty() {
            self.clipboard = self.buffer.selected_text();
        }
    }

    fn text_changed(&mut self, changed: bool) {
        if changed {
            self.document.mark_changed();
        }
        self.buffer.scroll_to_cursor();
    }

    /// Clear the text and start a document that will be saved to `path`.
    pub fn new_file(&mut self, path: PathBuf) {
        self.buffer.set_text("");
        self.document.reset(Some(path));
        tracing::info!("new document");
    }

    /// Load `path` into the buffer. On error nothing changes.
    pub fn open_file(&mut self, path: &Path) -> Result<(), DocumentError> {
        let text = self.document.open(path)?;
        self.buffer.set_text(&text);
        Ok(())
    }

    pub fn save(&mut self) -> Result<SaveOutcome, DocumentError> {
        self.document.save(&self.buffer.rope)
    }

    pub fn save_as(&mut self, path: PathBuf) -> Result<(), DocumentError> {
        self.document.save_as(path, &self.buffer.rope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cursor::Selection;
    use crate::model::document::DocumentEvent;
    use crate::model::document::testing::Recorder;

    fn new_editor() -> (Editor, Recorder) {
        let recorder = Recorder::default();
        let editor = Editor::new(EngineOptions::default(), Box::new(recorder.clone()));
        (editor, recorder)
    }

    fn type_str(editor: &mut Editor, text: &str) {
        for ch in text.chars() {
            let key = if ch == '\n' {
                Key::plain(KeyCode::Enter)
            } else {
                Key::plain(KeyCode::Char(ch))
            };
            editor.handle_key(&key);
        }
    }

    #[test]
    fn typing_keeps_indent_across_lines() {
        let (mut editor, _) = new_editor();
        editor.handle_key(&Key::plain(KeyCode::Tab));
        type_str(&mut editor, "a\nb\n");
        assert_eq!(editor.buffer.text(), "    a\n    b\n    ");
    }

    #[test]
    fn brackets_complete_with_caret_inside() {
        let (mut editor, _) = new_editor();
        type_str(&mut editor, "f(");
        assert_eq!(editor.buffer.text(), "f()");
        assert_eq!(editor.buffer.selection(), Selection::caret(2));
        type_str(&mut editor, "x");
        assert_eq!(editor.buffer.text(), "f(x)");
    }

    #[test]
    fn comment_block_completion() {
        let (mut editor, _) = new_editor();
        type_str(&mut editor, "/*");
        assert_eq!(editor.buffer.text(), "/*  */");
        assert_eq!(editor.buffer.selection(), Selection::caret(3));
    }

    #[test]
    fn html_tags_close_themselves() {
        let (mut editor, _) = new_editor();
        type_str(&mut editor, "<div>");
        assert_eq!(editor.buffer.text(), "<div></div>");
        assert_eq!(editor.buffer.selection(), Selection::caret(5));

        let (mut editor, _) = new_editor();
        type_str(&mut editor, "</div>");
        assert_eq!(editor.buffer.text(), "</div>");

        let (mut editor, _) = new_editor();
        type_str(&mut editor, "a > b");
        assert_eq!(editor.buffer.text(), "a > b");
    }

    #[test]
    fn backspaced_slash_does_not_open_comment() {
        let (mut editor, _) = new_editor();
        type_str(&mut editor, "/");
        editor.handle_key(&Key::plain(KeyCode::Backspace));
        type_str(&mut editor, "*");
        assert_eq!(editor.buffer.text(), "*");
        assert_eq!(editor.buffer.selection(), Selection::caret(1));
    }

    #[test]
    fn empty_tag_is_closed() {
        let (mut editor, _) = new_editor();
        type_str(&mut editor, "ab<>");
        assert_eq!(editor.buffer.text(), "ab<></>");
        assert_eq!(editor.buffer.selection(), Selection::caret(4));
    }

    #[test]
    fn ctrl_r_removes_only_whitespace() {
        let (mut editor, _) = new_editor();
        type_str(&mut editor, "ab");
        editor.handle_key(&Key::ctrl('t'));
        assert_eq!(editor.buffer.text(), "ab  ");
        editor.handle_key(&Key::ctrl('r'));
        assert_eq!(editor.buffer.text(), "ab  ");
        assert_eq!(editor.buffer.selection(), Selection::caret(4));

        editor.handle_key(&Key::ctrl('t'));
        editor.handle_key(&Key::ctrl('r'));
        assert_eq!(editor.buffer.text(), "ab  ");
    }

    #[test]
    fn shift_tab_at_line_start_changes_nothing() {
        let (mut editor, events) = new_editor();
        assert!(!editor.handle_key(&Key::plain(KeyCode::BackTab)));
        assert_eq!(editor.buffer.text(), "");
        assert!(events.take().is_empty());
    }

    #[test]
    fn first_edit_notifies_once() {
        let (mut editor, events) = new_editor();
        editor.handle_key(&Key::plain(KeyCode::Left));
        assert!(events.take().is_empty());

        type_str(&mut editor, "abc");
        assert_eq!(events.take(), vec![DocumentEvent::Changed]);
        assert!(editor.document.is_dirty());
    }

    #[test]
    fn backspace_and_navigation() {
        let (mut editor, _) = new_editor();
        type_str(&mut editor, "abc");
        editor.handle_key(&Key::plain(KeyCode::Left));
        editor.handle_key(&Key::plain(KeyCode::Backspace));
        assert_eq!(editor.buffer.text(), "ac");
        editor.handle_key(&Key::plain(KeyCode::Home));
        editor.handle_key(&Key::plain(KeyCode::Delete));
        assert_eq!(editor.buffer.text(), "c");
    }

    #[test]
    fn clipboard_cut_and_paste() {
        let (mut editor, _) = new_editor();
        type_str(&mut editor, "hello");
        editor.handle_key(&Key::shifted(KeyCode::Left));
        editor.handle_key(&Key::shifted(KeyCode::Left));
        editor.handle_key(&Key::ctrl('x'));
        assert_eq!(editor.buffer.text(), "hel");
        editor.handle_key(&Key::plain(KeyCode::Home));
        editor.handle_key(&Key::ctrl('v'));
        assert_eq!(editor.buffer.text(), "lohel");

        editor.handle_key(&Key::ctrl('a'));
        editor.handle_key(&Key::ctrl('c'));
        editor.handle_key(&Key::plain(KeyCode::End));
        editor.handle_key(&Key::ctrl('v'));
        assert_eq!(editor.buffer.text(), "lohellohel");
    }

    #[test]
    fn typed_char_replaces_selection() {
        let (mut editor, _) = new_editor();
        type_str(&mut editor, "abc");
        editor.handle_key(&Key::ctrl('a'));
        type_str(&mut editor, "[");
        assert_eq!(editor.buffer.text(), "[]");
    }

    #[test]
    fn paste_is_not_completed() {
        let (mut editor, _) = new_editor();
        assert!(editor.paste_text("(a\r\nb"));
        assert_eq!(editor.buffer.text(), "(a\nb");
        assert!(editor.document.is_dirty());
    }

    #[test]
    fn file_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "  one").unwrap();

        let (mut editor, events) = new_editor();
        editor.open_file(&path).unwrap();
        assert_eq!(editor.buffer.text(), "  one");
        assert!(!editor.document.is_dirty());

        editor.handle_key(&Key::plain(KeyCode::End));
        type_str(&mut editor, "\ntwo");
        assert_eq!(editor.buffer.text(), "  one\n  two");
        assert_eq!(editor.save().unwrap(), SaveOutcome::Written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "  one\n  two");
        assert_eq!(
            events.take(),
            vec![
                DocumentEvent::FileChanged(Some(path.clone())),
                DocumentEvent::Changed,
                DocumentEvent::Saved,
            ]
        );

        let fresh = dir.path().join("untitled.txt");
        editor.new_file(fresh.clone());
        assert_eq!(editor.buffer.text(), "");
        assert_eq!(editor.document.path(), Some(fresh.as_path()));
        assert!(!editor.document.is_dirty());
    }

    #[test]
    fn failed_open_keeps_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let (mut editor, _) = new_editor();
        type_str(&mut editor, "keep");
        let err = editor.open_file(&dir.path().join("missing.txt"));
        assert!(matches!(err, Err(DocumentError::NotFound(_))));
        assert_eq!(editor.buffer.text(), "keep");
        assert!(editor.document.is_dirty());
    }
}
