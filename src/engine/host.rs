use crate::model::cursor::Selection;

/// The editable text surface the heuristics run against.
///
/// Offsets are character indices into the flattened text. Lines are returned
/// without their terminating newline.
pub trait TextHost {
    fn line_count(&self) -> usize;

    /// Text of line `idx`, or an empty string past the end.
    fn line(&self, idx: usize) -> String;

    /// Index of the line containing `offset`.
    fn line_of(&self, offset: usize) -> usize;

    /// Offset of the first character of line `idx`.
    fn line_start(&self, idx: usize) -> usize;

    fn selection(&self) -> Selection;

    /// Set the selection, clamped into the buffer.
    fn set_selection(&mut self, selection: Selection);

    /// Replace the selected text and leave a caret right after the insertion.
    fn replace_selection(&mut self, text: &str);

    fn text(&self) -> String;

    /// Replace the whole text and reset the selection to offset 0.
    fn set_text(&mut self, text: &str);

    /// Caret column within its line.
    fn caret_column(&self) -> (usize, usize) {
        let start = self.selection().start;
        let line_start = self.line_start(self.line_of(start));
        (line_start, start - line_start)
    }

    /// Apply an engine decision. Returns `true` when the text changed.
    fn apply(&mut self, decision: &Decision) -> bool {
        match decision {
            Decision::NotHandled | Decision::Consumed => false,
            Decision::Insert { text, cursor_back } => {
                let changed = !text.is_empty() || !self.selection().is_empty();
                self.replace_selection(text);
                let end = self.selection().start;
                self.set_selection(Selection::caret(end.saturating_sub(*cursor_back)));
                changed
            }
            Decision::Replace { range, text } => {
                self.set_selection(*range);
                let changed = !text.is_empty() || !self.selection().is_empty();
                self.replace_selection(text);
                changed
            }
            Decision::Collapse(offset) => {
                self.set_selection(Selection::caret(*offset));
                false
            }
        }
    }
}

/// What the host should do in response to an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Fall through to the host's default behaviour.
    NotHandled,
    /// Swallow the event without touching the buffer.
    Consumed,
    /// Replace the selection with `text`, then move the caret back
    /// `cursor_back` characters from the end of the insertion.
    Insert { text: String, cursor_back: usize },
    /// Replace `range` with `text`.
    Replace { range: Selection, text: String },
    /// Drop the selection and put the caret at the offset.
    Collapse(usize),
}

impl Decision {
    pub fn insert(text: impl Into<String>) -> Self {
        Self::Insert {
            text: text.into(),
            cursor_back: 0,
        }
    }

    pub fn insert_back(text: impl Into<String>, cursor_back: usize) -> Self {
        Self::Insert {
            text: text.into(),
            cursor_back,
        }
    }

    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::NotHandled)
    }
}
