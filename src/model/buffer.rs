use ropey::Rope;

use super::cursor::{Position, Selection};
use crate::engine::TextHost;
use crate::msg::Direction;

/// Viewport state for scroll tracking.
#[derive(Debug, Clone)]
pub struct Viewport {
    pub top_line: usize,
    pub left_col: usize,
    pub height: u16,
    pub width: u16,
    pub scroll_off: u16,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            top_line: 0,
            left_col: 0,
            height: 24,
            width: 80,
            scroll_off: 3,
        }
    }
}

/// The single text buffer backed by a Rope.
///
/// All offsets are character indices. The selection is the only cursor.
pub struct Buffer {
    pub rope: Rope,
    selection: Selection,
    /// Column kept across vertical moves ("sticky" column).
    desired_col: Option<usize>,
    pub viewport: Viewport,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            selection: Selection::default(),
            desired_col: None,
            viewport: Viewport::default(),
        }
    }

    pub fn from_text(text: &str) -> Self {
        let mut buffer = Self::new();
        buffer.rope = Rope::from_str(text);
        buffer
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Length of line `idx` in characters, excluding the line break.
    pub fn line_len(&self, idx: usize) -> usize {
        self.line(idx).chars().count()
    }

    pub fn caret_position(&self) -> Position {
        self.position_of(self.selection.head())
    }

    pub fn position_of(&self, offset: usize) -> Position {
        let row = self.line_of(offset);
        Position {
            row,
            col: offset.min(self.len_chars()) - self.line_start(row),
        }
    }

    /// Offset for a row/column, clamping both into the text.
    pub fn offset_of(&self, pos: Position) -> usize {
        let row = pos.row.min(self.line_count().saturating_sub(1));
        self.line_start(row) + pos.col.min(self.line_len(row))
    }

    pub fn selected_text(&self) -> String {
        let sel = self.selection;
        self.rope.slice(sel.start..sel.end()).to_string()
    }

    pub fn select_all(&mut self) {
        self.set_selection(Selection::new(0, self.len_chars()));
    }

    /// Insert a newline at the caret, replacing the selection.
    pub fn insert_newline(&mut self) {
        self.replace_selection("\n");
    }

    /// Delete the selection, or the character before the caret.
    pub fn delete_char_before(&mut self) -> bool {
        if !self.selection.is_empty() {
            self.replace_selection("");
            return true;
        }

        let caret = self.selection.start;
        if caret == 0 {
            return false;
        }

        // A CRLF pair counts as one line break.
        let mut from = caret - 1;
        if self.rope.char(from) == '\n' && from > 0 && self.rope.char(from - 1) == '\r' {
            from -= 1;
        }
        self.rope.remove(from..caret);
        self.selection = Selection::caret(from);
        self.desired_col = None;
        true
    }

    /// Delete the selection, or the character after the caret.
    pub fn delete_char_after(&mut self) -> bool {
        if !self.selection.is_empty() {
            self.replace_selection("");
            return true;
        }

        let caret = self.selection.start;
        let len = self.len_chars();
        if caret >= len {
            return false;
        }

        let mut to = caret + 1;
        if self.rope.char(caret) == '\r' && to < len && self.rope.char(to) == '\n' {
            to += 1;
        }
        self.rope.remove(caret..to);
        self.desired_col = None;
        true
    }

    /// Move the caret. With `extend`, the selection anchor stays put.
    pub fn move_caret(&mut self, dir: Direction, extend: bool) {
        let sel = self.selection;
        let head = sel.head();
        let pos = self.position_of(head);
        let page = usize::from(self.viewport.height.max(1));

        let target = match dir {
            Direction::Left if !extend && !sel.is_empty() => sel.start,
            Direction::Right if !extend && !sel.is_empty() => sel.end(),
            Direction::Left => {
                if pos.col > 0 {
                    head - 1
                } else if pos.row > 0 {
                    self.line_start(pos.row - 1) + self.line_len(pos.row - 1)
                } else {
                    head
                }
            }
            Direction::Right => {
                if pos.col < self.line_len(pos.row) {
                    head + 1
                } else if pos.row + 1 < self.line_count() {
                    self.line_start(pos.row + 1)
                } else {
                    head
                }
            }
            Direction::Up => self.vertical_target(pos, -1),
            Direction::Down => self.vertical_target(pos, 1),
            Direction::PageUp => self.vertical_target(pos, -(page as isize)),
            Direction::PageDown => self.vertical_target(pos, page as isize),
            Direction::LineStart => self.line_start(pos.row),
            Direction::LineEnd => self.line_start(pos.row) + self.line_len(pos.row),
        };

        if !matches!(
            dir,
            Direction::Up | Direction::Down | Direction::PageUp | Direction::PageDown
        ) {
            self.desired_col = None;
        }

        self.selection = if extend {
            Selection::between(sel.anchor(), target)
        } else {
            Selection::caret(target)
        };
    }

    fn vertical_target(&mut self, pos: Position, delta: isize) -> usize {
        let col = *self.desired_col.get_or_insert(pos.col);
        let max_row = self.line_count().saturating_sub(1) as isize;
        let row = (pos.row as isize + delta).clamp(0, max_row) as usize;
        self.offset_of(Position { row, col })
    }

    /// Ensure the viewport keeps the caret visible.
    pub fn scroll_to_cursor(&mut self) {
        let pos = self.caret_position();
        let height = usize::from(self.viewport.height.max(1));
        let off = usize::from(self.viewport.scroll_off).min(height.saturating_sub(1) / 2);

        if pos.row < self.viewport.top_line + off {
            self.viewport.top_line = pos.row.saturating_sub(off);
        }
        if pos.row + off >= self.viewport.top_line + height {
            self.viewport.top_line = pos.row + off + 1 - height;
        }

        let width = usize::from(self.viewport.width.max(1));
        if pos.col < self.viewport.left_col {
            self.viewport.left_col = pos.col;
        }
        if pos.col >= self.viewport.left_col + width {
            self.viewport.left_col = pos.col + 1 - width;
        }
    }
}

impl TextHost for Buffer {
    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line(&self, idx: usize) -> String {
        if idx >= self.rope.len_lines() {
            return String::new();
        }
        let mut s: String = self.rope.line(idx).chunks().collect();
        if s.ends_with('\n') {
            s.pop();
        }
        if s.ends_with('\r') {
            s.pop();
        }
        s
    }

    fn line_of(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.len_chars()))
    }

    fn line_start(&self, idx: usize) -> usize {
        self.rope.line_to_char(idx.min(self.rope.len_lines()))
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamped(self.len_chars());
        self.desired_col = None;
    }

    fn replace_selection(&mut self, text: &str) {
        let sel = self.selection;
        if !sel.is_empty() {
            self.rope.remove(sel.start..sel.end());
        }
        self.rope.insert(sel.start, text);
        self.selection = Selection::caret(sel.start + text.chars().count());
        self.desired_col = None;
    }

    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.selection = Selection::default();
        self.desired_col = None;
        self.viewport.top_line = 0;
        self.viewport.left_col = 0;
    }
}
