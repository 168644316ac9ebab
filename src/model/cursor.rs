/// Selection within a buffer, in character offsets.
///
/// `start` is always the low end; `caret_at_start` records which side the
/// caret sits on so Shift+arrow can grow or shrink from the right edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub len: usize,
    /// Caret is at `start` instead of `start + len`.
    pub caret_at_start: bool,
}

/// Row/column pair (0-indexed, column in characters).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Selection {
    pub fn new(start: usize, len: usize) -> Self {
        Self {
            start,
            len,
            caret_at_start: false,
        }
    }

    /// Zero-length selection at `offset`.
    pub fn caret(offset: usize) -> Self {
        Self::new(offset, 0)
    }

    /// Selection spanning `anchor` and `caret`, in either order.
    pub fn between(anchor: usize, caret: usize) -> Self {
        if caret < anchor {
            Self {
                start: caret,
                len: anchor - caret,
                caret_at_start: true,
            }
        } else {
            Self::new(anchor, caret - anchor)
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset where the caret is drawn.
    pub fn head(&self) -> usize {
        if self.caret_at_start {
            self.start
        } else {
            self.end()
        }
    }

    /// The fixed end of the selection.
    pub fn anchor(&self) -> usize {
        if self.caret_at_start {
            self.end()
        } else {
            self.start
        }
    }

    /// Clamp into `0..=max` keeping `start + len <= max`.
    pub fn clamped(self, max: usize) -> Self {
        let start = self.start.min(max);
        let len = self.len.min(max - start);
        Self {
            start,
            len,
            caret_at_start: self.caret_at_start && len > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn between_orders_endpoints() {
        let sel = Selection::between(7, 3);
        assert_eq!(sel.start, 3);
        assert_eq!(sel.len, 4);
        assert_eq!(sel.head(), 3);
        assert_eq!(sel.anchor(), 7);

        let sel = Selection::between(3, 7);
        assert_eq!(sel.head(), 7);
        assert_eq!(sel.anchor(), 3);
    }

    #[test]
    fn clamped_stays_in_bounds() {
        let sel = Selection::new(8, 10).clamped(12);
        assert_eq!(sel, Selection::new(8, 4));

        let sel = Selection::new(20, 3).clamped(5);
        assert_eq!(sel, Selection::caret(5));
    }
}
