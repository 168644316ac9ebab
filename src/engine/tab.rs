use super::host::{Decision, TextHost};
use crate::model::cursor::Selection;

/// Number of spaces that moves column `x` to the next tab stop.
///
/// An aligned column always advances a full stop.
pub fn spaces_to_next_stop(x: usize, width: usize) -> usize {
    width - x % width
}

/// Column of the tab stop before `x`. `x` must be non-zero.
pub fn previous_stop(x: usize, width: usize) -> usize {
    if x % width == 0 {
        x - width
    } else {
        x - x % width
    }
}

/// Replace the selection with spaces up to the next tab stop.
pub fn insert_tab(host: &impl TextHost, width: usize) -> Decision {
    let (_, x) = host.caret_column();
    Decision::insert(" ".repeat(spaces_to_next_stop(x, width)))
}

/// Delete whitespace back to the previous tab stop.
///
/// Only whitespace is ever removed. When the cells between the stop and the
/// caret hold anything else, the caret is collapsed in place instead.
pub fn remove_tab(host: &impl TextHost, width: usize) -> Decision {
    let (line_start, x) = host.caret_column();
    if x == 0 {
        return Decision::Consumed;
    }

    let x1 = previous_stop(x, width);
    let line = host.line(host.line_of(line_start));
    let cells: String = line.chars().skip(x1).take(x - x1).collect();

    if !cells.trim().is_empty() {
        return Decision::Collapse(line_start + x);
    }

    Decision::Replace {
        range: Selection::new(line_start + x1, x - x1),
        text: String::new(),
    }
}
