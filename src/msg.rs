use crossterm::event::KeyEvent;
use std::path::PathBuf;
use std::sync::mpsc;

use crate::model::document::{DocumentEvent, DocumentObserver};

/// Direction for caret movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    LineStart,
    LineEnd,
    PageUp,
    PageDown,
}

/// All possible messages that drive state transitions.
#[derive(Debug)]
pub enum Msg {
    // -- Input events (raw)
    Key(KeyEvent),
    Paste(String),
    Resize(u16, u16),

    // -- Document notifications
    Document(DocumentEvent),

    // -- File I/O
    /// Open a path given on the command line.
    OpenOnStartup(PathBuf),
}

impl DocumentObserver for mpsc::Sender<Msg> {
    fn notify(&mut self, event: DocumentEvent) {
        if self.send(Msg::Document(event)).is_err() {
            tracing::debug!("document event dropped, event loop gone");
        }
    }
}
