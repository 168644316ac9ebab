//! Editing heuristics: auto-indent, soft tabs and bracket/tag completion.
//!
//! The engine never owns text. It reads a [`TextHost`] and answers each input
//! event with a [`Decision`] the host applies. The only state it carries is the
//! indent captured on Enter key-down and the last character typed.

pub mod complete;
pub mod host;
pub mod indent;
pub mod key;
pub mod tab;

pub use host::{Decision, TextHost};
pub use key::{Key, KeyCode};

const BACKSPACE: char = '\u{8}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub tab_width: usize,
    pub auto_indent: bool,
    pub auto_complete: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            tab_width: 4,
            auto_indent: true,
            auto_complete: true,
        }
    }
}

#[derive(Debug)]
pub struct Engine {
    options: EngineOptions,
    pending_indent: String,
    last_char: char,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options: EngineOptions {
                tab_width: options.tab_width.max(1),
                ..options
            },
            pending_indent: String::new(),
            last_char: '\0',
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn pending_indent(&self) -> &str {
        &self.pending_indent
    }

    pub fn last_char(&self) -> char {
        self.last_char
    }

    /// Key pressed, before any character reaches the buffer.
    ///
    /// Enter only records the indent of the caret line; the newline itself is
    /// left to the host.
    pub fn key_down(&mut self, key: &Key, host: &impl TextHost) -> Decision {
        let width = self.options.tab_width;
        match (key.code, key.ctrl) {
            (KeyCode::Char('t'), true) | (KeyCode::Tab, false) => tab::insert_tab(host, width),
            (KeyCode::Char('r'), true) | (KeyCode::BackTab, _) => tab::remove_tab(host, width),
            (KeyCode::Enter, false) => {
                if self.options.auto_indent {
                    let indent = indent::current_line_indent(host);
                    if indent != self.pending_indent.len() {
                        self.pending_indent = " ".repeat(indent);
                    }
                }
                Decision::NotHandled
            }
            _ => Decision::NotHandled,
        }
    }

    /// Key released. After Enter the caret sits on the new line.
    pub fn key_up(&mut self, key: &Key, _host: &impl TextHost) -> Decision {
        match (key.code, key.ctrl) {
            (KeyCode::Enter, false) if self.options.auto_indent => {
                Decision::insert(self.pending_indent.clone())
            }
            _ => Decision::NotHandled,
        }
    }

    /// Backspace erased text. It counts as a typed `\u{8}`, so a deleted `/`
    /// no longer opens a comment block.
    pub fn char_erased(&mut self) {
        self.last_char = BACKSPACE;
    }

    /// A character is about to be inserted.
    pub fn char_typed(&mut self, ch: char, host: &impl TextHost) -> Decision {
        let last = std::mem::replace(&mut self.last_char, ch);
        if !self.options.auto_complete {
            return Decision::NotHandled;
        }

        if let Some(decision) = complete::complete_char(ch, last) {
            return decision;
        }

        if ch == '>' && last != ' ' {
            return complete::complete_html_tag(host);
        }

        Decision::NotHandled
    }
}
