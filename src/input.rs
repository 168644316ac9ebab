use crossterm::event::{KeyCode as TermKey, KeyEvent, KeyModifiers};

use crate::engine::{Key, KeyCode};

/// App-level commands bound to keys in edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    New,
    Open,
    Save,
    SaveAs,
    ToggleHelp,
    Quit,
}

/// Translate a crossterm key event into the engine's key model.
pub fn translate(event: &KeyEvent) -> Key {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let shift = event.modifiers.contains(KeyModifiers::SHIFT);

    let code = match event.code {
        TermKey::Char(ch) if ctrl => KeyCode::Char(ch.to_ascii_lowercase()),
        TermKey::Char(ch) => KeyCode::Char(ch),
        TermKey::Enter => KeyCode::Enter,
        TermKey::Tab if shift => KeyCode::BackTab,
        TermKey::Tab => KeyCode::Tab,
        TermKey::BackTab => KeyCode::BackTab,
        TermKey::Backspace => KeyCode::Backspace,
        TermKey::Delete => KeyCode::Delete,
        TermKey::Left => KeyCode::Left,
        TermKey::Right => KeyCode::Right,
        TermKey::Up => KeyCode::Up,
        TermKey::Down => KeyCode::Down,
        TermKey::Home => KeyCode::Home,
        TermKey::End => KeyCode::End,
        TermKey::PageUp => KeyCode::PageUp,
        TermKey::PageDown => KeyCode::PageDown,
        TermKey::Esc => KeyCode::Esc,
        TermKey::F(n) => KeyCode::F(n),
        _ => KeyCode::Other,
    };

    Key { code, ctrl, shift }
}

pub fn command_for(key: &Key) -> Option<Command> {
    match (key.code, key.ctrl) {
        (KeyCode::Char('n'), true) => Some(Command::New),
        (KeyCode::Char('o'), true) => Some(Command::Open),
        (KeyCode::Char('s'), true) => Some(Command::Save),
        (KeyCode::Char('w'), true) => Some(Command::SaveAs),
        (KeyCode::Char('q'), true) => Some(Command::Quit),
        (KeyCode::F(1), _) => Some(Command::ToggleHelp),
        _ => None,
    }
}

pub const HELP_TEXT: &str = "\
Liquorice Help - Press [F1] to exit.

File handling
-------------
^N  New file
^O  Open a file
^S  Save currently loaded file
^W  Write out current text to a different file
^Q  Quit

Editing
-------
^X  Cut
^C  Copy
^V  Paste
^A  Select all
^T  Insert spaces to the next tab stop (also Tab)
^R  Remove spaces back to the previous tab stop (also Shift+Tab)

Typing ( { [ ' \" ` inserts the closing character too.
Typing /* inserts a comment block, <tag> inserts </tag>.
Enter keeps the indentation of the current line.
";
