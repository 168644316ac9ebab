/// Terminal-independent key identity consumed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Esc,
    F(u8),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub code: KeyCode,
    pub ctrl: bool,
    pub shift: bool,
}

impl Key {
    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            ctrl: false,
            shift: false,
        }
    }

    pub fn ctrl(ch: char) -> Self {
        Self {
            code: KeyCode::Char(ch),
            ctrl: true,
            shift: false,
        }
    }

    pub fn shifted(code: KeyCode) -> Self {
        Self {
            code,
            ctrl: false,
            shift: true,
        }
    }

    /// Character a plain key press types, if any.
    pub fn typed_char(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(ch) if !self.ctrl => Some(ch),
            KeyCode::Enter => Some('\n'),
            _ => None,
        }
    }
}
