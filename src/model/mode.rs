/// Application interaction modes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// Text editing.
    #[default]
    Edit,
    /// Help panel shown instead of the editor.
    Help,
    /// Typing a file path for open or save-as.
    Prompt(PromptKind),
    /// Asking whether to save unsaved changes before `then` runs.
    ConfirmSave { then: PendingAction },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Open,
    SaveAs,
}

/// Action deferred until unsaved changes are dealt with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    New,
    /// Ask for a path and open it.
    Open,
    Quit,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Edit => "EDIT",
            Mode::Help => "HELP",
            Mode::Prompt(PromptKind::Open) => "OPEN",
            Mode::Prompt(PromptKind::SaveAs) => "SAVE AS",
            Mode::ConfirmSave { .. } => "CONFIRM",
        }
    }
}
