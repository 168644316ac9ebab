use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::editor::Editor;
use crate::engine::TextHost;
use crate::input::{self, Command, HELP_TEXT};
use crate::model::config::AppConfig;
use crate::model::document::{DocumentError, DocumentEvent, SaveOutcome};
use crate::model::mode::{Mode, PendingAction, PromptKind};
use crate::msg::Msg;

const DIRTY_COLOR: Color = Color::Rgb(205, 92, 92);

/// File name label shown in the title bar, driven by document events.
#[derive(Debug, Clone)]
struct TitleLabel {
    name: String,
    dirty: bool,
}

pub struct App {
    pub mode: Mode,
    pub editor: Editor,
    pub config: AppConfig,
    pub should_quit: bool,
    title: TitleLabel,
    status: Option<String>,
    prompt_input: String,
    /// Runs once a save-as started from the unsaved-changes prompt succeeds.
    after_save: Option<PendingAction>,
    help_scroll: u16,
}

impl App {
    pub fn new(config: AppConfig, event_tx: mpsc::Sender<Msg>) -> Self {
        let mut editor = Editor::new(config.engine_options(), Box::new(event_tx));
        editor.buffer.viewport.scroll_off = config.editor.scroll_off;

        Self {
            mode: Mode::Edit,
            editor,
            config,
            should_quit: false,
            title: TitleLabel {
                name: "untitled".to_string(),
                dirty: false,
            },
            status: Some("F1: help".to_string()),
            prompt_input: String::new(),
            after_save: None,
            help_scroll: 0,
        }
    }

    // ── MVU: Update ──────────────────────────────────────────────

    pub fn update(&mut self, msg: Msg) -> Result<()> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Paste(text) => match self.mode {
                Mode::Edit => {
                    self.editor.paste_text(&text);
                }
                Mode::Prompt(_) => self.prompt_input.push_str(text.trim_end_matches(['\r', '\n'])),
                _ => {}
            },
            Msg::Resize(w, h) => {
                self.editor.buffer.viewport.height = h.saturating_sub(2); // title + status bar
                self.editor.buffer.viewport.width = w;
                self.editor.buffer.scroll_to_cursor();
            }
            Msg::Document(event) => self.handle_document_event(event),
            Msg::OpenOnStartup(path) => self.open_on_startup(path),
        }
        Ok(())
    }

    fn handle_document_event(&mut self, event: DocumentEvent) {
        tracing::debug!("document event: {event:?}");
        match event {
            DocumentEvent::Changed => self.title.dirty = true,
            DocumentEvent::Saved => self.title.dirty = false,
            DocumentEvent::FileChanged(path) => {
                self.title.name = path
                    .as_ref()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "untitled".to_string());
                self.title.dirty = false;
            }
        }
    }

    fn open_on_startup(&mut self, path: PathBuf) {
        match self.editor.open_file(&path) {
            Ok(()) => self.set_status(format!("opened {}", path.display())),
            Err(err) => {
                tracing::warn!("startup open failed: {err}");
                self.set_status(err.to_string());
            }
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // Some platforms report releases too; the editor runs its own key-up.
        if key.kind != KeyEventKind::Press {
            return;
        }

        match self.mode.clone() {
            Mode::Edit => self.handle_key_edit(key),
            Mode::Help => self.handle_key_help(key),
            Mode::Prompt(kind) => self.handle_key_prompt(kind, key),
            Mode::ConfirmSave { then } => self.handle_key_confirm(then, key),
        }
    }

    fn handle_key_edit(&mut self, key: KeyEvent) {
        let key = input::translate(&key);
        if let Some(command) = input::command_for(&key) {
            self.run_command(command);
            return;
        }

        self.editor.handle_key(&key);
    }

    fn handle_key_help(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::F(1) | KeyCode::Esc => self.mode = Mode::Edit,
            KeyCode::Up => self.help_scroll = self.help_scroll.saturating_sub(1),
            KeyCode::Down => self.help_scroll = self.help_scroll.saturating_add(1),
            _ => {}
        }
    }

    fn handle_key_prompt(&mut self, kind: PromptKind, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Edit;
                self.prompt_input.clear();
                self.after_save = None;
                self.set_status("cancelled");
            }
            KeyCode::Enter => {
                let raw = self.prompt_input.trim().to_string();
                self.prompt_input.clear();
                self.mode = Mode::Edit;

                if raw.is_empty() {
                    self.after_save = None;
                    return;
                }

                let path = expand_home(&raw);
                match kind {
                    PromptKind::Open => self.open_path(path),
                    PromptKind::SaveAs => self.save_as(path),
                }
            }
            KeyCode::Backspace => {
                self.prompt_input.pop();
            }
            KeyCode::Char(ch)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.prompt_input.push(ch);
            }
            _ => {}
        }
    }

    fn handle_key_confirm(&mut self, then: PendingAction, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.mode = Mode::Edit;
                match self.editor.save() {
                    Ok(_) => self.proceed(then),
                    Err(DocumentError::Untitled) => {
                        self.after_save = Some(then);
                        self.begin_save_as();
                    }
                    Err(err) => self.set_status(err.to_string()),
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.mode = Mode::Edit;
                self.proceed(then);
            }
            KeyCode::Esc => {
                self.mode = Mode::Edit;
                self.set_status("cancelled");
            }
            _ => {}
        }
    }

    fn run_command(&mut self, command: Command) {
        match command {
            Command::New => self.guard_unsaved(PendingAction::New),
            Command::Open => self.guard_unsaved(PendingAction::Open),
            Command::Quit => self.guard_unsaved(PendingAction::Quit),
            Command::Save => self.save(),
            Command::SaveAs => self.begin_save_as(),
            Command::ToggleHelp => {
                self.help_scroll = 0;
                self.mode = Mode::Help;
            }
        }
    }

    /// Run `action` now, or first ask about unsaved changes.
    fn guard_unsaved(&mut self, action: PendingAction) {
        if self.editor.document.is_dirty() {
            self.mode = Mode::ConfirmSave { then: action };
        } else {
            self.proceed(action);
        }
    }

    fn proceed(&mut self, action: PendingAction) {
        match action {
            PendingAction::New => {
                self.editor.new_file(self.config.default_document_path());
                self.set_status("new file");
            }
            PendingAction::Open => {
                let mut start = self.config.documents_dir().display().to_string();
                if !start.ends_with(std::path::MAIN_SEPARATOR) {
                    start.push(std::path::MAIN_SEPARATOR);
                }
                self.prompt_input = start;
                self.mode = Mode::Prompt(PromptKind::Open);
            }
            PendingAction::Quit => self.should_quit = true,
        }
    }

    fn open_path(&mut self, path: PathBuf) {
        match self.editor.open_file(&path) {
            Ok(()) => self.set_status(format!("opened {}", path.display())),
            Err(DocumentError::NotFound(path)) => {
                // Opening a name that does not exist yet starts that file.
                self.set_status(format!("new file {}", path.display()));
                self.editor.new_file(path);
            }
            Err(err) => {
                tracing::warn!("open failed: {err}");
                self.set_status(err.to_string());
            }
        }
    }

    fn save(&mut self) {
        match self.editor.save() {
            Ok(SaveOutcome::Written) => {
                let name = self.editor.document.display_name();
                self.set_status(format!("saved {name}"));
            }
            Ok(SaveOutcome::Unchanged) => self.set_status("no changes to save"),
            Err(DocumentError::Untitled) => self.begin_save_as(),
            Err(err) => self.set_status(err.to_string()),
        }
    }

    fn begin_save_as(&mut self) {
        let current = self
            .editor
            .document
            .path()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| self.config.default_document_path());
        self.prompt_input = current.display().to_string();
        self.mode = Mode::Prompt(PromptKind::SaveAs);
    }

    fn save_as(&mut self, path: PathBuf) {
        match self.editor.save_as(path) {
            Ok(()) => {
                let name = self.editor.document.display_name();
                self.set_status(format!("saved {name}"));
                if let Some(then) = self.after_save.take() {
                    self.proceed(then);
                }
            }
            Err(err) => {
                self.after_save = None;
                self.set_status(err.to_string());
            }
        }
    }

    // ── MVU: View ────────────────────────────────────────────────

    pub fn view(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // title bar
                Constraint::Min(1),    // body
                Constraint::Length(1), // status bar
            ])
            .split(frame.area());

        self.render_title_bar(frame, chunks[0]);

        if self.mode == Mode::Help {
            self.render_help(frame, chunks[1]);
        } else {
            self.render_editor(frame, chunks[1]);
        }

        self.render_status_bar(frame, chunks[2]);

        if let Mode::Prompt(kind) = self.mode {
            self.render_prompt_overlay(frame, kind);
        }
    }

    fn render_editor(&self, frame: &mut Frame, area: Rect) {
        let buffer = &self.editor.buffer;
        let top = buffer.viewport.top_line;
        let bottom = (top + area.height as usize).min(buffer.line_count());

        let lines: Vec<Line> = (top..bottom).map(|row| self.render_line(row)).collect();
        frame.render_widget(Paragraph::new(lines), area);

        if self.mode == Mode::Edit {
            let pos = buffer.caret_position();
            let left = buffer.viewport.left_col;
            if pos.row >= top && pos.col >= left {
                let x = area.x + (pos.col - left) as u16;
                let y = area.y + (pos.row - top) as u16;
                if y < area.y + area.height && x < area.x + area.width {
                    frame.set_cursor_position((x, y));
                }
            }
        }
    }

    /// One visible line, horizontally scrolled, with the selection highlighted.
    fn render_line(&self, row: usize) -> Line<'static> {
        let buffer = &self.editor.buffer;
        let left = buffer.viewport.left_col;
        let width = buffer.viewport.width as usize;
        let line_start = buffer.line_start(row);
        let chars: Vec<char> = buffer.line(row).chars().collect();

        let sel = buffer.selection();
        let sel_from = sel.start.saturating_sub(line_start).min(chars.len());
        let sel_to = sel.end().saturating_sub(line_start).min(chars.len());

        let visible = |from: usize, to: usize| -> String {
            let from = from.max(left);
            let to = to.min(left + width);
            if from >= to {
                String::new()
            } else {
                chars[from..to].iter().collect()
            }
        };

        let selected = Style::default().bg(Color::Rgb(60, 60, 90));
        let mut spans = vec![Span::raw(visible(0, sel_from))];
        if sel_from < sel_to {
            spans.push(Span::styled(visible(sel_from, sel_to), selected));
        }
        spans.push(Span::raw(visible(sel_to.max(sel_from), chars.len())));

        // Mark the line break inside a selection.
        if !sel.is_empty()
            && sel.start <= line_start + chars.len()
            && sel.end() > line_start + chars.len()
        {
            spans.push(Span::styled(" ", selected));
        }

        Line::from(spans)
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let help = Paragraph::new(HELP_TEXT)
            .scroll((self.help_scroll, 0))
            .block(Block::default().borders(Borders::ALL).title(" Help "));
        frame.render_widget(help, area);
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let name_color = if self.title.dirty {
            DIRTY_COLOR
        } else {
            Color::DarkGray
        };

        let line = Line::from(vec![
            Span::styled(
                " Liquorice ",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {} ", self.title.name),
                Style::default()
                    .fg(name_color)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);

        frame.render_widget(
            Paragraph::new(line).style(Style::default().bg(Color::Rgb(20, 20, 30))),
            area,
        );
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mode_style = match self.mode {
            Mode::Edit => Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            _ => Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        };

        let mode_span = Span::styled(format!(" {} ", self.mode.label()), mode_style);

        let pos = self.editor.buffer.caret_position();
        let message = match &self.mode {
            Mode::ConfirmSave { .. } => format!(
                "save changes to {}? (y/n/esc)",
                self.editor.document.display_name()
            ),
            _ => self.status.clone().unwrap_or_default(),
        };

        let info = Span::styled(
            format!(" {}:{}  {message} ", pos.row + 1, pos.col + 1),
            Style::default().fg(Color::Gray).bg(Color::DarkGray),
        );

        let bar = Line::from(vec![mode_span, info]);
        let status = Paragraph::new(bar).style(Style::default().bg(Color::DarkGray));
        frame.render_widget(status, area);
    }

    fn render_prompt_overlay(&self, frame: &mut Frame, kind: PromptKind) {
        let area = centered_rect(70, 20, frame.area());
        frame.render_widget(Clear, area);

        let title = match kind {
            PromptKind::Open => " Open file ",
            PromptKind::SaveAs => " Save file as ",
        };

        let prompt = Paragraph::new(self.prompt_input.as_str()).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .style(Style::default().bg(Color::Rgb(15, 15, 24))),
        );
        frame.render_widget(prompt, area);

        let cursor_x = area.x + 1 + self.prompt_input.chars().count() as u16;
        let cursor_y = area.y + 1;
        frame.set_cursor_position((cursor_x.min(area.x + area.width.saturating_sub(2)), cursor_y));
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Expand a leading `~` to the home directory.
fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix('~')
        && let Some(dirs) = directories::BaseDirs::new()
    {
        let rest = rest.trim_start_matches(['/', '\\']);
        return dirs.home_dir().join(rest);
    }
    PathBuf::from(raw)
}
