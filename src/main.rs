mod app;
mod editor;
mod engine;
mod input;
mod model;
mod msg;

use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::Result;
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use app::App;
use model::config::AppConfig;
use msg::Msg;

fn main() -> Result<()> {
    // Initialize logging to file (never stdout)
    let log_dir = directories::ProjectDirs::from("", "", "liquorice")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "liquorice.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter("liquorice=info")
        .init();

    tracing::info!("liquorice starting");

    let config = AppConfig::load()?;
    let startup_path = std::env::args_os().nth(1).map(PathBuf::from);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, config, startup_path);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        tracing::error!("fatal: {e:?}");
        eprintln!("liquorice error: {e:?}");
    }

    tracing::info!("liquorice exiting");
    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: AppConfig,
    startup_path: Option<PathBuf>,
) -> Result<()> {
    let (tx, rx) = mpsc::channel::<Msg>();
    let mut app = App::new(config, tx.clone());

    let size = terminal.size()?;
    app.update(Msg::Resize(size.width, size.height))?;

    if let Some(path) = startup_path {
        tx.send(Msg::OpenOnStartup(path))?;
    }

    // Input thread — reads terminal events and forwards as Msg
    let tx_input = tx.clone();
    thread::spawn(move || {
        loop {
            if let Ok(event) = event::read() {
                let msg = match event {
                    Event::Key(k) => Msg::Key(k),
                    Event::Paste(text) => Msg::Paste(text),
                    Event::Resize(w, h) => Msg::Resize(w, h),
                    _ => continue,
                };
                if tx_input.send(msg).is_err() {
                    break;
                }
            }
        }
    });
    drop(tx);

    // ── Main event loop ──
    loop {
        terminal.draw(|f| app.view(f))?;

        // Batch-drain all pending messages
        let first = rx.recv()?;
        app.update(first)?;

        while let Ok(msg) = rx.try_recv() {
            app.update(msg)?;
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
