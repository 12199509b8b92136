//! Terminal User Interface for interactive document chat.
//!
//! Provides a three-panel TUI with question input, chat history and answer
//! detail, using ratatui for rendering and crossterm for terminal management.

use std::io;
use std::panic;

use anyhow::{Context, Result};
use crossterm::{
    event::{self as crossterm_event, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::session::Session;

mod app;
pub mod event;
mod ui;

pub use app::{App, Focus};
pub use event::KeyAction;

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

/// Enables raw mode and enters the alternate screen.
fn init_terminal() -> Result<Tui> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// Must run before exiting the TUI, including on error paths.
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// Terminal restoration for the panic hook, where no `Terminal` is at hand.
fn restore_terminal_panic() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Restores the terminal before the original panic hook runs.
fn init_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal_panic();
        original_hook(panic_info);
    }));
}

/// Runs the event loop until the user quits.
///
/// # Errors
///
/// Returns an error if event polling, rendering, or terminal operations fail.
/// Terminal state is always restored, even on error.
pub fn run_event_loop(app: &mut App) -> Result<()> {
    let mut terminal = init_terminal()?;

    let result = run_event_loop_internal(app, &mut terminal);

    if let Err(e) = restore_terminal(&mut terminal) {
        eprintln!("Error restoring terminal: {e}");
    }

    result
}

fn run_event_loop_internal(app: &mut App, terminal: &mut Tui) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if crossterm_event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = crossterm_event::read()?
            && key.kind == KeyEventKind::Press
        {
            match event::handle_key_event(app, key) {
                KeyAction::Continue => {}
                KeyAction::Quit => break,
                KeyAction::Submit(input) => {
                    // Questions block until answered; show progress first.
                    app.set_status("Working...");
                    terminal.draw(|frame| ui::draw(frame, app))?;
                    app.submit(&input);
                }
            }
        }
    }

    Ok(())
}

/// Entry point for the interactive shell.
///
/// # Errors
///
/// Returns an error if terminal initialization or the event loop fails.
pub fn run(session: Session) -> Result<()> {
    init_panic_hook();

    let mut app = App::new(session);
    if app.session().store().is_empty() {
        app.set_status("No documents loaded; use /add <path>");
    } else {
        let loaded = app.session().store().len();
        app.set_status(format!("{loaded} document(s) loaded"));
    }

    run_event_loop(&mut app).context("TUI event loop failed")?;

    tracing::info!(questions = app.session().history().len(), "session ended");
    Ok(())
}
