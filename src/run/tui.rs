use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};
use tracing::info;

use super::profile_id;
use crate::config::Config;
use crate::db::Database;
use crate::ui::app::{App, InputMode, PendingAction};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_up};

/// Upper bound on how long the loop blocks with nothing pending.
const IDLE_TICK: Duration = Duration::from_secs(1);

pub(crate) fn as_tui(db: &mut Database, config: &Config) -> Result<()> {
    let pid = profile_id(db, &config.profile)?;
    let mut app = App::new(pid, config.profile.clone(), config.debounce);
    app.refresh_categories(db)?;
    app.refresh_now(db);
    info!(profile = %config.profile, debounce = ?config.debounce, "tui started");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // title + status + command bars, table borders and header
            let content_height = f.area().height.saturating_sub(6) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        let timeout = app
            .scheduler
            .time_until_due(Instant::now())
            .map_or(IDLE_TICK, |wait| wait.min(IDLE_TICK));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(key, app, db)?;
                }
            }
        }

        app.run_due_refresh(db, Instant::now());
    }
    Ok(())
}

fn handle_key(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    if app.show_help {
        app.show_help = false;
        return Ok(());
    }
    if app.input_mode == InputMode::Normal && app.dismiss_alert().is_some() {
        return Ok(());
    }
    match app.input_mode {
        InputMode::Normal => handle_normal_input(key, app, db),
        InputMode::Command => handle_command_input(key, app, db),
        InputMode::Confirm => handle_confirm_input(key, app, db),
    }
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let page = app.visible_rows.max(1);
            scroll_down(&mut app.row_index, &mut app.row_scroll, app.rows.len(), page);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            scroll_up(&mut app.row_index, &mut app.row_scroll);
        }
        KeyCode::Char('g') | KeyCode::Home => {
            app.row_index = 0;
            app.row_scroll = 0;
        }
        KeyCode::Char('G') | KeyCode::End => {
            if !app.rows.is_empty() {
                app.row_index = app.rows.len() - 1;
                let page = app.visible_rows.max(1);
                app.row_scroll = app.row_index.saturating_sub(page - 1);
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            commands::handle_command("delete-limit", app, db)?;
        }
        KeyCode::Char('e') => {
            app.input_mode = InputMode::Command;
            app.command_input = "edit-limit ".into();
        }
        KeyCode::Char('r') => {
            commands::handle_command("refresh", app, db)?;
        }
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Esc => {
            app.status_message.clear();
        }
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = std::mem::take(&mut app.command_input);
            app.input_mode = InputMode::Normal;
            commands::handle_command(&input, app, db)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(PendingAction::DeleteLimit { id, category }) = app.pending_action.take() {
                app.delete_limit(db, id, &category);
            }
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
        _ => {}
    }
    Ok(())
}
