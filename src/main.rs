mod app;
mod config;
mod git;
mod ui;
mod watch;

use anyhow::{Context, Result};
use app::{App, InputMode, Mode, PromptKind};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::fs::File;
use std::io::{self, Stdout};
use std::path::Path;
use std::sync::{mpsc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use watch::{RepoWatcher, WatchEvent};

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Side-by-side git diff viewer and staging client
#[derive(Parser)]
#[command(name = "gitgud", version, about)]
struct Cli {
    /// Repository to open (defaults to the last active one)
    path: Option<String>,

    /// Print the aligned diff of FILE to stdout and exit
    #[arg(long, value_name = "FILE")]
    dump: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    if let Some(ref file) = cli.dump {
        let dir = cli.path.as_deref().unwrap_or(".");
        return dump_diff(dir, file);
    }

    let settings_path = config::settings_path()?;
    let settings = config::load_from(&settings_path)?;
    let mut app = App::new(settings, settings_path);

    match cli.path {
        Some(ref path) => {
            if let Err(e) = app.open_repository(path) {
                app.notify(&format!("Cannot open {}: {}", path, e));
            }
        }
        None => app.open_initial_repo(),
    }

    // Load syntax highlighting (once, reused for all files)
    let highlighter = ui::highlight::Highlighter::new();

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app, &highlighter);
    restore_terminal(&mut terminal)?;

    if let Err(err) = result {
        eprintln!("Error: {:?}", err);
    }
    Ok(())
}

/// Log to the file named by `GITGUD_LOG`; stay silent otherwise so nothing
/// is written over the TUI
fn init_tracing() -> Result<()> {
    let Ok(log_path) = std::env::var("GITGUD_LOG") else {
        return Ok(());
    };
    let file = File::options()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gitgud=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// Non-interactive mode: print the two aligned columns of one file's diff
fn dump_diff(dir: &str, file: &str) -> Result<()> {
    let root = git::repo_root_in(dir)?;
    let entries = git::status(&root)?;
    let entry = entries
        .into_iter()
        .find(|e| e.path == file)
        .unwrap_or_else(|| git::StatusEntry {
            path: file.to_string(),
            orig_path: None,
            kind: git::ChangeKind::Modified,
            staged: false,
            selected: true,
        });
    let diff = git::diff_entry(&root, &entry)?;
    print!("{}", diff);
    Ok(())
}

fn setup_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn start_watcher(app: &mut App, tx: &mpsc::Sender<WatchEvent>) -> Option<RepoWatcher> {
    let path = app.repo.as_ref()?.path.clone();
    match RepoWatcher::new(Path::new(&path), 500, tx.clone()) {
        Ok(w) => {
            app.watching = true;
            Some(w)
        }
        Err(e) => {
            warn!(path = %path, error = %e, "could not watch repository");
            app.watching = false;
            None
        }
    }
}

fn run_app(terminal: &mut Term, app: &mut App, hl: &ui::highlight::Highlighter) -> Result<()> {
    let (watch_tx, watch_rx) = mpsc::channel::<WatchEvent>();

    let mut watched_path = app.repo.as_ref().map(|r| r.path.clone());
    app.watching = true;
    let mut watcher = start_watcher(app, &watch_tx);

    loop {
        terminal.draw(|f| ui::draw(f, app, hl))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let outcome = match app.input_mode {
                        InputMode::Search => handle_search_input(app, key),
                        InputMode::Prompt => handle_prompt_input(app, key),
                        InputMode::Normal => match app.mode {
                            Mode::Normal => handle_normal_input(app, key, terminal),
                            Mode::Delete => handle_delete_input(app, key),
                            Mode::Stash => handle_stash_input(app, key),
                        },
                    };
                    if let Err(e) = outcome {
                        warn!(error = %e, "action failed");
                        app.notify(&format!("{:#}", e));
                    }
                }
            }
        }

        // Follow the open repository; `w` toggles watching off and on
        let current_path = app.repo.as_ref().map(|r| r.path.clone());
        if !app.watching {
            watcher = None;
        } else if watcher.is_none() || current_path != watched_path {
            watcher = start_watcher(app, &watch_tx);
        }
        watched_path = current_path;

        let mut changed = 0usize;
        while let Ok(WatchEvent::RepoChanged(paths)) = watch_rx.try_recv() {
            changed += paths.len();
        }
        if changed > 0 {
            debug!(changed, "repository changed on disk");
            if let Err(e) = app.refresh() {
                warn!(error = %e, "refresh after file change failed");
            }
        }

        app.tick();

        if app.should_quit {
            return Ok(());
        }
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

fn handle_normal_input(app: &mut App, key: KeyEvent, terminal: &mut Term) -> Result<()> {
    if is_quit(&key) {
        app.should_quit = true;
        return Ok(());
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Staging list
        KeyCode::Char('j') | KeyCode::Down => app.next_entry(),
        KeyCode::Char('k') | KeyCode::Up => app.prev_entry(),
        KeyCode::Char('v') | KeyCode::Char(' ') => app.toggle_entry_selected(),
        KeyCode::Char('V') => app.toggle_all_selected(),

        // Diff scrolling
        KeyCode::Char('J') | KeyCode::PageDown => app.scroll_down(),
        KeyCode::Char('K') | KeyCode::PageUp => app.scroll_up(),

        // Modes
        KeyCode::Char('d') if app.repo.is_some() => app.set_mode(Mode::Delete),
        KeyCode::Char('s') if app.repo.is_some() => app.set_mode(Mode::Stash),

        // Quick search
        KeyCode::Char('b') => app.open_branch_search(),
        KeyCode::Char('p') => app.open_repo_search(),

        // Prompts
        KeyCode::Char('c') => app.start_prompt(PromptKind::CommitMessage),
        KeyCode::Char('o') => app.start_prompt(PromptKind::OpenRepo),
        KeyCode::Char('n') => app.start_prompt(PromptKind::NewRepo),
        KeyCode::Char('N') => app.start_prompt(PromptKind::NewBranch),

        KeyCode::Char('u') => app.undo_last_commit()?,
        KeyCode::Char('r') => {
            app.refresh()?;
            app.notify("Refreshed");
        }
        KeyCode::Char('w') => {
            app.watching = !app.watching;
            app.notify(if app.watching { "Watching for changes" } else { "Stopped watching" });
        }
        KeyCode::Char(',') => edit_settings(app, terminal)?,
        _ => {}
    }
    Ok(())
}

/// Hand the terminal to `$EDITOR`, then reload whatever was saved
fn edit_settings(app: &mut App, terminal: &mut Term) -> Result<()> {
    restore_terminal(terminal)?;
    let edited = config::open_settings_in_editor(&app.settings_path);
    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()?;
    edited?;

    app.settings = config::load_from(&app.settings_path)?;
    info!(path = %app.settings_path.display(), "settings reloaded");
    app.notify("Settings reloaded");
    Ok(())
}

fn handle_delete_input(app: &mut App, key: KeyEvent) -> Result<()> {
    if is_quit(&key) {
        app.should_quit = true;
        return Ok(());
    }
    match key.code {
        KeyCode::Char('d') => {
            app.set_mode(Mode::Normal);
            app.discard_active()?;
        }
        KeyCode::Char('a') => {
            app.set_mode(Mode::Normal);
            app.discard_all()?;
        }
        KeyCode::Esc | KeyCode::Char('q') => app.set_mode(Mode::Normal),
        _ => {}
    }
    Ok(())
}

fn handle_stash_input(app: &mut App, key: KeyEvent) -> Result<()> {
    if is_quit(&key) {
        app.should_quit = true;
        return Ok(());
    }
    match key.code {
        KeyCode::Char('s') => {
            app.set_mode(Mode::Normal);
            app.stash_changes()?;
        }
        KeyCode::Char('a') => {
            app.set_mode(Mode::Normal);
            app.apply_branch_stash()?;
        }
        KeyCode::Char('d') => {
            app.set_mode(Mode::Normal);
            app.drop_branch_stash()?;
        }
        KeyCode::Esc | KeyCode::Char('q') => app.set_mode(Mode::Normal),
        _ => {}
    }
    Ok(())
}

fn handle_search_input(app: &mut App, key: KeyEvent) -> Result<()> {
    if is_quit(&key) {
        app.should_quit = true;
        return Ok(());
    }
    match key.code {
        KeyCode::Esc => app.close_search(),
        KeyCode::Enter => app.submit_search()?,
        KeyCode::Down | KeyCode::Tab => {
            if let Some(s) = app.search.as_mut() {
                s.select_next();
            }
        }
        KeyCode::Up | KeyCode::BackTab => {
            if let Some(s) = app.search.as_mut() {
                s.select_prev();
            }
        }
        KeyCode::Backspace => {
            if let Some(s) = app.search.as_mut() {
                s.pop_char();
            }
        }
        KeyCode::Char(c) => {
            if let Some(s) = app.search.as_mut() {
                s.push_char(c);
            }
        }
        _ => {}
    }
    Ok(())
}

fn handle_prompt_input(app: &mut App, key: KeyEvent) -> Result<()> {
    if is_quit(&key) {
        app.should_quit = true;
        return Ok(());
    }
    match key.code {
        KeyCode::Esc => app.cancel_prompt(),
        KeyCode::Enter => app.submit_prompt()?,
        KeyCode::Backspace => {
            if let Some(p) = app.prompt.as_mut() {
                p.input.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(p) = app.prompt.as_mut() {
                p.input.push(c);
            }
        }
        _ => {}
    }
    Ok(())
}
