mod app;
mod cli;
mod domain;
mod infra;
mod ui;

use crate::app::{AppCommand, AppData, AppEvent, AppModel, Outcome};
use crate::cli::{CliCommand, CliInvocation};
use crate::domain::{LaunchFlags, plan_new_session, plan_resume};
use crate::infra::{
    CatalogOutput, ExecError, LoadCatalogError, LoadOptions, ResolveProjectsDirError, Settings,
    discover_worktrees, exec_plan, find_claude_binary, init_logging, load_catalog,
    prepare_worktree_resume, remove_worktree_entry,
};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::size as terminal_size;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Sender, channel};
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Error)]
enum MainError {
    #[error(transparent)]
    App(#[from] crate::app::AppError),

    #[error(transparent)]
    Cli(#[from] crate::cli::CliRunError),

    #[error(transparent)]
    Settings(#[from] ResolveProjectsDirError),

    #[error("Error loading sessions: {0}")]
    Catalog(#[from] LoadCatalogError),

    #[error("Error: {0}")]
    Exec(#[from] ExecError),

    #[error("failed to open log file: {0}")]
    Log(#[source] io::Error),
}

fn main() {
    if let Err(error) = run_main() {
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "{error}");
        std::process::exit(crate::cli::FAILURE_EXIT_CODE);
    }
}

fn run_main() -> Result<(), MainError> {
    let args = std::env::args().collect::<Vec<_>>();
    let invocation = match crate::cli::parse_invocation(&args) {
        Ok(invocation) => invocation,
        Err(error) => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "{error}");
            let _ = writeln!(err);
            print_help();
            std::process::exit(crate::cli::FAILURE_EXIT_CODE);
        }
    };

    match invocation {
        CliInvocation::PrintHelp => {
            print_help();
            Ok(())
        }
        CliInvocation::PrintVersion => {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliInvocation::Tui => {
            let settings = load_settings()?;
            run_tui(&settings)
        }
        CliInvocation::Command(CliCommand::List) => {
            let settings = load_settings()?;
            let Some(catalog) = load_sessions(&settings, LoadOptions::default())? else {
                return Ok(());
            };
            let mut out = io::stdout().lock();
            crate::cli::run_list(&catalog.sessions, OffsetDateTime::now_utc(), &mut out)?;
            Ok(())
        }
        CliInvocation::Command(CliCommand::Resume { session_id }) => {
            let settings = load_settings()?;
            let Some(catalog) = load_sessions(&settings, LoadOptions::default())? else {
                return Ok(());
            };
            let session = crate::cli::find_session(&catalog.sessions, &session_id)?;
            launch(
                &settings,
                Outcome::Resume {
                    session: session.clone(),
                    flags: LaunchFlags::default(),
                },
            )
        }
    }
}

fn print_help() {
    let text = format!(
        "{name} - browse and resume Claude Code sessions\n\nUSAGE:\n  {name}                     Start the TUI\n  {name} list                List all sessions\n  {name} resume <session-id> Resume a session without the TUI\n  {name} --help | --version\n\nOUTPUT:\n  list: PROJECT<TAB>SUMMARY<TAB>BRANCH<TAB>LAST ACTIVE<TAB>SESSION ID\n\nENV:\n  {projects}   Override the projects dir (default: ~/.claude/projects)\n  {bin}  Assistant binary to launch (default: claude)\n  {log}         Write debug logs to this file\n",
        name = env!("CARGO_PKG_NAME"),
        projects = crate::infra::PROJECTS_DIR_ENV,
        bin = crate::infra::CLAUDE_BIN_ENV,
        log = crate::infra::LOG_FILE_ENV,
    );
    let mut out = io::stdout().lock();
    let _ = write!(out, "{text}");
}

fn load_settings() -> Result<Settings, MainError> {
    let settings = Settings::from_env()?;
    init_logging(settings.log_file.as_deref()).map_err(MainError::Log)?;
    tracing::debug!(projects_dir = %settings.projects_dir.display(), "settings resolved");
    Ok(settings)
}

/// `None` when the catalog is empty; the message has already been printed.
fn load_sessions(
    settings: &Settings,
    options: LoadOptions,
) -> Result<Option<CatalogOutput>, MainError> {
    let catalog = load_catalog(&settings.projects_dir, options)?;
    if catalog.sessions.is_empty() {
        let mut err = io::stderr().lock();
        let _ = writeln!(
            err,
            "No sessions found in {}",
            settings.projects_dir.display()
        );
        return Ok(None);
    }
    Ok(Some(catalog))
}

fn run_tui(settings: &Settings) -> Result<(), MainError> {
    let Some(catalog) = load_sessions(settings, LoadOptions { message_text: true })? else {
        return Ok(());
    };
    tracing::debug!(skipped = catalog.warnings.get(), "starting session browser");
    let data = AppData {
        sessions: Arc::new(catalog.sessions),
        cwd: std::env::current_dir().unwrap_or_default(),
    };
    let mut model = AppModel::new(data);

    let mut terminal = setup_terminal()?;
    if let Ok((width, height)) = terminal_size() {
        model = model.with_terminal_size(width, height);
    }
    let result = run(&mut terminal, model, &settings.projects_dir);
    restore_terminal(&mut terminal)?;
    let model = result?;

    match model.outcome {
        Some(outcome) => launch(settings, outcome),
        None => Ok(()),
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, app::AppError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result<(), app::AppError> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Drives `update` from one inbox fed by the input thread and by worker threads, until a
/// command asks to quit.
fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut model: AppModel,
    projects_dir: &std::path::Path,
) -> Result<AppModel, app::AppError> {
    let (tx, rx) = channel::<AppEvent>();
    spawn_input_reader(tx.clone());

    terminal.draw(|frame| ui::render(frame, &model))?;
    while let Ok(event) = rx.recv() {
        let (next, command) = app::update(model, event);
        model = next;
        match command {
            AppCommand::None => {}
            AppCommand::Quit => return Ok(model),
            AppCommand::DiscoverWorktrees => {
                spawn_worktree_discovery(tx.clone(), Arc::clone(&model.data.sessions));
            }
            AppCommand::RemoveWorktree { entry } => {
                spawn_worktree_removal(tx.clone(), entry, projects_dir.to_path_buf());
            }
        }
        terminal.draw(|frame| ui::render(frame, &model))?;
    }
    Ok(model)
}

fn spawn_input_reader(tx: Sender<AppEvent>) {
    std::thread::spawn(move || {
        loop {
            let event = match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => AppEvent::Key(key),
                Ok(Event::Resize(width, height)) => AppEvent::Resize(width, height),
                Ok(_) => continue,
                Err(error) => {
                    tracing::debug!(%error, "terminal input closed");
                    return;
                }
            };
            if tx.send(event).is_err() {
                return;
            }
        }
    });
}

fn spawn_worktree_discovery(tx: Sender<AppEvent>, sessions: Arc<Vec<domain::Session>>) {
    std::thread::spawn(move || {
        let entries = discover_worktrees(&sessions);
        tracing::debug!(count = entries.len(), "worktrees discovered");
        let _ = tx.send(AppEvent::WorktreesDiscovered(entries));
    });
}

fn spawn_worktree_removal(tx: Sender<AppEvent>, entry: domain::WorktreeEntry, projects_dir: PathBuf) {
    std::thread::spawn(move || {
        let result = remove_worktree_entry(&entry, &projects_dir).map_err(|error| {
            tracing::debug!(path = %entry.path.display(), %error, "worktree removal failed");
            error.to_string()
        });
        let _ = tx.send(AppEvent::WorktreeRemoved { entry, result });
    });
}

fn launch(settings: &Settings, outcome: Outcome) -> Result<(), MainError> {
    let binary = find_claude_binary(&settings.claude_bin)?;
    let plan = match outcome {
        Outcome::Resume { session, flags } if flags.use_worktree => {
            prepare_worktree_resume(&session, flags, &settings.projects_dir)?
        }
        Outcome::Resume { session, flags } => plan_resume(&session, flags),
        Outcome::NewSession { path, flags } => {
            if flags.use_worktree {
                tracing::debug!("worktree flag ignored for new sessions");
            }
            plan_new_session(&path, flags)
        }
    };
    exec_plan(&binary, &plan)?;
    Ok(())
}
