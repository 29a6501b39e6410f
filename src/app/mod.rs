mod query_editor;

use crate::domain::{
    LaunchFlags, ProjectEntry, Session, WorktreeEntry, build_project_entries, filter_sessions,
    parse_query,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub use query_editor::QueryEditor;

const DEFAULT_PAGE_STEP: usize = 10;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug)]
pub struct AppData {
    pub sessions: Arc<Vec<Session>>,
    /// Directory the launcher was started from; offered first for new sessions.
    pub cwd: PathBuf,
}

/// The selection state of the interactive loop. Only `update` changes it.
#[derive(Clone, Debug)]
pub struct AppModel {
    pub data: AppData,
    pub mode: Mode,
    pub query: QueryEditor,
    pub full_text: bool,
    pub flags: LaunchFlags,
    /// Catalog indices currently listed, in catalog order.
    pub filtered: Vec<usize>,
    pub selected: usize,
    pub terminal_size: (u16, u16),
    pub outcome: Option<Outcome>,
}

#[derive(Clone, Debug)]
pub enum Mode {
    Normal,
    Searching,
    Worktrees(WorktreesView),
    NewSession(NewSessionView),
    Help,
}

#[derive(Clone, Debug, Default)]
pub struct WorktreesView {
    /// `None` until discovery completes.
    pub entries: Option<Vec<WorktreeEntry>>,
    pub selected: usize,
    pub status: Option<String>,
    pub removing: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct NewSessionView {
    pub projects: Vec<ProjectEntry>,
    pub selected: usize,
}

/// How the loop ended when the user picked something.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    Resume { session: Session, flags: LaunchFlags },
    NewSession { path: PathBuf, flags: LaunchFlags },
}

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    WorktreesDiscovered(Vec<WorktreeEntry>),
    WorktreeRemoved {
        entry: WorktreeEntry,
        result: Result<(), String>,
    },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AppCommand {
    None,
    Quit,
    DiscoverWorktrees,
    RemoveWorktree { entry: WorktreeEntry },
}

impl AppModel {
    pub fn new(data: AppData) -> Self {
        let filtered = (0..data.sessions.len()).collect();
        Self {
            data,
            mode: Mode::Normal,
            query: QueryEditor::new(),
            full_text: false,
            flags: LaunchFlags::default(),
            filtered,
            selected: 0,
            terminal_size: (0, 0),
            outcome: None,
        }
    }

    pub fn with_terminal_size(mut self, width: u16, height: u16) -> Self {
        self.terminal_size = (width, height);
        self
    }

    pub fn selected_session(&self) -> Option<&Session> {
        let index = *self.filtered.get(self.selected)?;
        self.data.sessions.get(index)
    }

    pub fn filtered_sessions(&self) -> impl Iterator<Item = &Session> {
        self.filtered
            .iter()
            .filter_map(|index| self.data.sessions.get(*index))
    }

    fn apply_filters(&mut self) {
        let query = parse_query(self.query.text());
        self.filtered = filter_sessions(&self.data.sessions, &query, self.full_text);
        self.selected = 0;
    }
}

pub fn update(model: AppModel, event: AppEvent) -> (AppModel, AppCommand) {
    match event {
        AppEvent::Key(key) => update_on_key(model, key),
        AppEvent::Resize(width, height) => (model.with_terminal_size(width, height), AppCommand::None),
        AppEvent::WorktreesDiscovered(entries) => update_on_worktrees_discovered(model, entries),
        AppEvent::WorktreeRemoved { entry, result } => {
            update_on_worktree_removed(model, entry, result)
        }
    }
}

fn update_on_key(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return (model, AppCommand::Quit);
    }

    match std::mem::replace(&mut model.mode, Mode::Normal) {
        Mode::Normal => update_normal(model, key),
        Mode::Searching => update_searching(model, key),
        Mode::Worktrees(view) => update_worktrees(model, view, key),
        Mode::NewSession(view) => update_new_session(model, view, key),
        Mode::Help => update_help(model, key),
    }
}

fn update_normal(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let len = model.filtered.len();
    let page = page_step(model.terminal_size);

    match key.code {
        KeyCode::Char('q') => return (model, AppCommand::Quit),
        KeyCode::Esc => {
            if model.query.is_empty() {
                return (model, AppCommand::Quit);
            }
            model.query.clear();
            model.apply_filters();
        }
        KeyCode::Char('/') => model.mode = Mode::Searching,
        KeyCode::Char('?') => model.mode = Mode::Help,
        KeyCode::Up | KeyCode::Char('k') => model.selected = step_up(model.selected, 1),
        KeyCode::Down | KeyCode::Char('j') => model.selected = step_down(model.selected, 1, len),
        KeyCode::Home | KeyCode::Char('g') => model.selected = 0,
        KeyCode::End | KeyCode::Char('G') => model.selected = len.saturating_sub(1),
        KeyCode::PageUp => model.selected = step_up(model.selected, page),
        KeyCode::PageDown => model.selected = step_down(model.selected, page, len),
        KeyCode::Char('!') => model.flags.skip_permissions = !model.flags.skip_permissions,
        KeyCode::Char('w') => model.flags.use_worktree = !model.flags.use_worktree,
        KeyCode::Char('t') => {
            model.mode = Mode::Worktrees(WorktreesView::default());
            return (model, AppCommand::DiscoverWorktrees);
        }
        KeyCode::Char('n') => {
            let projects = build_project_entries(&model.data.sessions, &model.data.cwd);
            model.mode = Mode::NewSession(NewSessionView {
                projects,
                selected: 0,
            });
        }
        KeyCode::Enter => {
            let Some(session) = model.selected_session().cloned() else {
                return (model, AppCommand::None);
            };
            model.outcome = Some(Outcome::Resume {
                session,
                flags: model.flags,
            });
            return (model, AppCommand::Quit);
        }
        _ => {}
    }

    (model, AppCommand::None)
}

fn update_searching(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let len = model.filtered.len();

    match key.code {
        KeyCode::Esc => {
            model.query.clear();
            model.apply_filters();
            return (model, AppCommand::None);
        }
        KeyCode::Enter => return (model, AppCommand::None),
        KeyCode::Tab => {
            model.full_text = !model.full_text;
            model.apply_filters();
        }
        KeyCode::Up => model.selected = step_up(model.selected, 1),
        KeyCode::Down => model.selected = step_down(model.selected, 1, len),
        KeyCode::Left => model.query.move_left(),
        KeyCode::Right => model.query.move_right(),
        KeyCode::Home => model.query.move_home(),
        KeyCode::End => model.query.move_end(),
        KeyCode::Backspace => {
            model.query.backspace();
            model.apply_filters();
        }
        KeyCode::Delete => {
            model.query.delete_forward();
            model.apply_filters();
        }
        KeyCode::Char(character)
            if !character.is_control()
                && !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            model.query.insert_char(character);
            model.apply_filters();
        }
        _ => {}
    }

    model.mode = Mode::Searching;
    (model, AppCommand::None)
}

fn update_help(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    if !matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
        model.mode = Mode::Help;
    }
    (model, AppCommand::None)
}

fn update_worktrees(
    mut model: AppModel,
    mut view: WorktreesView,
    key: KeyEvent,
) -> (AppModel, AppCommand) {
    let len = view.entries.as_ref().map_or(0, Vec::len);
    let page = page_step(model.terminal_size);
    let mut command = AppCommand::None;

    match key.code {
        KeyCode::Esc => return (model, AppCommand::None),
        KeyCode::Char('q') => return (model, AppCommand::Quit),
        KeyCode::Up | KeyCode::Char('k') => view.selected = step_up(view.selected, 1),
        KeyCode::Down | KeyCode::Char('j') => view.selected = step_down(view.selected, 1, len),
        KeyCode::PageUp => view.selected = step_up(view.selected, page),
        KeyCode::PageDown => view.selected = step_down(view.selected, page, len),
        KeyCode::Char('d') | KeyCode::Char('x') => {
            let target = view
                .entries
                .as_ref()
                .and_then(|entries| entries.get(view.selected))
                .cloned();
            if let (Some(entry), None) = (target, view.removing.as_ref()) {
                view.status = Some(format!("Removing {}...", entry.path.display()));
                view.removing = Some(entry.path.clone());
                command = AppCommand::RemoveWorktree { entry };
            }
        }
        _ => {}
    }

    model.mode = Mode::Worktrees(view);
    (model, command)
}

fn update_new_session(
    mut model: AppModel,
    mut view: NewSessionView,
    key: KeyEvent,
) -> (AppModel, AppCommand) {
    let len = view.projects.len();

    match key.code {
        KeyCode::Esc => return (model, AppCommand::None),
        KeyCode::Char('q') => return (model, AppCommand::Quit),
        KeyCode::Up | KeyCode::Char('k') => view.selected = step_up(view.selected, 1),
        KeyCode::Down | KeyCode::Char('j') => view.selected = step_down(view.selected, 1, len),
        KeyCode::Char('!') => model.flags.skip_permissions = !model.flags.skip_permissions,
        KeyCode::Char('w') => model.flags.use_worktree = !model.flags.use_worktree,
        KeyCode::Enter => {
            if let Some(project) = view.projects.get(view.selected) {
                model.outcome = Some(Outcome::NewSession {
                    path: project.path.clone(),
                    flags: model.flags,
                });
                model.mode = Mode::NewSession(view);
                return (model, AppCommand::Quit);
            }
        }
        _ => {}
    }

    model.mode = Mode::NewSession(view);
    (model, AppCommand::None)
}

fn update_on_worktrees_discovered(
    mut model: AppModel,
    entries: Vec<WorktreeEntry>,
) -> (AppModel, AppCommand) {
    if let Mode::Worktrees(view) = &mut model.mode {
        view.entries = Some(entries);
        view.selected = 0;
        view.status = None;
    }
    (model, AppCommand::None)
}

fn update_on_worktree_removed(
    mut model: AppModel,
    entry: WorktreeEntry,
    result: Result<(), String>,
) -> (AppModel, AppCommand) {
    let Mode::Worktrees(view) = &mut model.mode else {
        return (model, AppCommand::None);
    };
    if view.removing.as_ref() == Some(&entry.path) {
        view.removing = None;
    }

    match result {
        Err(error) => {
            view.status = Some(format!("Error: {error}"));
        }
        Ok(()) => {
            view.status = Some(format!("Removed {}", entry.path.display()));
            if let Some(entries) = view.entries.as_mut() {
                if let Some(index) = entries.iter().position(|item| item.path == entry.path) {
                    entries.remove(index);
                }
                if view.selected >= entries.len() && view.selected > 0 {
                    view.selected -= 1;
                }
            }
        }
    }

    (model, AppCommand::None)
}

fn step_up(selected: usize, step: usize) -> usize {
    selected.saturating_sub(step)
}

fn step_down(selected: usize, step: usize, len: usize) -> usize {
    selected.saturating_add(step).min(len.saturating_sub(1))
}

/// Rows the session list shows for a terminal of this size; PgUp/PgDn move by this much.
pub fn page_step(terminal_size: (u16, u16)) -> usize {
    let (_width, height) = terminal_size;
    if height == 0 {
        return DEFAULT_PAGE_STEP;
    }
    usize::from(crate::ui::session_list_height(height)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample_session;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn chars(model: AppModel, text: &str) -> AppModel {
        text.chars().fold(model, |model, ch| {
            update(model, key(KeyCode::Char(ch))).0
        })
    }

    fn model_with(sessions: Vec<Session>) -> AppModel {
        AppModel::new(AppData {
            sessions: Arc::new(sessions),
            cwd: PathBuf::from("/home/me/launcher"),
        })
    }

    fn sample_model() -> AppModel {
        let mut with_text = sample_session("s3", "backend", "add metrics");
        with_text.message_text = "the deadlock is in the pool".to_string();
        model_with(vec![
            sample_session("s1", "backend", "Fix login"),
            sample_session("s2", "frontend", "fix layout"),
            with_text,
            sample_session("s4", "backend", "FIX cache"),
        ])
    }

    fn worktree(name: &str) -> WorktreeEntry {
        WorktreeEntry {
            path: PathBuf::from(format!("/code/repo-worktrees/{name}")),
            branch: name.to_string(),
            repo_root: PathBuf::from("/code/repo"),
        }
    }

    fn worktrees_model(names: &[&str]) -> AppModel {
        let (model, command) = update(sample_model(), key(KeyCode::Char('t')));
        assert_eq!(command, AppCommand::DiscoverWorktrees);
        let entries = names.iter().map(|name| worktree(name)).collect();
        update(model, AppEvent::WorktreesDiscovered(entries)).0
    }

    fn worktrees_view(model: &AppModel) -> &WorktreesView {
        match &model.mode {
            Mode::Worktrees(view) => view,
            other => panic!("expected worktrees mode, got {other:?}"),
        }
    }

    #[test]
    fn starts_in_normal_with_everything_listed() {
        let model = sample_model();
        assert!(matches!(model.mode, Mode::Normal));
        assert_eq!(model.filtered, vec![0, 1, 2, 3]);
        assert_eq!(model.selected_session().map(|s| s.id.as_str()), Some("s1"));
    }

    #[test]
    fn typing_filters_live_with_scope() {
        let (model, _) = update(sample_model(), key(KeyCode::Char('/')));
        assert!(matches!(model.mode, Mode::Searching));
        let model = chars(model, "@backend fix");
        assert_eq!(model.query.text(), "@backend fix");
        let ids: Vec<&str> = model.filtered_sessions().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s4"]);
    }

    #[test]
    fn filtering_resets_cursor() {
        let (model, _) = update(sample_model(), key(KeyCode::Down));
        let (model, _) = update(model, key(KeyCode::Down));
        assert_eq!(model.selected, 2);
        let (model, _) = update(model, key(KeyCode::Char('/')));
        let model = chars(model, "f");
        assert_eq!(model.selected, 0);
    }

    #[test]
    fn search_keys_do_not_trigger_normal_actions() {
        let (model, _) = update(sample_model(), key(KeyCode::Char('/')));
        let (model, command) = update(model, key(KeyCode::Char('q')));
        assert_eq!(command, AppCommand::None);
        assert!(matches!(model.mode, Mode::Searching));
        assert_eq!(model.query.text(), "q");
    }

    #[test]
    fn modified_chars_are_not_typed_into_query() {
        let (model, _) = update(sample_model(), key(KeyCode::Char('/')));
        let model = chars(model, "fix");
        let ctrl_w = AppEvent::Key(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL));
        let alt_b = AppEvent::Key(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::ALT));
        let (model, _) = update(model, ctrl_w);
        let (model, _) = update(model, alt_b);
        assert_eq!(model.query.text(), "fix");
        assert!(matches!(model.mode, Mode::Searching));

        let shifted = AppEvent::Key(KeyEvent::new(KeyCode::Char('X'), KeyModifiers::SHIFT));
        let (model, _) = update(model, shifted);
        assert_eq!(model.query.text(), "fixX");
    }

    #[test]
    fn tab_toggles_full_text_without_touching_query() {
        let (model, _) = update(sample_model(), key(KeyCode::Char('/')));
        let model = chars(model, "deadlock");
        assert!(model.filtered.is_empty());
        let (model, _) = update(model, key(KeyCode::Tab));
        assert!(model.full_text);
        assert_eq!(model.query.text(), "deadlock");
        assert_eq!(model.filtered, vec![2]);
        let (model, _) = update(model, key(KeyCode::Tab));
        assert!(!model.full_text);
        assert!(model.filtered.is_empty());
    }

    #[test]
    fn escape_in_search_clears_and_returns_to_normal() {
        let (model, _) = update(sample_model(), key(KeyCode::Char('/')));
        let model = chars(model, "layout");
        assert_eq!(model.filtered, vec![1]);
        let (model, _) = update(model, key(KeyCode::Esc));
        assert!(matches!(model.mode, Mode::Normal));
        assert!(model.query.is_empty());
        assert_eq!(model.filtered, vec![0, 1, 2, 3]);
    }

    #[test]
    fn enter_in_search_keeps_filter() {
        let (model, _) = update(sample_model(), key(KeyCode::Char('/')));
        let model = chars(model, "layout");
        let (model, command) = update(model, key(KeyCode::Enter));
        assert_eq!(command, AppCommand::None);
        assert!(matches!(model.mode, Mode::Normal));
        assert_eq!(model.filtered, vec![1]);

        let (model, command) = update(model, key(KeyCode::Esc));
        assert_eq!(command, AppCommand::None);
        assert_eq!(model.filtered.len(), 4);
        let (_, command) = update(model, key(KeyCode::Esc));
        assert_eq!(command, AppCommand::Quit);
    }

    #[test]
    fn enter_resumes_selected_session_with_flags() {
        let (model, _) = update(sample_model(), key(KeyCode::Down));
        let (model, _) = update(model, key(KeyCode::Char('!')));
        let (model, _) = update(model, key(KeyCode::Char('w')));
        let (model, command) = update(model, key(KeyCode::Enter));
        assert_eq!(command, AppCommand::Quit);
        let Some(Outcome::Resume { session, flags }) = model.outcome else {
            panic!("expected resume outcome");
        };
        assert_eq!(session.id, "s2");
        assert!(flags.skip_permissions);
        assert!(flags.use_worktree);
    }

    #[test]
    fn enter_on_empty_list_does_nothing() {
        let model = model_with(Vec::new());
        let (model, command) = update(model, key(KeyCode::Enter));
        assert_eq!(command, AppCommand::None);
        assert!(model.outcome.is_none());
    }

    #[test]
    fn quit_ends_without_selection() {
        let (model, command) = update(sample_model(), key(KeyCode::Char('q')));
        assert_eq!(command, AppCommand::Quit);
        assert!(model.outcome.is_none());

        let ctrl_c = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        let (model, _) = update(sample_model(), key(KeyCode::Char('/')));
        let (_, command) = update(model, ctrl_c);
        assert_eq!(command, AppCommand::Quit);
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let model = sample_model().with_terminal_size(80, 40);
        let (model, _) = update(model, key(KeyCode::Up));
        assert_eq!(model.selected, 0);
        let (model, _) = update(model, key(KeyCode::PageDown));
        assert_eq!(model.selected, 3);
        let (model, _) = update(model, key(KeyCode::Down));
        assert_eq!(model.selected, 3);
        let (model, _) = update(model, key(KeyCode::PageUp));
        assert_eq!(model.selected, 0);
        let (model, _) = update(model, key(KeyCode::End));
        assert_eq!(model.selected, 3);
        let (model, _) = update(model, key(KeyCode::Char('g')));
        assert_eq!(model.selected, 0);

        let empty = model_with(Vec::new());
        let (empty, _) = update(empty, key(KeyCode::PageDown));
        let (empty, _) = update(empty, key(KeyCode::End));
        assert_eq!(empty.selected, 0);
    }

    #[test]
    fn help_is_modal() {
        let (model, _) = update(sample_model(), key(KeyCode::Char('?')));
        assert!(matches!(model.mode, Mode::Help));
        let (model, command) = update(model, key(KeyCode::Down));
        assert_eq!(command, AppCommand::None);
        assert!(matches!(model.mode, Mode::Help));
        assert_eq!(model.selected, 0);
        let (model, _) = update(model, key(KeyCode::Char('?')));
        assert!(matches!(model.mode, Mode::Normal));
        let (model, _) = update(model, key(KeyCode::Char('?')));
        let (model, command) = update(model, key(KeyCode::Esc));
        assert_eq!(command, AppCommand::None);
        assert!(matches!(model.mode, Mode::Normal));
    }

    #[test]
    fn worktrees_show_removing_status_and_issue_command() {
        let model = worktrees_model(&["a", "b"]);
        let (model, _) = update(model, key(KeyCode::Down));
        let (model, command) = update(model, key(KeyCode::Char('d')));
        assert_eq!(command, AppCommand::RemoveWorktree { entry: worktree("b") });
        assert_eq!(
            worktrees_view(&model).status.as_deref(),
            Some("Removing /code/repo-worktrees/b...")
        );

        let (model, command) = update(model, key(KeyCode::Char('x')));
        assert_eq!(command, AppCommand::None);
        assert_eq!(worktrees_view(&model).entries.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn failed_removal_leaves_list_and_cursor() {
        let model = worktrees_model(&["a", "b", "c"]);
        let (model, _) = update(model, key(KeyCode::Down));
        let (model, _) = update(model, key(KeyCode::Char('d')));
        let event = AppEvent::WorktreeRemoved {
            entry: worktree("b"),
            result: Err("exit status: 128: fatal: dirty".to_string()),
        };
        let (model, _) = update(model, event);
        let view = worktrees_view(&model);
        assert_eq!(view.entries, Some(vec![worktree("a"), worktree("b"), worktree("c")]));
        assert_eq!(view.selected, 1);
        assert_eq!(view.status.as_deref(), Some("Error: exit status: 128: fatal: dirty"));
        assert_eq!(view.removing, None);
    }

    #[test]
    fn successful_removal_of_last_entry_clamps_cursor() {
        let model = worktrees_model(&["a", "b"]);
        let (model, _) = update(model, key(KeyCode::End));
        let (model, _) = update(model, key(KeyCode::Down));
        let (model, _) = update(model, key(KeyCode::Char('d')));
        let event = AppEvent::WorktreeRemoved {
            entry: worktree("b"),
            result: Ok(()),
        };
        let (model, _) = update(model, event);
        let view = worktrees_view(&model);
        assert_eq!(view.entries, Some(vec![worktree("a")]));
        assert_eq!(view.selected, 0);
        assert_eq!(view.status.as_deref(), Some("Removed /code/repo-worktrees/b"));

        let (model, _) = update(model, key(KeyCode::Char('d')));
        let event = AppEvent::WorktreeRemoved {
            entry: worktree("a"),
            result: Ok(()),
        };
        let (model, _) = update(model, event);
        let view = worktrees_view(&model);
        assert_eq!(view.entries, Some(Vec::new()));
        assert_eq!(view.selected, 0);
        let (model, command) = update(model, key(KeyCode::Char('d')));
        assert_eq!(command, AppCommand::None);
        let (_, command) = update(model, key(KeyCode::Down));
        assert_eq!(command, AppCommand::None);
    }

    #[test]
    fn leaving_worktrees_discards_list_and_late_events() {
        let model = worktrees_model(&["a"]);
        let (model, _) = update(model, key(KeyCode::Esc));
        assert!(matches!(model.mode, Mode::Normal));
        let (model, _) = update(model, AppEvent::WorktreesDiscovered(vec![worktree("z")]));
        assert!(matches!(model.mode, Mode::Normal));

        let (model, command) = update(model, key(KeyCode::Char('t')));
        assert_eq!(command, AppCommand::DiscoverWorktrees);
        assert_eq!(worktrees_view(&model).entries, None);
    }

    #[test]
    fn new_session_lists_cwd_first_and_returns_path() {
        let (model, _) = update(sample_model(), key(KeyCode::Char('n')));
        let Mode::NewSession(view) = &model.mode else {
            panic!("expected new session mode");
        };
        let names: Vec<&str> = view.projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["launcher (current dir)", "backend", "frontend"]);

        let (model, _) = update(model, key(KeyCode::Char('j')));
        let (model, _) = update(model, key(KeyCode::Char('!')));
        assert!(model.flags.skip_permissions);
        let (model, command) = update(model, key(KeyCode::Enter));
        assert_eq!(command, AppCommand::Quit);
        assert_eq!(
            model.outcome,
            Some(Outcome::NewSession {
                path: PathBuf::from("/work/backend"),
                flags: LaunchFlags {
                    skip_permissions: true,
                    use_worktree: false,
                },
            })
        );
    }

    #[test]
    fn new_session_escape_returns_to_normal() {
        let (model, _) = update(sample_model(), key(KeyCode::Char('n')));
        let (model, command) = update(model, key(KeyCode::Esc));
        assert_eq!(command, AppCommand::None);
        assert!(matches!(model.mode, Mode::Normal));
        assert!(model.outcome.is_none());
    }
}
