use std::path::{Path, PathBuf};
use time::{Duration, OffsetDateTime};

/// One aggregated transcript file. Built by `SessionAggregator::finish` and never mutated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Session {
    pub id: String,
    /// Display hint decoded from the project directory name.
    pub project: String,
    /// Working directory recorded in the log; empty when never observed.
    pub project_path: PathBuf,
    pub summary: String,
    pub git_branch: String,
    /// `UNIX_EPOCH` when no line carried a parseable timestamp.
    pub last_active: OffsetDateTime,
    pub message_count: usize,
    pub file_path: PathBuf,
    /// Concatenated message text for full-text search; empty unless collected.
    pub message_text: String,
}

impl Session {
    pub fn has_project_path(&self) -> bool {
        !self.project_path.as_os_str().is_empty()
    }

    pub fn time_ago(&self, now: OffsetDateTime) -> String {
        format_time_ago(now - self.last_active)
    }
}

pub type Catalog = Vec<Session>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectEntry {
    pub name: String,
    pub path: PathBuf,
}

/// One directory under `<repo-root>-worktrees`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorktreeEntry {
    pub path: PathBuf,
    /// Directory name, i.e. the branch with separators replaced.
    pub branch: String,
    pub repo_root: PathBuf,
}

impl WorktreeEntry {
    pub fn repo_name(&self) -> String {
        self.repo_root
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.repo_root.display().to_string())
    }
}

pub fn format_time_ago(elapsed: Duration) -> String {
    if elapsed < Duration::MINUTE {
        return "just now".to_string();
    }
    if elapsed < Duration::HOUR {
        return format!("{}m ago", elapsed.whole_minutes());
    }
    if elapsed < Duration::DAY {
        return format!("{}h ago", elapsed.whole_hours());
    }
    let days = elapsed.whole_days();
    if days < 30 {
        return format!("{days}d ago");
    }
    format!("{}mo ago", days / 30)
}

/// Builds the new-session project list: `cwd` first (when non-empty), then each distinct
/// project path in catalog order.
pub fn build_project_entries(sessions: &[Session], cwd: &Path) -> Vec<ProjectEntry> {
    let mut seen: Vec<&Path> = Vec::new();
    let mut entries = Vec::new();

    if !cwd.as_os_str().is_empty() {
        let base = cwd
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| cwd.display().to_string());
        entries.push(ProjectEntry {
            name: format!("{base} (current dir)"),
            path: cwd.to_path_buf(),
        });
        seen.push(cwd);
    }

    for session in sessions {
        if !session.has_project_path() || seen.contains(&session.project_path.as_path()) {
            continue;
        }
        seen.push(session.project_path.as_path());
        entries.push(ProjectEntry {
            name: session.project.clone(),
            path: session.project_path.clone(),
        });
    }

    entries
}

#[cfg(test)]
pub(crate) fn sample_session(id: &str, project: &str, summary: &str) -> Session {
    Session {
        id: id.to_string(),
        project: project.to_string(),
        project_path: PathBuf::from(format!("/work/{project}")),
        summary: summary.to_string(),
        git_branch: String::new(),
        last_active: OffsetDateTime::UNIX_EPOCH,
        message_count: 1,
        file_path: PathBuf::from(format!("/logs/{id}.jsonl")),
        message_text: String::new(),
    }
}
