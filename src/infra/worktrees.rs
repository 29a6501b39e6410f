use crate::domain::{Session, WorktreeEntry, worktrees_dir};
use crate::infra::{GitError, project_metadata_dir, remove_worktree, resolve_repo_root};
use std::fs;
use std::path::{Path, PathBuf};

/// Lists worktree directories for every repository the catalog's sessions ran in.
pub fn discover_worktrees(sessions: &[Session]) -> Vec<WorktreeEntry> {
    let roots = unique_repo_roots(sessions, |path| match resolve_repo_root(path) {
        Ok(root) => Some(root),
        Err(error) => {
            tracing::trace!(path = %path.display(), %error, "not a git checkout");
            None
        }
    });
    list_worktrees(&roots)
}

/// Resolves each distinct non-empty project path to its repository root, deduplicated in
/// first-seen order. Paths that fail to resolve are skipped.
pub fn unique_repo_roots(
    sessions: &[Session],
    resolve: impl Fn(&Path) -> Option<PathBuf>,
) -> Vec<PathBuf> {
    let mut visited: Vec<&Path> = Vec::new();
    let mut roots: Vec<PathBuf> = Vec::new();

    for session in sessions {
        if !session.has_project_path() || visited.contains(&session.project_path.as_path()) {
            continue;
        }
        visited.push(session.project_path.as_path());

        let Some(root) = resolve(&session.project_path) else {
            continue;
        };
        if !roots.contains(&root) {
            roots.push(root);
        }
    }

    roots
}

/// Each immediate subdirectory of `<root>-worktrees` is one entry. Missing or unreadable
/// directories contribute nothing.
pub fn list_worktrees(roots: &[PathBuf]) -> Vec<WorktreeEntry> {
    let mut entries = Vec::new();
    for root in roots {
        let dir = worktrees_dir(root);
        let Ok(children) = fs::read_dir(&dir) else {
            continue;
        };

        let mut found: Vec<WorktreeEntry> = children
            .filter_map(Result::ok)
            .filter(|child| child.file_type().is_ok_and(|kind| kind.is_dir()))
            .map(|child| WorktreeEntry {
                path: child.path(),
                branch: child.file_name().to_string_lossy().to_string(),
                repo_root: root.clone(),
            })
            .collect();
        found.sort_by(|a, b| a.branch.cmp(&b.branch));
        entries.extend(found);
    }
    entries
}

/// Removes the worktree via git, then best-effort deletes its metadata directory under
/// `projects_dir`. Only the git step can fail.
pub fn remove_worktree_entry(entry: &WorktreeEntry, projects_dir: &Path) -> Result<(), GitError> {
    remove_worktree(&entry.repo_root, &entry.path)?;
    tracing::debug!(path = %entry.path.display(), "worktree removed");
    remove_metadata_dir(projects_dir, &entry.path);
    Ok(())
}

fn remove_metadata_dir(projects_dir: &Path, worktree_path: &Path) {
    let dir = project_metadata_dir(projects_dir, worktree_path);
    if !dir.is_dir() {
        return;
    }
    if let Err(error) = fs::remove_dir_all(&dir) {
        tracing::debug!(dir = %dir.display(), %error, "metadata cleanup failed");
    }
}
