use crate::domain::Session;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const RESUME_FLAG: &str = "-r";
pub const SKIP_PERMISSIONS_FLAG: &str = "--dangerously-skip-permissions";
pub const WORKTREES_DIR_SUFFIX: &str = "-worktrees";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LaunchFlags {
    pub skip_permissions: bool,
    pub use_worktree: bool,
}

/// What the process-replacement step should run: `program args..` inside `working_dir`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LaunchPlan {
    /// `None` keeps the current directory.
    pub working_dir: Option<PathBuf>,
    pub args: Vec<String>,
}

/// A worktree that must exist (and have the session log mirrored into it) before launching.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorktreeTarget {
    pub repo_root: PathBuf,
    pub branch: String,
    pub path: PathBuf,
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum LaunchError {
    #[error("session has no git branch, cannot create worktree")]
    MissingBranch,

    #[error("session has no project path")]
    MissingProjectPath,
}

pub fn resume_args(session_id: &str, flags: LaunchFlags) -> Vec<String> {
    let mut args = vec![RESUME_FLAG.to_string(), session_id.to_string()];
    if flags.skip_permissions {
        args.push(SKIP_PERMISSIONS_FLAG.to_string());
    }
    args
}

/// Resume in place: run in the session's recorded directory when there is one.
pub fn plan_resume(session: &Session, flags: LaunchFlags) -> LaunchPlan {
    LaunchPlan {
        working_dir: session
            .has_project_path()
            .then(|| session.project_path.clone()),
        args: resume_args(&session.id, flags),
    }
}

pub fn plan_new_session(project_path: &Path, flags: LaunchFlags) -> LaunchPlan {
    let mut args = Vec::new();
    if flags.skip_permissions {
        args.push(SKIP_PERMISSIONS_FLAG.to_string());
    }
    LaunchPlan {
        working_dir: (!project_path.as_os_str().is_empty()).then(|| project_path.to_path_buf()),
        args,
    }
}

/// Checks that a session can be resumed in a worktree and returns the directory whose repo root
/// must be resolved.
pub fn worktree_source(session: &Session) -> Result<&Path, LaunchError> {
    if session.git_branch.is_empty() {
        return Err(LaunchError::MissingBranch);
    }
    if !session.has_project_path() {
        return Err(LaunchError::MissingProjectPath);
    }
    Ok(&session.project_path)
}

pub fn worktrees_dir(repo_root: &Path) -> PathBuf {
    let mut name = repo_root.as_os_str().to_os_string();
    name.push(WORKTREES_DIR_SUFFIX);
    PathBuf::from(name)
}

pub fn sanitize_branch(branch: &str) -> String {
    branch.replace('/', "-")
}

pub fn worktree_target(repo_root: &Path, branch: &str) -> WorktreeTarget {
    WorktreeTarget {
        repo_root: repo_root.to_path_buf(),
        branch: branch.to_string(),
        path: worktrees_dir(repo_root).join(sanitize_branch(branch)),
    }
}

pub fn plan_worktree_resume(
    session: &Session,
    target: &WorktreeTarget,
    flags: LaunchFlags,
) -> LaunchPlan {
    LaunchPlan {
        working_dir: Some(target.path.clone()),
        args: resume_args(&session.id, flags),
    }
}
