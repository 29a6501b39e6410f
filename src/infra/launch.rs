use crate::domain::{
    LaunchError, LaunchFlags, LaunchPlan, Session, plan_worktree_resume, worktree_source,
    worktree_target,
};
use crate::infra::{GitError, add_worktree, project_metadata_dir, resolve_repo_root};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("'{0}' not found in PATH")]
    BinaryNotFound(String),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error("failed to find git root for {path}: {source}")]
    RepoRoot {
        path: String,
        #[source]
        source: GitError,
    },

    #[error("failed to create worktree: {0}")]
    AddWorktree(#[source] GitError),

    #[error("failed to prepare project dir {path}: {source}")]
    MetadataDir {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to run {program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: io::Error,
    },
}

pub fn find_claude_binary(name: &str) -> Result<PathBuf, ExecError> {
    which::which(name).map_err(|_| ExecError::BinaryNotFound(name.to_string()))
}

/// Creates (or reuses) the branch worktree for `session`, mirrors the session log into the
/// worktree's metadata directory, and returns the plan that resumes inside it.
pub fn prepare_worktree_resume(
    session: &Session,
    flags: LaunchFlags,
    projects_dir: &Path,
) -> Result<LaunchPlan, ExecError> {
    let source = worktree_source(session)?;
    let repo_root = resolve_repo_root(source).map_err(|source_error| ExecError::RepoRoot {
        path: source.display().to_string(),
        source: source_error,
    })?;
    let target = worktree_target(&repo_root, &session.git_branch);

    let mut out = io::stdout().lock();
    if target.path.exists() {
        let _ = writeln!(out, "Reusing existing worktree at {}", target.path.display());
    } else {
        let _ = writeln!(
            out,
            "Creating worktree at {} for branch {}...",
            target.path.display(),
            target.branch
        );
        add_worktree(&target.repo_root, &target.path, &target.branch)
            .map_err(ExecError::AddWorktree)?;
    }

    mirror_session_log(projects_dir, &target.path, &session.file_path)?;
    let _ = writeln!(out, "Resuming session in worktree {}...", target.path.display());
    Ok(plan_worktree_resume(session, &target, flags))
}

/// Links `log_path` into the metadata directory of `worktree_path` so the assistant finds the
/// session from there. An existing entry is left alone.
pub fn mirror_session_log(
    projects_dir: &Path,
    worktree_path: &Path,
    log_path: &Path,
) -> Result<(), ExecError> {
    let dir = project_metadata_dir(projects_dir, worktree_path);
    fs::create_dir_all(&dir).map_err(|source| ExecError::MetadataDir {
        path: dir.display().to_string(),
        source,
    })?;

    let Some(file_name) = log_path.file_name() else {
        return Ok(());
    };
    let link = dir.join(file_name);
    if fs::symlink_metadata(&link).is_ok() {
        return Ok(());
    }
    if let Err(error) = link_file(log_path, &link) {
        tracing::debug!(link = %link.display(), %error, "failed to mirror session log");
    }
    Ok(())
}

#[cfg(unix)]
fn link_file(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(not(unix))]
fn link_file(original: &Path, link: &Path) -> io::Result<()> {
    fs::copy(original, link).map(|_| ())
}

/// Replaces the current process with `binary plan.args..` running in `plan.working_dir`.
/// Only returns on failure.
pub fn exec_plan(binary: &Path, plan: &LaunchPlan) -> Result<(), ExecError> {
    let mut command = Command::new(binary);
    command.args(&plan.args);
    if let Some(dir) = &plan.working_dir {
        command.current_dir(dir);
    }
    tracing::debug!(binary = %binary.display(), args = ?plan.args, dir = ?plan.working_dir, "launching");

    let program = binary.display().to_string();

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        let source = command.exec();
        Err(ExecError::Exec { program, source })
    }

    #[cfg(not(unix))]
    {
        let status = command
            .status()
            .map_err(|source| ExecError::Exec { program, source })?;
        std::process::exit(status.code().unwrap_or(1));
    }
}
