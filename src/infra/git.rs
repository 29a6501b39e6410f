use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] io::Error),

    #[error("{status}: {output}")]
    Failed { status: String, output: String },
}

fn git(dir: &Path) -> Command {
    let mut command = Command::new("git");
    command.arg("-C").arg(dir).stdin(Stdio::null());
    command
}

fn check(output: Output) -> Result<Output, GitError> {
    if output.status.success() {
        return Ok(output);
    }
    let mut text = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if text.is_empty() {
        text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    }
    Err(GitError::Failed {
        status: output.status.to_string(),
        output: text,
    })
}

/// `git -C <path> rev-parse --show-toplevel`
pub fn resolve_repo_root(path: &Path) -> Result<PathBuf, GitError> {
    let output = check(
        git(path)
            .arg("rev-parse")
            .arg("--show-toplevel")
            .stderr(Stdio::piped())
            .output()?,
    )?;
    let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(PathBuf::from(root))
}

/// `git -C <repo_root> worktree remove <path>`
pub fn remove_worktree(repo_root: &Path, path: &Path) -> Result<(), GitError> {
    check(
        git(repo_root)
            .arg("worktree")
            .arg("remove")
            .arg(path)
            .output()?,
    )?;
    Ok(())
}

/// `git -C <repo_root> worktree add -f <path> <branch>`, streaming git's output to the terminal.
pub fn add_worktree(repo_root: &Path, path: &Path, branch: &str) -> Result<(), GitError> {
    let status = git(repo_root)
        .arg("worktree")
        .arg("add")
        .arg("-f")
        .arg(path)
        .arg(branch)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(GitError::Failed {
            status: status.to_string(),
            output: format!("git worktree add failed for {}", path.display()),
        })
    }
}
