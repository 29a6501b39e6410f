use dirs::home_dir;
use std::path::PathBuf;
use thiserror::Error;

pub const PROJECTS_DIR_ENV: &str = "CLAUDE_PROJECTS_DIR";
pub const CLAUDE_BIN_ENV: &str = "CLAUDE_MANAGER_CLAUDE_BIN";
pub const LOG_FILE_ENV: &str = "CLAUDE_MANAGER_LOG";
const DEFAULT_CLAUDE_BIN: &str = "claude";

#[derive(Debug, Error)]
pub enum ResolveProjectsDirError {
    #[error("home directory not found")]
    HomeDirNotFound,
}

/// Runtime configuration, read from the environment once at startup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    pub projects_dir: PathBuf,
    pub claude_bin: String,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ResolveProjectsDirError> {
        let claude_bin = std::env::var(CLAUDE_BIN_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_CLAUDE_BIN.to_string());
        let log_file = std::env::var_os(LOG_FILE_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            projects_dir: resolve_projects_dir()?,
            claude_bin,
            log_file,
        })
    }
}

pub fn resolve_projects_dir() -> Result<PathBuf, ResolveProjectsDirError> {
    if let Some(override_dir) = std::env::var_os(PROJECTS_DIR_ENV) {
        return Ok(PathBuf::from(override_dir));
    }

    let Some(home) = home_dir() else {
        return Err(ResolveProjectsDirError::HomeDirNotFound);
    };

    Ok(home.join(".claude").join("projects"))
}
