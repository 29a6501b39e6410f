use crate::domain::{Catalog, Session, SessionAggregator, parse_log_line};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

const LOG_EXTENSION: &str = "jsonl";
const PATH_FILLER: char = '-';

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ScanWarningCount(usize);

impl From<usize> for ScanWarningCount {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl ScanWarningCount {
    pub fn get(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Error)]
pub enum LoadCatalogError {
    #[error("failed to read projects dir {path}: {source}")]
    ReadRoot {
        path: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LoadOptions {
    /// Collect message text for full-text search.
    pub message_text: bool,
}

#[derive(Clone, Debug)]
pub struct CatalogOutput {
    pub sessions: Catalog,
    /// Files and directories that could not be read.
    pub warnings: ScanWarningCount,
}

/// Reads every `<projects_dir>/<encoded-project>/*.jsonl` into a catalog, newest first.
pub fn load_catalog(
    projects_dir: &Path,
    options: LoadOptions,
) -> Result<CatalogOutput, LoadCatalogError> {
    let entries = fs::read_dir(projects_dir).map_err(|source| LoadCatalogError::ReadRoot {
        path: projects_dir.display().to_string(),
        source,
    })?;

    let mut project_dirs: Vec<PathBuf> = Vec::new();
    let mut warnings = 0usize;
    for entry in entries {
        let Ok(entry) = entry else {
            warnings += 1;
            continue;
        };
        let Ok(file_type) = entry.file_type() else {
            warnings += 1;
            continue;
        };
        if file_type.is_dir() {
            project_dirs.push(entry.path());
        }
    }
    project_dirs.sort();

    let mut sessions: Catalog = Vec::new();
    for project_dir in &project_dirs {
        let project = project_dir
            .file_name()
            .map(|name| decode_project_name(&name.to_string_lossy()))
            .unwrap_or_default();
        warnings += load_project_dir(project_dir, &project, options, &mut sessions);
    }

    sessions.sort_by(|a, b| b.last_active.cmp(&a.last_active));
    let duplicates = dedupe_by_id(&mut sessions);
    tracing::debug!(
        projects = project_dirs.len(),
        sessions = sessions.len(),
        warnings,
        duplicates,
        "catalog loaded"
    );

    Ok(CatalogOutput {
        sessions,
        warnings: ScanWarningCount::from(warnings),
    })
}

/// Keeps the first session for each id. A mirrored log (a worktree's metadata dir links back to
/// the original file) would otherwise appear once per directory. Returns how many were dropped.
fn dedupe_by_id(sessions: &mut Catalog) -> usize {
    let before = sessions.len();
    let mut seen: HashSet<String> = HashSet::new();
    sessions.retain(|session| seen.insert(session.id.clone()));
    before - sessions.len()
}

fn load_project_dir(
    project_dir: &Path,
    project: &str,
    options: LoadOptions,
    sessions: &mut Catalog,
) -> usize {
    let mut warnings = 0usize;
    let walker = WalkDir::new(project_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                tracing::debug!(dir = %project_dir.display(), %error, "skipping unreadable entry");
                warnings += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|ext| ext.to_str()) != Some(LOG_EXTENSION) {
            continue;
        }

        match load_session_file(entry.path(), project, options) {
            Ok(Some(session)) => sessions.push(session),
            Ok(None) => {}
            Err(error) => {
                tracing::debug!(file = %entry.path().display(), %error, "skipping unreadable log");
                warnings += 1;
            }
        }
    }

    warnings
}

pub fn load_session_file(
    path: &Path,
    project: &str,
    options: LoadOptions,
) -> io::Result<Option<Session>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut aggregator = SessionAggregator::new().with_message_text(options.message_text);

    for line in reader.split(b'\n') {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                tracing::debug!(file = %path.display(), %error, "log truncated by read error");
                break;
            }
        };
        let Ok(text) = std::str::from_utf8(&line) else {
            continue;
        };
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if let Some(record) = parse_log_line(text) {
            aggregator.push(&record);
        }
    }

    Ok(aggregator.finish(project, path))
}

/// Recovers a display name from an encoded directory name: the last non-empty `-` component.
///
/// `-Users-me-code-shop` becomes `shop`. Lossy for paths whose components contain `-`.
pub fn decode_project_name(dir_name: &str) -> String {
    dir_name
        .rsplit(PATH_FILLER)
        .find(|part| !part.is_empty())
        .unwrap_or(dir_name)
        .to_string()
}

/// Encodes an absolute path the way the assistant names its per-project metadata directories.
pub fn encode_project_dir(path: &Path) -> String {
    path.to_string_lossy()
        .replace(std::path::MAIN_SEPARATOR, &PATH_FILLER.to_string())
}

pub fn project_metadata_dir(projects_dir: &Path, path: &Path) -> PathBuf {
    projects_dir.join(encode_project_dir(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_log(dir: &Path, name: &str, lines: &[&str]) {
        fs::create_dir_all(dir).expect("mkdir");
        let mut file = File::create(dir.join(name)).expect("create");
        for line in lines {
            writeln!(file, "{line}").expect("write");
        }
    }

    fn user_line(id: &str, timestamp: &str, text: &str) -> String {
        format!(
            r#"{{"type":"user","sessionId":"{id}","cwd":"/code/{id}","timestamp":"{timestamp}","message":{{"role":"user","content":"{text}"}}}}"#
        )
    }

    #[test]
    fn decodes_last_component() {
        assert_eq!(decode_project_name("-Users-lagap-code-producthunt"), "producthunt");
        assert_eq!(decode_project_name("-Users-me-my-app"), "app");
        assert_eq!(decode_project_name("trailing--"), "trailing");
        assert_eq!(decode_project_name("---"), "---");
        assert_eq!(decode_project_name("plain"), "plain");
    }

    #[test]
    fn encodes_paths_with_filler() {
        assert_eq!(
            encode_project_dir(Path::new("/code/repo-worktrees/feat")),
            "-code-repo-worktrees-feat"
        );
    }

    #[test]
    fn loads_sorted_catalog_and_skips_noise() {
        let root = TempDir::new().expect("tempdir");
        let older = user_line("older", "2026-01-01T00:00:00Z", "old work");
        let newer = user_line("newer", "2026-03-01T00:00:00Z", "new work");
        let middle = user_line("middle", "2026-02-01T00:00:00.123456789Z", "mid work");
        write_log(
            &root.path().join("-code-alpha"),
            "a.jsonl",
            &[&older, "{not json", ""],
        );
        write_log(&root.path().join("-code-beta"), "b.jsonl", &[&newer]);
        write_log(&root.path().join("-code-beta"), "c.jsonl", &[&middle]);
        write_log(&root.path().join("-code-beta"), "notes.txt", &[&newer]);
        write_log(
            &root.path().join("-code-beta"),
            "empty.jsonl",
            &[r#"{"type":"summary","summary":"orphan"}"#],
        );
        fs::write(root.path().join("stray.jsonl"), newer.as_bytes()).expect("write");

        let output = load_catalog(root.path(), LoadOptions::default()).expect("load");
        let ids: Vec<&str> = output.sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["newer", "middle", "older"]);
        assert_eq!(output.sessions[2].project, "alpha");
        assert_eq!(output.sessions[0].project, "beta");
        assert_eq!(output.warnings.get(), 0);
        for pair in output.sessions.windows(2) {
            assert!(pair[0].last_active >= pair[1].last_active);
        }
        assert!(output.sessions.iter().all(|session| session.message_count > 0));
    }

    #[test]
    fn full_text_collection_is_optional() {
        let root = TempDir::new().expect("tempdir");
        let line = user_line("s", "2026-01-01T00:00:00Z", "needle in here");
        write_log(&root.path().join("-p"), "s.jsonl", &[&line]);

        let plain = load_catalog(root.path(), LoadOptions::default()).expect("load");
        assert_eq!(plain.sessions[0].message_text, "");

        let full = load_catalog(root.path(), LoadOptions { message_text: true }).expect("load");
        assert_eq!(full.sessions[0].message_text, "needle in here");
    }

    #[test]
    fn missing_root_is_an_error() {
        let root = TempDir::new().expect("tempdir");
        let missing = root.path().join("nope");
        assert!(matches!(
            load_catalog(&missing, LoadOptions::default()),
            Err(LoadCatalogError::ReadRoot { .. })
        ));
    }

    #[test]
    fn invalid_utf8_line_is_skipped() {
        let root = TempDir::new().expect("tempdir");
        let dir = root.path().join("-p");
        fs::create_dir_all(&dir).expect("mkdir");
        let mut bytes = vec![0xff, 0xfe, b'\n'];
        bytes.extend_from_slice(user_line("s", "2026-01-01T00:00:00Z", "ok").as_bytes());
        fs::write(dir.join("s.jsonl"), bytes).expect("write");

        let output = load_catalog(root.path(), LoadOptions::default()).expect("load");
        assert_eq!(output.sessions.len(), 1);
        assert_eq!(output.sessions[0].summary, "ok");
    }

    #[test]
    fn mirrored_log_is_listed_once() {
        let root = TempDir::new().expect("tempdir");
        let line = user_line("s1", "2026-01-01T00:00:00Z", "shared work");
        let app_dir = root.path().join("-code-app");
        write_log(&app_dir, "s1.jsonl", &[&line]);
        crate::infra::mirror_session_log(
            root.path(),
            Path::new("/code/app-worktrees/feat-x"),
            &app_dir.join("s1.jsonl"),
        )
        .expect("mirror");

        let output = load_catalog(root.path(), LoadOptions::default()).expect("load");
        let ids: Vec<(&str, &str)> = output
            .sessions
            .iter()
            .map(|s| (s.id.as_str(), s.project.as_str()))
            .collect();
        assert_eq!(ids, vec![("s1", "app")]);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_log_link_is_skipped_with_a_warning() {
        let root = TempDir::new().expect("tempdir");
        let dir = root.path().join("-code-app");
        let line = user_line("ok", "2026-01-01T00:00:00Z", "still loads");
        write_log(&dir, "ok.jsonl", &[&line]);
        std::os::unix::fs::symlink(root.path().join("gone.jsonl"), dir.join("broken.jsonl"))
            .expect("symlink");

        let output = load_catalog(root.path(), LoadOptions::default()).expect("load");
        assert_eq!(output.sessions.len(), 1);
        assert_eq!(output.sessions[0].id, "ok");
        assert_eq!(output.warnings.get(), 1);
    }
}
