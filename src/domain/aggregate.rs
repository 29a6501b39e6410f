use crate::domain::{
    LogRecord, RecordKind, Session, extract_all_message_text, extract_message_text,
};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

pub const MAX_SUMMARY_CHARS: usize = 200;
pub const SUMMARY_ELLIPSIS: &str = "...";
const MAX_MESSAGE_TEXT_BYTES: usize = 64 * 1024;

/// Folds the records of one log file into a `Session`.
#[derive(Clone, Debug, Default)]
pub struct SessionAggregator {
    id: String,
    project_path: String,
    git_branch: String,
    summary: String,
    first_user_text: String,
    last_active: Option<OffsetDateTime>,
    message_count: usize,
    collect_message_text: bool,
    message_text: String,
}

impl SessionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message_text(mut self, collect: bool) -> Self {
        self.collect_message_text = collect;
        self
    }

    pub fn push(&mut self, record: &LogRecord) {
        if record.kind == RecordKind::Summary {
            if !record.summary.is_empty() {
                self.summary = record.summary.clone();
            }
            return;
        }
        if !record.kind.is_message() {
            return;
        }

        if self.id.is_empty() && !record.session_id.is_empty() {
            self.id = record.session_id.clone();
        }
        if !record.cwd.is_empty() {
            self.project_path = record.cwd.clone();
        }
        if !record.git_branch.is_empty() {
            self.git_branch = record.git_branch.clone();
        }
        if let Some(timestamp) = record.timestamp {
            if self.last_active.is_none_or(|current| timestamp > current) {
                self.last_active = Some(timestamp);
            }
        }

        if record.is_meta {
            return;
        }
        self.message_count += 1;

        let wants_first_user =
            record.kind == RecordKind::User && self.first_user_text.is_empty();
        if !wants_first_user && !self.collect_message_text {
            return;
        }
        if wants_first_user {
            self.first_user_text = extract_message_text(&record.message);
        }
        if self.collect_message_text {
            self.append_message_text(&extract_all_message_text(&record.message));
        }
    }

    fn append_message_text(&mut self, text: &str) {
        if text.is_empty() || self.message_text.len() >= MAX_MESSAGE_TEXT_BYTES {
            return;
        }
        if !self.message_text.is_empty() {
            self.message_text.push('\n');
        }
        let room = MAX_MESSAGE_TEXT_BYTES.saturating_sub(self.message_text.len());
        let mut cut = text.len().min(room);
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        self.message_text.push_str(&text[..cut]);
    }

    /// Returns `None` for files without an id or without a single counted message.
    pub fn finish(self, project: &str, file_path: &Path) -> Option<Session> {
        if self.id.is_empty() || self.message_count == 0 {
            return None;
        }

        let raw_summary = if self.summary.is_empty() {
            self.first_user_text
        } else {
            self.summary
        };

        Some(Session {
            id: self.id,
            project: project.to_string(),
            project_path: PathBuf::from(self.project_path),
            summary: normalize_summary(&raw_summary),
            git_branch: self.git_branch,
            last_active: self.last_active.unwrap_or(OffsetDateTime::UNIX_EPOCH),
            message_count: self.message_count,
            file_path: file_path.to_path_buf(),
            message_text: self.message_text,
        })
    }
}

/// Collapses whitespace runs and bounds the result to `MAX_SUMMARY_CHARS` characters,
/// ellipsis included.
pub fn normalize_summary(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_SUMMARY_CHARS {
        return collapsed;
    }
    let keep = MAX_SUMMARY_CHARS - SUMMARY_ELLIPSIS.chars().count();
    let mut out: String = collapsed.chars().take(keep).collect();
    out.push_str(SUMMARY_ELLIPSIS);
    out
}
