use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RecordKind {
    User,
    Assistant,
    Summary,
    Other(String),
}

impl RecordKind {
    fn from_type(value: &str) -> Self {
        match value {
            "user" => Self::User,
            "assistant" => Self::Assistant,
            "summary" => Self::Summary,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_message(&self) -> bool {
        matches!(self, Self::User | Self::Assistant)
    }
}

/// One decoded line of a session log. Missing string fields decode as empty.
#[derive(Clone, Debug, PartialEq)]
pub struct LogRecord {
    pub kind: RecordKind,
    pub session_id: String,
    pub cwd: String,
    pub git_branch: String,
    /// `None` when absent or not valid RFC 3339.
    pub timestamp: Option<OffsetDateTime>,
    pub is_meta: bool,
    pub summary: String,
    pub message: Value,
}

#[derive(Debug, Deserialize)]
struct LogLine {
    #[serde(rename = "type", default)]
    line_type: Option<String>,

    #[serde(rename = "sessionId", default)]
    session_id: Option<String>,

    #[serde(default)]
    cwd: Option<String>,

    #[serde(rename = "gitBranch", default)]
    git_branch: Option<String>,

    #[serde(default)]
    timestamp: Option<String>,

    #[serde(rename = "isMeta", default)]
    is_meta: Option<bool>,

    #[serde(default)]
    summary: Option<String>,

    #[serde(default)]
    message: Value,
}

/// Decodes one log line. Anything that is not a JSON object of the expected shape yields `None`.
pub fn parse_log_line(line: &str) -> Option<LogRecord> {
    let parsed: LogLine = serde_json::from_str(line).ok()?;
    let timestamp = parsed
        .timestamp
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .and_then(parse_timestamp);

    Some(LogRecord {
        kind: RecordKind::from_type(parsed.line_type.as_deref().unwrap_or("")),
        session_id: parsed.session_id.unwrap_or_default(),
        cwd: parsed.cwd.unwrap_or_default(),
        git_branch: parsed.git_branch.unwrap_or_default(),
        timestamp,
        is_meta: parsed.is_meta.unwrap_or(false),
        summary: parsed.summary.unwrap_or_default(),
        message: parsed.message,
    })
}

pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc3339).ok()
}

/// Extracts user-authored text from a `message` payload.
///
/// The payload is normally `{"role": .., "content": ..}` where `content` is either a string or a
/// list of typed blocks. A bare string payload is treated as the content itself. Text starting
/// with `<` is a command or control directive and is skipped. Returns an empty string when
/// nothing qualifies.
pub fn extract_message_text(message: &Value) -> String {
    text_blocks(message)
        .next()
        .map(str::to_string)
        .unwrap_or_default()
}

/// Like `extract_message_text`, but joins every qualifying text block with newlines.
pub fn extract_all_message_text(message: &Value) -> String {
    text_blocks(message).collect::<Vec<_>>().join("\n")
}

fn text_blocks(message: &Value) -> Box<dyn Iterator<Item = &str> + '_> {
    let content = match message {
        Value::String(_) => message,
        Value::Object(map) => map.get("content").unwrap_or(&Value::Null),
        _ => return Box::new(std::iter::empty()),
    };

    let qualifies = |text: &&str| !text.is_empty() && !text.starts_with('<');
    match content {
        Value::String(text) => Box::new(std::iter::once(text.trim()).filter(qualifies)),
        Value::Array(blocks) => Box::new(
            blocks
                .iter()
                .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|block| block.get("text").and_then(Value::as_str))
                .map(str::trim)
                .filter(qualifies),
        ),
        _ => Box::new(std::iter::empty()),
    }
}
