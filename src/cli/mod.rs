use crate::domain::Session;
use std::io::{self, Write};
use thiserror::Error;
use time::OffsetDateTime;

const LIST_HEADER: &str = "PROJECT\tSUMMARY\tBRANCH\tLAST ACTIVE\tSESSION ID";
const LIST_SUMMARY_MAX_CHARS: usize = 60;
const LIST_SUMMARY_KEEP_CHARS: usize = 57;

/// Exit status for every failure, bad arguments included.
pub const FAILURE_EXIT_CODE: i32 = 1;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliInvocation {
    PrintHelp,
    PrintVersion,
    Tui,
    Command(CliCommand),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliCommand {
    List,
    Resume { session_id: String },
}

#[derive(Debug, Error)]
pub enum CliParseError {
    #[error("unknown subcommand: {0}")]
    UnknownSubcommand(String),

    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("missing argument: {0}")]
    MissingArgument(String),

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
}

#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

pub fn parse_invocation(args: &[String]) -> Result<CliInvocation, CliParseError> {
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        return Ok(CliInvocation::PrintHelp);
    }
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        return Ok(CliInvocation::PrintVersion);
    }

    let mut iter = args.iter().skip(1);
    let Some(subcommand) = iter.next() else {
        return Ok(CliInvocation::Tui);
    };

    let command = match subcommand.as_str() {
        "list" | "ls" => CliCommand::List,
        "resume" => {
            let session_id = iter
                .next()
                .ok_or_else(|| CliParseError::MissingArgument("<session-id>".to_string()))?;
            if session_id.starts_with('-') {
                return Err(CliParseError::UnknownFlag(session_id.to_string()));
            }
            CliCommand::Resume {
                session_id: session_id.to_string(),
            }
        }
        other if other.starts_with('-') => {
            return Err(CliParseError::UnknownFlag(other.to_string()));
        }
        other => return Err(CliParseError::UnknownSubcommand(other.to_string())),
    };

    if let Some(extra) = iter.next() {
        return Err(CliParseError::UnexpectedArgument(extra.to_string()));
    }
    Ok(CliInvocation::Command(command))
}

/// Prints one tab-separated row per session, newest first, after a header row.
pub fn run_list(
    sessions: &[Session],
    now: OffsetDateTime,
    out: &mut impl Write,
) -> Result<(), CliRunError> {
    if !write_line(out, LIST_HEADER)? {
        return Ok(());
    }
    for session in sessions {
        let line = format!(
            "{}\t{}\t{}\t{}\t{}",
            session.project,
            list_summary(&session.summary),
            session.git_branch,
            session.time_ago(now),
            session.id
        );
        if !write_line(out, &line)? {
            return Ok(());
        }
    }
    Ok(())
}

pub fn find_session<'a>(sessions: &'a [Session], session_id: &str) -> Result<&'a Session, CliRunError> {
    sessions
        .iter()
        .find(|session| session.id == session_id)
        .ok_or_else(|| CliRunError::SessionNotFound(session_id.to_string()))
}

fn list_summary(summary: &str) -> String {
    if summary.chars().count() <= LIST_SUMMARY_MAX_CHARS {
        return summary.to_string();
    }
    let mut out: String = summary.chars().take(LIST_SUMMARY_KEEP_CHARS).collect();
    out.push_str("...");
    out
}

fn write_line(out: &mut impl Write, line: &str) -> io::Result<bool> {
    match writeln!(out, "{line}") {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(false),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample_session;
    use time::Duration;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn parse_defaults_to_tui_when_no_args() {
        let parsed = parse_invocation(&args(&["claude-manager"])).expect("parse");
        assert_eq!(parsed, CliInvocation::Tui);
    }

    #[test]
    fn parse_help_flag_wins() {
        let parsed = parse_invocation(&args(&["claude-manager", "list", "--help"])).expect("parse");
        assert_eq!(parsed, CliInvocation::PrintHelp);
    }

    #[test]
    fn parse_list_and_resume() {
        assert_eq!(
            parse_invocation(&args(&["claude-manager", "list"])).expect("parse"),
            CliInvocation::Command(CliCommand::List)
        );
        assert_eq!(
            parse_invocation(&args(&["claude-manager", "resume", "abc-123"])).expect("parse"),
            CliInvocation::Command(CliCommand::Resume {
                session_id: "abc-123".to_string()
            })
        );
    }

    #[test]
    fn parse_rejects_bad_invocations() {
        assert!(matches!(
            parse_invocation(&args(&["claude-manager", "resume"])),
            Err(CliParseError::MissingArgument(_))
        ));
        assert!(matches!(
            parse_invocation(&args(&["claude-manager", "open"])),
            Err(CliParseError::UnknownSubcommand(_))
        ));
        assert!(matches!(
            parse_invocation(&args(&["claude-manager", "--json"])),
            Err(CliParseError::UnknownFlag(_))
        ));
        assert!(matches!(
            parse_invocation(&args(&["claude-manager", "list", "extra"])),
            Err(CliParseError::UnexpectedArgument(_))
        ));
    }

    #[test]
    fn usage_errors_share_the_failure_exit_code() {
        assert!(parse_invocation(&args(&["claude-manager", "bogus"])).is_err());
        assert_eq!(FAILURE_EXIT_CODE, 1);
    }

    #[test]
    fn list_prints_header_and_rows() {
        let now = OffsetDateTime::UNIX_EPOCH + Duration::hours(3);
        let mut session = sample_session("abc", "api", &"x".repeat(61));
        session.git_branch = "main".to_string();
        let short = sample_session("def", "web", &"y".repeat(60));

        let mut out = Vec::new();
        run_list(&[session, short], now, &mut out).expect("list");
        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], LIST_HEADER);
        assert_eq!(lines[1], format!("api\t{}...\tmain\t3h ago\tabc", "x".repeat(57)));
        assert_eq!(lines[2], format!("web\t{}\t\t3h ago\tdef", "y".repeat(60)));
    }

    #[test]
    fn list_summary_counts_chars() {
        let summary = "é".repeat(60);
        assert_eq!(list_summary(&summary), summary);
        let long = "é".repeat(61);
        assert_eq!(list_summary(&long).chars().count(), 60);
    }

    #[test]
    fn find_session_reports_missing_id() {
        let sessions = vec![sample_session("abc", "api", "x")];
        assert_eq!(find_session(&sessions, "abc").expect("found").id, "abc");
        let error = find_session(&sessions, "nope").expect_err("missing");
        assert_eq!(error.to_string(), "Session not found: nope");
    }
}
