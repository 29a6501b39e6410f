use crate::domain::Session;

pub const SCOPE_MARKER: char = '@';

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SearchQuery {
    /// Project-name filter; empty when the input carried no `@scope` prefix.
    pub scope: String,
    pub text: String,
}

/// Splits `"@scope free text"` into its scope and free-text parts.
///
/// Total: every input maps to exactly one query. Without a leading `@` the whole trimmed input is
/// free text.
pub fn parse_query(raw: &str) -> SearchQuery {
    let raw = raw.trim();
    let Some(rest) = raw.strip_prefix(SCOPE_MARKER) else {
        return SearchQuery {
            scope: String::new(),
            text: raw.to_string(),
        };
    };

    match rest.find(char::is_whitespace) {
        Some(index) => SearchQuery {
            scope: rest[..index].to_string(),
            text: rest[index..].trim().to_string(),
        },
        None => SearchQuery {
            scope: rest.to_string(),
            text: String::new(),
        },
    }
}

/// Returns catalog indices of sessions matching `query`, preserving catalog order.
pub fn filter_sessions(sessions: &[Session], query: &SearchQuery, full_text: bool) -> Vec<usize> {
    let scope = query.scope.to_lowercase();
    let needle = query.text.to_lowercase();

    sessions
        .iter()
        .enumerate()
        .filter(|(_, session)| scope.is_empty() || session.project.to_lowercase().contains(&scope))
        .filter(|(_, session)| session_matches_text(session, &needle, full_text))
        .map(|(index, _)| index)
        .collect()
}

fn session_matches_text(session: &Session, needle: &str, full_text: bool) -> bool {
    if needle.is_empty() {
        return true;
    }
    if session.summary.to_lowercase().contains(needle)
        || session.project.to_lowercase().contains(needle)
        || session.git_branch.to_lowercase().contains(needle)
    {
        return true;
    }
    full_text && session.message_text.to_lowercase().contains(needle)
}
