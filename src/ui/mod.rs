mod theme;

use crate::app::{AppModel, Mode, NewSessionView, WorktreesView};
use crate::domain::{LaunchFlags, Session};
use ratatui::prelude::*;
use ratatui::widgets::*;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use unicode_width::UnicodeWidthStr;

const SEARCH_ROWS: u16 = 3;
const DETAIL_ROWS: u16 = 9;
const FOOTER_ROWS: u16 = 2;
const PROJECT_COLUMN_MAX: usize = 24;
const BRANCH_COLUMN_MAX: usize = 20;

pub fn render(frame: &mut Frame, model: &AppModel) {
    let full_area = frame.area();
    if full_area.width == 0 || full_area.height == 0 {
        return;
    }

    let area = inner_area(full_area);
    match &model.mode {
        Mode::Normal | Mode::Searching => render_sessions(frame, area, model),
        Mode::Worktrees(view) => render_worktrees(frame, area, view),
        Mode::NewSession(view) => render_new_session(frame, area, model, view),
        Mode::Help => {
            render_sessions(frame, area, model);
            render_help_overlay(frame, area);
        }
    }
}

/// Rows available to the session list on a terminal `terminal_height` rows tall.
pub fn session_list_height(terminal_height: u16) -> u16 {
    let margin = if terminal_height >= 12 { 2 } else { 0 };
    terminal_height.saturating_sub(margin + SEARCH_ROWS + DETAIL_ROWS + FOOTER_ROWS + 2)
}

fn render_sessions(frame: &mut Frame, area: Rect, model: &AppModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(SEARCH_ROWS),
            Constraint::Min(0),
            Constraint::Length(DETAIL_ROWS),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_search_box(frame, chunks[0], model);

    let now = OffsetDateTime::now_utc();
    let max_width = (chunks[1].width as usize).saturating_sub(6);
    let sessions: Vec<&Session> = model.filtered_sessions().collect();
    let (project_width, branch_width, ago_width) = session_columns_width(&sessions, now);
    let items: Vec<ListItem> = sessions
        .iter()
        .map(|session| {
            session_list_item(session, now, max_width, project_width, branch_width, ago_width)
        })
        .collect();

    let title = if model.data.sessions.is_empty() {
        "Sessions".to_string()
    } else {
        "Sessions · newest first".to_string()
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::BORDER))
                .padding(Padding::horizontal(1))
                .title(title),
        )
        .highlight_style(
            Style::default()
                .fg(theme::ACCENT)
                .bg(theme::ACCENT_BG)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut state = ListState::default();
    if !sessions.is_empty() {
        state.select(Some(model.selected.min(sessions.len().saturating_sub(1))));
    }
    frame.render_stateful_widget(list, chunks[1], &mut state);

    if sessions.is_empty() && !model.query.is_empty() {
        let empty = Paragraph::new("No sessions match the query.")
            .style(Style::default().fg(theme::DIM));
        frame.render_widget(empty, inner_area(chunks[1]));
    }

    render_detail(frame, chunks[2], model.selected_session(), now);

    let status = Line::from(status_spans(
        &status_line(sessions.len(), model.data.sessions.len()),
        model.flags,
    ));
    frame.render_widget(Paragraph::new(status), chunks[3]);

    let keys = if matches!(model.mode, Mode::Searching) {
        "type to filter  @project scopes  Tab=full-text  Enter=keep  Esc=clear  ↑↓=move"
    } else {
        "↑↓/jk=move  Enter=resume  /=search  n=new  t=worktrees  w=worktree  !=skip-perms  ?=help  q=quit"
    };
    frame.render_widget(footer_paragraph(keys), chunks[4]);
}

fn render_search_box(frame: &mut Frame, area: Rect, model: &AppModel) {
    let searching = matches!(model.mode, Mode::Searching);
    let mut title = "Claude sessions".to_string();
    if searching || !model.query.is_empty() {
        title.push(' ');
        title.push_str(mode_tag(model.full_text));
    }

    let prompt = "/ ";
    let line = if !searching && model.query.is_empty() {
        Line::from(Span::styled(
            "Press / to search, @project to scope",
            Style::default().fg(theme::DIM),
        ))
    } else {
        Line::from(vec![
            Span::styled(prompt, Style::default().fg(theme::ACCENT)),
            Span::styled(model.query.text().to_string(), Style::default().fg(theme::FG)),
        ])
    };

    let border = if searching { theme::ACCENT } else { theme::BORDER };
    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .padding(Padding::horizontal(1))
            .title(title),
    );
    frame.render_widget(paragraph, area);

    if searching {
        let before_cursor: String = model.query.text().chars().take(model.query.cursor()).collect();
        let offset = UnicodeWidthStr::width(prompt) + UnicodeWidthStr::width(before_cursor.as_str());
        let x = area
            .x
            .saturating_add(2)
            .saturating_add(offset as u16)
            .min(area.right().saturating_sub(2));
        frame.set_cursor_position(Position::new(x, area.y.saturating_add(1)));
    }
}

fn mode_tag(full_text: bool) -> &'static str {
    if full_text { "[full-text]" } else { "[quick]" }
}

fn status_line(shown: usize, total: usize) -> String {
    if shown == total {
        format!("{total} sessions")
    } else {
        format!("{shown} sessions (of {total})")
    }
}

fn status_spans(base: &str, flags: LaunchFlags) -> Vec<Span<'static>> {
    let mut spans = vec![Span::styled(base.to_string(), Style::default().fg(theme::MUTED))];
    if flags.use_worktree {
        spans.push(Span::raw("  "));
        spans.push(badge("worktree", theme::ACCENT));
    }
    if flags.skip_permissions {
        spans.push(Span::raw("  "));
        spans.push(badge("skip-permissions", theme::ERROR));
    }
    spans
}

fn badge(label: &str, color: Color) -> Span<'static> {
    Span::styled(
        format!("[{label}]"),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

fn footer_paragraph(keys: &str) -> Paragraph<'static> {
    Paragraph::new(keys.to_string()).style(Style::default().fg(Color::DarkGray))
}

fn session_columns_width(sessions: &[&Session], now: OffsetDateTime) -> (usize, usize, usize) {
    let mut project_width = 0usize;
    let mut branch_width = 0usize;
    let mut ago_width = 0usize;

    for session in sessions {
        project_width = project_width.max(UnicodeWidthStr::width(session.project.as_str()));
        branch_width = branch_width.max(UnicodeWidthStr::width(session.git_branch.as_str()));
        ago_width = ago_width.max(UnicodeWidthStr::width(session.time_ago(now).as_str()));
    }

    (
        project_width.min(PROJECT_COLUMN_MAX),
        branch_width.min(BRANCH_COLUMN_MAX),
        ago_width,
    )
}

fn session_list_item(
    session: &Session,
    now: OffsetDateTime,
    max_width: usize,
    project_width: usize,
    branch_width: usize,
    ago_width: usize,
) -> ListItem<'static> {
    if max_width == 0 {
        return ListItem::new(Line::from(""));
    }

    let gap = 2usize;
    let project = pad_right(&truncate_end(&session.project, project_width), project_width);
    let branch = pad_left(&truncate_end(&session.git_branch, branch_width), branch_width);
    let ago = pad_left(&session.time_ago(now), ago_width);

    let left_width = project_width + gap;
    let right_width = branch_width + gap + ago_width;
    let min_summary = 12usize;
    if left_width + min_summary + gap + right_width > max_width {
        return ListItem::new(Line::from(truncate_end(&session.summary, max_width)));
    }

    let summary_width = max_width.saturating_sub(left_width + gap + right_width);
    let summary = pad_right(&truncate_end(&session.summary, summary_width), summary_width);

    ListItem::new(Line::from(vec![
        Span::styled(project, Style::default().fg(theme::MUTED)),
        Span::raw(" ".repeat(gap)),
        Span::styled(summary, Style::default().fg(theme::FG)),
        Span::raw(" ".repeat(gap)),
        Span::styled(branch, Style::default().fg(theme::SUCCESS)),
        Span::raw(" ".repeat(gap)),
        Span::styled(ago, Style::default().fg(Color::DarkGray)),
    ]))
}

fn render_detail(frame: &mut Frame, area: Rect, session: Option<&Session>, now: OffsetDateTime) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER))
        .padding(Padding::horizontal(1))
        .title("Details");

    let Some(session) = session else {
        let paragraph = Paragraph::new(Span::styled(
            "No session selected.",
            Style::default().fg(theme::DIM),
        ))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let paragraph = Paragraph::new(detail_lines(session, now)).block(block);
    frame.render_widget(paragraph, area);
}

fn detail_lines(session: &Session, now: OffsetDateTime) -> Vec<Line<'static>> {
    let label = |name: &str| Span::styled(format!("{name:<10}"), Style::default().fg(theme::DIM));
    let path = if session.has_project_path() {
        session.project_path.display().to_string()
    } else {
        "-".to_string()
    };
    let branch = if session.git_branch.is_empty() {
        "-".to_string()
    } else {
        session.git_branch.clone()
    };

    vec![
        Line::from(Span::styled(
            session.summary.clone(),
            Style::default().fg(theme::FG).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![label("Project"), Span::raw(session.project.clone())]),
        Line::from(vec![label("Path"), Span::raw(path)]),
        Line::from(vec![
            label("Branch"),
            Span::styled(branch, Style::default().fg(theme::SUCCESS)),
        ]),
        Line::from(vec![
            label("Active"),
            Span::raw(format!(
                "{} ({})",
                format_timestamp(session.last_active),
                session.time_ago(now)
            )),
        ]),
        Line::from(vec![label("Messages"), Span::raw(session.message_count.to_string())]),
        Line::from(vec![
            label("Session"),
            Span::styled(session.id.clone(), Style::default().fg(theme::MUTED)),
        ]),
    ]
}

fn format_timestamp(value: OffsetDateTime) -> String {
    if value == OffsetDateTime::UNIX_EPOCH {
        return "unknown".to_string();
    }
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    value
        .to_offset(offset)
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| "unknown".to_string())
}

fn render_worktrees(frame: &mut Frame, area: Rect, view: &WorktreesView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER))
        .padding(Padding::horizontal(1))
        .title("Worktrees");

    match view.entries.as_deref() {
        None => {
            let paragraph = Paragraph::new(Span::styled(
                "Discovering worktrees...",
                Style::default().fg(theme::DIM),
            ))
            .block(block);
            frame.render_widget(paragraph, chunks[0]);
        }
        Some([]) => {
            let paragraph = Paragraph::new(Span::styled(
                "No worktrees found.",
                Style::default().fg(theme::DIM),
            ))
            .block(block);
            frame.render_widget(paragraph, chunks[0]);
        }
        Some(entries) => {
            let max_width = (chunks[0].width as usize).saturating_sub(6);
            let repo_width = entries
                .iter()
                .map(|entry| UnicodeWidthStr::width(entry.repo_name().as_str()))
                .max()
                .unwrap_or(0)
                .min(PROJECT_COLUMN_MAX);
            let branch_width = entries
                .iter()
                .map(|entry| UnicodeWidthStr::width(entry.branch.as_str()))
                .max()
                .unwrap_or(0)
                .min(PROJECT_COLUMN_MAX);

            let items: Vec<ListItem> = entries
                .iter()
                .map(|entry| {
                    let repo = pad_right(&truncate_end(&entry.repo_name(), repo_width), repo_width);
                    let branch =
                        pad_right(&truncate_end(&entry.branch, branch_width), branch_width);
                    let path_width = max_width.saturating_sub(repo_width + branch_width + 4);
                    let path = truncate_end(&entry.path.display().to_string(), path_width);
                    ListItem::new(Line::from(vec![
                        Span::styled(repo, Style::default().fg(theme::MUTED)),
                        Span::raw("  "),
                        Span::styled(branch, Style::default().fg(theme::SUCCESS)),
                        Span::raw("  "),
                        Span::styled(path, Style::default().fg(Color::DarkGray)),
                    ]))
                })
                .collect();

            let list = List::new(items)
                .block(block)
                .highlight_style(
                    Style::default()
                        .fg(theme::ACCENT)
                        .bg(theme::ACCENT_BG)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("▸ ");
            let mut state = ListState::default();
            state.select(Some(view.selected.min(entries.len().saturating_sub(1))));
            frame.render_stateful_widget(list, chunks[0], &mut state);
        }
    }

    if let Some(status) = &view.status {
        let color = if status.starts_with("Error:") {
            theme::ERROR
        } else if status.starts_with("Removed") {
            theme::SUCCESS
        } else {
            theme::MUTED
        };
        let width = chunks[1].width as usize;
        frame.render_widget(
            Paragraph::new(truncate_end(status, width)).style(Style::default().fg(color)),
            chunks[1],
        );
    }

    frame.render_widget(
        footer_paragraph("↑↓/jk=move  d/x=remove  Esc=back  q=quit"),
        chunks[2],
    );
}

fn render_new_session(frame: &mut Frame, area: Rect, model: &AppModel, view: &NewSessionView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let max_width = (chunks[0].width as usize).saturating_sub(6);
    let name_width = view
        .projects
        .iter()
        .map(|project| UnicodeWidthStr::width(project.name.as_str()))
        .max()
        .unwrap_or(0)
        .min(max_width / 2);

    let items: Vec<ListItem> = view
        .projects
        .iter()
        .map(|project| {
            let name = pad_right(&truncate_end(&project.name, name_width), name_width);
            let path_width = max_width.saturating_sub(name_width + 2);
            let path = truncate_end(&project.path.display().to_string(), path_width);
            ListItem::new(Line::from(vec![
                Span::styled(name, Style::default().fg(theme::FG)),
                Span::raw("  "),
                Span::styled(path, Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::BORDER))
                .padding(Padding::horizontal(1))
                .title("New session · pick a project"),
        )
        .highlight_style(
            Style::default()
                .fg(theme::ACCENT)
                .bg(theme::ACCENT_BG)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut state = ListState::default();
    if !view.projects.is_empty() {
        state.select(Some(view.selected.min(view.projects.len().saturating_sub(1))));
    }
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let base = format!("{} projects", view.projects.len());
    frame.render_widget(
        Paragraph::new(Line::from(status_spans(&base, model.flags))),
        chunks[1],
    );
    frame.render_widget(
        footer_paragraph("↑↓/jk=move  Enter=start  !=skip-perms  w=worktree  Esc=back  q=quit"),
        chunks[2],
    );
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(70, 80, area);
    frame.render_widget(Clear, popup);

    let text = vec![
        Line::from("Sessions"),
        Line::from("  ↑/k ↓/j      move selection"),
        Line::from("  g/Home G/End jump to first / last"),
        Line::from("  PgUp/PgDn    page up / down"),
        Line::from("  Enter        resume selected session"),
        Line::from("  n            start a new session"),
        Line::from("  t            manage worktrees"),
        Line::from(""),
        Line::from("Search"),
        Line::from("  /            start typing a query"),
        Line::from("  @name text   limit to projects containing name"),
        Line::from("  Tab          toggle quick / full-text"),
        Line::from("  Enter        keep filter   Esc  clear filter"),
        Line::from(""),
        Line::from("Flags"),
        Line::from("  w            resume in a git worktree of the branch"),
        Line::from("  !            pass --dangerously-skip-permissions"),
        Line::from(""),
        Line::from("  q or Ctrl+C  quit"),
    ];

    let paragraph = Paragraph::new(text).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .padding(Padding::horizontal(1))
            .title("Help (? or Esc to close)"),
    );
    frame.render_widget(paragraph, popup);
}

fn pad_left(text: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(text);
    if current >= width {
        return text.to_string();
    }
    format!("{}{}", " ".repeat(width.saturating_sub(current)), text)
}

fn pad_right(text: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(text);
    if current >= width {
        return text.to_string();
    }
    format!("{}{}", text, " ".repeat(width.saturating_sub(current)))
}

fn truncate_end(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    let ellipsis = "…";
    let available = max_width.saturating_sub(UnicodeWidthStr::width(ellipsis));
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + width > available {
            break;
        }
        used += width;
        out.push(ch);
    }
    out.push_str(ellipsis);
    out
}

fn inner_area(area: Rect) -> Rect {
    if area.width < 40 || area.height < 12 {
        return area;
    }
    area.inner(Margin {
        vertical: 1,
        horizontal: 2,
    })
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
