//! Rendering: header, users table, activity log, status bar and modals.
//!
pub mod components;
pub mod log;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, InputMode, ModalState, Pane};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
        .split(f.area());
    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(root[1]);

    render_header(f, root[0], app);
    users::render_users_table(f, body[0], app);
    log::render_log_list(f, body[1], app);
    components::render_status_bar(f, root[2], app);

    if app.modal.is_some() {
        render_modal(f, f.area(), app);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &AppState) {
    let who = app.panel.session_user().unwrap_or("anonymous");
    let pane = match app.focus {
        Pane::Users => "[Users]  Log",
        Pane::Log => "Users  [Log]",
    };
    let prompt = match app.input_mode {
        InputMode::Search => match app.focus {
            Pane::Users => format!("  Search by username or role: {}_", app.user_query),
            Pane::Log => format!("  Search activity log: {}_", app.log_query),
        },
        InputMode::Normal | InputMode::Modal => String::new(),
    };
    let p = Paragraph::new(format!(
        "signed in as {who}  {pane}{prompt}  | Tab: switch; /: search; e: edit role; d: delete; c: CSV; p: PDF; q: quit"
    ))
    .block(
        Block::default()
            .title("User Management")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    )
    .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, area);
}

fn render_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(state) = app.modal.as_ref() else {
        return;
    };
    match state {
        ModalState::EditRole { .. } | ModalState::DeleteConfirm { .. } => {
            users::render_user_modal(f, area, app, state);
        }
        ModalState::Info { .. } => {
            components::render_info_modal(f, area, app, state);
        }
    }
}
