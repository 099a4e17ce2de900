use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};

use crate::app::{AppState, ModalState, Pane};
use crate::model::Role;
use crate::ui::components::{centered_rect, pane_border};

pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 {
        app.rows_per_page = body_height;
    }
    app.clamp_selection();

    let editing = app.panel.pending_edit().cloned();
    let session = app.panel.session_user().map(str::to_string);
    let users = app.panel.filtered_users(&app.user_query);
    let start = (app.selected_user_index / app.rows_per_page) * app.rows_per_page;
    let end = (start + app.rows_per_page).min(users.len());
    let slice = &users[start.min(end)..end];

    let rows = slice.iter().enumerate().map(|(i, (name, rec))| {
        let absolute_index = start + i;
        let mut style = Style::default().fg(app.theme.text);
        if absolute_index == app.selected_user_index && app.focus == Pane::Users {
            style = style
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD);
        }
        let role = match &editing {
            Some(e) if e.username == *name => format!("{} (editing)", e.role.as_str()),
            _ => rec.role.as_str().to_string(),
        };
        let actions = if session.as_deref() == Some(*name) { "edit" } else { "edit, delete" };
        Row::new(vec![
            Cell::from(name.to_string()),
            Cell::from(role),
            Cell::from(rec.modified_or_na().to_string()),
            Cell::from(actions).style(Style::default().fg(app.theme.muted)),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Percentage(30),
        Constraint::Percentage(20),
        Constraint::Percentage(30),
        Constraint::Percentage(20),
    ];
    let header = Row::new(vec!["Username", "Role", "Modified", "Actions"])
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));

    let title = format!("Users ({}/{})", users.len(), app.panel.users().len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(pane_border(app, Pane::Users)),
        )
        .column_spacing(1);
    f.render_widget(table, area);
}

pub fn render_user_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    match state {
        ModalState::EditRole { username } => {
            let staged = app.panel.pending_edit().map(|p| p.role).unwrap_or(Role::User);
            let rect = centered_rect(40, (Role::ALL.len() + 5) as u16, area);
            let mut text = format!("Role for '{username}':\n\n");
            for role in Role::ALL {
                let marker = if role == staged { "▶" } else { " " };
                text.push_str(&format!("{marker} {}\n", role.label()));
            }
            text.push_str("\nEnter: save  Esc: cancel");
            let p = Paragraph::new(text).block(
                Block::default()
                    .title("Edit role")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.border)),
            );
            f.render_widget(Clear, rect);
            f.render_widget(p, rect);
        }
        ModalState::DeleteConfirm { question, selected, .. } => {
            let rect = centered_rect(60, 7, area);
            let yes = if *selected == 0 { "[Yes]" } else { " Yes " };
            let no = if *selected == 1 { "[No]" } else { " No " };
            let body = format!("{question}\n\n  {yes}    {no}");
            let p = Paragraph::new(body).block(
                Block::default()
                    .title("Confirm delete")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.danger)),
            );
            f.render_widget(Clear, rect);
            f.render_widget(p, rect);
        }
        ModalState::Info { .. } => { /* routed to components */ }
    }
}
