use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, List, ListItem};

use crate::app::{AppState, Pane};
use crate::ui::components::pane_border;

/// Activity log as `<timestamp> - <user>: <action>`, oldest first.
pub fn render_log_list(f: &mut Frame, area: Rect, app: &mut AppState) {
    let capacity = (area.height.saturating_sub(2) as usize).max(1);
    app.log_rows_per_page = capacity;
    let entries = app.panel.filtered_log(&app.log_query);
    let start = (app.selected_log_index / capacity) * capacity;
    let end = (start + capacity).min(entries.len());

    let items: Vec<ListItem> = entries[start.min(end)..end]
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut style = Style::default().fg(app.theme.text);
            if start + i == app.selected_log_index && app.focus == Pane::Log {
                style = style
                    .fg(app.theme.highlight_fg)
                    .bg(app.theme.highlight_bg)
                    .add_modifier(Modifier::BOLD);
            }
            ListItem::new(format!("{} - {}: {}", e.timestamp, e.user, e.action)).style(style)
        })
        .collect();

    let title = format!("Activity Log ({}/{})", entries.len(), app.panel.log().len());
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(pane_border(app, Pane::Log)),
    );
    f.render_widget(list, area);
}
