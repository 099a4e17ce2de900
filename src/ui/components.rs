//! Shared UI components (status bar, modal helpers).
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::{AppState, InputMode, ModalState, Pane};

/// Render the bottom status bar with mode, counts and the last message.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::Modal => "MODAL",
    };
    let mut msg = format!(
        "mode: {mode}  users:{}  log:{}  export dir: {}",
        app.visible_users(),
        app.visible_log(),
        app.export_target
    );
    if !app.active_query().is_empty() && app.input_mode != InputMode::Search {
        msg.push_str(&format!("  filter: \"{}\"", app.active_query()));
    }
    if let Some(status) = &app.status {
        msg.push_str("  | ");
        msg.push_str(status);
    }
    let p = Paragraph::new(msg).style(Style::default().fg(app.theme.status_fg).bg(app.theme.status_bg));
    f.render_widget(p, area);
}

/// Border style for a pane, brighter when it has focus.
pub fn pane_border(app: &AppState, pane: Pane) -> Style {
    if app.focus == pane {
        Style::default().fg(app.theme.focus_border)
    } else {
        Style::default().fg(app.theme.border)
    }
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render a blocking notice; Enter or Esc dismisses it.
pub fn render_info_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    if let ModalState::Info { message } = state {
        let max_w = area.width.saturating_sub(6).max(30);
        let min_w = 44u16.min(max_w);
        let approx_lines = (message.len() as u16 / (min_w.saturating_sub(4).max(10))).max(1);
        let max_h = area.height.saturating_sub(6).max(5);
        let height = (approx_lines + 4).min(max_h).max(5);
        let rect = centered_rect(min_w, height, area);
        let p = Paragraph::new(format!("{message}\n\nPress Enter to close"))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title("Notice")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.border)),
            );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}
