use anyhow::{Context as _, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::Backend;
use std::time::Duration;

use crate::app::{AppState, InputMode, ModalState, Pane};
use crate::export;
use crate::model::Role;
use crate::panel::{DeleteCheck, DeleteOutcome};
use crate::ui;

/// Draw, poll, dispatch until the operator quits.
pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut AppState) -> Result<()> {
    loop {
        terminal
            .draw(|f| ui::render(f, app))
            .context("drawing frame")?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !handle_key(app, key) {
                    break;
                }
            }
        }
    }
    tracing::info!("panel closed");
    Ok(())
}

/// Apply one key press. Returns `false` when the app should exit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    match app.input_mode {
        InputMode::Normal => return handle_normal_key(app, key.code),
        InputMode::Search => handle_search_key(app, key.code),
        InputMode::Modal => handle_modal_key(app, key.code),
    }
    true
}

fn handle_normal_key(app: &mut AppState, code: KeyCode) -> bool {
    app.status = None;
    match code {
        KeyCode::Char('q') => return false,
        KeyCode::Tab | KeyCode::BackTab => {
            app.focus = match app.focus {
                Pane::Users => Pane::Log,
                Pane::Log => Pane::Users,
            };
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
        }
        KeyCode::Up | KeyCode::Char('k') => move_selection(app, -1),
        KeyCode::Down | KeyCode::Char('j') => move_selection(app, 1),
        KeyCode::PageUp | KeyCode::Left | KeyCode::Char('h') => {
            let rpp = app.page_size() as isize;
            move_selection(app, -rpp);
        }
        KeyCode::PageDown | KeyCode::Right | KeyCode::Char('l') => {
            let rpp = app.page_size() as isize;
            move_selection(app, rpp);
        }
        KeyCode::Enter | KeyCode::Char('e') if app.focus == Pane::Users => start_edit(app),
        KeyCode::Delete | KeyCode::Char('d') if app.focus == Pane::Users => start_delete(app),
        KeyCode::Char('c') => export_csv(app),
        KeyCode::Char('p') => export_pdf(app),
        _ => {}
    }
    true
}

fn move_selection(app: &mut AppState, delta: isize) {
    let (idx, len) = match app.focus {
        Pane::Users => (&mut app.selected_user_index, app.panel.filtered_users(&app.user_query).len()),
        Pane::Log => (&mut app.selected_log_index, app.panel.filtered_log(&app.log_query).len()),
    };
    let max = len.saturating_sub(1) as isize;
    *idx = (*idx as isize + delta).clamp(0, max) as usize;
}

/// Live search: the filtered view is recomputed on every keystroke.
fn handle_search_key(app: &mut AppState, code: KeyCode) {
    match code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Esc => {
            app.active_query_mut().clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.active_query_mut().pop();
        }
        KeyCode::Char(c) => {
            app.active_query_mut().push(c);
        }
        _ => {}
    }
    app.clamp_selection();
}

fn start_edit(app: &mut AppState) {
    let Some((username, role)) = app.selected_user() else {
        return;
    };
    match app.panel.begin_edit(&username, role) {
        Ok(()) => open_modal(app, ModalState::EditRole { username }),
        Err(e) => open_modal(app, ModalState::Info { message: e.to_string() }),
    }
}

fn start_delete(app: &mut AppState) {
    let Some((username, _)) = app.selected_user() else {
        return;
    };
    if !app.panel.can_offer_delete(&username) {
        app.status = Some("Your own account cannot be deleted here.".to_string());
        return;
    }
    match app.panel.check_delete(&username) {
        Ok(DeleteCheck::Refused { notice }) => open_modal(app, ModalState::Info { message: notice }),
        Ok(DeleteCheck::NeedsConfirmation { question }) => open_modal(
            app,
            ModalState::DeleteConfirm {
                username,
                question,
                selected: 1,
            },
        ),
        Err(e) => open_modal(app, ModalState::Info { message: e.to_string() }),
    }
}

fn export_csv(app: &mut AppState) {
    let res = match app.focus {
        Pane::Users => {
            let rows = app.panel.filtered_users(&app.user_query);
            export::export_users_csv(&rows, app.sink.as_mut()).map(|_| export::USERS_CSV)
        }
        Pane::Log => {
            let rows = app.panel.filtered_log(&app.log_query);
            export::export_log_csv(&rows, app.sink.as_mut()).map(|_| export::LOG_CSV)
        }
    };
    report_export(app, res);
}

fn export_pdf(app: &mut AppState) {
    let rows = app.panel.filtered_users(&app.user_query);
    let res = export::export_users_pdf(&rows, app.sink.as_mut()).map(|_| export::USERS_PDF);
    report_export(app, res);
}

fn report_export(app: &mut AppState, res: Result<&str, crate::error::PanelError>) {
    match res {
        Ok(file) => app.status = Some(format!("Exported {file} to {}", app.export_target)),
        Err(e) => {
            tracing::error!(error = %e, "export failed");
            open_modal(app, ModalState::Info { message: e.to_string() });
        }
    }
}

fn handle_modal_key(app: &mut AppState, code: KeyCode) {
    let Some(modal) = app.modal.clone() else {
        close_modal(app);
        return;
    };
    match modal {
        ModalState::EditRole { username } => {
            let staged = app.panel.pending_edit().map(|p| p.role).unwrap_or(Role::User);
            match code {
                KeyCode::Esc => {
                    app.panel.cancel_edit();
                    close_modal(app);
                }
                KeyCode::Up | KeyCode::Left | KeyCode::Char('k') | KeyCode::Char('h') => {
                    let _ = app.panel.stage_role(staged.prev());
                }
                KeyCode::Down | KeyCode::Right | KeyCode::Char('j') | KeyCode::Char('l') => {
                    let _ = app.panel.stage_role(staged.next());
                }
                KeyCode::Enter => match app.panel.commit_edit() {
                    Ok(()) => {
                        close_modal(app);
                        app.status = Some(format!("Saved role of '{username}'"));
                        app.clamp_selection();
                    }
                    Err(e) => {
                        tracing::error!(error = %e, user = %username, "commit failed");
                        app.panel.cancel_edit();
                        app.modal = Some(ModalState::Info { message: e.to_string() });
                    }
                },
                _ => {}
            }
        }
        ModalState::DeleteConfirm { username, question, selected } => match code {
            KeyCode::Esc | KeyCode::Char('n') => close_modal(app),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
                app.modal = Some(ModalState::DeleteConfirm {
                    username,
                    question,
                    selected: 1 - selected.min(1),
                });
            }
            KeyCode::Char('y') => confirm_delete(app, &username),
            KeyCode::Enter => {
                if selected == 0 {
                    confirm_delete(app, &username);
                } else {
                    close_modal(app);
                }
            }
            _ => {}
        },
        ModalState::Info { .. } => {
            if matches!(code, KeyCode::Esc | KeyCode::Enter) {
                close_modal(app);
            }
        }
    }
}

fn confirm_delete(app: &mut AppState, username: &str) {
    match app.panel.delete_confirmed(username) {
        Ok(DeleteOutcome::Deleted) => {
            close_modal(app);
            app.status = Some(format!("Deleted '{username}'"));
            app.clamp_selection();
        }
        Ok(DeleteOutcome::Rejected | DeleteOutcome::Cancelled) => {
            app.modal = Some(ModalState::Info { message: "Cannot delete another admin.".to_string() });
        }
        Err(e) => {
            tracing::error!(error = %e, user = username, "delete failed");
            app.modal = Some(ModalState::Info { message: e.to_string() });
        }
    }
}

fn open_modal(app: &mut AppState, modal: ModalState) {
    app.modal = Some(modal);
    app.input_mode = InputMode::Modal;
}

fn close_modal(app: &mut AppState) {
    app.modal = None;
    app.input_mode = InputMode::Normal;
}
