//! Application state types and entry glue.
//!
//! Defines the enums and structs that model the TUI state on top of a
//! [`UserPanel`], plus the event loop entry point (re-exported as `run`).
//!
pub mod theme;
pub mod update;

use crate::export::ExportSink;
use crate::model::Role;
use crate::panel::{Clock, UserPanel};
use crate::store::Store;

pub use theme::Theme;

/// Panel over type-erased store and clock, as driven by the TUI.
pub type DynPanel = UserPanel<Box<dyn Store>, Box<dyn Clock>>;

/// Which pane has keyboard focus.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pane {
    Users,
    Log,
}

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the focused pane's search box.
    Search,
    Modal,
}

/// Modal dialogs. While one is open every key goes to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalState {
    /// Role picker for the user under edit; the staged role lives in the panel.
    EditRole { username: String },
    DeleteConfirm {
        username: String,
        question: String,
        /// 0 = Yes, 1 = No
        selected: usize,
    },
    Info { message: String },
}

pub struct AppState {
    pub panel: DynPanel,
    pub sink: Box<dyn ExportSink>,
    /// Where exports land, for status messages.
    pub export_target: String,
    pub focus: Pane,
    pub input_mode: InputMode,
    pub user_query: String,
    pub log_query: String,
    pub selected_user_index: usize,
    pub selected_log_index: usize,
    /// Rows shown per page in the users table, set on render.
    pub rows_per_page: usize,
    /// Rows shown per page in the activity log, set on render.
    pub log_rows_per_page: usize,
    pub theme: Theme,
    pub modal: Option<ModalState>,
    pub status: Option<String>,
}

impl AppState {
    pub fn new(panel: DynPanel, sink: Box<dyn ExportSink>, export_target: impl Into<String>, theme: Theme) -> Self {
        Self {
            panel,
            sink,
            export_target: export_target.into(),
            focus: Pane::Users,
            input_mode: InputMode::Normal,
            user_query: String::new(),
            log_query: String::new(),
            selected_user_index: 0,
            selected_log_index: 0,
            rows_per_page: 10,
            log_rows_per_page: 10,
            theme,
            modal: None,
            status: None,
        }
    }

    /// Number of users in the filtered view.
    pub fn visible_users(&self) -> usize {
        self.panel.filtered_users(&self.user_query).len()
    }

    /// Number of log entries in the filtered view.
    pub fn visible_log(&self) -> usize {
        self.panel.filtered_log(&self.log_query).len()
    }

    /// Username and role of the highlighted row in the filtered users view.
    pub fn selected_user(&self) -> Option<(String, Role)> {
        self.panel
            .filtered_users(&self.user_query)
            .get(self.selected_user_index)
            .map(|(name, rec)| (name.to_string(), rec.role))
    }

    /// Keep both selections inside their filtered views.
    pub fn clamp_selection(&mut self) {
        self.selected_user_index = self.selected_user_index.min(self.visible_users().saturating_sub(1));
        self.selected_log_index = self.selected_log_index.min(self.visible_log().saturating_sub(1));
    }

    /// Page step for the focused pane.
    pub fn page_size(&self) -> usize {
        match self.focus {
            Pane::Users => self.rows_per_page.max(1),
            Pane::Log => self.log_rows_per_page.max(1),
        }
    }

    pub fn active_query(&self) -> &str {
        match self.focus {
            Pane::Users => &self.user_query,
            Pane::Log => &self.log_query,
        }
    }

    pub fn active_query_mut(&mut self) -> &mut String {
        match self.focus {
            Pane::Users => &mut self.user_query,
            Pane::Log => &mut self.log_query,
        }
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
