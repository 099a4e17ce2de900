//! The user panel core: cached store records plus the mutating operations.
//!
//! Every mutation writes the users mapping first, then appends one log
//! entry, and only then touches the cached copies. A failed write leaves
//! the cache untouched.

use crate::error::PanelError;
use crate::model::{LogEntry, Role, UserDirectory, UserRecord};
use crate::search;
use crate::store::{self, Store};

/// Source of human-readable timestamps.
pub trait Clock {
    fn now(&self) -> String;
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> String {
        (**self).now()
    }
}

/// Local wall-clock time, e.g. `3/14/2025, 9:05:07 PM`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        chrono::Local::now()
            .format("%-m/%-d/%Y, %-I:%M:%S %p")
            .to_string()
    }
}

/// Blocking operator interaction used by [`UserPanel::delete`].
pub trait Prompt {
    fn alert(&mut self, message: &str);
    fn confirm(&mut self, message: &str) -> bool;
}

/// Result of a delete request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Business rule refused the delete (admin target).
    Rejected,
    /// Operator declined the confirmation.
    Cancelled,
}

/// What a delete request needs before it may proceed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteCheck {
    Refused { notice: String },
    NeedsConfirmation { question: String },
}

/// Role change staged but not yet persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEdit {
    pub username: String,
    pub role: Role,
}

pub struct UserPanel<S: Store, C: Clock = SystemClock> {
    store: S,
    clock: C,
    users: UserDirectory,
    log: Vec<LogEntry>,
    session_user: Option<String>,
    editing: Option<PendingEdit>,
}

impl<S: Store, C: Clock> UserPanel<S, C> {
    /// Read `users`, `log` and the session username once from `store`.
    pub fn open(store: S, clock: C) -> Self {
        let users = store::load_users(&store);
        let log = store::load_log(&store);
        let session_user = store::load_session_user(&store);
        tracing::debug!(
            users = users.len(),
            log_entries = log.len(),
            session = session_user.as_deref().unwrap_or(""),
            "panel loaded"
        );
        Self {
            store,
            clock,
            users,
            log,
            session_user,
            editing: None,
        }
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn session_user(&self) -> Option<&str> {
        self.session_user.as_deref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn pending_edit(&self) -> Option<&PendingEdit> {
        self.editing.as_ref()
    }

    pub fn filtered_users(&self, query: &str) -> Vec<(&str, &UserRecord)> {
        search::filter_users(&self.users, query)
    }

    pub fn filtered_log(&self, query: &str) -> Vec<&LogEntry> {
        search::filter_log(&self.log, query)
    }

    /// The session's own record is never offered for deletion.
    pub fn can_offer_delete(&self, username: &str) -> bool {
        self.session_user.as_deref() != Some(username)
    }

    /// First half of a delete: refuse admins, otherwise phrase the question.
    pub fn check_delete(&self, username: &str) -> Result<DeleteCheck, PanelError> {
        let rec = self
            .users
            .get(username)
            .ok_or_else(|| PanelError::UnknownUser(username.to_string()))?;
        if rec.role == Role::Admin {
            return Ok(DeleteCheck::Refused {
                notice: "Cannot delete another admin.".to_string(),
            });
        }
        Ok(DeleteCheck::NeedsConfirmation {
            question: format!("Are you sure you want to delete user '{username}'?"),
        })
    }

    /// Second half of a delete, after the operator said yes. Admins are
    /// still refused here and come back as [`DeleteOutcome::Rejected`].
    pub fn delete_confirmed(&mut self, username: &str) -> Result<DeleteOutcome, PanelError> {
        if let DeleteCheck::Refused { .. } = self.check_delete(username)? {
            tracing::warn!(user = username, "refusing to delete admin");
            return Ok(DeleteOutcome::Rejected);
        }
        let mut updated = self.users.clone();
        updated.remove(username);
        self.record_users_change(updated, format!("Deleted user '{username}'"))?;
        if self.editing.as_ref().is_some_and(|e| e.username == username) {
            self.editing = None;
        }
        tracing::info!(user = username, "deleted user");
        Ok(DeleteOutcome::Deleted)
    }

    /// Delete `username`, consulting `prompt` for the notice or confirmation.
    pub fn delete(&mut self, username: &str, prompt: &mut dyn Prompt) -> Result<DeleteOutcome, PanelError> {
        match self.check_delete(username)? {
            DeleteCheck::Refused { notice } => {
                prompt.alert(&notice);
                Ok(DeleteOutcome::Rejected)
            }
            DeleteCheck::NeedsConfirmation { question } => {
                if !prompt.confirm(&question) {
                    tracing::debug!(user = username, "delete cancelled");
                    return Ok(DeleteOutcome::Cancelled);
                }
                self.delete_confirmed(username)
            }
        }
    }

    /// Enter edit mode for `username`, staging `current_role`.
    pub fn begin_edit(&mut self, username: &str, current_role: Role) -> Result<(), PanelError> {
        if !self.users.contains(username) {
            return Err(PanelError::UnknownUser(username.to_string()));
        }
        if let Some(pending) = &self.editing {
            if pending.username != username {
                return Err(PanelError::EditInProgress(pending.username.clone()));
            }
        }
        self.editing = Some(PendingEdit {
            username: username.to_string(),
            role: current_role,
        });
        Ok(())
    }

    /// Change the staged role of the pending edit.
    pub fn stage_role(&mut self, role: Role) -> Result<(), PanelError> {
        let pending = self.editing.as_mut().ok_or(PanelError::NoPendingEdit)?;
        pending.role = role;
        Ok(())
    }

    /// Persist the staged role, stamp `modified`, log it and leave edit mode.
    pub fn commit_edit(&mut self) -> Result<(), PanelError> {
        let PendingEdit { username, role } = self.editing.clone().ok_or(PanelError::NoPendingEdit)?;
        if !self.users.contains(&username) {
            self.editing = None;
            return Err(PanelError::UnknownUser(username));
        }
        let mut updated = self.users.clone();
        updated.insert(
            username.clone(),
            UserRecord {
                role,
                modified: Some(self.clock.now()),
            },
        );
        self.record_users_change(updated, format!("Changed role of '{username}' to '{role}'"))?;
        self.editing = None;
        tracing::info!(user = %username, role = %role, "changed role");
        Ok(())
    }

    /// Drop the staged role without writing anything.
    pub fn cancel_edit(&mut self) {
        if let Some(pending) = self.editing.take() {
            tracing::debug!(user = %pending.username, "edit cancelled");
        }
    }

    /// Write `updated`, then its log entry, then adopt both in the cache.
    /// When the log write fails the previous users mapping is written back.
    fn record_users_change(&mut self, updated: UserDirectory, action: String) -> Result<(), PanelError> {
        self.persist_users(&updated)?;
        if let Err(e) = self.append_log(action) {
            if let Err(undo) = store::save_users(&mut self.store, &self.users) {
                tracing::error!(error = %undo, "could not restore users after failed log write");
            }
            return Err(e);
        }
        self.users = updated;
        Ok(())
    }

    fn persist_users(&mut self, users: &UserDirectory) -> Result<(), PanelError> {
        store::save_users(&mut self.store, users).map_err(|source| PanelError::Store {
            key: store::USERS_KEY.to_string(),
            source,
        })
    }

    fn append_log(&mut self, action: String) -> Result<(), PanelError> {
        let entry = LogEntry {
            timestamp: self.clock.now(),
            user: self.session_user.clone().unwrap_or_default(),
            action,
        };
        let mut updated = self.log.clone();
        updated.push(entry);
        store::save_log(&mut self.store, &updated).map_err(|source| PanelError::Store {
            key: store::LOG_KEY.to_string(),
            source,
        })?;
        self.log = updated;
        Ok(())
    }
}
