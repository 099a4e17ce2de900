//! Command-line surface: argument parsing and the one-shot subcommands.
//!
//! Every subcommand drives the same [`UserPanel`] as the TUI, so role
//! changes and deletes made here land in the activity log too.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::PanelConfig;
use crate::export::{self, ExportSink};
use crate::model::Role;
use crate::panel::{Clock, DeleteOutcome, Prompt, UserPanel};
use crate::store::Store;

#[derive(Parser, Debug)]
#[command(name = "user-panel")]
#[command(about = "Review, search and administer user roles with an activity log")]
#[command(version)]
pub struct Cli {
    /// Path to panel.conf
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON store document (overrides panel.conf)
    #[arg(long, global = true, env = "USER_PANEL_STORE")]
    pub store: Option<PathBuf>,

    /// Directory receiving exports (overrides panel.conf)
    #[arg(long, global = true, env = "USER_PANEL_EXPORT_DIR")]
    pub export_dir: Option<PathBuf>,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the interactive panel (default)
    Tui,
    /// Print users matching a query
    Users {
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Print activity log entries matching a query
    Log {
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Change a user's role
    SetRole { username: String, role: Role },
    /// Delete a user (never an admin)
    Delete {
        username: String,
        /// Skip the confirmation question
        #[arg(short, long)]
        yes: bool,
    },
    /// Export the filtered users or log
    Export {
        #[arg(value_enum)]
        kind: ExportKind,
        #[arg(short, long, default_value = "")]
        query: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    UsersCsv,
    UsersPdf,
    LogCsv,
}

impl Cli {
    /// panel.conf (or defaults) with the command-line overrides applied.
    pub fn resolve_config(&self) -> PanelConfig {
        let path = self.config.clone().unwrap_or_else(PanelConfig::default_path);
        let mut cfg = PanelConfig::load_or_init(&path);
        if let Some(store) = &self.store {
            cfg.store_path = store.clone();
        }
        if let Some(dir) = &self.export_dir {
            cfg.export_dir = dir.clone();
        }
        cfg
    }
}

/// Terminal prompt: notices go to stderr, confirmations read a y/N line.
pub struct StdioPrompt<R, W> {
    input: R,
    output: W,
    assume_yes: bool,
}

impl<R: BufRead, W: Write> StdioPrompt<R, W> {
    pub fn new(input: R, output: W, assume_yes: bool) -> Self {
        Self { input, output, assume_yes }
    }
}

impl<R: BufRead, W: Write> Prompt for StdioPrompt<R, W> {
    fn alert(&mut self, message: &str) {
        let _ = writeln!(self.output, "{message}");
    }

    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let _ = write!(self.output, "{message} [y/N] ");
        let _ = self.output.flush();
        let mut line = String::new();
        if self.input.read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Run a non-interactive subcommand, writing results to `out`.
pub fn run_command<S: Store, C: Clock>(
    command: &Command,
    panel: &mut UserPanel<S, C>,
    sink: &mut dyn ExportSink,
    prompt: &mut dyn Prompt,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Tui => bail!("the interactive panel is started from main"),
        Command::Users { query } => {
            let rows = panel.filtered_users(query);
            let width = rows.iter().map(|(n, _)| n.len()).max().unwrap_or(0).max("Username".len());
            writeln!(out, "{:<width$}  {:<8}  Modified", "Username", "Role")?;
            for (name, rec) in rows {
                writeln!(out, "{name:<width$}  {:<8}  {}", rec.role.as_str(), rec.modified_or_na())?;
            }
        }
        Command::Log { query } => {
            for e in panel.filtered_log(query) {
                writeln!(out, "{} - {}: {}", e.timestamp, e.user, e.action)?;
            }
        }
        Command::SetRole { username, role } => {
            let current = panel
                .users()
                .get(username)
                .map(|r| r.role)
                .with_context(|| format!("no user named '{username}'"))?;
            panel.begin_edit(username, current)?;
            panel.stage_role(*role)?;
            panel.commit_edit()?;
            writeln!(out, "Changed role of '{username}' to '{role}'")?;
        }
        Command::Delete { username, .. } => {
            if !panel.can_offer_delete(username) {
                bail!("refusing to delete the signed-in user '{username}'");
            }
            match panel.delete(username, prompt)? {
                DeleteOutcome::Deleted => writeln!(out, "Deleted user '{username}'")?,
                DeleteOutcome::Rejected => bail!("'{username}' is an admin and cannot be deleted"),
                DeleteOutcome::Cancelled => writeln!(out, "Cancelled")?,
            }
        }
        Command::Export { kind, query } => {
            let file = match kind {
                ExportKind::UsersCsv => {
                    export::export_users_csv(&panel.filtered_users(query), sink)?;
                    export::USERS_CSV
                }
                ExportKind::UsersPdf => {
                    export::export_users_pdf(&panel.filtered_users(query), sink)?;
                    export::USERS_PDF
                }
                ExportKind::LogCsv => {
                    export::export_log_csv(&panel.filtered_log(query), sink)?;
                    export::LOG_CSV
                }
            };
            writeln!(out, "Wrote {file}")?;
        }
    }
    Ok(())
}
