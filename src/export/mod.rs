//! Exporters for the filtered views.
//!
//! Each exporter is a pure transform of the rows currently shown into file
//! bytes, handed to an [`ExportSink`] together with a file name and MIME
//! type. The host decides where the bytes land.

pub mod csv;
pub mod pdf;

use std::fs;
use std::path::PathBuf;

use crate::error::{Context, PanelError, Result};
use crate::model::{LogEntry, UserRecord};

pub const USERS_CSV: &str = "user_list.csv";
pub const USERS_PDF: &str = "user_list.pdf";
pub const LOG_CSV: &str = "activity_log.csv";

const CSV_MIME: &str = "text/csv;charset=utf-8";
const PDF_MIME: &str = "application/pdf";

const USER_HEADER: [&str; 3] = ["Username", "Role", "Modified"];
const LOG_HEADER: [&str; 3] = ["Timestamp", "User", "Action"];

/// Destination for exported files.
pub trait ExportSink {
    fn write(&mut self, bytes: &[u8], filename: &str, mime_type: &str) -> Result<()>;
}

/// Writes each export as `<dir>/<filename>`, replacing earlier exports.
#[derive(Clone, Debug)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExportSink for DirSink {
    fn write(&mut self, bytes: &[u8], filename: &str, _mime_type: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_ctx(|| format!("creating export directory {}", self.dir.display()))?;
        let path = self.dir.join(filename);
        fs::write(&path, bytes).with_ctx(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

/// A file captured by [`MemorySink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Keeps exports in memory; handy for tests and previews.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub files: Vec<ExportedFile>,
}

impl ExportSink for MemorySink {
    fn write(&mut self, bytes: &[u8], filename: &str, mime_type: &str) -> Result<()> {
        self.files.push(ExportedFile {
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

fn user_rows(users: &[(&str, &UserRecord)]) -> Vec<Vec<String>> {
    users
        .iter()
        .map(|(name, rec)| {
            vec![
                name.to_string(),
                rec.role.as_str().to_string(),
                rec.modified_or_na().to_string(),
            ]
        })
        .collect()
}

fn deliver(sink: &mut dyn ExportSink, bytes: &[u8], filename: &str, mime: &str) -> std::result::Result<(), PanelError> {
    sink.write(bytes, filename, mime)
        .map_err(|source| PanelError::Export {
            filename: filename.to_string(),
            source,
        })?;
    tracing::info!(file = filename, bytes = bytes.len(), "exported");
    Ok(())
}

/// `Username,Role,Modified` for each filtered user, as `user_list.csv`.
pub fn export_users_csv(users: &[(&str, &UserRecord)], sink: &mut dyn ExportSink) -> std::result::Result<(), PanelError> {
    let body = csv::render(&USER_HEADER, user_rows(users));
    deliver(sink, body.as_bytes(), USERS_CSV, CSV_MIME)
}

/// The filtered users as a titled table, as `user_list.pdf`.
pub fn export_users_pdf(users: &[(&str, &UserRecord)], sink: &mut dyn ExportSink) -> std::result::Result<(), PanelError> {
    let bytes = pdf::render_table("User List", &USER_HEADER, &user_rows(users));
    deliver(sink, &bytes, USERS_PDF, PDF_MIME)
}

/// `Timestamp,User,Action` for each filtered log entry, as `activity_log.csv`.
pub fn export_log_csv(log: &[&LogEntry], sink: &mut dyn ExportSink) -> std::result::Result<(), PanelError> {
    let rows = log
        .iter()
        .map(|e| [e.timestamp.as_str(), e.user.as_str(), e.action.as_str()]);
    let body = csv::render(&LOG_HEADER, rows);
    deliver(sink, body.as_bytes(), LOG_CSV, CSV_MIME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::simple_error;
    use crate::model::Role;

    struct FailingSink;

    impl ExportSink for FailingSink {
        fn write(&mut self, _bytes: &[u8], _filename: &str, _mime_type: &str) -> Result<()> {
            Err(simple_error("read-only filesystem"))
        }
    }

    #[test]
    fn users_csv_has_header_and_na_for_unmodified() {
        let alice = UserRecord::new(Role::User);
        let bob = UserRecord {
            role: Role::Admin,
            modified: Some("1/2/2025".into()),
        };
        let mut sink = MemorySink::default();
        export_users_csv(&[("alice", &alice), ("bob", &bob)], &mut sink).unwrap();
        let file = &sink.files[0];
        assert_eq!(file.filename, USERS_CSV);
        assert_eq!(file.mime_type, "text/csv;charset=utf-8");
        assert_eq!(
            String::from_utf8(file.bytes.clone()).unwrap(),
            "Username,Role,Modified\nalice,user,N/A\nbob,admin,1/2/2025"
        );
    }

    #[test]
    fn log_csv_quotes_timestamps_with_commas() {
        let entry = LogEntry {
            timestamp: "6/1/2025, 10:00:00 AM".into(),
            user: "root".into(),
            action: "Deleted user 'alice'".into(),
        };
        let mut sink = MemorySink::default();
        export_log_csv(&[&entry], &mut sink).unwrap();
        let body = String::from_utf8(sink.files[0].bytes.clone()).unwrap();
        assert_eq!(
            body,
            "Timestamp,User,Action\n\"6/1/2025, 10:00:00 AM\",root,Deleted user 'alice'"
        );
        assert_eq!(sink.files[0].filename, LOG_CSV);
    }

    #[test]
    fn users_pdf_is_named_and_typed() {
        let rec = UserRecord::new(Role::Doctor);
        let mut sink = MemorySink::default();
        export_users_pdf(&[("drew", &rec)], &mut sink).unwrap();
        assert_eq!(sink.files[0].filename, USERS_PDF);
        assert_eq!(sink.files[0].mime_type, "application/pdf");
        assert!(sink.files[0].bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn sink_failure_names_the_file() {
        let err = export_users_csv(&[], &mut FailingSink).unwrap_err();
        assert_eq!(err.to_string(), "export of 'user_list.csv' failed: read-only filesystem");
    }
}
