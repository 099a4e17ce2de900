//! Synchronous key-value store behind the panel.
//!
//! The panel only ever talks to a [`Store`]. Two implementations ship:
//! [`MemoryStore`] for tests and scratch use, and [`FileStore`], which keeps
//! every key in one JSON document on disk.
//!
//! Reads never fail: a missing key or unreadable data is `None`, and the
//! typed helpers below turn that into empty defaults.

use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Context, Result};
use crate::model::{LogEntry, UserDirectory};

/// Key holding the username -> record mapping.
pub const USERS_KEY: &str = "users";
/// Key holding the activity log.
pub const LOG_KEY: &str = "log";
/// Key holding the session username, written by the login collaborator.
pub const SESSION_KEY: &str = "username";

pub trait Store {
    fn load(&self, key: &str) -> Option<Value>;
    fn save(&mut self, key: &str, value: Value) -> Result<()>;
}

impl<S: Store + ?Sized> Store for &mut S {
    fn load(&self, key: &str) -> Option<Value> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: Value) -> Result<()> {
        (**self).save(key, value)
    }
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn load(&self, key: &str) -> Option<Value> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: Value) -> Result<()> {
        (**self).save(key, value)
    }
}

/// Users mapping, or an empty directory when absent or malformed.
pub fn load_users(store: &impl Store) -> UserDirectory {
    match store.load(USERS_KEY) {
        Some(v) => UserDirectory::from_value(v),
        None => UserDirectory::new(),
    }
}

/// Activity log, or an empty log when absent. Malformed entries are skipped.
pub fn load_log(store: &impl Store) -> Vec<LogEntry> {
    let Some(Value::Array(items)) = store.load(LOG_KEY) else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<LogEntry>(raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed log entry");
                None
            }
        })
        .collect()
}

/// Session username, if a login collaborator recorded one.
pub fn load_session_user(store: &impl Store) -> Option<String> {
    match store.load(SESSION_KEY)? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

pub fn save_users(store: &mut impl Store, users: &UserDirectory) -> Result<()> {
    store.save(USERS_KEY, users.to_value())
}

pub fn save_log(store: &mut impl Store, log: &[LogEntry]) -> Result<()> {
    let value = serde_json::to_value(log).with_ctx(|| "encoding activity log".to_string())?;
    store.save(LOG_KEY, value)
}

/// In-process store; nothing survives the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style seeding for tests and demos.
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }
}

impl Store for MemoryStore {
    fn load(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// All keys in a single JSON object file, rewritten in full on each save.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: serde_json::Map<String, Value>,
}

impl FileStore {
    /// Open the document at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = read_document(&path);
        tracing::debug!(path = %path.display(), keys = values.len(), "opened store");
        Self { path, values }
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_ctx(|| format!("creating store directory {}", parent.display()))?;
            }
        }
        let body = serde_json::to_string_pretty(&self.values)
            .with_ctx(|| "encoding store document".to_string())?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, body).with_ctx(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_ctx(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

fn read_document(path: &Path) -> serde_json::Map<String, Value> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return serde_json::Map::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "store unreadable; starting empty");
            return serde_json::Map::new();
        }
    };
    match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            tracing::warn!(path = %path.display(), "store is not a JSON object; starting empty");
            serde_json::Map::new()
        }
    }
}

impl Store for FileStore {
    fn load(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: Value) -> Result<()> {
        let previous = self.values.insert(key.to_string(), value);
        if let Err(e) = self.flush() {
            // keep memory in line with disk
            match previous {
                Some(v) => self.values.insert(key.to_string(), v),
                None => self.values.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}
