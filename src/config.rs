//! Panel configuration: parse/write `panel.conf` and resolve default paths.
//!
//! The file uses the same `<key> = <value>` format as `theme.conf`. Lines
//! starting with `#` and unknown keys are ignored. Command-line flags and
//! environment variables override whatever the file says.

use std::path::{Path, PathBuf};

use crate::error::{Context, Result};

const APP_DIR: &str = "user-panel";

/// Where configuration files live: `$XDG_CONFIG_HOME/user-panel` or `./`.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Where the store, exports and logs live: `$XDG_DATA_HOME/user-panel` or `./`.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelConfig {
    /// JSON document backing the key-value store.
    pub store_path: PathBuf,
    /// Directory receiving `user_list.csv`, `user_list.pdf`, `activity_log.csv`.
    pub export_dir: PathBuf,
    pub theme_path: PathBuf,
}

impl Default for PanelConfig {
    fn default() -> Self {
        let data = data_dir();
        Self {
            store_path: data.join("store.json"),
            export_dir: data.join("exports"),
            theme_path: config_dir().join("theme.conf"),
        }
    }
}

impl PanelConfig {
    pub fn default_path() -> PathBuf {
        config_dir().join("panel.conf")
    }

    /// Load from `path`; a missing file is created with the defaults.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        let cfg = Self::default();
        if let Err(e) = cfg.write_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "could not write default panel.conf");
        }
        cfg
    }

    /// Parse `path`. Keys missing from the file keep their defaults.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let mut cfg = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().map(|s| s.trim()).unwrap_or("");
            let val = parts.next().map(|s| s.trim()).unwrap_or("");
            if key.is_empty() || val.is_empty() {
                continue;
            }
            match key {
                "store_path" => cfg.store_path = expand_home(val),
                "export_dir" => cfg.export_dir = expand_home(val),
                "theme_path" => cfg.theme_path = expand_home(val),
                _ => {}
            }
        }
        cfg
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        use std::fmt::Write as _;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_ctx(|| format!("creating {}", parent.display()))?;
            }
        }
        let mut buf = String::new();
        buf.push_str("# user-panel configuration\n");
        buf.push_str("# Paths may start with ~/ for the home directory.\n\n");
        let _ = writeln!(buf, "store_path = {}", self.store_path.display());
        let _ = writeln!(buf, "export_dir = {}", self.export_dir.display());
        let _ = writeln!(buf, "theme_path = {}", self.theme_path.display());
        std::fs::write(path, buf).with_ctx(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

fn expand_home(val: &str) -> PathBuf {
    match (val.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(val),
    }
}
