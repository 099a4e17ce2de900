//! Records kept in the store: user roles and activity log entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Access role assigned to a user record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Doctor,
    Manager,
    Admin,
}

impl Role {
    /// All roles in picker order.
    pub const ALL: [Role; 4] = [Role::User, Role::Doctor, Role::Manager, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Doctor => "doctor",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    /// Label shown in the role picker.
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Doctor => "Doctor",
            Role::Manager => "Manager",
            Role::Admin => "Admin",
        }
    }

    /// Next role in picker order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|r| *r == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous role in picker order, wrapping around.
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|r| *r == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = crate::error::SimpleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "doctor" => Ok(Role::Doctor),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            other => Err(crate::error::SimpleError::new(format!(
                "unknown role '{other}' (expected user, doctor, manager or admin)"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

impl UserRecord {
    pub fn new(role: Role) -> Self {
        Self { role, modified: None }
    }

    /// `modified` as displayed and exported.
    pub fn modified_or_na(&self) -> &str {
        self.modified.as_deref().unwrap_or("N/A")
    }
}

/// One immutable line of the activity log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    /// Actor: the session username at the time of the action.
    pub user: String,
    pub action: String,
}

/// Username -> record mapping that keeps the order the store yielded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserDirectory {
    entries: Vec<(String, UserRecord)>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, username: &str) -> Option<&UserRecord> {
        self.entries
            .iter()
            .find(|(name, _)| name == username)
            .map(|(_, rec)| rec)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.get(username).is_some()
    }

    /// Insert or replace; a replaced record keeps its position.
    pub fn insert(&mut self, username: impl Into<String>, record: UserRecord) {
        let username = username.into();
        match self.entries.iter_mut().find(|(name, _)| *name == username) {
            Some((_, slot)) => *slot = record,
            None => self.entries.push((username, record)),
        }
    }

    pub fn remove(&mut self, username: &str) -> Option<UserRecord> {
        let idx = self.entries.iter().position(|(name, _)| name == username)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UserRecord)> {
        self.entries.iter().map(|(name, rec)| (name.as_str(), rec))
    }

    /// Build from a stored JSON object. Entries that do not decode are
    /// skipped and reported; a non-object yields an empty directory.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(map) = value else {
            tracing::warn!("stored users value is not an object; using empty directory");
            return Self::default();
        };
        let mut dir = Self::default();
        for (name, raw) in map {
            match serde_json::from_value::<UserRecord>(raw) {
                Ok(rec) => dir.entries.push((name, rec)),
                Err(e) => tracing::warn!(user = %name, error = %e, "skipping malformed user record"),
            }
        }
        dir
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.entries.len());
        for (name, rec) in &self.entries {
            // UserRecord only holds strings and a unit enum
            let v = serde_json::to_value(rec).unwrap_or(Value::Null);
            map.insert(name.clone(), v);
        }
        Value::Object(map)
    }
}

impl<S: Into<String>> FromIterator<(S, UserRecord)> for UserDirectory {
    fn from_iter<I: IntoIterator<Item = (S, UserRecord)>>(iter: I) -> Self {
        let mut dir = Self::default();
        for (name, rec) in iter {
            dir.insert(name, rec);
        }
        dir
    }
}
