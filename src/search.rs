//! Case-insensitive substring filters over users and log entries.
//!
//! Both filters are recomputed in full on every keystroke and keep the
//! input order.

use crate::model::{LogEntry, UserDirectory, UserRecord};

/// Users whose name or role contains `query`, ignoring case.
pub fn filter_users<'a>(users: &'a UserDirectory, query: &str) -> Vec<(&'a str, &'a UserRecord)> {
    let q = query.to_lowercase();
    users
        .iter()
        .filter(|(name, rec)| {
            q.is_empty()
                || name.to_lowercase().contains(&q)
                || rec.role.as_str().contains(&q)
        })
        .collect()
}

/// Log entries whose actor or action text contains `query`, ignoring case.
pub fn filter_log<'a>(log: &'a [LogEntry], query: &str) -> Vec<&'a LogEntry> {
    let q = query.to_lowercase();
    log.iter()
        .filter(|e| {
            q.is_empty()
                || e.user.to_lowercase().contains(&q)
                || e.action.to_lowercase().contains(&q)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;

    fn mk_dir(entries: &[(&str, Role)]) -> UserDirectory {
        entries
            .iter()
            .map(|(n, r)| (n.to_string(), UserRecord::new(*r)))
            .collect()
    }

    fn mk_entry(user: &str, action: &str) -> LogEntry {
        LogEntry {
            timestamp: "1/1/2025, 9:00:00 AM".into(),
            user: user.into(),
            action: action.into(),
        }
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let dir = mk_dir(&[("zoe", Role::User), ("adam", Role::Admin), ("max", Role::Doctor)]);
        let names: Vec<&str> = filter_users(&dir, "").into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["zoe", "adam", "max"]);
    }

    #[test]
    fn users_match_on_name_or_role_ignoring_case() {
        let dir = mk_dir(&[("Alice", Role::User), ("bob", Role::Admin), ("carol", Role::Manager)]);
        let by_name: Vec<&str> = filter_users(&dir, "ALI").into_iter().map(|(n, _)| n).collect();
        assert_eq!(by_name, ["Alice"]);
        let by_role: Vec<&str> = filter_users(&dir, "Adm").into_iter().map(|(n, _)| n).collect();
        assert_eq!(by_role, ["bob"]);
        assert!(filter_users(&dir, "nobody").is_empty());
    }

    #[test]
    fn log_matches_on_actor_or_action() {
        let log = vec![
            mk_entry("root", "Deleted user 'alice'"),
            mk_entry("Ops", "Changed role of 'bob' to 'manager'"),
            mk_entry("root", "Changed role of 'eve' to 'user'"),
        ];
        assert_eq!(filter_log(&log, "ops").len(), 1);
        let hits: Vec<&str> = filter_log(&log, "CHANGED").iter().map(|e| e.action.as_str()).collect();
        assert_eq!(hits, ["Changed role of 'bob' to 'manager'", "Changed role of 'eve' to 'user'"]);
        assert_eq!(filter_log(&log, "").len(), 3);
    }
}
