// Unit tests for user-panel
// These exercise the public API against an in-memory store.

#[cfg(test)]
mod panel_tests {
    use serde_json::json;
    use user_panel::model::{Role, UserRecord};
    use user_panel::panel::{Clock, DeleteOutcome, Prompt, UserPanel};
    use user_panel::store::{LOG_KEY, MemoryStore, SESSION_KEY, Store, USERS_KEY};

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> String {
            "2/3/2025, 4:05:06 PM".to_string()
        }
    }

    struct Answer(bool);

    impl Prompt for Answer {
        fn alert(&mut self, _message: &str) {}

        fn confirm(&mut self, _message: &str) -> bool {
            self.0
        }
    }

    fn seeded_store() -> MemoryStore {
        MemoryStore::new()
            .with(USERS_KEY, json!({"alice": {"role": "user"}, "bob": {"role": "admin"}}))
            .with(SESSION_KEY, json!("ops"))
    }

    #[test]
    fn test_scenario_delete_admin_then_user() {
        let mut store = seeded_store();
        let mut panel = UserPanel::open(&mut store, FixedClock);

        assert_eq!(panel.delete("bob", &mut Answer(true)).unwrap(), DeleteOutcome::Rejected);
        assert_eq!(panel.users().len(), 2);

        assert_eq!(panel.delete("alice", &mut Answer(true)).unwrap(), DeleteOutcome::Deleted);
        let names: Vec<&str> = panel.users().iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["bob"]);
        assert_eq!(panel.log().len(), 1);
        assert_eq!(panel.log()[0].action, "Deleted user 'alice'");
        drop(panel);

        // both writes landed in the store
        assert_eq!(store.load(USERS_KEY), Some(json!({"bob": {"role": "admin"}})));
        assert_eq!(
            store.load(LOG_KEY),
            Some(json!([{"timestamp": "2/3/2025, 4:05:06 PM", "user": "ops", "action": "Deleted user 'alice'"}]))
        );
    }

    #[test]
    fn test_scenario_edit_alice_to_manager() {
        let mut store = seeded_store();
        let mut panel = UserPanel::open(&mut store, FixedClock);
        panel.begin_edit("alice", Role::User).unwrap();
        panel.stage_role(Role::Manager).unwrap();
        panel.commit_edit().unwrap();

        let alice = panel.users().get("alice").unwrap();
        assert_eq!(alice.role, Role::Manager);
        assert!(alice.modified.is_some());
        assert_eq!(panel.log().last().unwrap().action, "Changed role of 'alice' to 'manager'");
        drop(panel);

        let stored = store.load(USERS_KEY).unwrap();
        assert_eq!(stored["alice"], json!({"role": "manager", "modified": "2/3/2025, 4:05:06 PM"}));
        assert_eq!(stored["bob"], json!({"role": "admin"}));
    }

    #[test]
    fn test_every_admin_is_undeletable() {
        let users: serde_json::Map<String, serde_json::Value> = (0..5)
            .map(|i| (format!("admin{i}"), json!({"role": "admin"})))
            .collect();
        let store = MemoryStore::new().with(USERS_KEY, serde_json::Value::Object(users));
        let mut panel = UserPanel::open(store, FixedClock);
        let before = panel.users().clone();
        for i in 0..5 {
            let name = format!("admin{i}");
            assert_eq!(panel.delete(&name, &mut Answer(true)).unwrap(), DeleteOutcome::Rejected);
            // the split API refuses as well
            assert_eq!(panel.delete_confirmed(&name).unwrap(), DeleteOutcome::Rejected);
        }
        assert_eq!(panel.users(), &before);
        assert!(panel.log().is_empty());
    }

    #[test]
    fn test_reopen_sees_committed_state() {
        let mut store = seeded_store();
        {
            let mut panel = UserPanel::open(&mut store, FixedClock);
            panel.begin_edit("bob", Role::Admin).unwrap();
            panel.stage_role(Role::Doctor).unwrap();
            panel.commit_edit().unwrap();
        }
        let panel = UserPanel::open(store, FixedClock);
        assert_eq!(panel.users().get("bob").unwrap().role, Role::Doctor);
        assert_eq!(panel.log().len(), 1);
        assert_eq!(panel.session_user(), Some("ops"));
        assert_ne!(panel.users().get("alice"), Some(&UserRecord::new(Role::Admin)));
    }
}

#[cfg(test)]
mod search_tests {
    use user_panel::model::{LogEntry, Role, UserDirectory, UserRecord};
    use user_panel::search::{filter_log, filter_users};

    fn create_directory() -> UserDirectory {
        [
            ("martha", Role::Manager),
            ("doc.brown", Role::Doctor),
            ("Eve", Role::User),
            ("root", Role::Admin),
        ]
        .into_iter()
        .map(|(n, r)| (n, UserRecord::new(r)))
        .collect()
    }

    #[test]
    fn test_filter_results_are_subset_in_order() {
        let dir = create_directory();
        for q in ["", "e", "DOC", "man", "zzz", "o"] {
            let hits = filter_users(&dir, q);
            let all: Vec<&str> = dir.iter().map(|(n, _)| n).collect();
            let mut last = None;
            for (name, rec) in &hits {
                let q = q.to_lowercase();
                assert!(name.to_lowercase().contains(&q) || rec.role.as_str().contains(&q));
                let pos = all.iter().position(|n| n == name).unwrap();
                assert!(last.is_none_or(|l| l < pos), "order broken for query {q:?}");
                last = Some(pos);
            }
        }
        assert_eq!(filter_users(&dir, "").len(), dir.len());
    }

    #[test]
    fn test_role_query_matches_role_not_name() {
        let dir = create_directory();
        let names: Vec<&str> = filter_users(&dir, "admin").into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["root"]);
    }

    #[test]
    fn test_log_filter_keeps_chronology() {
        let log: Vec<LogEntry> = (0..4)
            .map(|i| LogEntry {
                timestamp: format!("t{i}"),
                user: if i % 2 == 0 { "ops".into() } else { "root".into() },
                action: format!("Deleted user 'u{i}'"),
            })
            .collect();
        let hits: Vec<&str> = filter_log(&log, "OPS").iter().map(|e| e.timestamp.as_str()).collect();
        assert_eq!(hits, ["t0", "t2"]);
    }
}
