// Integration tests for user-panel

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::json;
use user_panel::cli::{Command, ExportKind, StdioPrompt, run_command};
use user_panel::export::{self, DirSink, MemorySink};
use user_panel::model::Role;
use user_panel::panel::{Clock, UserPanel};
use user_panel::store::{FileStore, LOG_KEY, SESSION_KEY, Store, USERS_KEY};

struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> String {
        "7/4/2025, 12:30:00 PM".to_string()
    }
}

fn tmp_dir(tag: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    let nonce = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    p.push(format!("upanel_it_{tag}_{}_{}", std::process::id(), nonce));
    std::fs::create_dir_all(&p).unwrap();
    p
}

fn seed_file_store(dir: &Path) -> PathBuf {
    let path = dir.join("store.json");
    let mut store = FileStore::open(&path);
    store
        .save(
            USERS_KEY,
            json!({
                "alice": {"role": "user"},
                "bob": {"role": "admin"},
                "carol": {"role": "doctor", "modified": "1/1/2025, 9:00:00 AM"}
            }),
        )
        .unwrap();
    store.save(SESSION_KEY, json!("bob")).unwrap();
    path
}

/// Split on commas outside quotes; enough to read back what the exporter writes.
fn parse_csv(body: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for line in body.split('\n') {
        let mut fields = Vec::new();
        let mut cur = String::new();
        let mut quoted = false;
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            match (c, quoted) {
                ('"', true) if chars.peek() == Some(&'"') => {
                    cur.push('"');
                    chars.next();
                }
                ('"', _) => quoted = !quoted,
                (',', false) => fields.push(std::mem::take(&mut cur)),
                _ => cur.push(c),
            }
        }
        fields.push(cur);
        rows.push(fields);
    }
    rows
}

// 1) Filtered users CSV reads back as the same triples
#[test]
fn users_csv_round_trips_filtered_view() {
    let dir = tmp_dir("csv");
    let path = seed_file_store(&dir);
    let panel = UserPanel::open(FileStore::open(&path), FixedClock);

    let view = panel.filtered_users("o");
    let mut sink = MemorySink::default();
    export::export_users_csv(&view, &mut sink).unwrap();
    let body = String::from_utf8(sink.files[0].bytes.clone()).unwrap();
    let rows = parse_csv(&body);

    assert_eq!(rows[0], ["Username", "Role", "Modified"]);
    let expected: Vec<Vec<String>> = view
        .iter()
        .map(|(n, r)| vec![n.to_string(), r.role.as_str().to_string(), r.modified_or_na().to_string()])
        .collect();
    assert_eq!(&rows[1..], expected.as_slice());
    // bob (admin) and carol (doctor) match "o"; alice does not
    assert_eq!(expected.len(), 2);

    let _ = std::fs::remove_dir_all(&dir);
}

// 2) Mutations through the file store survive a restart
#[test]
fn file_backed_mutations_survive_restart() {
    let dir = tmp_dir("restart");
    let path = seed_file_store(&dir);
    {
        let mut panel = UserPanel::open(FileStore::open(&path), FixedClock);
        panel.begin_edit("alice", Role::User).unwrap();
        panel.stage_role(Role::Manager).unwrap();
        panel.commit_edit().unwrap();
        panel.delete_confirmed("carol").unwrap();
    }
    let store = FileStore::open(&path);
    assert_eq!(
        store.load(USERS_KEY),
        Some(json!({
            "alice": {"role": "manager", "modified": "7/4/2025, 12:30:00 PM"},
            "bob": {"role": "admin"}
        }))
    );
    let log = store.load(LOG_KEY).unwrap();
    assert_eq!(log[0]["action"], "Changed role of 'alice' to 'manager'");
    assert_eq!(log[1]["action"], "Deleted user 'carol'");
    assert_eq!(log[1]["user"], "bob");

    let _ = std::fs::remove_dir_all(&dir);
}

// 3) Subcommands drive the panel, prompt and sink
#[test]
fn subcommands_export_and_delete() {
    let dir = tmp_dir("cli");
    let path = seed_file_store(&dir);
    let out_dir = dir.join("exports");
    let mut panel = UserPanel::open(FileStore::open(&path), FixedClock);
    let mut sink = DirSink::new(&out_dir);
    let mut out: Vec<u8> = Vec::new();

    let mut prompt = StdioPrompt::new("n\n".as_bytes(), Vec::<u8>::new(), false);
    run_command(
        &Command::Delete { username: "alice".into(), yes: false },
        &mut panel,
        &mut sink,
        &mut prompt,
        &mut out,
    )
    .unwrap();
    assert!(panel.users().contains("alice"));

    let mut prompt = StdioPrompt::new("y\n".as_bytes(), Vec::<u8>::new(), false);
    run_command(
        &Command::Delete { username: "alice".into(), yes: false },
        &mut panel,
        &mut sink,
        &mut prompt,
        &mut out,
    )
    .unwrap();
    assert!(!panel.users().contains("alice"));

    // admins and the signed-in user are refused
    let mut prompt = StdioPrompt::new("".as_bytes(), Vec::<u8>::new(), true);
    assert!(
        run_command(
            &Command::Delete { username: "bob".into(), yes: true },
            &mut panel,
            &mut sink,
            &mut prompt,
            &mut out,
        )
        .is_err()
    );

    for kind in [ExportKind::UsersCsv, ExportKind::UsersPdf, ExportKind::LogCsv] {
        run_command(
            &Command::Export { kind, query: String::new() },
            &mut panel,
            &mut sink,
            &mut prompt,
            &mut out,
        )
        .unwrap();
    }
    let log_csv = std::fs::read_to_string(out_dir.join(export::LOG_CSV)).unwrap();
    assert_eq!(
        log_csv,
        "Timestamp,User,Action\n\"7/4/2025, 12:30:00 PM\",bob,Deleted user 'alice'"
    );
    let pdf = std::fs::read(out_dir.join(export::USERS_PDF)).unwrap();
    assert!(pdf.starts_with(b"%PDF-"));
    assert!(String::from_utf8_lossy(&pdf).contains("(carol) Tj"));
    assert!(out_dir.join(export::USERS_CSV).exists());

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Cancelled"));
    assert!(printed.contains("Deleted user 'alice'"));
    assert!(printed.contains("Wrote user_list.pdf"));

    let _ = std::fs::remove_dir_all(&dir);
}

// 4) set-role and listing
#[test]
fn set_role_then_list() {
    let dir = tmp_dir("setrole");
    let path = seed_file_store(&dir);
    let mut panel = UserPanel::open(FileStore::open(&path), FixedClock);
    let mut sink = MemorySink::default();
    let mut prompt = StdioPrompt::new("".as_bytes(), Vec::<u8>::new(), false);
    let mut out: Vec<u8> = Vec::new();

    run_command(
        &Command::SetRole { username: "carol".into(), role: Role::Admin },
        &mut panel,
        &mut sink,
        &mut prompt,
        &mut out,
    )
    .unwrap();
    run_command(&Command::Users { query: "ADMIN".into() }, &mut panel, &mut sink, &mut prompt, &mut out).unwrap();
    run_command(&Command::Log { query: String::new() }, &mut panel, &mut sink, &mut prompt, &mut out).unwrap();

    assert!(
        run_command(
            &Command::SetRole { username: "nobody".into(), role: Role::User },
            &mut panel,
            &mut sink,
            &mut prompt,
            &mut out,
        )
        .is_err()
    );

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Changed role of 'carol' to 'admin'"));
    assert!(printed.contains("7/4/2025, 12:30:00 PM - bob: Changed role of 'carol' to 'admin'"));
    let listed: Vec<&str> = printed
        .lines()
        .filter(|l| l.starts_with("bob ") || l.starts_with("carol "))
        .collect();
    assert_eq!(listed.len(), 2);

    let _ = std::fs::remove_dir_all(&dir);
}
