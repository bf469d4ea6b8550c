use std::path::Path;
use std::process::{Command, Output};

const GROUP_EXPORT: &str = r#"{
    "name": "Book club",
    "users": [
        {"id": 1, "name": "Alice", "username": "alice"},
        {"id": 2, "name": "Bob", "username": "bob_b"},
        {"id": 3, "name": "Carol"}
    ],
    "messages": [
        {"id": 10, "type": "message", "date": "2024-03-01T09:00:00", "date_unixtime": "1709283600",
         "from": "Alice", "from_id": "user1", "text": "Who finished the book?"},
        {"id": 11, "type": "message", "date": "2024-03-01T09:05:00", "date_unixtime": "1709283900",
         "from": "Bob", "from_id": "user2", "reply_to_message_id": 10, "text": "Me!",
         "reactions": [{"type": "emoji", "count": 1, "emoji": "👍",
                        "recent": [{"from": "Alice", "from_id": "user1", "date": "2024-03-01T09:06:00"}]}]},
        {"id": 12, "type": "message", "date": "2024-03-01T09:07:00", "date_unixtime": "1709284020",
         "from": "Carol", "from_id": "user3", "text": "@bob_b spoilers please"},
        {"id": 13, "type": "message", "date": "2024-03-01T09:08:00",
         "from": "Dan", "from_id": "user4", "text": "lurking"}
    ]
}"#;

fn parley(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_parley"))
        .args(args)
        .current_dir(cwd)
        .env_remove("PARLEY_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run parley")
}

fn write_export(dir: &Path, contents: &str) -> String {
    let path = dir.join("result.json");
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn analyze_json_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let export = write_export(dir.path(), GROUP_EXPORT);

    let first = parley(&["analyze", &export, "--format", "json"], dir.path());
    let second = parley(&["analyze", &export, "--format", "json"], dir.path());
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    let value: serde_json::Value = serde_json::from_slice(&first.stdout).unwrap();
    let edges = value["report"]["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 3);
    assert_eq!(edges[0]["source"], "user2");
    assert_eq!(edges[0]["target"], "user1");
    assert_eq!(edges[0]["strength"], 1.0);
    assert_eq!(edges[1]["source"], "user3");
    assert_eq!(edges[1]["strength"], 0.5);
    assert_eq!(value["diagnostics"]["nodes_filtered_isolated"], 1);
}

#[test]
fn analyze_dot_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let export = write_export(dir.path(), GROUP_EXPORT);
    let out = dir.path().join("graph.dot");

    let result = parley(
        &["analyze", &export, "-f", "dot", "-o", &out.to_string_lossy()],
        dir.path(),
    );
    assert!(result.status.success());
    assert!(result.stdout.is_empty());

    let dot = std::fs::read_to_string(&out).unwrap();
    assert!(dot.starts_with("digraph parley {"));
    assert!(dot.contains("\"user2\" -> \"user1\""));
    assert!(!dot.contains("\u{1b}["));
}

#[test]
fn config_file_sets_default_format() {
    let dir = tempfile::tempdir().unwrap();
    let export = write_export(dir.path(), GROUP_EXPORT);
    std::fs::write(dir.path().join("parley.toml"), "[output]\nformat = \"force\"\n").unwrap();

    let result = parley(&["analyze", &export], dir.path());
    assert!(result.status.success());
    let value: serde_json::Value = serde_json::from_slice(&result.stdout).unwrap();
    assert_eq!(value["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(value["links"].as_array().unwrap().len(), 3);
}

#[test]
fn empty_export_exits_with_code_two() {
    let dir = tempfile::tempdir().unwrap();
    let export = write_export(dir.path(), r#"{"name": "Quiet", "messages": []}"#);

    let result = parley(&["analyze", &export], dir.path());
    assert_eq!(result.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&result.stderr).contains("no usable messages"));
}

#[test]
fn missing_export_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = parley(&["analyze", "nope.json"], dir.path());
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("Failed to read export"));
}

#[test]
fn participants_json_lists_everyone_with_all() {
    let dir = tempfile::tempdir().unwrap();
    let export = write_export(dir.path(), GROUP_EXPORT);

    let reported = parley(&["participants", &export, "--json"], dir.path());
    let rows: serde_json::Value = serde_json::from_slice(&reported.stdout).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 3);

    let all = parley(&["participants", &export, "--json", "--all"], dir.path());
    let rows: serde_json::Value = serde_json::from_slice(&all.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    let dan = rows.iter().find(|r| r["id"] == "user4").unwrap();
    assert_eq!(dan["known"], true);
    assert_eq!(dan["reported"], false);
}
