//! Command-line behaviour: exit status and output formats

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const FACTS: &str = r#"
facts:
  Person:
    age: { type: Integer }
"#;

const CLEAN_TABLE: &str = r#"
name: ages
patterns:
  - fact_type: Person
    binding: p
    conditions:
      - field: age
        operator: ">="
      - field: age
        operator: "<"
actions:
  - header: result
rows:
  - [1, "young", 18, 25, "A"]
  - [2, "adult", 25, 70, "B"]
"#;

const BROKEN_TABLE: &str = r#"
name: ages
patterns:
  - fact_type: Person
    binding: p
    conditions:
      - field: age
        operator: ">"
      - field: age
        operator: "<"
actions:
  - header: result
rows:
  - [1, "never", 10, 5, "A"]
  - [2, "teens", 12, 20, "B"]
"#;

fn dtanalyze(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dtanalyze"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run dtanalyze")
}

fn workspace(table: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("facts.yaml"), FACTS).unwrap();
    fs::write(dir.path().join("table.yaml"), table).unwrap();
    dir
}

#[test]
fn test_clean_table_exits_zero() {
    let dir = workspace(CLEAN_TABLE);

    let out = dtanalyze(dir.path(), &["analyze", "table.yaml", "--model", "facts.yaml"]);

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("ages: 2 row(s) analyzed"));
    assert!(stdout.contains("no issues found"));
}

#[test]
fn test_impossible_row_exits_one() {
    let dir = workspace(BROKEN_TABLE);

    let out = dtanalyze(dir.path(), &["analyze", "table.yaml", "--model", "facts.yaml"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stdout).contains("row 1: impossible match on p.age"));
}

#[test]
fn test_json_output() {
    let dir = workspace(BROKEN_TABLE);

    let out = dtanalyze(
        dir.path(),
        &["analyze", "table.yaml", "--model", "facts.yaml", "--json"],
    );

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["table"], "ages");
    assert_eq!(report["summary"]["impossible"], 1);
    assert_eq!(report["rows"][0]["findings"][0]["kind"], "impossible");
}

#[test]
fn test_config_in_working_directory_is_picked_up() {
    let dir = workspace(
        r#"
patterns:
  - fact_type: Person
    conditions:
      - field: age
        operator: "=="
actions:
  - header: result
rows:
  - [1, "", 10, "A"]
  - [2, "", 10, "A"]
"#,
    );
    fs::write(dir.path().join(".dtanalyze.yaml"), "detect_duplicates: false\n").unwrap();

    let out = dtanalyze(dir.path(), &["analyze", "table.yaml", "--model", "facts.yaml"]);

    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("no issues found"));
}

#[test]
fn test_malformed_table_exits_two() {
    let dir = workspace("patterns: [}");

    let out = dtanalyze(dir.path(), &["analyze", "table.yaml"]);

    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Error:"));
}

#[test]
fn test_schema_command() {
    let dir = TempDir::new().unwrap();

    let out = dtanalyze(dir.path(), &["schema", "config"]);

    assert!(out.status.success());
    let schema: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert!(schema["properties"]["detect_duplicates"].is_object());
}
