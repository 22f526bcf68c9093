//! Tests that run the built `logrot` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Run logrot with the given arguments.
fn run_logrot(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_logrot"))
        .args(args)
        .output()
        .expect("Failed to execute logrot")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

#[test]
fn test_help_exits_zero() {
    let output = run_logrot(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("rotate"));
}

#[test]
fn test_unknown_flag_is_invalid_args() {
    let output = run_logrot(&["rotate", "--no-such-flag"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_zero_max_size_is_invalid_args() {
    let dir = TempDir::new().unwrap();
    let audit = dir.path().join("audit.log");

    let output = run_logrot(&[
        "rotate",
        "--source-dir",
        path_arg(dir.path()),
        "--audit-log",
        path_arg(&audit),
        "--max-size",
        "0",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error: invalid argument"));
    assert!(!audit.exists());
}

#[test]
fn test_missing_source_dir_exits_2() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing");
    let archive = dir.path().join("archive");
    let audit = dir.path().join("audit.log");

    let output = run_logrot(&[
        "rotate",
        "--source-dir",
        path_arg(&missing),
        "--archive-dir",
        path_arg(&archive),
        "--audit-log",
        path_arg(&audit),
    ]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot access directory"));
}

#[test]
fn test_held_lock_exits_3() {
    let dir = TempDir::new().unwrap();
    let audit = dir.path().join("audit.log");
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    // Our own pid, so the owner is alive.
    let pid = std::process::id();
    fs::write(dir.path().join("audit.log.lock"), format!("pid={}\nts={}\n", pid, now)).unwrap();

    let output = run_logrot(&[
        "rotate",
        "--source-dir",
        path_arg(dir.path()),
        "--audit-log",
        path_arg(&audit),
    ]);

    assert_eq!(output.status.code(), Some(3));
}

#[cfg(target_os = "linux")]
#[test]
fn test_fresh_lock_of_exited_process_is_taken_over() {
    let dir = TempDir::new().unwrap();
    let audit = dir.path().join("audit.log");
    let mut child = Command::new("true").spawn().expect("spawn true");
    let dead_pid = child.id();
    child.wait().unwrap();
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    fs::write(dir.path().join("audit.log.lock"), format!("pid={}\nts={}\n", dead_pid, now)).unwrap();

    let output = run_logrot(&[
        "rotate",
        "--source-dir",
        path_arg(dir.path()),
        "--archive-dir",
        path_arg(&dir.path().join("archive")),
        "--audit-log",
        path_arg(&audit),
    ]);

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stderr).contains("replacing abandoned run lock"));
    assert!(!dir.path().join("audit.log.lock").exists());
}

#[test]
fn test_rotate_with_json_summary() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("logs");
    let archive = dir.path().join("archive");
    let audit = dir.path().join("audit.log");
    fs::create_dir(&source).unwrap();
    fs::write(source.join("big.log"), vec![b'x'; 4096]).unwrap();
    fs::write(source.join("small.log"), b"tiny\n").unwrap();

    let output = run_logrot(&[
        "rotate",
        "--source-dir",
        path_arg(&source),
        "--archive-dir",
        path_arg(&archive),
        "--audit-log",
        path_arg(&audit),
        "--max-size",
        "1K",
        "--json",
    ]);

    assert_eq!(output.status.code(), Some(0));
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("summary JSON on stdout");
    assert_eq!(summary["rotated"].as_array().unwrap().len(), 1);
    assert_eq!(summary["rotated"][0]["name"], "big.log");
    assert_eq!(summary["skipped"][0], "small.log");

    assert_eq!(fs::metadata(source.join("big.log")).unwrap().len(), 0);
    assert_eq!(fs::read_dir(&archive).unwrap().count(), 1);
    assert!(!dir.path().join("audit.log.lock").exists());

    // Audit entries are echoed on stderr, never stdout.
    assert!(String::from_utf8_lossy(&output.stderr).contains("Archiving big.log"));
}

#[test]
fn test_relative_audit_log_in_source_dir_keeps_prior_entries() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("logs");
    fs::create_dir(&source).unwrap();
    let prior = "[2023-12-31 23:59:59] Check finished: 0 rotated, 0 skipped, 0 failed\n";
    fs::write(source.join("audit.log"), prior).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_logrot"))
        .current_dir(dir.path())
        .args([
            "rotate",
            "--source-dir",
            "logs",
            "--archive-dir",
            "arch",
            "--audit-log",
            "./logs/audit.log",
            "--max-size",
            "10",
        ])
        .output()
        .expect("Failed to execute logrot");

    assert_eq!(output.status.code(), Some(0));
    let audit = fs::read_to_string(source.join("audit.log")).unwrap();
    assert!(audit.starts_with(prior));
    assert!(!audit.contains("Archiving audit.log"));
    assert_eq!(fs::read_dir(dir.path().join("arch")).unwrap().count(), 0);
}

#[test]
fn test_watch_max_passes() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("logs");
    let audit = dir.path().join("audit.log");
    fs::create_dir(&source).unwrap();

    let output = run_logrot(&[
        "watch",
        "--source-dir",
        path_arg(&source),
        "--archive-dir",
        path_arg(&dir.path().join("archive")),
        "--audit-log",
        path_arg(&audit),
        "--interval-sec",
        "1",
        "--max-passes",
        "2",
    ]);

    assert_eq!(output.status.code(), Some(0));
    let audit_text = fs::read_to_string(&audit).unwrap();
    assert_eq!(audit_text.matches("Check finished").count(), 2);
}
