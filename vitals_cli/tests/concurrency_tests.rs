//! Concurrent access and damaged-log tests for the vitals binary.
//!
//! The change log is shared by every process pointed at a data directory:
//! - Parallel inserts must all land, one line per record
//! - Reads keep working when the log holds garbage lines

use assert_cmd::Command;
use std::fs::{self, OpenOptions};
use std::io::Write as IoWrite;
use std::path::Path;
use std::thread;
use tempfile::TempDir;

fn cli(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vitals"));
    cmd.env("XDG_CONFIG_HOME", temp_dir.path().join("config"));
    cmd.env("HOME", temp_dir.path());
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

const ALL_TYPES: &str = "[\"Steps\", \"HeartRate\", \"SleepSession\", \"ActiveCalories\", \
\"BasalBodyTemperature\", \"BasalMetabolicRate\", \"BloodGlucose\", \"BloodPressure\", \"Height\", \"Weight\"]";

/// Configure every record type and grant it in `data_dir`
fn grant_all(temp_dir: &TempDir, data_dir: &Path) {
    let config_dir = temp_dir.path().join("config/vitals");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        format!("[permissions]\nread = {ALL_TYPES}\nwrite = {ALL_TYPES}\n"),
    )
    .unwrap();

    cli(temp_dir)
        .arg("permissions")
        .arg("--request")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();
}

fn read_all(temp_dir: &TempDir, data_dir: &Path, record_type: &str) -> Vec<serde_json::Value> {
    let output = cli(temp_dir)
        .arg("read")
        .arg(record_type)
        .arg("--data-dir")
        .arg(data_dir)
        .output()
        .expect("Failed to run read");
    assert!(output.status.success());
    let page: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    page["records"].as_array().unwrap().clone()
}

#[test]
fn test_concurrent_inserts() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    grant_all(&temp_dir, &data_dir);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let data_dir = data_dir.clone();
            let home = temp_dir.path().to_path_buf();
            thread::spawn(move || {
                Command::new(assert_cmd::cargo::cargo_bin!("vitals"))
                    .env("XDG_CONFIG_HOME", home.join("config"))
                    .env("HOME", &home)
                    .arg("insert")
                    .arg("sleep")
                    .arg("--data-dir")
                    .arg(&data_dir)
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Insert thread panicked");
    }

    // 4 processes x 3 sessions, each on its own line
    let log = fs::read_to_string(data_dir.join("changes.jsonl")).unwrap();
    assert_eq!(log.lines().count(), 12);
    for line in log.lines() {
        serde_json::from_str::<serde_json::Value>(line).expect("every line is whole JSON");
    }

    assert_eq!(read_all(&temp_dir, &data_dir, "SleepSession").len(), 12);
}

#[test]
fn test_corrupted_log_lines_are_skipped() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    grant_all(&temp_dir, &data_dir);

    cli(&temp_dir)
        .arg("insert")
        .arg("steps")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    {
        let mut file = OpenOptions::new()
            .append(true)
            .open(data_dir.join("changes.jsonl"))
            .unwrap();
        writeln!(file, "{{ invalid json }}").unwrap();
        // Partial write left behind by a crash
        write!(file, r#"{{"type":"Upsert","record":{{"type":"Steps","#).unwrap();
    }

    assert_eq!(read_all(&temp_dir, &data_dir, "Steps").len(), 1);

    // The next append starts on a fresh line
    cli(&temp_dir)
        .arg("insert")
        .arg("steps")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    assert_eq!(read_all(&temp_dir, &data_dir, "Steps").len(), 2);
}

#[test]
fn test_corrupted_permissions_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("permissions.json"), "{ invalid json }}}}").unwrap();

    cli(&temp_dir)
        .arg("permissions")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicates::str::contains("All permissions: false"));
}
