//! Integration tests for the vitals binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cli(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vitals"));
    // Keep the user's real config out of the picture
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

fn insert(temp_dir: &TempDir, data_dir: &Path, kind: &str) -> Vec<String> {
    let output = cli(temp_dir)
        .arg("insert")
        .arg(kind)
        .arg("--data-dir")
        .arg(data_dir)
        .output()
        .expect("Failed to run insert");
    assert!(output.status.success());
    String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn read_page(temp_dir: &TempDir, data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let output = cli(temp_dir)
        .arg("read")
        .args(args)
        .arg("--data-dir")
        .arg(data_dir)
        .output()
        .expect("Failed to run read");
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).expect("read prints JSON")
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Health record store and query tool"));
}

#[test]
fn test_availability() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("availability")
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Available"));
}

#[test]
fn test_insert_then_get() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    grant_all(&temp_dir, &data_dir);

    let ids = insert(&temp_dir, &data_dir, "steps");
    assert_eq!(ids.len(), 1);
    assert!(data_dir.join("changes.jsonl").exists());

    cli(&temp_dir)
        .arg("get")
        .arg("Steps")
        .arg(&ids[0])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 510"))
        .stdout(predicate::str::contains(ids[0].as_str()))
        .stdout(predicate::str::contains("\"dataOrigin\": \"vitals\""));
}

#[test]
fn test_insert_without_grant_fails() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli(&temp_dir)
        .arg("insert")
        .arg("steps")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Permission"));
    assert!(!data_dir.join("changes.jsonl").exists());

    cli(&temp_dir)
        .arg("read")
        .arg("Steps")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Permission"));
}

#[test]
fn test_get_with_wrong_type_fails() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    grant_all(&temp_dir, &data_dir);

    let ids = insert(&temp_dir, &data_dir, "weight");

    cli(&temp_dir)
        .arg("get")
        .arg("Steps")
        .arg(&ids[0])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure();
}

#[test]
fn test_unknown_record_type_rejected() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("read")
        .arg("Cholesterol")
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown record type"));
}

#[test]
fn test_read_pages_through_sleep_sessions() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    grant_all(&temp_dir, &data_dir);

    let ids = insert(&temp_dir, &data_dir, "sleep");
    assert_eq!(ids.len(), 3);

    let first = read_page(&temp_dir, &data_dir, &["SleepSession", "--page-size", "2"]);
    assert_eq!(first["records"].as_array().unwrap().len(), 2);
    let token = first["pageToken"].as_str().expect("more pages").to_string();

    let second = read_page(
        &temp_dir,
        &data_dir,
        &["SleepSession", "--page-size", "2", "--page-token", &token],
    );
    assert_eq!(second["records"].as_array().unwrap().len(), 1);
    assert!(second.get("pageToken").is_none());

    let mut seen: Vec<String> = first["records"]
        .as_array()
        .unwrap()
        .iter()
        .chain(second["records"].as_array().unwrap())
        .map(|r| r["metadata"]["id"].as_str().unwrap().to_string())
        .collect();
    seen.sort();
    let mut expected = ids.clone();
    expected.sort();
    assert_eq!(seen, expected);
}

#[test]
fn test_read_descending_and_time_filter() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    grant_all(&temp_dir, &data_dir);
    insert(&temp_dir, &data_dir, "sleep");

    let page = read_page(&temp_dir, &data_dir, &["SleepSession", "--descending"]);
    let records = page["records"].as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["stages"][0]["stage"], 5);
    assert_eq!(records[2]["stages"][0]["stage"], 6);

    let page = read_page(
        &temp_dir,
        &data_dir,
        &["SleepSession", "--after", "2100-01-01T00:00:00Z"],
    );
    assert!(page["records"].as_array().unwrap().is_empty());
}

#[test]
fn test_read_with_inverted_range_fails() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("read")
        .arg("Steps")
        .arg("--after")
        .arg("2024-01-02T00:00:00Z")
        .arg("--before")
        .arg("2024-01-01T00:00:00Z")
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidRange"));
}

#[test]
fn test_read_origin_filter() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    grant_all(&temp_dir, &data_dir);
    insert(&temp_dir, &data_dir, "steps");

    let page = read_page(&temp_dir, &data_dir, &["Steps", "--origin", "vitals"]);
    assert_eq!(page["records"].as_array().unwrap().len(), 1);

    let page = read_page(&temp_dir, &data_dir, &["Steps", "--origin", "some.other.app"]);
    assert!(page["records"].as_array().unwrap().is_empty());
}

#[test]
fn test_permissions_request_then_check() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli(&temp_dir)
        .arg("permissions")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("All permissions: false"))
        .stdout(predicate::str::contains("Missing:"));

    cli(&temp_dir)
        .arg("permissions")
        .arg("--request")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("All permissions: true"));

    cli(&temp_dir)
        .arg("permissions")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("All permissions: true"))
        .stdout(predicate::str::contains("Missing:").not());

    assert!(data_dir.join("permissions.json").exists());
}

#[test]
fn test_permissions_from_config_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let config_dir = temp_dir.path().join("config/vitals");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[permissions]\nread = [\"HeartRateSeries\"]\nwrite = []\n",
    )
    .unwrap();

    cli(&temp_dir)
        .arg("permissions")
        .arg("--request")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Granted: HeartRate"))
        .stdout(predicate::str::contains("All permissions: true"));
}

#[test]
fn test_invalid_config_is_reported() {
    let temp_dir = setup_test_dir();
    let config_dir = temp_dir.path().join("config/vitals");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[query]\npage_size = 0\n").unwrap();

    cli(&temp_dir)
        .arg("availability")
        .assert()
        .failure()
        .stderr(predicate::str::contains("page_size"));
}

#[test]
fn test_settings_is_best_effort() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("settings")
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings requested."));
}

#[test]
fn test_import_records() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    grant_all(&temp_dir, &data_dir);
    let payload = temp_dir.path().join("records.json");
    fs::write(
        &payload,
        r#"[
            {"type": "Steps", "startTime": "2024-03-01T08:00:00Z", "endTime": "2024-03-01T09:00:00Z", "count": 1200},
            {"type": "Weight", "time": "2024-03-01T07:00:00Z", "zoneOffset": "+01:00",
             "weight": {"unit": "pound", "value": 165.0}}
        ]"#,
    )
    .unwrap();

    cli(&temp_dir)
        .arg("import")
        .arg(&payload)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 records"));

    let page = read_page(&temp_dir, &data_dir, &["Weight"]);
    let records = page["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["weight"]["unit"], "pound");
    assert_eq!(records[0]["zoneOffset"], "+01:00");
}

#[test]
fn test_import_rejects_whole_batch_on_bad_record() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let payload = temp_dir.path().join("records.json");
    fs::write(
        &payload,
        r#"[
            {"type": "Steps", "startTime": "2024-03-01T08:00:00Z", "endTime": "2024-03-01T09:00:00Z", "count": 1200},
            {"type": "Steps", "startTime": "2024-03-01T08:00:00Z", "count": 5}
        ]"#,
    )
    .unwrap();

    cli(&temp_dir)
        .arg("import")
        .arg(&payload)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("MissingField"));

    assert!(!data_dir.join("changes.jsonl").exists());
}

#[test]
fn test_import_rejects_bad_unit() {
    let temp_dir = setup_test_dir();
    let payload = temp_dir.path().join("records.json");
    fs::write(
        &payload,
        r#"[{"type": "Height", "time": "2024-03-01T07:00:00Z", "height": {"unit": "cubit", "value": 4.0}}]"#,
    )
    .unwrap();

    cli(&temp_dir)
        .arg("import")
        .arg(&payload)
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidUnit"));
}
