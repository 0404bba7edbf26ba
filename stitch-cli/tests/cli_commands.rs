use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn stitch_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stitch"));
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("STITCH_BASE_URL")
        .env_remove("STITCH_TOKEN");
    cmd
}

fn init_project(dir: &Path) {
    stitch_cmd(dir)
        .args(["init", "--name", "acme", "--base-url", "http://127.0.0.1:9"])
        .assert()
        .success();
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, content).expect("write");
}

#[test]
fn init_writes_config_and_empty_cache() {
    let tmp = TempDir::new().expect("tmp");
    stitch_cmd(tmp.path())
        .args(["init", "--name", "acme", "--base-url", "https://acme.example.com/api"])
        .assert()
        .success()
        .stdout(contains("Initialized 'acme'"));

    let config = fs::read_to_string(tmp.path().join(".stitch/config.yaml")).expect("config");
    assert!(config.contains("name: acme"));
    assert!(config.contains("base_url: https://acme.example.com/api"));

    let cache: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(tmp.path().join(".stitch/file-hashes.json")).expect("cache"),
    )
    .expect("cache json");
    assert_eq!(cache["version"], "1.0");
    assert_eq!(cache["hashes"], serde_json::json!({}));
}

#[test]
fn init_twice_keeps_existing_config() {
    let tmp = TempDir::new().expect("tmp");
    init_project(tmp.path());
    stitch_cmd(tmp.path())
        .args(["init", "--name", "other", "--base-url", "https://other.example.com"])
        .assert()
        .success()
        .stdout(contains("already a stitch project"));

    let config = fs::read_to_string(tmp.path().join(".stitch/config.yaml")).expect("config");
    assert!(config.contains("name: acme"));
}

#[test]
fn status_outside_project_fails_with_hint() {
    let tmp = TempDir::new().expect("tmp");
    stitch_cmd(tmp.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(contains("stitch init"));
}

#[test]
fn status_json_lists_new_files_by_area() {
    let tmp = TempDir::new().expect("tmp");
    init_project(tmp.path());
    write(tmp.path(), "src/backend/nightly.js", "cleanup();");
    write(tmp.path(), "src/backend/nightly.json", "{\"name\": \"nightly\"}\n");
    write(tmp.path(), "src/pages/home.html", "<h1/>");

    let assert = stitch_cmd(tmp.path())
        .args(["status", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let status: serde_json::Value = serde_json::from_str(&stdout).expect("status json");

    assert_eq!(status["total"]["new"], 3);
    assert_eq!(status["total"]["changed"], 0);
    assert_eq!(status["new"]["backend"].as_array().map(Vec::len), Some(2));
    assert_eq!(status["new"]["pages"][0], "src/pages/home.html");
    assert_eq!(status["last_sync_age"], "never");
}

#[test]
fn status_works_from_nested_directory_and_with_project_flag() {
    let tmp = TempDir::new().expect("tmp");
    init_project(tmp.path());
    write(tmp.path(), "src/reports/revenue.sql", "select 1");
    let nested = tmp.path().join("src/reports");

    stitch_cmd(&nested)
        .arg("status")
        .assert()
        .success()
        .stdout(contains("src/reports/revenue.sql"));

    let elsewhere = TempDir::new().expect("elsewhere");
    stitch_cmd(elsewhere.path())
        .arg("-C")
        .arg(tmp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(contains("acme"));
}

#[test]
fn cache_clear_resets_hashes() {
    let tmp = TempDir::new().expect("tmp");
    init_project(tmp.path());
    fs::write(
        tmp.path().join(".stitch/file-hashes.json"),
        r#"{"version": "1.0", "hashes": {"src/pages/home.html": "abc"}}"#,
    )
    .expect("seed cache");

    stitch_cmd(tmp.path())
        .args(["cache", "clear"])
        .assert()
        .success()
        .stdout(contains("Cleared 1"));

    let cache = fs::read_to_string(tmp.path().join(".stitch/file-hashes.json")).expect("cache");
    assert!(!cache.contains("home.html"));
}

#[test]
fn push_with_no_changes_needs_no_network() {
    let tmp = TempDir::new().expect("tmp");
    init_project(tmp.path());
    stitch_cmd(tmp.path())
        .arg("push")
        .assert()
        .success()
        .stdout(contains("Nothing to push"));
}

#[test]
fn pull_against_unreachable_remote_fails() {
    let tmp = TempDir::new().expect("tmp");
    init_project(tmp.path());
    stitch_cmd(tmp.path())
        .arg("pull")
        .assert()
        .failure()
        .stderr(contains("failed to fetch objects").and(contains("127.0.0.1:9")));
    assert!(!tmp.path().join("src").exists());
}
