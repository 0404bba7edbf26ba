//! Project config error-message, atomic-write-safety, and init integration tests.

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use std::fs;
use stitch_core::{project, CoreError, ProjectConfig};

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_missing_config_returns_not_found() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let err = project::load_config_at(root.path()).unwrap_err();
    assert!(matches!(err, CoreError::ProjectNotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("stitch init"));
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child(".stitch/config.yaml")
        .write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = project::load_config_at(root.path()).unwrap_err();
    assert!(matches!(err, CoreError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Atomic write safety
// ---------------------------------------------------------------------------

#[test]
fn save_cleans_up_tmp_file() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    project::save_config_at(root.path(), &ProjectConfig::new("acme", "https://x.example.com"))
        .expect("save");
    root.child(".stitch/config.yaml.tmp")
        .assert(predicate::path::missing());
}

#[test]
fn mid_write_crash_leaves_original_intact() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    project::save_config_at(root.path(), &ProjectConfig::new("acme", "https://x.example.com"))
        .expect("save");
    let path = project::config_path(root.path());
    let original = fs::read(&path).expect("read original");

    // Simulate crash: .tmp written but process died before rename
    let tmp = path.with_file_name("config.yaml.tmp");
    fs::write(&tmp, b"CRASH - INCOMPLETE WRITE").expect("write crash tmp");

    assert_eq!(fs::read(&path).expect("read after crash"), original);
    let loaded = project::load_config_at(root.path()).expect("load");
    assert_eq!(loaded.name, "acme");
}

// ---------------------------------------------------------------------------
// 3. Init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_with_private_mode() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let cfg = project::init_at(root.path(), "acme", "https://acme.example.com/api").expect("init");
    assert_eq!(cfg.base_url, "https://acme.example.com/api");

    root.child(".stitch/config.yaml")
        .assert(predicate::path::exists());
    root.child(".stitch/config.yaml")
        .assert(predicate::str::contains("base_url: https://acme.example.com/api"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(project::config_path(root.path()))
            .expect("meta")
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(mode, 0o600, "expected 0600, got {mode:o}");
    }
}

#[test]
fn init_is_idempotent() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    project::init_at(root.path(), "first", "https://one.example.com").expect("first init");
    let second =
        project::init_at(root.path(), "second", "https://two.example.com").expect("second init");
    // First wins: idempotent
    assert_eq!(second.name, "first");
    assert_eq!(second.base_url, "https://one.example.com");
}
