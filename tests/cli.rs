//! Integration tests for the sriracha command line
//!
//! Every test points `--config` at a temporary directory so the user's real
//! configuration is never touched.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// Command with HOME and AWS settings isolated from the host
fn sriracha(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sriracha").unwrap();
    cmd.env("HOME", home)
        .env_remove("SRIRACHA_CONFIG")
        .env("AWS_REGION", "us-east-1")
        .env("AWS_EC2_METADATA_DISABLED", "true")
        .env("AWS_ACCESS_KEY_ID", "test")
        .env("AWS_SECRET_ACCESS_KEY", "test");
    cmd
}

fn configure(temp_dir: &TempDir) -> std::path::PathBuf {
    let config_path = temp_dir.path().join("config.toml");
    sriracha(temp_dir.path())
        .arg("--config")
        .arg(&config_path)
        .arg("configure")
        .arg("--local-sync-dir")
        .arg(temp_dir.path().join("s3"))
        .arg("--log-dir")
        .arg("")
        .arg("--no-input")
        .assert()
        .success();
    config_path
}

#[test]
fn test_help_lists_commands() {
    let temp_dir = TempDir::new().unwrap();
    sriracha(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("configure"))
        .stdout(predicate::str::contains("s3-to-local"))
        .stdout(predicate::str::contains("get-manifest"));
}

#[test]
fn test_configure_writes_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = configure(&temp_dir);

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("local_sync_dir"));
    assert!(!content.contains("log_dir"));
    assert!(temp_dir.path().join("s3").is_dir());
}

#[test]
fn test_configure_defaults_under_home() {
    let temp_dir = TempDir::new().unwrap();
    sriracha(temp_dir.path())
        .args(["configure", "--no-input"])
        .assert()
        .success();

    let home = temp_dir.path().join(".sriracha");
    assert!(home.join("config.toml").is_file());
    assert!(home.join("s3").is_dir());
    assert!(home.join("logs").is_dir());
}

#[test]
fn test_configure_rejects_remote_dir() {
    let temp_dir = TempDir::new().unwrap();
    sriracha(temp_dir.path())
        .arg("--config")
        .arg(temp_dir.path().join("config.toml"))
        .args(["configure", "--local-sync-dir", "s3://bucket/dir", "--no-input"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be a remote path"));
}

#[test]
fn test_s3_to_local_requires_configuration() {
    let temp_dir = TempDir::new().unwrap();
    sriracha(temp_dir.path())
        .arg("--config")
        .arg(temp_dir.path().join("missing.toml"))
        .args(["s3-to-local", "s3://bucket/a.csv"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("sriracha configure"));
}

#[test]
fn test_s3_to_local_rejects_malformed_reference() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = configure(&temp_dir);

    sriracha(temp_dir.path())
        .arg("--config")
        .arg(&config_path)
        .args(["s3-to-local", "gs://bucket/a.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid path"));

    // Nothing was written under the mirror root
    let entries = std::fs::read_dir(temp_dir.path().join("s3")).unwrap().count();
    assert_eq!(entries, 0);
}

#[test]
fn test_s3_to_local_passes_local_path_through() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = configure(&temp_dir);

    sriracha(temp_dir.path())
        .arg("--config")
        .arg(&config_path)
        .args(["s3-to-local", "data/local.csv"])
        .assert()
        .success()
        .stdout("data/local.csv\n");
}

#[test]
fn test_s3_to_local_local_path_without_configuration() {
    let temp_dir = TempDir::new().unwrap();
    sriracha(temp_dir.path())
        .arg("--config")
        .arg(temp_dir.path().join("missing.toml"))
        .args(["s3-to-local", "data/local.csv"])
        .assert()
        .success()
        .stdout("data/local.csv\n");
}

#[test]
fn test_s3_to_local_rejects_scheme_without_slashes() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = configure(&temp_dir);

    sriracha(temp_dir.path())
        .arg("--config")
        .arg(&config_path)
        .args(["s3-to-local", "s3:bucket/a.csv"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid path"));
}

#[test]
fn test_s3_to_local_never_mode_prints_mirror_path() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = configure(&temp_dir);
    let expected = temp_dir.path().join("s3").join("bucket").join("a.csv");

    sriracha(temp_dir.path())
        .arg("--config")
        .arg(&config_path)
        .args(["s3-to-local", "s3://bucket/a.csv", "--download-mode", "never"])
        .assert()
        .success()
        .stdout(format!("{}\n", expected.display()));
}

#[test]
fn test_get_manifest_requires_s3_scheme() {
    let temp_dir = TempDir::new().unwrap();
    sriracha(temp_dir.path())
        .args(["get-manifest", "/local/dataset"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("URL scheme should be s3"));
}
