//! Integration tests for command-line behavior.

#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

/// Command isolated from the user's real configuration.
fn litterwatch(config_home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("litterwatch"));
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .env_remove("RUST_LOG")
        .env_remove("LITTERWATCH_CONFIDENCE")
        .env_remove("LITTERWATCH_FRAME_SKIP");
    cmd
}

#[test]
fn test_help_lists_annotation_options() {
    let home = TempDir::new().unwrap();
    litterwatch(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--confidence"))
        .stdout(predicate::str::contains("--frame-skip"))
        .stdout(predicate::str::contains("--save"));
}

#[test]
fn test_confidence_out_of_range_is_rejected() {
    let home = TempDir::new().unwrap();
    litterwatch(&home)
        .args(["-c", "1.5", "street.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("confidence must be between"));
}

#[test]
fn test_frame_skip_zero_is_rejected() {
    let home = TempDir::new().unwrap();
    litterwatch(&home)
        .args(["--frame-skip", "0", "street.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("frame skip must be between 1 and 10"));
}

#[test]
fn test_unsupported_extension_fails() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("notes.txt");
    std::fs::write(&input, "not a video").unwrap();

    litterwatch(&home)
        .arg("-q")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported video format"));
}

#[test]
fn test_json_reports_errors_on_stdout() {
    let home = TempDir::new().unwrap();

    litterwatch(&home)
        .args(["--json", "-q", "clip.webm"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""event":"error""#))
        .stdout(predicate::str::contains(r#""category":"io""#));
}

#[test]
fn test_missing_input_file_fails() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("absent.mp4");

    litterwatch(&home)
        .arg("-q")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open video"));
}

#[test]
fn test_config_path_subcommand() {
    let home = TempDir::new().unwrap();
    litterwatch(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("litterwatch"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_prints_defaults() {
    let home = TempDir::new().unwrap();
    litterwatch(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("frame_skip = 3"))
        .stdout(predicate::str::contains("garbage_bag"));
}
