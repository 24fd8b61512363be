//! Tests for the command line driver
//!
//! This module tests:
//! - Argument errors exit with 2
//! - A host-platform build publishes the release and exits 0
//! - Failures exit 1 without publishing

mod common;

use assert_cmd::Command;
use common::TestProject;
use cursorpro_packager::bundler::{Arch, MacOsSettings, Platform};
use predicates::prelude::*;

fn host() -> Platform {
    Platform::host(Arch::host()).expect("tests run on a supported host")
}

fn target_table(platform: Platform, mode: &str, entry: &str) -> String {
    format!(
        r#"[[target]]
platform = "{platform}"
mode = "{mode}"
entry_point = "{entry}"
bundled_files = [{{ source = "turnstilePatch", destination = "turnstilePatch" }}]
declared_dependencies = ["cursor_auth_manager"]
"#
    )
}

fn packager(project: &TestProject) -> Command {
    let mut cmd = Command::cargo_bin("cursorpro_packager").unwrap();
    cmd.current_dir(&project.path)
        .env_remove("TARGET_ARCH")
        .env("SOURCE_DATE_EPOCH", common::EPOCH.to_string());
    cmd
}

#[test]
fn test_help_mentions_gui_flag() {
    Command::cargo_bin("cursorpro_packager")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--gui"));
}

#[test]
fn test_unknown_flag_is_usage_error() {
    Command::cargo_bin("cursorpro_packager")
        .unwrap()
        .arg("--frobnicate")
        .assert()
        .code(2);
}

#[test]
fn test_zero_jobs_is_usage_error() {
    let project = TestProject::new();
    packager(&project)
        .args(["--jobs", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--jobs"));
}

#[test]
fn test_missing_manifest_fails() {
    let project = TestProject::new();
    packager(&project)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid manifest"));
}

#[test]
fn test_host_build_publishes_release() {
    let project = TestProject::new();
    let platform = host();
    project.write_manifest(&format!(
        "{}\n{}",
        target_table(platform, "cli", "cursor_pro_keep_alive.py"),
        target_table(platform, "gui", "gui.py"),
    ));

    packager(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("Published v1.2.0"));

    let name = platform.artifact_file_name(
        "CursorPro",
        &MacOsSettings {
            dmg: false,
            ..Default::default()
        },
    );
    let release = project.dist().join("releases/v1.2.0");
    assert!(release.join(&name).exists(), "{name} missing");
    assert!(release.join("RELEASE_NOTES.md").is_file());
    assert!(release.join("release.json").is_file());

    // Only the CLI target was selected.
    let gui_name = platform.artifact_file_name(
        "CursorProGUI",
        &MacOsSettings {
            dmg: false,
            ..Default::default()
        },
    );
    assert!(!release.join(gui_name).exists());
}

#[test]
fn test_list_does_not_build() {
    let project = TestProject::new();
    project.write_manifest(&target_table(host(), "cli", "cursor_pro_keep_alive.py"));

    packager(&project)
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("cursor_pro_keep_alive.py"));

    assert!(!project.dist().exists());
}

#[test]
fn test_gui_without_gui_targets_fails() {
    let project = TestProject::new();
    project.write_manifest(&target_table(host(), "cli", "cursor_pro_keep_alive.py"));

    packager(&project).arg("--gui").assert().code(1);
    assert!(!project.dist().join("releases").exists());
}

#[test]
fn test_failed_build_exits_nonzero_without_release() {
    let project = TestProject::new();
    project.write_manifest(&target_table(host(), "cli", "missing_entry.py"));

    packager(&project)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing_entry.py"));

    assert!(!project.dist().join("releases/v1.2.0").exists());
}

#[test]
fn test_tag_not_matching_version_warns() {
    let project = TestProject::new();
    project.write_manifest(&target_table(host(), "cli", "cursor_pro_keep_alive.py"));

    packager(&project)
        .args(["--tag", "v1.2.1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("tag v1.2.1 does not match version 1.2.0"));

    assert!(project.dist().join("releases/v1.2.1").is_dir());
}
