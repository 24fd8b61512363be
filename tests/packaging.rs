//! Tests for single-target packaging
//!
//! This module tests:
//! - Artifact naming and layout per platform
//! - Frozen executable contents (bootloader, payload, stamp)
//! - Idempotence modulo the build stamp
//! - Windows application manifest and sidecar files
//! - Failure modes: missing entry point, unresolved dependency, missing toolchain,
//!   failures after staging has started

mod common;

use common::{TestProject, descriptor};
use cursorpro_packager::bundler::{
    BootloaderSettings, BuildError, ExecutionLevel, Mode, Packager, Platform, TargetDescriptor,
    WindowsSettings,
    builder::{checksum::sha256_bytes, payload::payload_entries},
    read_frozen, strip_build_stamp,
};

#[tokio::test]
async fn test_windows_cli_artifact_contains_frozen_payload() {
    let project = TestProject::new();
    let packager = Packager::new(project.settings());

    let artifact = packager
        .build(&descriptor(Platform::Windows, Mode::Cli), &project.dist())
        .await
        .expect("build should succeed");

    assert_eq!(artifact.binary_path, project.dist().join("CursorPro-Windows.exe"));
    let bytes = std::fs::read(&artifact.binary_path).unwrap();
    assert_eq!(artifact.size, bytes.len() as u64);
    assert_eq!(artifact.checksum, sha256_bytes(&bytes));
    assert_eq!(artifact.produced_at, common::at(common::EPOCH));

    let frozen = read_frozen(&bytes).unwrap();
    assert_eq!(frozen.bootloader_len, "MZ-windows-stub".len() as u64);
    assert!(bytes.starts_with(b"MZ-windows-stub"));
    assert_eq!(frozen.stamp.product, "CursorPro");
    assert_eq!(frozen.stamp.version, "1.2.0");
    assert_eq!(frozen.stamp.target, artifact.id());

    let files = payload_entries(&frozen.payload).unwrap();
    assert!(files.contains_key("entry/cursor_pro_keep_alive.py"));
    assert!(files.contains_key("data/turnstilePatch/manifest.json"));
    assert!(files.contains_key("data/config.ini.example"));
    assert!(files.contains_key("lib/cursor_auth_manager.py"));

    let closure: serde_json::Value = serde_json::from_slice(&files["closure.json"]).unwrap();
    assert_eq!(closure["platform"], "windows");
    assert_eq!(closure["mode"], "cli");
    assert_eq!(closure["subsystem"], "console");
    assert_eq!(closure["entry_point"], "entry/cursor_pro_keep_alive.py");
    assert_eq!(closure["dependencies"][0]["name"], "cursor_auth_manager");
    assert_eq!(
        closure["dependencies"][0]["sha256"],
        sha256_bytes(b"class CursorAuthManager: pass\n")
    );

    // Only the artifact remains; the staging directory is gone.
    assert_eq!(common::dir_names(&project.dist()), vec!["CursorPro-Windows.exe"]);
}

#[tokio::test]
async fn test_gui_mode_uses_gui_product_name() {
    let project = TestProject::new();
    let packager = Packager::new(project.settings());

    let artifact = packager
        .build(&descriptor(Platform::Windows, Mode::Gui), &project.dist())
        .await
        .unwrap();

    assert!(artifact.binary_path.ends_with("CursorProGUI-Windows.exe"));
    let frozen = read_frozen(&std::fs::read(&artifact.binary_path).unwrap()).unwrap();
    let files = payload_entries(&frozen.payload).unwrap();
    let closure: serde_json::Value = serde_json::from_slice(&files["closure.json"]).unwrap();
    assert_eq!(closure["subsystem"], "windows");
}

#[cfg(unix)]
#[tokio::test]
async fn test_linux_artifact_is_executable() {
    use std::os::unix::fs::PermissionsExt;

    let project = TestProject::new();
    let artifact = Packager::new(project.settings())
        .build(&descriptor(Platform::Linux, Mode::Cli), &project.dist())
        .await
        .unwrap();

    assert!(artifact.binary_path.ends_with("CursorPro-Linux"));
    let mode = std::fs::metadata(&artifact.binary_path)
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o755);
}

#[tokio::test]
async fn test_macos_app_bundle_without_dmg() {
    let project = TestProject::new();
    let artifact = Packager::new(project.settings())
        .build(&descriptor(Platform::MacosArm64, Mode::Gui), &project.dist())
        .await
        .unwrap();

    assert_eq!(
        artifact.binary_path,
        project.dist().join("CursorProGUI-MacOS-ARM64.app")
    );
    let contents = artifact.binary_path.join("Contents");
    assert!(contents.join("Info.plist").is_file());
    assert!(contents.join("PkgInfo").is_file());

    let exe = std::fs::read(contents.join("MacOS/CursorProGUI")).unwrap();
    assert!(exe.starts_with(b"#!macos-stub"));
    assert_eq!(read_frozen(&exe).unwrap().stamp.target, artifact.id());
    assert!(artifact.size > exe.len() as u64);
}

#[tokio::test]
async fn test_rebuild_is_identical_except_for_stamp() {
    let project = TestProject::new();
    let first_out = project.path.join("out-1");
    let second_out = project.path.join("out-2");
    let target = descriptor(Platform::Linux, Mode::Cli);

    let first = Packager::new(project.settings_with(project.bootloaders(), common::EPOCH))
        .build(&target, &first_out)
        .await
        .unwrap();
    let second = Packager::new(project.settings_with(project.bootloaders(), common::EPOCH + 3600))
        .build(&target, &second_out)
        .await
        .unwrap();

    let a = std::fs::read(&first.binary_path).unwrap();
    let b = std::fs::read(&second.binary_path).unwrap();
    assert_ne!(a, b, "stamps carry different build times");
    assert_eq!(strip_build_stamp(&a).unwrap(), strip_build_stamp(&b).unwrap());
}

#[tokio::test]
async fn test_rebuild_replaces_previous_artifact() {
    let project = TestProject::new();
    let packager = Packager::new(project.settings());
    let target = descriptor(Platform::Windows, Mode::Cli);

    packager.build(&target, &project.dist()).await.unwrap();
    project.write_file("cursor_pro_keep_alive.py", "import cursor_auth_manager\nprint(2)\n");
    let second = packager.build(&target, &project.dist()).await.unwrap();

    let frozen = read_frozen(&std::fs::read(&second.binary_path).unwrap()).unwrap();
    let files = payload_entries(&frozen.payload).unwrap();
    assert_eq!(
        files["entry/cursor_pro_keep_alive.py"],
        b"import cursor_auth_manager\nprint(2)\n"
    );
}

#[tokio::test]
async fn test_missing_entry_point_leaves_no_artifact() {
    let project = TestProject::new();
    let target = TargetDescriptor::new(Platform::Linux, Mode::Cli, "does_not_exist.py");

    let err = Packager::new(project.settings())
        .build(&target, &project.dist())
        .await
        .unwrap_err();

    assert!(matches!(err, BuildError::MissingEntryPoint { .. }), "{err}");
    assert!(!project.dist().join("CursorPro-Linux").exists());
}

#[tokio::test]
async fn test_missing_bundled_file() {
    let project = TestProject::new();
    let target = descriptor(Platform::Linux, Mode::Cli).with_file("missing_dir", "x");

    let err = Packager::new(project.settings())
        .build(&target, &project.dist())
        .await
        .unwrap_err();

    assert!(matches!(err, BuildError::MissingBundledFile { .. }), "{err}");
}

#[tokio::test]
async fn test_unresolved_dependency() {
    let project = TestProject::new();
    let target = descriptor(Platform::Windows, Mode::Cli).with_dependency("browser_utils");

    let err = Packager::new(project.settings())
        .build(&target, &project.dist())
        .await
        .unwrap_err();

    match err {
        BuildError::DependencyResolutionFailure { name, searched, .. } => {
            assert_eq!(name, "browser_utils");
            assert_eq!(searched, vec![project.path.join(".")]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!project.dist().join("CursorPro-Windows.exe").exists());
}

#[tokio::test]
async fn test_missing_bootloader_is_toolchain_error() {
    let project = TestProject::new();
    let bootloaders = BootloaderSettings {
        windows: None,
        ..project.bootloaders()
    };
    let packager = Packager::new(project.settings_with(bootloaders, common::EPOCH));

    let err = packager
        .build(&descriptor(Platform::Windows, Mode::Cli), &project.dist())
        .await
        .unwrap_err();
    assert!(
        matches!(err, BuildError::PlatformToolchainUnavailable { ref tool, .. } if tool == "bootloader"),
        "{err}"
    );

    // Configured but absent on disk.
    let bootloaders = BootloaderSettings {
        linux: Some("stubs/gone".into()),
        ..project.bootloaders()
    };
    let err = Packager::new(project.settings_with(bootloaders, common::EPOCH))
        .build(&descriptor(Platform::Linux, Mode::Cli), &project.dist())
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::PlatformToolchainUnavailable { .. }), "{err}");
}

#[tokio::test]
async fn test_windows_payload_carries_app_manifest() {
    let project = TestProject::new();
    let settings = project
        .settings_builder()
        .windows(WindowsSettings {
            execution_level: ExecutionLevel::AsInvoker,
        })
        .build()
        .unwrap();
    let packager = Packager::new(settings);

    let artifact = packager
        .build(&descriptor(Platform::Windows, Mode::Gui), &project.dist())
        .await
        .unwrap();
    let frozen = read_frozen(&std::fs::read(&artifact.binary_path).unwrap()).unwrap();
    let files = payload_entries(&frozen.payload).unwrap();

    let manifest = String::from_utf8(files["app.manifest"].clone()).unwrap();
    assert!(manifest.contains(r#"level="asInvoker""#));
    assert!(manifest.contains(r#"name="CursorProGUI""#));
    assert!(manifest.contains("8e0f7a12-bfb3-4fe8-b9a5-48fd50a15a9a"));
    let closure: serde_json::Value = serde_json::from_slice(&files["closure.json"]).unwrap();
    assert_eq!(closure["app_manifest"], "app.manifest");

    // Default level when [windows] is absent.
    let artifact = Packager::new(project.settings())
        .build(&descriptor(Platform::Windows, Mode::Cli), &project.dist())
        .await
        .unwrap();
    let frozen = read_frozen(&std::fs::read(&artifact.binary_path).unwrap()).unwrap();
    let files = payload_entries(&frozen.payload).unwrap();
    let manifest = String::from_utf8(files["app.manifest"].clone()).unwrap();
    assert!(manifest.contains(r#"level="requireAdministrator""#));
}

#[tokio::test]
async fn test_linux_payload_has_no_app_manifest() {
    let project = TestProject::new();
    let artifact = Packager::new(project.settings())
        .build(&descriptor(Platform::Linux, Mode::Cli), &project.dist())
        .await
        .unwrap();

    let frozen = read_frozen(&std::fs::read(&artifact.binary_path).unwrap()).unwrap();
    let files = payload_entries(&frozen.payload).unwrap();
    assert!(!files.contains_key("app.manifest"));
    let closure: serde_json::Value = serde_json::from_slice(&files["closure.json"]).unwrap();
    assert!(closure.get("app_manifest").is_none());
}

#[tokio::test]
async fn test_sidecar_files_land_next_to_artifact() {
    let project = TestProject::new();
    let target = descriptor(Platform::Windows, Mode::Cli)
        .with_sidecar("config.ini.example", "config.ini")
        .with_sidecar(".env.example", ".env");

    let artifact = Packager::new(project.settings())
        .build(&target, &project.dist())
        .await
        .unwrap();

    assert_eq!(
        common::dir_names(&project.dist()),
        vec![".env", "CursorPro-Windows.exe", "config.ini"]
    );
    assert_eq!(
        artifact.sidecars,
        vec![project.dist().join("config.ini"), project.dist().join(".env")]
    );
    assert_eq!(
        std::fs::read_to_string(project.dist().join("config.ini")).unwrap(),
        "[Config]\n"
    );
    assert_eq!(
        std::fs::read_to_string(project.dist().join(".env")).unwrap(),
        "DOMAIN=example.com\n"
    );
    // The template itself still travels inside the payload.
    let frozen = read_frozen(&std::fs::read(&artifact.binary_path).unwrap()).unwrap();
    let files = payload_entries(&frozen.payload).unwrap();
    assert!(files.contains_key("data/config.ini.example"));
    assert!(!files.contains_key("data/config.ini"));
}

#[tokio::test]
async fn test_sidecar_cannot_shadow_artifact() {
    let project = TestProject::new();
    let target = descriptor(Platform::Windows, Mode::Cli)
        .with_sidecar(".env.example", "CursorPro-Windows.exe");

    let err = Packager::new(project.settings())
        .build(&target, &project.dist())
        .await
        .unwrap_err();

    assert!(matches!(err, BuildError::Bundler { .. }), "{err}");
    assert!(common::dir_names(&project.dist()).is_empty());
}

#[tokio::test]
async fn test_missing_sidecar_source_is_rejected() {
    let project = TestProject::new();
    let target = descriptor(Platform::Windows, Mode::Cli).with_sidecar("config.ini", "config.ini");

    let err = Packager::new(project.settings())
        .build(&target, &project.dist())
        .await
        .unwrap_err();

    assert!(matches!(err, BuildError::MissingBundledFile { .. }), "{err}");
    assert!(!project.dist().exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_failure_after_staging_leaves_nothing_behind() {
    let project = TestProject::new();
    std::fs::create_dir_all(project.path.join("links")).unwrap();
    std::os::unix::fs::symlink("nowhere", project.path.join("links/dangling")).unwrap();
    let target = descriptor(Platform::Linux, Mode::Cli)
        .with_file("links", "links")
        .with_sidecar("config.ini.example", "config.ini");

    let err = Packager::new(project.settings())
        .build(&target, &project.dist())
        .await
        .unwrap_err();

    assert!(matches!(err, BuildError::Bundler { .. }), "{err}");
    // The output root was created for staging; the staging directory, the
    // artifact and the sidecar are all absent.
    assert!(project.dist().is_dir());
    assert!(common::dir_names(&project.dist()).is_empty());
}
