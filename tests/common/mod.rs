//! Common test utilities for packager integration tests

use chrono::{DateTime, Utc};
use cursorpro_packager::bundler::{
    BootloaderSettings, MacOsSettings, Mode, PackageSettings, Platform, Settings,
    SettingsBuilder, TargetDescriptor, ToolchainSettings,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Pinned build time used by most tests.
#[allow(dead_code)]
pub const EPOCH: i64 = 1_700_000_000;

/// A throwaway project with entry points, data files, a dependency and
/// bootloader stubs for every platform.
pub struct TestProject {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to project root
    pub path: PathBuf,
}

impl TestProject {
    /// Create a new test project
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        let project = Self { temp, path };

        project.write_file(
            "cursor_pro_keep_alive.py",
            "import cursor_auth_manager\n\nprint('keep alive')\n",
        );
        project.write_file("gui.py", "import cursor_auth_manager\n\nprint('gui')\n");
        project.write_file("cursor_auth_manager.py", "class CursorAuthManager: pass\n");
        project.write_file("turnstilePatch/manifest.json", "{\"manifest_version\": 3}\n");
        project.write_file("turnstilePatch/script.js", "// patch\n");
        project.write_file("config.ini.example", "[Config]\n");
        project.write_file(".env.example", "DOMAIN=example.com\n");
        project.write_file("stubs/run-windows.exe", "MZ-windows-stub");
        project.write_file("stubs/run-linux", "#!linux-stub\n");
        project.write_file("stubs/run-macos", "#!macos-stub\n");
        project
    }

    /// Write a file in the project
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Bootloader stubs for every artifact kind
    #[allow(dead_code)]
    pub fn bootloaders(&self) -> BootloaderSettings {
        BootloaderSettings {
            windows: Some("stubs/run-windows.exe".into()),
            linux: Some("stubs/run-linux".into()),
            macos: Some("stubs/run-macos".into()),
        }
    }

    /// Settings with all bootloaders, `.app` output and a pinned build time
    #[allow(dead_code)]
    pub fn settings(&self) -> Settings {
        self.settings_with(self.bootloaders(), EPOCH)
    }

    /// Settings with the given bootloaders and build time
    #[allow(dead_code)]
    pub fn settings_with(&self, bootloaders: BootloaderSettings, epoch: i64) -> Settings {
        self.settings_builder()
            .toolchain(ToolchainSettings {
                search_paths: vec![PathBuf::from(".")],
                bootloaders,
            })
            .build_timestamp(Some(at(epoch)))
            .build()
            .expect("Failed to build settings")
    }

    /// Package metadata the default settings use
    #[allow(dead_code)]
    pub fn package(&self) -> PackageSettings {
        PackageSettings {
            product_name: "CursorPro".into(),
            version: "1.2.0".into(),
            identifier: Some("com.cursor.pro".into()),
            ..Default::default()
        }
    }

    /// Builder preloaded with the default settings, for tests that change one part
    #[allow(dead_code)]
    pub fn settings_builder(&self) -> SettingsBuilder {
        SettingsBuilder::new()
            .project_root(&self.path)
            .package_settings(self.package())
            .toolchain(ToolchainSettings {
                search_paths: vec![PathBuf::from(".")],
                bootloaders: self.bootloaders(),
            })
            .macos(MacOsSettings {
                dmg: false,
                ..Default::default()
            })
            .build_timestamp(Some(at(EPOCH)))
    }

    /// Write a bundle.toml with the given `[[target]]` tables appended
    #[allow(dead_code)]
    pub fn write_manifest(&self, targets: &str) -> PathBuf {
        let manifest = format!(
            r#"[package]
product_name = "CursorPro"
version = "1.2.0"

[toolchain]
search_paths = ["."]

[toolchain.bootloaders]
windows = "stubs/run-windows.exe"
linux = "stubs/run-linux"
macos = "stubs/run-macos"

[macos]
dmg = false

{targets}"#
        );
        self.write_file("bundle.toml", &manifest);
        self.path.join("bundle.toml")
    }

    /// Output directory inside the project
    #[allow(dead_code)]
    pub fn dist(&self) -> PathBuf {
        self.path.join("dist")
    }
}

/// Descriptor for the project's CLI or GUI entry point
#[allow(dead_code)]
pub fn descriptor(platform: Platform, mode: Mode) -> TargetDescriptor {
    let entry = match mode {
        Mode::Cli => "cursor_pro_keep_alive.py",
        Mode::Gui => "gui.py",
    };
    TargetDescriptor::new(platform, mode, entry)
        .with_file("turnstilePatch", "turnstilePatch")
        .with_file("config.ini.example", ".")
        .with_dependency("cursor_auth_manager")
}

/// Unix timestamp as UTC time
#[allow(dead_code)]
pub fn at(epoch: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(epoch, 0).expect("timestamp in range")
}

/// Names of the entries of a directory, sorted
#[allow(dead_code)]
pub fn dir_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read directory")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
