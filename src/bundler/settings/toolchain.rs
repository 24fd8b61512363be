//! Toolchain configuration: bootloader stubs and dependency search roots.

use std::path::{Path, PathBuf};

use crate::bundler::platform::ArtifactKind;

/// Launcher stubs that frozen executables start with, one per artifact kind.
///
/// # Configuration
///
/// ```toml
/// [toolchain.bootloaders]
/// windows = "stubs/run-windows.exe"
/// linux = "stubs/run-linux"
/// macos = "stubs/run-macos"
/// ```
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct BootloaderSettings {
    /// Stub for Windows executables.
    #[serde(default)]
    pub windows: Option<PathBuf>,
    /// Stub for Linux executables.
    #[serde(default)]
    pub linux: Option<PathBuf>,
    /// Stub for the executable inside macOS `.app` bundles.
    #[serde(default)]
    pub macos: Option<PathBuf>,
}

impl BootloaderSettings {
    /// Configured stub for an artifact kind, if any.
    pub fn for_kind(&self, kind: ArtifactKind) -> Option<&Path> {
        match kind {
            ArtifactKind::Windows => self.windows.as_deref(),
            ArtifactKind::Linux => self.linux.as_deref(),
            ArtifactKind::MacOsApp => self.macos.as_deref(),
        }
    }
}

/// Toolchain configuration.
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct ToolchainSettings {
    /// Roots searched, in order, when resolving declared dependencies.
    ///
    /// Default: empty (the project root is used)
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// Bootloader stubs per artifact kind.
    #[serde(default)]
    pub bootloaders: BootloaderSettings,
}
