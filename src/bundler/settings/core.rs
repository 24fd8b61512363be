//! Core Settings struct and implementations.

use super::{MacOsSettings, PackageSettings, ToolchainSettings, WindowsSettings};
use crate::bundler::descriptor::{Mode, TargetId};
use crate::bundler::platform::ArtifactKind;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Main settings for packaging operations.
///
/// Central configuration constructed via [`SettingsBuilder`](super::SettingsBuilder)
/// and passed explicitly into [`Packager`](crate::bundler::Packager) and the
/// release assembler. Nothing here is read from ambient process state.
///
/// # Examples
///
/// ```no_run
/// use cursorpro_packager::bundler::{PackageSettings, SettingsBuilder};
///
/// # fn example() -> cursorpro_packager::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .project_root(".")
///     .package_settings(PackageSettings {
///         product_name: "CursorPro".into(),
///         version: "1.2.0".into(),
///         ..Default::default()
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    /// Package metadata.
    package: PackageSettings,

    /// Directory relative descriptor paths are resolved against.
    project_root: PathBuf,

    /// Bootloaders and dependency search roots.
    toolchain: ToolchainSettings,

    /// macOS bundle options.
    macos: MacOsSettings,

    /// Windows executable options.
    windows: WindowsSettings,

    /// Pinned build time (e.g. from `SOURCE_DATE_EPOCH`).
    build_timestamp: Option<DateTime<Utc>>,
}

impl Settings {
    /// Returns the product name for a UI mode.
    pub fn product_name(&self, mode: Mode) -> String {
        match mode {
            Mode::Cli => self.package.product_name.clone(),
            Mode::Gui => self.package.gui_product_name(),
        }
    }

    /// Returns the version string.
    pub fn version_string(&self) -> &str {
        &self.package.version
    }

    /// Returns the package metadata.
    pub fn package(&self) -> &PackageSettings {
        &self.package
    }

    /// Returns the bundle identifier, derived from the product name if unset.
    pub fn identifier(&self, mode: Mode) -> String {
        let base = self.package.identifier.clone().unwrap_or_else(|| {
            format!("com.{}", self.package.product_name.to_ascii_lowercase())
        });
        match mode {
            Mode::Cli => base,
            Mode::Gui => format!("{base}.gui"),
        }
    }

    /// Returns the project root.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Resolves a possibly relative path against the project root.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// Roots searched for declared dependencies, in order.
    ///
    /// Falls back to the project root when none are configured.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        if self.toolchain.search_paths.is_empty() {
            vec![self.project_root.clone()]
        } else {
            self.toolchain
                .search_paths
                .iter()
                .map(|p| self.resolve_path(p))
                .collect()
        }
    }

    /// Returns the resolved bootloader stub for an artifact kind.
    pub fn bootloader(&self, kind: ArtifactKind) -> Option<PathBuf> {
        self.toolchain
            .bootloaders
            .for_kind(kind)
            .map(|p| self.resolve_path(p))
    }

    /// Returns the macOS options.
    pub fn macos(&self) -> &MacOsSettings {
        &self.macos
    }

    /// Returns the Windows options.
    pub fn windows(&self) -> &WindowsSettings {
        &self.windows
    }

    /// File name of the artifact a target produces in the output root.
    pub fn artifact_file_name(&self, target: TargetId) -> String {
        target
            .platform
            .artifact_file_name(&self.product_name(target.mode), &self.macos)
    }

    /// Build time to embed into artifacts: the pinned value or now.
    pub fn build_timestamp(&self) -> DateTime<Utc> {
        self.build_timestamp.unwrap_or_else(Utc::now)
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    pub(super) fn new(
        package: PackageSettings,
        project_root: PathBuf,
        toolchain: ToolchainSettings,
        macos: MacOsSettings,
        windows: WindowsSettings,
        build_timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            package,
            project_root,
            toolchain,
            macos,
            windows,
            build_timestamp,
        }
    }
}
