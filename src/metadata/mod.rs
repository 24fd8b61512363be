//! Build manifest loading from `bundle.toml`.
//!
//! ```toml
//! [package]
//! product_name = "CursorPro"
//! version = "1.2.0"
//!
//! [toolchain.bootloaders]
//! windows = "stubs/run-windows.exe"
//!
//! [windows]
//! execution_level = "requireAdministrator"
//!
//! [[target]]
//! platform = "windows"
//! mode = "cli"
//! entry_point = "cursor_pro_keep_alive.py"
//! bundled_files = [{ source = "turnstilePatch", destination = "turnstilePatch" }]
//! declared_dependencies = ["cursor_auth_manager"]
//! sidecar_files = [{ source = "config.ini.example", name = "config.ini" }]
//! ```
//!
//! Relative paths anywhere in the manifest resolve against the directory the
//! manifest lives in.

use crate::bundler::{
    DescriptorSet, MacOsSettings, PackageSettings, Settings, SettingsBuilder, TargetDescriptor,
    ToolchainSettings, WindowsSettings,
};
use crate::error::{BundlerError, CliError, Result};
use chrono::{DateTime, Utc};
use path_absolutize::Absolutize;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default manifest file name.
pub const MANIFEST_FILE: &str = "bundle.toml";

/// A loaded manifest: settings plus the descriptors of one release.
#[derive(Debug)]
pub struct BundleManifest {
    /// Manifest file the data came from.
    pub path: PathBuf,

    /// Settings built from `[package]`, `[toolchain]` and `[macos]`.
    pub settings: Settings,

    /// `[[target]]` entries, unique by `(platform, mode)`.
    pub descriptors: DescriptorSet,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    package: Option<PackageSettings>,
    #[serde(default)]
    toolchain: ToolchainSettings,
    #[serde(default)]
    macos: MacOsSettings,
    #[serde(default)]
    windows: WindowsSettings,
    #[serde(default, rename = "target")]
    targets: Vec<TargetDescriptor>,
}

/// Reads and validates a manifest file.
///
/// `build_timestamp` pins the build time embedded into artifacts (for
/// example from `SOURCE_DATE_EPOCH`).
pub fn load_manifest(path: &Path, build_timestamp: Option<DateTime<Utc>>) -> Result<BundleManifest> {
    let path = path.absolutize()?.into_owned();
    let text = std::fs::read_to_string(&path).map_err(|e| invalid(&path, format!("cannot read: {e}")))?;
    let base_dir = path.parent().unwrap_or(Path::new("/")).to_path_buf();

    let (settings, descriptors) = parse_manifest(&text, &base_dir, build_timestamp)
        .map_err(|e| match e {
            BundlerError::Cli(CliError::InvalidManifest { reason, .. }) => invalid(&path, reason),
            other => invalid(&path, other.to_string()),
        })?;

    log::debug!(
        "Loaded {} with {} targets",
        path.display(),
        descriptors.len()
    );
    Ok(BundleManifest {
        path,
        settings,
        descriptors,
    })
}

/// Parses manifest text, resolving relative paths against `base_dir`.
pub fn parse_manifest(
    text: &str,
    base_dir: &Path,
    build_timestamp: Option<DateTime<Utc>>,
) -> Result<(Settings, DescriptorSet)> {
    let raw: RawManifest = toml::from_str(text)?;

    let package = raw
        .package
        .ok_or_else(|| invalid(base_dir, "missing [package] section".to_string()))?;

    let settings = SettingsBuilder::new()
        .project_root(base_dir)
        .package_settings(package)
        .toolchain(raw.toolchain)
        .macos(raw.macos)
        .windows(raw.windows)
        .build_timestamp(build_timestamp)
        .build()?;

    let descriptors = DescriptorSet::new(raw.targets)?;
    Ok((settings, descriptors))
}

fn invalid(path: &Path, reason: String) -> BundlerError {
    BundlerError::Cli(CliError::InvalidManifest {
        path: path.to_path_buf(),
        reason,
    })
}
