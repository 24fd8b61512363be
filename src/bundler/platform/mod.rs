//! Target platforms and their packaging strategies.
//!
//! Each [`Platform`] maps to one [`ArtifactKind`]. The kind owns the
//! platform-specific emission step: Windows and Linux produce a single frozen
//! executable, macOS produces an `.app` bundle optionally wrapped in a `.dmg`.
//!
//! The shared single-file layout lives in [`frozen`].

pub mod frozen;
mod linux;
mod macos;
mod windows;

use crate::bundler::{
    Arch, MacOsSettings, Mode, Result, Settings, descriptor::ValidDescriptor, error::Context,
};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, path::PathBuf, str::FromStr};

/// Platform a descriptor targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    /// Windows, single-file `.exe`.
    Windows,
    /// macOS on Apple Silicon.
    MacosArm64,
    /// macOS on Intel.
    MacosIntel,
    /// Linux, single-file executable.
    Linux,
}

impl Platform {
    /// All platforms of the release matrix.
    pub const ALL: [Platform; 4] = [
        Platform::Windows,
        Platform::MacosArm64,
        Platform::MacosIntel,
        Platform::Linux,
    ];

    /// Platform of the running host for the given architecture.
    ///
    /// Returns `None` on operating systems the pipeline does not target.
    pub fn host(arch: Arch) -> Option<Self> {
        Self::for_os(std::env::consts::OS, arch)
    }

    /// Platform for an OS name as reported by `std::env::consts::OS`.
    pub fn for_os(os: &str, arch: Arch) -> Option<Self> {
        match os {
            "windows" => Some(Platform::Windows),
            "linux" => Some(Platform::Linux),
            "macos" => Some(match arch {
                Arch::AArch64 => Platform::MacosArm64,
                Arch::X86_64 => Platform::MacosIntel,
            }),
            _ => None,
        }
    }

    /// Packaging strategy for this platform.
    pub fn kind(self) -> ArtifactKind {
        match self {
            Platform::Windows => ArtifactKind::Windows,
            Platform::MacosArm64 | Platform::MacosIntel => ArtifactKind::MacOsApp,
            Platform::Linux => ArtifactKind::Linux,
        }
    }

    /// Architecture implied by the platform, where it is part of the name.
    pub fn arch(self) -> Option<Arch> {
        match self {
            Platform::MacosArm64 => Some(Arch::AArch64),
            Platform::MacosIntel => Some(Arch::X86_64),
            Platform::Windows | Platform::Linux => None,
        }
    }

    /// Name used in artifact file names.
    pub fn display_name(self) -> String {
        match self {
            Platform::Windows => "Windows".to_string(),
            Platform::Linux => "Linux".to_string(),
            Platform::MacosArm64 | Platform::MacosIntel => match self.arch() {
                Some(arch) => format!("MacOS-{}", arch.marketing_name()),
                None => "MacOS".to_string(),
            },
        }
    }

    /// Final artifact file name: `{Product}-{Platform}[-Arch][.ext]`.
    pub fn artifact_file_name(self, product: &str, macos: &MacOsSettings) -> String {
        let stem = format!("{}-{}", product, self.display_name());
        match self.kind() {
            ArtifactKind::Windows => format!("{stem}.exe"),
            ArtifactKind::Linux => stem,
            ArtifactKind::MacOsApp if macos.dmg => format!("{stem}.dmg"),
            ArtifactKind::MacOsApp => format!("{stem}.app"),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Platform::Windows => "windows",
            Platform::MacosArm64 => "macos-arm64",
            Platform::MacosIntel => "macos-intel",
            Platform::Linux => "linux",
        })
    }
}

impl FromStr for Platform {
    type Err = crate::bundler::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.to_string() == s.trim().to_ascii_lowercase())
            .context(format!(
                "unknown platform '{s}' (expected windows, macos-arm64, macos-intel or linux)"
            ))
    }
}

/// Closed set of packaging strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Single-file `.exe`.
    Windows,
    /// `.app` bundle, optionally wrapped in a `.dmg`.
    MacOsApp,
    /// Single-file executable with the executable bit set.
    Linux,
}

impl ArtifactKind {
    /// External tools this kind needs beyond its bootloader.
    pub fn required_tools(self, settings: &Settings) -> &'static [&'static str] {
        match self {
            ArtifactKind::MacOsApp if settings.macos().dmg => &["hdiutil"],
            _ => &[],
        }
    }

    /// Application manifest frozen into the payload, for kinds that have one.
    pub fn app_manifest(self, settings: &Settings, mode: Mode) -> Result<Option<String>> {
        match self {
            ArtifactKind::Windows => windows::render_app_manifest(settings, mode).map(Some),
            ArtifactKind::Linux | ArtifactKind::MacOsApp => Ok(None),
        }
    }

    /// Emits the artifact into the staging directory and returns its path.
    pub async fn emit(self, ctx: &EmitContext<'_>) -> Result<PathBuf> {
        match self {
            ArtifactKind::Windows => windows::bundle_project(ctx).await,
            ArtifactKind::Linux => linux::bundle_project(ctx).await,
            ArtifactKind::MacOsApp => macos::bundle_project(ctx).await,
        }
    }
}

/// Inputs shared by every emission strategy.
pub struct EmitContext<'a> {
    /// Packaging settings.
    pub settings: &'a Settings,
    /// Descriptor being packaged.
    pub descriptor: &'a ValidDescriptor,
    /// Product name for the descriptor's mode.
    pub product: &'a str,
    /// Frozen executable bytes (bootloader + payload + stamp + trailer).
    pub executable: &'a [u8],
    /// Scratch directory; the returned artifact must live inside it.
    pub staging_dir: &'a Path,
    /// Final file name in the output root.
    pub file_name: &'a str,
    /// Build time embedded into metadata.
    pub built_at: chrono::DateTime<chrono::Utc>,
}
