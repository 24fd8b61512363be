//! CPU architecture types and utilities.

use std::{fmt, str::FromStr};

/// CPU architecture for target artifacts.
///
/// Only the two architectures the release matrix ships are modelled. The host
/// architecture is the default; `TARGET_ARCH` overrides it for cross builds.
///
/// # Examples
///
/// ```no_run
/// use cursorpro_packager::bundler::Arch;
///
/// let arch: Arch = "arm64".parse().unwrap();
/// assert_eq!(arch, Arch::AArch64);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// x86_64 / AMD64 - Intel Macs, most Windows and Linux hosts
    X86_64,
    /// AArch64 / ARM64 - Apple Silicon
    AArch64,
}

impl Arch {
    /// Architecture of the running host.
    ///
    /// Hosts that are neither ARM64 nor x86_64 fall back to x86_64.
    pub fn host() -> Self {
        match std::env::consts::ARCH {
            "aarch64" => Arch::AArch64,
            _ => Arch::X86_64,
        }
    }

    /// Name used in artifact file names (`ARM64`, `Intel`).
    pub fn marketing_name(self) -> &'static str {
        match self {
            Arch::X86_64 => "Intel",
            Arch::AArch64 => "ARM64",
        }
    }
}

impl FromStr for Arch {
    type Err = crate::bundler::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arm64" | "aarch64" => Ok(Arch::AArch64),
            "x86_64" | "x64" | "amd64" | "intel" => Ok(Arch::X86_64),
            other => Err(crate::bundler::Error::ArchError(format!(
                "unknown architecture '{other}' (expected arm64 or x86_64)"
            ))),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::X86_64 => f.write_str("x86_64"),
            Arch::AArch64 => f.write_str("arm64"),
        }
    }
}
