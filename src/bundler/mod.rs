//! Packaging of entry-point scripts into platform artifacts.
//!
//! A [`TargetDescriptor`] names one `(platform, mode)` build. The [`Packager`]
//! validates it, resolves its declared dependencies, freezes everything into a
//! single executable behind a bootloader stub and emits the platform's
//! artifact:
//!
//! | Platform | Artifact | Notes |
//! |----------|----------|-------|
//! | Windows | `{Product}-Windows.exe` | single file |
//! | Linux | `{Product}-Linux` | single file, mode 0755 |
//! | macOS | `{Product}-MacOS-{ARM64,Intel}.dmg` | `.app` wrapped by hdiutil, or the bare `.app` |
//!
//! # Example
//!
//! ```no_run
//! use cursorpro_packager::bundler::{
//!     Mode, PackageSettings, Packager, Platform, SettingsBuilder, TargetDescriptor,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = SettingsBuilder::new()
//!     .project_root(".")
//!     .package_settings(PackageSettings {
//!         product_name: "CursorPro".into(),
//!         version: "1.2.0".into(),
//!         ..Default::default()
//!     })
//!     .build()?;
//!
//! let packager = Packager::new(settings);
//! let descriptor = TargetDescriptor::new(Platform::Linux, Mode::Cli, "main.py");
//! let artifact = packager.build(&descriptor, "dist".as_ref()).await?;
//! println!("{} ({} bytes, sha256 {})", artifact.binary_path.display(), artifact.size, artifact.checksum);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod descriptor;
pub mod error;
pub mod platform;
mod settings;
pub mod utils;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

pub use builder::{ArtifactBuilder, BuildError, Packager};
pub use descriptor::{
    BundledFile, DescriptorSet, DuplicateTargetError, Mode, SidecarFile, TargetDescriptor,
    TargetId, ValidDescriptor, ValidationError, validate,
};
pub use error::{Error, Result};
pub use platform::{
    ArtifactKind, Platform,
    frozen::{BuildStamp, FrozenExecutable, read_frozen, strip_build_stamp},
};
pub use settings::{
    Arch, BootloaderSettings, ExecutionLevel, MacOsSettings, PackageSettings, Settings,
    SettingsBuilder, ToolchainSettings, WindowsSettings,
};

/// A packaged artifact in the output root.
///
/// Only produced by a successful [`Packager::build`]; never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct BuildArtifact {
    /// Descriptor the artifact was built from.
    pub descriptor: TargetDescriptor,

    /// Final location of the artifact (file, or `.app` directory).
    pub binary_path: PathBuf,

    /// Build time recorded in the artifact's stamp.
    pub produced_at: DateTime<Utc>,

    /// Size in bytes; directory artifacts sum their files.
    pub size: u64,

    /// SHA-256 of the artifact, hex encoded.
    pub checksum: String,

    /// Sidecar files placed next to the artifact, in declaration order.
    pub sidecars: Vec<PathBuf>,
}

impl BuildArtifact {
    /// Target the artifact was built for.
    pub fn id(&self) -> TargetId {
        self.descriptor.id()
    }

    /// File name of the artifact inside the output root.
    pub fn file_name(&self) -> String {
        self.binary_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
