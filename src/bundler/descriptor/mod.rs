//! Build target descriptors.
//!
//! A [`TargetDescriptor`] declares one build: which platform and UI mode it
//! targets, the entry-point script, the data files bundled next to it and the
//! dependency names the packager must freeze into the artifact.
//!
//! A [`DescriptorSet`] holds the descriptors of one release and guarantees
//! that every `(platform, mode)` pair appears at most once. [`validate`] is
//! the pure pre-build check that turns a descriptor into a [`ValidDescriptor`].

mod validate;

pub use validate::{ValidDescriptor, ValidationError, validate};

use crate::bundler::platform::Platform;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// UI mode of a build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Console application.
    Cli,
    /// Windowed application.
    Gui,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Cli => f.write_str("cli"),
            Mode::Gui => f.write_str("gui"),
        }
    }
}

/// Identifier of a descriptor within a release: its `(platform, mode)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId {
    /// Target platform.
    pub platform: Platform,
    /// UI mode.
    pub mode: Mode,
}

impl TargetId {
    /// Creates a target identifier.
    pub fn new(platform: Platform, mode: Mode) -> Self {
        Self { platform, mode }
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.platform, self.mode)
    }
}

/// A data file or directory copied into the artifact.
///
/// Follows the usual freezer semantics: a file source lands at
/// `<destination>/<file name>`, a directory source has its contents copied
/// into `<destination>/`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundledFile {
    /// Path on disk, relative to the project root unless absolute.
    pub source: PathBuf,
    /// Directory inside the artifact's data tree.
    pub destination: PathBuf,
}

impl BundledFile {
    /// Creates a bundled file entry.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// A file copied next to the finished artifact under a new name.
///
/// Unlike a [`BundledFile`] it is not frozen into the payload; it lands in
/// the output root beside the artifact (e.g. `config.ini.example` as
/// `config.ini`) and only once the build has succeeded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidecarFile {
    /// Regular file on disk, relative to the project root unless absolute.
    pub source: PathBuf,
    /// File name in the output root.
    pub name: String,
}

impl SidecarFile {
    /// Creates a sidecar entry.
    pub fn new(source: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
        }
    }
}

/// Declarative record of one build target's inputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    /// Target platform.
    pub platform: Platform,
    /// UI mode.
    pub mode: Mode,
    /// Script the frozen executable starts.
    pub entry_point: PathBuf,
    /// Data files, in declaration order.
    #[serde(default)]
    pub bundled_files: Vec<BundledFile>,
    /// Module names that must be frozen even though nothing imports them statically.
    #[serde(default)]
    pub declared_dependencies: BTreeSet<String>,
    /// Files placed next to the artifact after a successful build.
    #[serde(default)]
    pub sidecar_files: Vec<SidecarFile>,
}

impl TargetDescriptor {
    /// Creates a descriptor with no bundled files or dependencies.
    pub fn new(platform: Platform, mode: Mode, entry_point: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            mode,
            entry_point: entry_point.into(),
            bundled_files: Vec::new(),
            declared_dependencies: BTreeSet::new(),
            sidecar_files: Vec::new(),
        }
    }

    /// Appends a bundled file.
    pub fn with_file(mut self, source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        self.bundled_files.push(BundledFile::new(source, destination));
        self
    }

    /// Adds a declared dependency.
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.declared_dependencies.insert(name.into());
        self
    }

    /// Appends a sidecar file.
    pub fn with_sidecar(mut self, source: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        self.sidecar_files.push(SidecarFile::new(source, name));
        self
    }

    /// Returns the `(platform, mode)` identifier.
    pub fn id(&self) -> TargetId {
        TargetId::new(self.platform, self.mode)
    }
}

/// A `(platform, mode)` pair appears more than once in a descriptor set.
#[derive(Debug, Error)]
#[error("duplicate target {target}")]
pub struct DuplicateTargetError {
    /// Repeated target.
    pub target: TargetId,
}

/// The descriptors of one release, unique by `(platform, mode)`.
#[derive(Clone, Debug, Default)]
pub struct DescriptorSet {
    descriptors: Vec<TargetDescriptor>,
}

impl DescriptorSet {
    /// Creates a set, rejecting duplicate `(platform, mode)` pairs.
    pub fn new(descriptors: Vec<TargetDescriptor>) -> Result<Self, DuplicateTargetError> {
        let mut seen = HashSet::new();
        for descriptor in &descriptors {
            if !seen.insert(descriptor.id()) {
                return Err(DuplicateTargetError {
                    target: descriptor.id(),
                });
            }
        }
        Ok(Self { descriptors })
    }

    /// Descriptors matching a platform and mode.
    pub fn select(&self, platform: Platform, mode: Mode) -> Vec<TargetDescriptor> {
        self.descriptors
            .iter()
            .filter(|d| d.platform == platform && d.mode == mode)
            .cloned()
            .collect()
    }

    /// All descriptors in declaration order.
    pub fn descriptors(&self) -> &[TargetDescriptor] {
        &self.descriptors
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl IntoIterator for DescriptorSet {
    type Item = TargetDescriptor;
    type IntoIter = std::vec::IntoIter<TargetDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_platform_mode_pairs() {
        let err = DescriptorSet::new(vec![
            TargetDescriptor::new(Platform::Windows, Mode::Cli, "a.py"),
            TargetDescriptor::new(Platform::Windows, Mode::Gui, "b.py"),
            TargetDescriptor::new(Platform::Windows, Mode::Cli, "c.py"),
        ])
        .unwrap_err();

        assert_eq!(err.target, TargetId::new(Platform::Windows, Mode::Cli));
    }

    #[test]
    fn select_filters_by_platform_and_mode() {
        let set = DescriptorSet::new(vec![
            TargetDescriptor::new(Platform::Windows, Mode::Cli, "a.py"),
            TargetDescriptor::new(Platform::Linux, Mode::Cli, "a.py"),
            TargetDescriptor::new(Platform::Linux, Mode::Gui, "gui.py"),
        ])
        .unwrap();

        let picked = set.select(Platform::Linux, Mode::Gui);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].entry_point, PathBuf::from("gui.py"));
        assert!(set.select(Platform::Windows, Mode::Gui).is_empty());
    }

    #[test]
    fn target_id_display() {
        let id = TargetId::new(Platform::MacosArm64, Mode::Gui);
        assert_eq!(id.to_string(), "macos-arm64-gui");
    }
}
