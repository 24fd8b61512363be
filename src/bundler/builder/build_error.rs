//! Per-descriptor build failures.

use crate::bundler::{Error, TargetId, ValidationError};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error as DeriveError;

/// Why a single descriptor failed to build.
///
/// Every variant is terminal for its own descriptor only; sibling builds of
/// the same release are unaffected.
#[derive(Debug, DeriveError)]
pub enum BuildError {
    /// Entry point does not exist.
    #[error("{target}: entry point not found: {}", path.display())]
    MissingEntryPoint {
        /// Failed target.
        target: TargetId,
        /// Resolved entry-point path.
        path: PathBuf,
    },

    /// A bundled data file or directory is missing or unreadable.
    #[error("{target}: bundled file not found: {}", path.display())]
    MissingBundledFile {
        /// Failed target.
        target: TargetId,
        /// Resolved source path.
        path: PathBuf,
    },

    /// Descriptor is malformed in a way no filesystem change would fix.
    #[error("{target}: invalid descriptor: {reason}")]
    InvalidDescriptor {
        /// Failed target.
        target: TargetId,
        /// What is wrong.
        reason: String,
    },

    /// A declared dependency was not found under any search root.
    #[error("{target}: cannot resolve dependency '{name}' (searched {})", display_paths(searched))]
    DependencyResolutionFailure {
        /// Failed target.
        target: TargetId,
        /// Dependency name as declared.
        name: String,
        /// Roots that were searched.
        searched: Vec<PathBuf>,
    },

    /// The bootloader or an external tool for this platform is missing.
    #[error("{target}: {tool} unavailable: {reason}")]
    PlatformToolchainUnavailable {
        /// Failed target.
        target: TargetId,
        /// Missing piece of the toolchain.
        tool: String,
        /// Details.
        reason: String,
    },

    /// Build exceeded its time budget and was cancelled.
    #[error("{target}: build timed out after {}s", after.as_secs())]
    TimedOut {
        /// Failed target.
        target: TargetId,
        /// Budget that was exceeded.
        after: Duration,
    },

    /// Staging, freezing or emission failed.
    #[error("{target}: {source}")]
    Bundler {
        /// Failed target.
        target: TargetId,
        /// Underlying failure.
        #[source]
        source: Error,
    },
}

impl BuildError {
    /// Target the failure belongs to.
    pub fn target(&self) -> TargetId {
        match self {
            BuildError::MissingEntryPoint { target, .. }
            | BuildError::MissingBundledFile { target, .. }
            | BuildError::InvalidDescriptor { target, .. }
            | BuildError::DependencyResolutionFailure { target, .. }
            | BuildError::PlatformToolchainUnavailable { target, .. }
            | BuildError::TimedOut { target, .. }
            | BuildError::Bundler { target, .. } => *target,
        }
    }
}

impl From<ValidationError> for BuildError {
    fn from(err: ValidationError) -> Self {
        let target = err.target();
        match err {
            ValidationError::MissingEntryPoint { path, .. } => {
                BuildError::MissingEntryPoint { target, path }
            }
            ValidationError::MissingBundledFile { path, .. } => {
                BuildError::MissingBundledFile { target, path }
            }
            other => BuildError::InvalidDescriptor {
                target,
                reason: other.to_string(),
            },
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
