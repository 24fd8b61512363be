//! Crate-level error types.
//!
//! Each concern keeps its own error enum; [`BundlerError`] wraps them for the
//! CLI and for callers that drive the whole pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all pipeline operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument and manifest errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Packaging errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),

    /// Descriptor validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] crate::bundler::ValidationError),

    /// Repeated `(platform, mode)` in a manifest
    #[error("Validation error: {0}")]
    DuplicateTarget(#[from] crate::bundler::DuplicateTargetError),

    /// Single-target build errors
    #[error("Build error: {0}")]
    Build(#[from] crate::bundler::BuildError),

    /// Release assembly errors
    #[error("Release error: {0}")]
    Release(#[from] crate::release::ReleaseError),

    /// Publishing errors
    #[error("Store error: {0}")]
    Store(#[from] crate::release::StoreError),

    /// Patch journal errors
    #[error("Patch error: {0}")]
    Patch(#[from] crate::patch::PatchError),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Manifest is unreadable or malformed
    #[error("Invalid manifest {}: {reason}", path.display())]
    InvalidManifest {
        /// Manifest path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Host operating system has no release platform
    #[error("Unsupported host: {os}")]
    UnsupportedHost {
        /// Operating system name
        os: String,
    },
}
