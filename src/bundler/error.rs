//! Error types for packaging operations.
//!
//! [`Error`] is the low-level failure type shared by every packaging step.
//! The [`ErrorExt`] and [`Context`] traits attach path and message context to
//! results, and [`bail!`](crate::bail) returns early with a formatted message.

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};
use thiserror::Error as DeriveError;

/// Result type alias for packaging operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Low-level packaging errors.
#[derive(Debug, DeriveError)]
pub enum Error {
    /// Free-form error message.
    #[error("{0}")]
    GenericError(String),

    /// Filesystem error with the operation and path that failed.
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// What was being attempted.
        context: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying I/O error.
        error: io::Error,
    },

    /// I/O error without path context.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// External command could not be spawned.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command name.
        command: String,
        /// Spawn error.
        error: io::Error,
    },

    /// Unsupported or unknown architecture.
    #[error("architecture error: {0}")]
    ArchError(String),

    /// JSON serialization failure.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// Info.plist serialization failure.
    #[error("{0}")]
    Plist(#[from] plist::Error),

    /// Template registration failure.
    #[error("{0}")]
    Template(#[from] handlebars::TemplateError),

    /// Template rendering failure.
    #[error("{0}")]
    Render(#[from] handlebars::RenderError),

    /// Path prefix stripping failure.
    #[error("{0}")]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// Directory traversal failure.
    #[error("{0}")]
    WalkDir(#[from] walkdir::Error),

    /// Blocking task failed to complete.
    #[error("{0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Attach filesystem context to I/O results.
pub trait ErrorExt<T> {
    /// Wraps the error in [`Error::Fs`] with the given context and path.
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Attach a message to a failure or to a missing value.
pub trait Context<T> {
    /// Adds static context to the error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::GenericError(format!("{context}: {e}")))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }
}

/// Returns early with an [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($($arg)*)).into())
    };
}
