//! Deterministic build-and-package pipeline for CursorPro.
//!
//! - [`bundler`] - descriptors, validation and the per-target [`Packager`](bundler::Packager)
//! - [`release`] - parallel release assembly and all-or-nothing publishing
//! - [`patch`] - journaled, reversible file patches
//! - [`metadata`] - `bundle.toml` loading
//! - [`cli`] - the `cursorpro_packager` command line
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;
pub mod patch;
pub mod release;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
