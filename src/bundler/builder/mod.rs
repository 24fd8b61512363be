//! Packaging orchestration.
//!
//! This module provides the [`Packager`] that turns a
//! [`TargetDescriptor`](crate::bundler::TargetDescriptor) into a platform
//! artifact.
//!
//! # Overview
//!
//! The packager:
//! 1. Validates the descriptor against [`Settings`](crate::bundler::Settings)
//! 2. Resolves declared dependencies ([`closure`])
//! 3. Stages the payload tree ([`staging`])
//! 4. Packs it deterministically ([`payload`]) behind a bootloader
//! 5. Delegates emission to the platform's artifact kind
//! 6. Returns a [`BuildArtifact`](crate::bundler::BuildArtifact) with size and checksum
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 checksum calculation for artifacts
//! - [`closure`] - dependency resolution and `closure.json`
//! - [`orchestrator`] - main [`Packager`] struct
//! - [`payload`] - reproducible tar.gz payload
//! - [`staging`] - payload directory layout
//! - [`tool_detection`] - external tool availability checking

mod build_error;
pub mod checksum;
pub mod closure;
mod orchestrator;
pub mod payload;
pub mod staging;
pub mod tool_detection;

pub use build_error::BuildError;
pub use orchestrator::{ArtifactBuilder, Packager};
