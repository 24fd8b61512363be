//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with environment
//! fallbacks for the architecture override and a pinned build time.

use crate::bundler::{Arch, Mode};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Build driver for CursorPro release artifacts
#[derive(Parser, Debug)]
#[command(
    name = "cursorpro_packager",
    version,
    about = "Builds and publishes CursorPro release artifacts",
    long_about = "Packages the entry points declared in bundle.toml into platform artifacts for the host platform.

Every [[target]] matching the host platform and the selected mode is built in parallel. The release is published only if every build succeeded.

Usage:
  cursorpro_packager                       # CLI-mode artifacts
  cursorpro_packager --gui                 # GUI-mode artifacts
  cursorpro_packager --tag v1.2.0 --jobs 2
  TARGET_ARCH=x86_64 cursorpro_packager    # Intel artifacts on an Apple Silicon host

Exit code 0 = every artifact built and the release published."
)]
pub struct Args {
    /// Build GUI-mode targets instead of CLI-mode targets
    #[arg(long)]
    pub gui: bool,

    /// Build manifest
    #[arg(short = 'c', long, value_name = "FILE", default_value = "bundle.toml")]
    pub config: PathBuf,

    /// Directory artifacts are built into
    #[arg(short = 'o', long, value_name = "DIR", default_value = "dist")]
    pub output: PathBuf,

    /// Directory releases are published to (default: <output>/releases)
    #[arg(long, value_name = "DIR")]
    pub release_dir: Option<PathBuf>,

    /// Release tag (default: v<package version>)
    #[arg(short = 't', long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Maximum number of concurrent builds (default: number of CPUs)
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Per-build time limit in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Target architecture: arm64 or x86_64 (default: host)
    #[arg(long, env = "TARGET_ARCH", value_name = "ARCH")]
    pub target_arch: Option<String>,

    /// Build time to embed, as seconds since the Unix epoch
    #[arg(long, env = "SOURCE_DATE_EPOCH", value_name = "SECS")]
    pub source_date_epoch: Option<i64>,

    /// List the manifest's targets and exit without building
    #[arg(long)]
    pub list: bool,

    /// Show detailed progress
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.jobs == Some(0) {
            return Err("--jobs must be at least 1".to_string());
        }
        if self.timeout == Some(0) {
            return Err("--timeout must be at least 1 second".to_string());
        }
        self.arch()?;
        if let Some(secs) = self.source_date_epoch {
            if DateTime::from_timestamp(secs, 0).is_none() {
                return Err(format!("SOURCE_DATE_EPOCH out of range: {secs}"));
            }
        }
        Ok(())
    }

    /// UI mode selected by `--gui`.
    pub fn mode(&self) -> Mode {
        if self.gui { Mode::Gui } else { Mode::Cli }
    }

    /// Requested architecture, or the host's.
    pub fn arch(&self) -> Result<Arch, String> {
        match &self.target_arch {
            Some(value) => value.parse().map_err(|e| format!("{e}")),
            None => Ok(Arch::host()),
        }
    }

    /// Pinned build time from `--source-date-epoch` / `SOURCE_DATE_EPOCH`.
    pub fn build_timestamp(&self) -> Option<DateTime<Utc>> {
        self.source_date_epoch
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Per-build time limit.
    pub fn build_timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// Release directory, defaulting to `<output>/releases`.
    pub fn release_dir(&self) -> PathBuf {
        self.release_dir
            .clone()
            .unwrap_or_else(|| self.output.join("releases"))
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.verbose, args.quiet),
        }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("cursorpro_packager").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);
        assert_eq!(args.mode(), Mode::Cli);
        assert_eq!(args.config, PathBuf::from("bundle.toml"));
        assert_eq!(args.release_dir(), PathBuf::from("dist/releases"));
    }

    #[test]
    fn gui_and_arch_flags() {
        let args = parse(&["--gui", "--target-arch", "arm64", "--timeout", "30"]);
        assert_eq!(args.mode(), Mode::Gui);
        assert_eq!(args.arch().unwrap(), Arch::AArch64);
        assert_eq!(args.build_timeout(), Some(Duration::from_secs(30)));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn validation_rejects_bad_values() {
        assert!(parse(&["--jobs", "0"]).validate().is_err());
        assert!(parse(&["--timeout", "0"]).validate().is_err());
        assert!(parse(&["--target-arch", "sparc"]).validate().is_err());
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(
            Args::try_parse_from(["cursorpro_packager", "--verbose", "--quiet"]).is_err()
        );
    }
}
