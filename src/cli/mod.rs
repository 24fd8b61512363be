//! Command line interface for the release pipeline.
//!
//! Loads the manifest, selects the host platform's targets for the requested
//! mode and hands them to the release assembler.

mod args;
mod output;

pub use args::{Args, RuntimeConfig};
pub use output::OutputManager;

use crate::bundler::{Packager, Platform};
use crate::error::{CliError, Result};
use crate::metadata::load_manifest;
use crate::release::{DirectoryStore, ReleaseAssembler, ReleaseError};

/// Exit code for a completed release.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for validation, build or release failures.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for argument errors (matches clap).
pub const EXIT_USAGE: i32 = 2;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let config = RuntimeConfig::from(&args);

    if let Err(reason) = args.validate() {
        config.output().error(&reason)?;
        return Ok(EXIT_USAGE);
    }

    execute(&args, &config).await
}

/// Runs a validated invocation and returns the process exit code.
pub async fn execute(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let output = config.output();
    let arch = args
        .arch()
        .map_err(|reason| CliError::InvalidArguments { reason })?;
    let mode = args.mode();

    let manifest = load_manifest(&args.config, args.build_timestamp())?;
    let platform = Platform::host(arch).ok_or_else(|| CliError::UnsupportedHost {
        os: std::env::consts::OS.to_string(),
    })?;

    if args.list {
        output.section(&format!("Targets in {}", manifest.path.display()))?;
        for descriptor in manifest.descriptors.descriptors() {
            let marker = if descriptor.platform == platform && descriptor.mode == mode {
                "*"
            } else {
                " "
            };
            output.indent(&format!(
                "{} {:<18} {}",
                marker,
                descriptor.id().to_string(),
                descriptor.entry_point.display()
            ))?;
        }
        output.info(&format!("* builds on this host in {mode} mode"))?;
        return Ok(EXIT_SUCCESS);
    }

    let selected = manifest.descriptors.select(platform, mode);
    if selected.is_empty() {
        output.error(&format!(
            "no [[target]] for {}-{} in {}",
            platform,
            mode,
            manifest.path.display()
        ))?;
        return Ok(EXIT_FAILURE);
    }

    let settings = manifest.settings;
    let tag = args
        .tag
        .clone()
        .unwrap_or_else(|| format!("v{}", settings.version_string()));
    let product = settings.product_name(mode);
    if tag.strip_prefix('v') != Some(settings.version_string()) {
        output.warn(&format!(
            "tag {} does not match version {}",
            tag,
            settings.version_string()
        ))?;
    }

    output.section(&format!("Building {} {} for {}", product, tag, platform))?;
    output.progress(&format!("{} target(s) selected", selected.len()))?;
    output.verbose(&format!("Output: {}", args.output.display()))?;
    output.verbose(&format!("Release directory: {}", args.release_dir().display()))?;

    let mut assembler = ReleaseAssembler::new(
        Packager::new(settings),
        DirectoryStore::new(args.release_dir()),
        args.output.clone(),
    )
    .build_timeout(args.build_timeout());
    if let Some(jobs) = args.jobs {
        assembler = assembler.jobs(jobs);
    }

    match assembler.assemble(&tag, selected).await {
        Ok(release) => {
            for artifact in &release.artifacts {
                output.success(&format!("{} ({} bytes)", artifact.file_name(), artifact.size))?;
                output.verbose(&format!("  sha256 {}", artifact.checksum))?;
                for sidecar in &artifact.sidecars {
                    output.verbose(&format!("  + {}", sidecar.display()))?;
                }
            }
            output.success(&format!(
                "Published {} to {}",
                release.tag,
                assembler.store().release_dir(&release.tag).display()
            ))?;
            Ok(EXIT_SUCCESS)
        }
        Err(ReleaseError::IncompleteRelease {
            missing, failures, ..
        }) => {
            for failure in &failures {
                output.error(&failure.to_string())?;
            }
            output.error(&format!(
                "release {} not published: {} of the targets failed",
                tag,
                missing.len()
            ))?;
            Ok(EXIT_FAILURE)
        }
        Err(e) => {
            output.error(&e.to_string())?;
            Ok(EXIT_FAILURE)
        }
    }
}
