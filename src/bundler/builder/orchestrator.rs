//! Main packaging orchestration.
//!
//! This module provides the [`Packager`] that turns one validated descriptor
//! into one artifact in the output root.

use super::{
    BuildError,
    checksum::calculate_sha256,
    closure::{ResolvedDependency, resolve_dependency},
    payload::pack_tree,
    staging::stage_payload,
    tool_detection::tool_available,
};
use crate::bundler::{
    BuildArtifact, Result, Settings, TargetDescriptor, ValidDescriptor,
    error::ErrorExt,
    platform::{
        EmitContext,
        frozen::{BuildStamp, write_frozen},
    },
    utils::fs,
    validate,
};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Something that turns one descriptor into one artifact.
///
/// [`Packager`] is the implementation used in production; release assembly
/// only depends on this trait.
pub trait ArtifactBuilder: Clone + Send + Sync + 'static {
    /// Builds `descriptor` into `output_root`.
    fn build(
        &self,
        descriptor: &TargetDescriptor,
        output_root: &Path,
    ) -> impl Future<Output = std::result::Result<BuildArtifact, BuildError>> + Send;

    /// Settings shared by every build.
    fn settings(&self) -> &Settings;
}

/// Packages descriptors into platform artifacts.
///
/// The packager holds only read-only [`Settings`]; concurrent builds of
/// different descriptors share one instance through an `Arc`.
///
/// # Examples
///
/// ```no_run
/// use cursorpro_packager::bundler::{Mode, Packager, Platform, Settings, TargetDescriptor};
///
/// # async fn example(settings: Settings) -> Result<(), cursorpro_packager::bundler::BuildError> {
/// let packager = Packager::new(settings);
/// let descriptor = TargetDescriptor::new(Platform::Windows, Mode::Cli, "cursor_pro_keep_alive.py");
/// let artifact = packager.build(&descriptor, "dist".as_ref()).await?;
/// assert!(artifact.binary_path.ends_with("CursorPro-Windows.exe"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Packager {
    settings: Arc<Settings>,
}

impl Packager {
    /// Creates a packager over the given settings.
    pub fn new(settings: impl Into<Arc<Settings>>) -> Self {
        Self {
            settings: settings.into(),
        }
    }

    /// Settings the packager builds with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Builds one descriptor into `output_root`.
    ///
    /// # Process
    /// 1. Validate the descriptor
    /// 2. Resolve declared dependencies against the search paths
    /// 3. Check the bootloader and external tools for the artifact kind
    /// 4. Stage entry point, data files, dependencies and `closure.json`
    /// 5. Freeze into `[bootloader][payload][stamp][trailer]`
    /// 6. Emit the platform artifact and hash it while still staged
    /// 7. Move sidecar files, then the artifact, into `output_root`
    ///
    /// Staging happens in a scratch directory inside `output_root` that is
    /// removed on every exit path, so a failed build leaves neither artifact
    /// nor sidecars.
    pub async fn build(
        &self,
        descriptor: &TargetDescriptor,
        output_root: &Path,
    ) -> std::result::Result<BuildArtifact, BuildError> {
        let target = descriptor.id();
        log::info!("Building {}", target);

        let valid = validate(descriptor, &self.settings)?;
        let dependencies = self.resolve_dependencies(&valid)?;
        let bootloader = self.locate_toolchain(&valid)?;

        let artifact = self
            .package(&valid, &dependencies, &bootloader, output_root)
            .await
            .map_err(|source| BuildError::Bundler { target, source })?;

        log::info!(
            "✓ Built {} ({} bytes, sha256 {})",
            artifact.binary_path.display(),
            artifact.size,
            artifact.checksum
        );
        Ok(artifact)
    }

    fn resolve_dependencies(
        &self,
        valid: &ValidDescriptor,
    ) -> std::result::Result<Vec<ResolvedDependency>, BuildError> {
        let roots = self.settings.search_paths();
        valid
            .descriptor()
            .declared_dependencies
            .iter()
            .map(|name| -> std::result::Result<ResolvedDependency, BuildError> {
                let resolved = resolve_dependency(name, &roots).ok_or_else(|| {
                    BuildError::DependencyResolutionFailure {
                        target: valid.id(),
                        name: name.clone(),
                        searched: roots.clone(),
                    }
                })?;
                log::debug!("Resolved {} -> {}", name, resolved.source.display());
                Ok(resolved)
            })
            .collect()
    }

    /// Returns the bootloader path once every piece of the toolchain is present.
    fn locate_toolchain(&self, valid: &ValidDescriptor) -> std::result::Result<PathBuf, BuildError> {
        let target = valid.id();
        let kind = target.platform.kind();

        let bootloader = self.settings.bootloader(kind).ok_or_else(|| {
            BuildError::PlatformToolchainUnavailable {
                target,
                tool: "bootloader".to_string(),
                reason: format!("no bootloader configured for {}", target.platform),
            }
        })?;
        if !bootloader.is_file() {
            return Err(BuildError::PlatformToolchainUnavailable {
                target,
                tool: "bootloader".to_string(),
                reason: format!("{} does not exist", bootloader.display()),
            });
        }

        for tool in kind.required_tools(&self.settings) {
            if !tool_available(tool) {
                return Err(BuildError::PlatformToolchainUnavailable {
                    target,
                    tool: (*tool).to_string(),
                    reason: "not found in PATH".to_string(),
                });
            }
        }

        Ok(bootloader)
    }

    async fn package(
        &self,
        valid: &ValidDescriptor,
        dependencies: &[ResolvedDependency],
        bootloader: &Path,
        output_root: &Path,
    ) -> Result<BuildArtifact> {
        let target = valid.id();
        let settings = self.settings.as_ref();

        fs::create_dir_all(output_root, false).await?;
        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(output_root)
            .fs_context("creating staging directory", output_root)?;

        let payload_dir = staging.path().join("payload");
        let kind = target.platform.kind();
        let app_manifest = kind.app_manifest(settings, target.mode)?;
        stage_payload(valid, dependencies, app_manifest.as_deref(), &payload_dir).await?;
        let payload = pack_tree(&payload_dir).await?;

        let stub = tokio::fs::read(bootloader)
            .await
            .fs_context("reading bootloader", bootloader)?;
        let product = settings.product_name(target.mode);
        let built_at = settings.build_timestamp();
        let stamp = BuildStamp {
            product: product.clone(),
            version: settings.version_string().to_string(),
            target,
            built_at,
        };
        let executable = write_frozen(&stub, &payload, &stamp)?;

        let emit_dir = staging.path().join("out");
        fs::create_dir_all(&emit_dir, false).await?;
        let file_name = settings.artifact_file_name(target);
        let ctx = EmitContext {
            settings,
            descriptor: valid,
            product: &product,
            executable: &executable,
            staging_dir: &emit_dir,
            file_name: &file_name,
            built_at,
        };
        let produced = kind.emit(&ctx).await?;

        let sidecars_dir = staging.path().join("sidecars");
        let mut staged_sidecars = Vec::with_capacity(valid.sidecar_files().len());
        for (source, name) in valid.sidecar_files() {
            if *name == file_name {
                crate::bail!("{}: sidecar '{}' would replace the artifact", target, name);
            }
            let staged = sidecars_dir.join(name);
            fs::copy_file(source, &staged).await?;
            staged_sidecars.push((staged, output_root.join(name)));
        }

        let size = fs::path_size(&produced).await?;
        let checksum = calculate_sha256(&produced).await?;

        let mut sidecars = Vec::with_capacity(staged_sidecars.len());
        for (staged, published) in staged_sidecars {
            tokio::fs::rename(&staged, &published)
                .await
                .fs_context("moving sidecar file", &published)?;
            log::debug!("Wrote sidecar {}", published.display());
            sidecars.push(published);
        }

        let binary_path = output_root.join(&file_name);
        fs::replace_path(&produced, &binary_path).await?;

        Ok(BuildArtifact {
            descriptor: valid.descriptor().clone(),
            binary_path,
            produced_at: built_at,
            size,
            checksum,
            sidecars,
        })
    }
}

impl ArtifactBuilder for Packager {
    fn build(
        &self,
        descriptor: &TargetDescriptor,
        output_root: &Path,
    ) -> impl Future<Output = std::result::Result<BuildArtifact, BuildError>> + Send {
        Packager::build(self, descriptor, output_root)
    }

    fn settings(&self) -> &Settings {
        Packager::settings(self)
    }
}
