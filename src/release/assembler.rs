//! Parallel build-and-publish of one release.

use super::{ArtifactStore, StoreError, render_release_notes};
use crate::bundler::{
    self, ArtifactBuilder, BuildArtifact, BuildError, DescriptorSet, Packager, TargetDescriptor,
    TargetId,
};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// A complete, publishable set of artifacts.
#[derive(Clone, Debug, Serialize)]
pub struct Release {
    /// Release tag, `v` + semver.
    pub tag: String,
    /// Artifacts ordered by target.
    pub artifacts: Vec<BuildArtifact>,
    /// Number of descriptors the release was assembled from.
    pub required_count: usize,
    /// Rendered `RELEASE_NOTES.md`.
    pub notes: String,
}

impl Release {
    /// True when every required target has an artifact.
    pub fn is_publishable(&self) -> bool {
        self.artifacts.len() == self.required_count
    }
}

/// Release-level failures.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// Tag is not `v` followed by a semantic version.
    #[error("invalid release tag '{tag}': expected v<semver> such as v1.2.0")]
    InvalidTag {
        /// Rejected tag.
        tag: String,
    },

    /// Two descriptors share a `(platform, mode)` pair.
    #[error("duplicate target {target} in release")]
    DuplicateTarget {
        /// Repeated target.
        target: TargetId,
    },

    /// Two targets would write the same artifact file.
    ///
    /// Names are compared case-insensitively, as on Windows and macOS
    /// filesystems.
    #[error("{first} and {second} both produce artifact '{name}'")]
    ArtifactNameCollision {
        /// Colliding file name, as produced by `second`.
        name: String,
        /// Earlier target with the same name.
        first: TargetId,
        /// Later target with the same name.
        second: TargetId,
    },

    /// Nothing to build.
    #[error("release has no targets")]
    NoTargets,

    /// At least one build failed; nothing was published.
    #[error(
        "release incomplete: {} of {} targets missing ({})",
        missing.len(),
        required,
        missing.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    IncompleteRelease {
        /// Targets without an artifact.
        missing: Vec<TargetId>,
        /// Why each missing target failed, ordered by target.
        failures: Vec<BuildError>,
        /// Number of targets in the release.
        required: usize,
    },

    /// Rendering release notes failed.
    #[error("failed to render release notes: {0}")]
    Notes(#[source] bundler::Error),

    /// The store rejected or failed the release.
    #[error("publishing failed: {0}")]
    Publish(#[from] StoreError),
}

/// Builds descriptors concurrently and publishes complete releases.
pub struct ReleaseAssembler<S, B = Packager> {
    packager: B,
    store: S,
    output_root: PathBuf,
    jobs: usize,
    build_timeout: Option<Duration>,
}

impl<S: ArtifactStore, B: ArtifactBuilder> ReleaseAssembler<S, B> {
    /// Creates an assembler that builds into `output_root` and publishes to `store`.
    ///
    /// Concurrency defaults to the number of CPUs; builds have no time limit.
    pub fn new(packager: B, store: S, output_root: impl Into<PathBuf>) -> Self {
        Self {
            packager,
            store,
            output_root: output_root.into(),
            jobs: num_cpus::get().max(1),
            build_timeout: None,
        }
    }

    /// Caps the number of builds running at once.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Cancels any single build running longer than `timeout`.
    pub fn build_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.build_timeout = timeout;
        self
    }

    /// Store releases are published to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Builds every descriptor and publishes the release if all succeeded.
    ///
    /// Builds run in their own tasks; a failing, panicking or timed-out build
    /// affects only its own target. Once every task has finished, either all
    /// artifacts are published together or [`ReleaseError::IncompleteRelease`]
    /// is returned and the store is not touched. Failed builds are not retried.
    ///
    /// Duplicate targets and colliding artifact names are rejected before
    /// anything is built.
    pub async fn assemble(
        &self,
        tag: &str,
        descriptors: Vec<TargetDescriptor>,
    ) -> Result<Release, ReleaseError> {
        validate_tag(tag)?;
        let set = DescriptorSet::new(descriptors)
            .map_err(|e| ReleaseError::DuplicateTarget { target: e.target })?;
        if set.is_empty() {
            return Err(ReleaseError::NoTargets);
        }
        self.check_artifact_names(&set)?;

        let required: BTreeSet<TargetId> = set.descriptors().iter().map(|d| d.id()).collect();
        let required_count = required.len();
        log::info!(
            "Assembling {} with {} targets ({} at a time)",
            tag,
            required_count,
            self.jobs
        );

        let (mut artifacts, mut failures) = self.build_all(set).await;

        if !failures.is_empty() {
            failures.sort_by_key(|f| f.target());
            let built: BTreeSet<TargetId> = artifacts.iter().map(|a| a.id()).collect();
            let missing: Vec<TargetId> = required.difference(&built).copied().collect();
            for failure in &failures {
                log::error!("{}", failure);
            }
            return Err(ReleaseError::IncompleteRelease {
                missing,
                failures,
                required: required_count,
            });
        }

        artifacts.sort_by_key(|a| a.id());
        let notes = render_release_notes(self.packager.settings(), tag, &artifacts)
            .map_err(ReleaseError::Notes)?;
        let release = Release {
            tag: tag.to_string(),
            artifacts,
            required_count,
            notes,
        };
        debug_assert!(release.is_publishable());

        self.store.publish(&release).await?;
        Ok(release)
    }

    /// Fails when two targets map to the same file in the output root.
    fn check_artifact_names(&self, set: &DescriptorSet) -> Result<(), ReleaseError> {
        let settings = self.packager.settings();
        let mut seen: HashMap<String, TargetId> = HashMap::new();
        for descriptor in set.descriptors() {
            let target = descriptor.id();
            let name = settings.artifact_file_name(target);
            if let Some(&first) = seen.get(&name.to_lowercase()) {
                return Err(ReleaseError::ArtifactNameCollision {
                    name,
                    first,
                    second: target,
                });
            }
            seen.insert(name.to_lowercase(), target);
        }
        Ok(())
    }

    /// Runs one task per descriptor and waits for all of them.
    async fn build_all(&self, set: DescriptorSet) -> (Vec<BuildArtifact>, Vec<BuildError>) {
        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let mut tasks = JoinSet::new();
        let mut targets = HashMap::new();

        for descriptor in set {
            let target = descriptor.id();
            let packager = self.packager.clone();
            let output_root = self.output_root.clone();
            let semaphore = Arc::clone(&semaphore);
            let timeout = self.build_timeout;

            let handle = tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let build = packager.build(&descriptor, &output_root);
                match timeout {
                    Some(after) => match tokio::time::timeout(after, build).await {
                        Ok(result) => result,
                        Err(_) => Err(BuildError::TimedOut { target, after }),
                    },
                    None => build.await,
                }
            });
            targets.insert(handle.id(), target);
        }

        let mut artifacts = Vec::new();
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, Ok(artifact))) => artifacts.push(artifact),
                Ok((_, Err(e))) => failures.push(e),
                Err(join_error) => {
                    let Some(target) = targets.get(&join_error.id()).copied() else {
                        log::error!("Untracked build task failed: {}", join_error);
                        continue;
                    };
                    failures.push(BuildError::Bundler {
                        target,
                        source: bundler::Error::Join(join_error),
                    });
                }
            }
        }
        (artifacts, failures)
    }
}

fn validate_tag(tag: &str) -> Result<(), ReleaseError> {
    let valid = tag
        .strip_prefix('v')
        .is_some_and(|version| semver::Version::parse(version).is_ok());
    if valid {
        Ok(())
    } else {
        Err(ReleaseError::InvalidTag {
            tag: tag.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_need_v_prefix_and_semver() {
        assert!(validate_tag("v1.2.0").is_ok());
        assert!(validate_tag("v0.3.0-beta.1").is_ok());
        assert!(validate_tag("1.2.0").is_err());
        assert!(validate_tag("v1.2").is_err());
        assert!(validate_tag("vnext").is_err());
    }
}
