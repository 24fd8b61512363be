//! Artifact stores.
//!
//! A store receives a complete [`Release`] and makes it visible all at once.
//! Stores are append-only: a published tag is never overwritten.

use super::Release;
use crate::bundler::{self, error::ErrorExt, utils::fs};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Publishing failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A release with this tag was already published.
    #[error("release {tag} already exists at {}", path.display())]
    TagExists {
        /// Rejected tag.
        tag: String,
        /// Location of the existing release.
        path: PathBuf,
    },

    /// Writing the release failed; nothing was published.
    #[error("failed to write release: {0}")]
    Write(#[from] bundler::Error),
}

/// Destination of complete releases.
pub trait ArtifactStore: Send + Sync {
    /// Publishes every artifact of `release` plus its notes, atomically.
    ///
    /// Returns where the release can be found.
    fn publish(&self, release: &Release) -> impl Future<Output = Result<PathBuf, StoreError>> + Send;
}

/// Publishes releases as directories: `<root>/<tag>/`.
///
/// The release is written to `<root>/<tag>.partial/` first and renamed into
/// place once complete.
#[derive(Clone, Debug)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Creates a store rooted at `root`; the directory is created on first publish.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a tag is (or would be) published to.
    pub fn release_dir(&self, tag: &str) -> PathBuf {
        self.root.join(tag)
    }
}

/// `release.json` contents.
#[derive(Serialize)]
struct ReleaseManifest<'a> {
    tag: &'a str,
    artifacts: Vec<ManifestEntry>,
}

#[derive(Serialize)]
struct ManifestEntry {
    target: String,
    file: String,
    size: u64,
    sha256: String,
    produced_at: DateTime<Utc>,
}

impl ArtifactStore for DirectoryStore {
    async fn publish(&self, release: &Release) -> Result<PathBuf, StoreError> {
        let final_dir = self.release_dir(&release.tag);
        if final_dir.exists() {
            return Err(StoreError::TagExists {
                tag: release.tag.clone(),
                path: final_dir,
            });
        }

        let partial = self.root.join(format!("{}.partial", release.tag));
        match write_release(release, &partial, &final_dir).await {
            Ok(()) => {
                log::info!("✓ Published {} to {}", release.tag, final_dir.display());
                Ok(final_dir)
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_path(&partial).await {
                    log::warn!("Failed to remove {}: {}", partial.display(), cleanup);
                }
                Err(e.into())
            }
        }
    }
}

async fn write_release(release: &Release, partial: &Path, final_dir: &Path) -> bundler::Result<()> {
    fs::create_dir_all(partial, true).await?;

    let mut entries = Vec::with_capacity(release.artifacts.len());
    for artifact in &release.artifacts {
        let file = artifact.file_name();
        fs::copy_path(&artifact.binary_path, &partial.join(&file)).await?;
        entries.push(ManifestEntry {
            target: artifact.id().to_string(),
            file,
            size: artifact.size,
            sha256: artifact.checksum.clone(),
            produced_at: artifact.produced_at,
        });
    }

    let notes_path = partial.join("RELEASE_NOTES.md");
    tokio::fs::write(&notes_path, &release.notes)
        .await
        .fs_context("writing release notes", notes_path)?;

    let manifest = ReleaseManifest {
        tag: &release.tag,
        artifacts: entries,
    };
    let manifest_path = partial.join("release.json");
    tokio::fs::write(&manifest_path, serde_json::to_vec_pretty(&manifest)?)
        .await
        .fs_context("writing release manifest", manifest_path)?;

    tokio::fs::rename(partial, final_dir)
        .await
        .fs_context("publishing release", final_dir)
}
