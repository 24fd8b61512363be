//! Apply/restore state machine.

use super::record::{PatchRecord, RECORD_VERSION, record_path};
use crate::bundler::{self, builder::checksum::sha256_bytes, error::ErrorExt};
use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Whether a target currently carries a patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchState {
    /// No record; the file holds its own bytes.
    Original,
    /// A record exists; the file holds patched bytes.
    Patched,
}

/// Patch journal failures. The target file is left untouched by every
/// variant except `Io`, which reports where the failure happened.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The target already carries a patch.
    #[error("{} is already patched (record at {})", target.display(), record.display())]
    AlreadyPatched {
        /// Target file.
        target: PathBuf,
        /// Existing record.
        record: PathBuf,
    },

    /// Restore requested but no record exists.
    #[error("no patch record for {}", target.display())]
    NoPatchRecord {
        /// Target file.
        target: PathBuf,
    },

    /// The file to patch does not exist.
    #[error("patch target not found: {}", target.display())]
    TargetMissing {
        /// Target file.
        target: PathBuf,
    },

    /// The record exists but cannot be decoded.
    #[error("corrupt patch record {}: {reason}", record.display())]
    CorruptRecord {
        /// Record file.
        record: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// The caller's transform rejected the input.
    #[error("patch transform failed: {0}")]
    Transform(#[source] anyhow::Error),

    /// Reading or writing failed.
    #[error(transparent)]
    Io(#[from] bundler::Error),
}

/// Reversible, journaled modification of a file's bytes.
///
/// The journal keeps no state of its own: a target is `Patched` exactly when
/// its record file exists. Single actor; no locking beyond check-then-act.
///
/// # Examples
///
/// ```no_run
/// use cursorpro_packager::patch::{PatchJournal, PatchState};
///
/// # async fn example() -> Result<(), cursorpro_packager::patch::PatchError> {
/// let journal = PatchJournal::new();
/// let target = std::path::Path::new("settings.json");
///
/// journal
///     .apply_patch(target, |bytes| Ok(bytes.to_ascii_uppercase()))
///     .await?;
/// assert_eq!(journal.state(target).await, PatchState::Patched);
///
/// journal.restore(target).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct PatchJournal;

impl PatchJournal {
    /// Creates a journal handle.
    pub fn new() -> Self {
        Self
    }

    /// Current state of `target`.
    pub async fn state(&self, target: &Path) -> PatchState {
        match tokio::fs::try_exists(record_path(target)).await {
            Ok(true) => PatchState::Patched,
            _ => PatchState::Original,
        }
    }

    /// Reads the record of `target`, if any.
    pub async fn record(&self, target: &Path) -> Result<Option<PatchRecord>, PatchError> {
        let path = record_path(target);
        let json = match tokio::fs::read(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(PatchError::Io(bundler::Error::Fs {
                    context: "reading patch record",
                    path,
                    error,
                }));
            }
        };
        serde_json::from_slice(&json)
            .map(Some)
            .map_err(|e| PatchError::CorruptRecord {
                record: path,
                reason: e.to_string(),
            })
    }

    /// Applies `transform` to the bytes of `target`.
    ///
    /// Only valid from [`PatchState::Original`]. The record is written before
    /// the target; if the target cannot be written the record is removed
    /// again, so a failed apply leaves the state `Original`.
    pub async fn apply_patch<F>(&self, target: &Path, transform: F) -> Result<PatchRecord, PatchError>
    where
        F: FnOnce(&[u8]) -> anyhow::Result<Vec<u8>>,
    {
        let record_file = record_path(target);
        if self.state(target).await == PatchState::Patched {
            return Err(PatchError::AlreadyPatched {
                target: target.to_path_buf(),
                record: record_file,
            });
        }

        let original = match tokio::fs::read(target).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PatchError::TargetMissing {
                    target: target.to_path_buf(),
                });
            }
            Err(error) => {
                return Err(PatchError::Io(bundler::Error::Fs {
                    context: "reading patch target",
                    path: target.to_path_buf(),
                    error,
                }));
            }
        };

        let patched = transform(&original).map_err(PatchError::Transform)?;

        let record = PatchRecord {
            version: RECORD_VERSION,
            target_file: target.to_path_buf(),
            patched_sha256: sha256_bytes(&patched),
            patched_len: patched.len() as u64,
            original_bytes: original,
            applied_at: Utc::now(),
        };
        let json = serde_json::to_vec_pretty(&record).map_err(bundler::Error::from)?;
        write_atomic(&record_file, &json).await?;

        if let Err(e) = write_atomic(target, &patched).await {
            if let Err(cleanup) = tokio::fs::remove_file(&record_file).await {
                log::warn!(
                    "Failed to roll back patch record {}: {}",
                    record_file.display(),
                    cleanup
                );
            }
            return Err(e.into());
        }

        log::info!("✓ Patched {}", target.display());
        Ok(record)
    }

    /// Writes the original bytes back and deletes the record.
    ///
    /// Only valid from [`PatchState::Patched`]. If the target changed since it
    /// was patched, the change is overwritten and a warning is logged.
    pub async fn restore(&self, target: &Path) -> Result<(), PatchError> {
        let record = self
            .record(target)
            .await?
            .ok_or_else(|| PatchError::NoPatchRecord {
                target: target.to_path_buf(),
            })?;

        if let Ok(current) = tokio::fs::read(target).await {
            if !record.matches_patched(&current) {
                log::warn!(
                    "{} changed since it was patched; restoring original bytes anyway",
                    target.display()
                );
            }
        }

        write_atomic(target, &record.original_bytes).await?;

        let record_file = record_path(target);
        tokio::fs::remove_file(&record_file)
            .await
            .fs_context("removing patch record", &record_file)?;

        log::info!("✓ Restored {}", target.display());
        Ok(())
    }
}

/// Replaces `path` with `bytes` through a sibling temp file and a rename,
/// keeping the permissions of the file being replaced.
async fn write_atomic(path: &Path, bytes: &[u8]) -> bundler::Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()));

    tokio::fs::write(&tmp, bytes)
        .await
        .fs_context("writing temp file", &tmp)?;

    if let Ok(metadata) = tokio::fs::metadata(path).await {
        if let Err(e) = tokio::fs::set_permissions(&tmp, metadata.permissions()).await {
            log::debug!("Could not copy permissions to {}: {}", tmp.display(), e);
        }
    }

    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e).fs_context("replacing file", path);
    }
    Ok(())
}
