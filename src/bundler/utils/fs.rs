//! File system utilities for staging and publishing.
//!
//! Copies create missing parent directories and preserve symlinks; removals
//! treat an absent path as success.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::{io, path::Path};
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_path(path).await?;
    }
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes a file or directory tree if it exists.
pub async fn remove_path(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e).fs_context("inspecting path", path),
    };
    if metadata.is_dir() {
        fs::remove_dir_all(path)
            .await
            .fs_context("removing directory", path)
    } else {
        fs::remove_file(path).await.fs_context("removing file", path)
    }
}

/// Moves `from` to `to` with a rename, replacing whatever is at `to`.
///
/// Both paths must be on the same filesystem.
pub async fn replace_path(from: &Path, to: &Path) -> Result<()> {
    remove_path(to).await?;
    fs::rename(from, to).await.fs_context("moving artifact", to)
}

/// Total size in bytes of a file or of every file below a directory.
pub async fn path_size(path: &Path) -> Result<u64> {
    let metadata = fs::metadata(path).await.fs_context("reading metadata", path)?;
    if metadata.is_file() {
        return Ok(metadata.len());
    }
    let root = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<u64> {
        let mut total = 0;
        for entry in walkdir::WalkDir::new(&root) {
            let entry = entry?;
            if entry.file_type().is_file() {
                total += entry.metadata()?.len();
            }
        }
        Ok(total)
    })
    .await?
}

/// Makes a symbolic link to a directory.
#[cfg(unix)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a directory.
#[cfg(windows)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(unix)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(windows)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        return Err(Error::GenericError(format!(
            "{} is not a file",
            from.display()
        )));
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }
    fs::copy(from, to).await.fs_context("copying file", from)?;
    Ok(())
}

/// Recursively copies the contents of `from` into `to`, creating `to` and
/// any missing parents.
///
/// Preserves symlinks on platforms that support them. Files already present
/// in `to` are overwritten.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.is_dir() {
        return Err(Error::GenericError(format!(
            "{} is not a directory",
            from.display()
        )));
    }

    let from = from.to_path_buf();
    let to = to.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<()> {
        for entry in walkdir::WalkDir::new(&from) {
            let entry = entry?;
            let rel_path = entry.path().strip_prefix(&from)?;
            let dest_path = to.join(rel_path);

            if entry.file_type().is_symlink() {
                let target = std::fs::read_link(entry.path())
                    .fs_context("reading symlink", entry.path())?;
                let linked = if entry.path().is_dir() {
                    symlink_dir(&target, &dest_path)
                } else {
                    symlink_file(&target, &dest_path)
                };
                linked.fs_context("creating symlink", &dest_path)?;
            } else if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dest_path).fs_context("creating directory", &dest_path)?;
            } else {
                std::fs::copy(entry.path(), &dest_path).fs_context("copying file", entry.path())?;
            }
        }

        Ok(())
    })
    .await?
}

/// Copies a file or directory source to `to`: files to exactly `to`,
/// directories have their contents copied into `to`.
pub async fn copy_path(from: &Path, to: &Path) -> Result<()> {
    if from.is_dir() {
        copy_dir(from, to).await
    } else {
        copy_file(from, to).await
    }
}
