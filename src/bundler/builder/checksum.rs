//! SHA-256 checksums for artifacts and frozen dependencies.
//!
//! Files are hashed by content. Directory trees (`.app` bundles, package
//! dependencies) are hashed over every file's relative path and content in
//! sorted order, so the digest is independent of traversal order.

use crate::bundler::error::{ErrorExt, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

const CHUNK: usize = 8192;

/// Hex SHA-256 of a file or directory tree.
pub async fn calculate_sha256(path: &Path) -> Result<String> {
    let metadata = tokio::fs::metadata(path)
        .await
        .fs_context("reading metadata for hashing", path)?;

    let mut hasher = Sha256::new();
    if metadata.is_file() {
        hash_file_into(&mut hasher, path).await?;
    } else if metadata.is_dir() {
        let mut files: Vec<_> = walkdir::WalkDir::new(path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        files.retain(|e| e.file_type().is_file());

        for entry in files {
            let rel = entry.path().strip_prefix(path)?;
            hasher.update(portable(rel).as_bytes());
            hasher.update([0u8]);
            hash_file_into(&mut hasher, entry.path()).await?;
        }
    } else {
        crate::bail!("Path is neither file nor directory: {}", path.display());
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Hex SHA-256 of an in-memory buffer.
pub fn sha256_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Relative path with `/` separators on every platform.
pub fn portable(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

async fn hash_file_into(hasher: &mut Sha256, file_path: &Path) -> Result<()> {
    let mut file = tokio::fs::File::open(file_path)
        .await
        .fs_context("opening file for hashing", file_path)?;
    let mut buffer = vec![0u8; CHUNK];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hash calculation", file_path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(())
}
