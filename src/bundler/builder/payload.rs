//! Deterministic payload archive.
//!
//! The staged tree is packed into a gzip'd tar whose bytes depend only on file
//! names and contents: entries are sorted, timestamps and owners are zeroed,
//! modes are fixed and the gzip header carries no mtime.

use crate::bundler::{
    builder::checksum::portable,
    error::{Context, ErrorExt, Result},
};
use flate2::{Compression, GzBuilder, read::GzDecoder};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

const DIR_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;

/// Packs `root` into a reproducible `.tar.gz`.
pub async fn pack_tree(root: &Path) -> Result<Vec<u8>> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || pack_tree_blocking(&root)).await?
}

fn pack_tree_blocking(root: &Path) -> Result<Vec<u8>> {
    let encoder = GzBuilder::new()
        .mtime(0)
        .write(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.mode(tar::HeaderMode::Deterministic);

    for entry in walkdir::WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry?;
        let rel = portable(entry.path().strip_prefix(root)?);

        let mut header = tar::Header::new_gnu();
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);

        if entry.file_type().is_dir() {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_mode(DIR_MODE);
            header.set_size(0);
            builder
                .append_data(&mut header, format!("{rel}/"), std::io::empty())
                .fs_context("archiving directory", entry.path())?;
        } else {
            let data = std::fs::read(entry.path()).fs_context("reading payload file", entry.path())?;
            header.set_entry_type(tar::EntryType::Regular);
            header.set_mode(FILE_MODE);
            header.set_size(data.len() as u64);
            builder
                .append_data(&mut header, &rel, data.as_slice())
                .fs_context("archiving file", entry.path())?;
        }
    }

    let encoder = builder.into_inner()?;
    Ok(encoder.finish()?)
}

/// Regular files of a payload archive, keyed by their `/`-separated path.
pub fn payload_entries(payload: &[u8]) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut archive = tar::Archive::new(GzDecoder::new(payload));
    let mut files = BTreeMap::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        if entry.header().entry_type() != tar::EntryType::Regular {
            continue;
        }
        let path: PathBuf = entry.path()?.into_owned();
        let name = path.to_str().context("non-UTF8 path in payload")?.to_string();
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        files.insert(name, data);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(root: &Path) {
        std::fs::create_dir_all(root.join("entry")).unwrap();
        std::fs::create_dir_all(root.join("data/turnstilePatch")).unwrap();
        std::fs::write(root.join("entry/main.py"), "print('hi')").unwrap();
        std::fs::write(root.join("data/turnstilePatch/script.js"), "x").unwrap();
    }

    #[tokio::test]
    async fn same_tree_packs_to_same_bytes() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        tree(a.path());
        std::thread::sleep(std::time::Duration::from_millis(20));
        tree(b.path());

        assert_eq!(
            pack_tree(a.path()).await.unwrap(),
            pack_tree(b.path()).await.unwrap()
        );
    }

    #[tokio::test]
    async fn entries_are_readable_back() {
        let dir = tempfile::tempdir().unwrap();
        tree(dir.path());

        let files = payload_entries(&pack_tree(dir.path()).await.unwrap()).unwrap();
        assert_eq!(
            files.keys().collect::<Vec<_>>(),
            vec!["data/turnstilePatch/script.js", "entry/main.py"]
        );
        assert_eq!(files["entry/main.py"], b"print('hi')");
    }
}
