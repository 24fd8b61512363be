//! Payload staging.
//!
//! ```text
//! payload/
//!   entry/<entry point file>
//!   data/<destination>/...      bundled files
//!   lib/<relative path>         resolved dependencies
//!   app.manifest                Windows only
//!   closure.json
//! ```

use super::{
    checksum::{calculate_sha256, portable},
    closure::{ClosureEntry, ClosureManifest, ResolvedDependency, subsystem},
};
use crate::bundler::{
    ValidDescriptor,
    error::{Context, ErrorExt, Result},
    utils::fs,
};
use std::path::{Component, Path, PathBuf};

const APP_MANIFEST: &str = "app.manifest";

/// Copies the descriptor's inputs into `payload_dir` and writes `closure.json`.
///
/// `app_manifest`, when given, is written verbatim to `app.manifest`.
pub async fn stage_payload(
    valid: &ValidDescriptor,
    dependencies: &[ResolvedDependency],
    app_manifest: Option<&str>,
    payload_dir: &Path,
) -> Result<ClosureManifest> {
    fs::create_dir_all(payload_dir, true).await?;

    let entry_name = valid
        .entry_point()
        .file_name()
        .context("entry point has no file name")?;
    let entry_rel = Path::new("entry").join(entry_name);
    fs::copy_file(valid.entry_point(), &payload_dir.join(&entry_rel)).await?;

    let mut data = Vec::with_capacity(valid.bundled_files().len());
    for (source, destination) in valid.bundled_files() {
        let dest_rel = Path::new("data").join(normalize(destination));
        let target = if source.is_dir() {
            payload_dir.join(&dest_rel)
        } else {
            let name = source.file_name().context("bundled file has no name")?;
            payload_dir.join(&dest_rel).join(name)
        };
        fs::copy_path(source, &target).await?;
        log::debug!("Bundled {} -> {}", source.display(), target.display());
        data.push(portable(&dest_rel));
    }

    let mut entries = Vec::with_capacity(dependencies.len());
    for dep in dependencies {
        let rel = Path::new("lib").join(&dep.relative);
        let target = payload_dir.join(&rel);
        fs::copy_path(&dep.source, &target).await?;
        entries.push(ClosureEntry {
            name: dep.name.clone(),
            path: portable(&rel),
            sha256: calculate_sha256(&target).await?,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let app_manifest = match app_manifest {
        Some(xml) => {
            let path = payload_dir.join(APP_MANIFEST);
            tokio::fs::write(&path, xml)
                .await
                .fs_context("writing application manifest", &path)?;
            Some(APP_MANIFEST.to_string())
        }
        None => None,
    };

    let manifest = ClosureManifest {
        target: valid.id(),
        entry_point: portable(&entry_rel),
        subsystem: subsystem(valid.descriptor().mode),
        data,
        dependencies: entries,
        app_manifest,
    };

    let manifest_path = payload_dir.join("closure.json");
    let json = serde_json::to_vec_pretty(&manifest)?;
    tokio::fs::write(&manifest_path, json)
        .await
        .fs_context("writing closure manifest", &manifest_path)?;

    Ok(manifest)
}

/// Drops `.` components; `.` alone means the data root.
fn normalize(destination: &Path) -> PathBuf {
    destination
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
