//! Core DMG creation logic using hdiutil.

use crate::bundler::error::{Context, Error, ErrorExt, Result};
use std::path::{Path, PathBuf};

/// Prepares the volume root: `<staging>/dmg-root/{app}` plus an
/// `Applications -> /Applications` symlink for drag-to-install.
pub async fn stage_volume(staging_dir: &Path, app_bundle: &Path) -> Result<PathBuf> {
    let volume_root = staging_dir.join("dmg-root");
    tokio::fs::create_dir_all(&volume_root)
        .await
        .fs_context("creating DMG volume root", &volume_root)?;

    let app_name = app_bundle
        .file_name()
        .context("invalid app bundle path")?;
    let staged_app = volume_root.join(app_name);
    tokio::fs::rename(app_bundle, &staged_app)
        .await
        .fs_context("moving .app into DMG volume", &staged_app)?;

    #[cfg(unix)]
    {
        let applications_link = volume_root.join("Applications");
        tokio::fs::symlink("/Applications", &applications_link)
            .await
            .fs_context("creating Applications symlink", &applications_link)?;
    }

    Ok(volume_root)
}

/// Create a compressed DMG from a volume root using hdiutil.
///
/// Overwrites `dmg_path` if it exists.
pub async fn create_dmg(volume_name: &str, volume_root: &Path, dmg_path: &Path) -> Result<()> {
    let volume_str = volume_root
        .to_str()
        .context("Invalid staging path (contains non-UTF8 characters)")?;
    let dmg_str = dmg_path
        .to_str()
        .context("Invalid DMG path (contains non-UTF8 characters)")?;

    log::info!("Creating DMG {}...", dmg_path.display());

    let output = tokio::process::Command::new("hdiutil")
        .args([
            "create",
            "-volname",
            volume_name,
            "-srcfolder",
            volume_str,
            "-ov",
            "-format",
            "UDZO",
            dmg_str,
        ])
        .output()
        .await
        .map_err(|error| Error::CommandFailed {
            command: "hdiutil".to_string(),
            error,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        crate::bail!("hdiutil failed: {}", stderr.trim());
    }

    log::info!("✓ Created DMG: {}", dmg_path.display());
    Ok(())
}
