//! macOS DMG disk image creator.
//!
//! Wraps the `.app` bundle into a compressed (UDZO) drag-to-install disk image
//! using the native hdiutil tool. The image holds the `.app` and an
//! Applications symlink.

mod creation;

use crate::bundler::{error::Result, platform::EmitContext};
use std::path::{Path, PathBuf};

pub use creation::{create_dmg, stage_volume};

/// Bundle project as DMG disk image
///
/// # Process
/// 1. Move the `.app` into a volume root next to an Applications symlink
/// 2. Run `hdiutil create -format UDZO` into the staging directory
///
/// # Returns
/// Path to the `.dmg` inside the staging directory.
pub async fn bundle_project(ctx: &EmitContext<'_>, app_bundle: &Path) -> Result<PathBuf> {
    let volume_root = stage_volume(ctx.staging_dir, app_bundle).await?;
    let dmg_path = ctx.staging_dir.join(ctx.file_name);
    create_dmg(ctx.product, &volume_root, &dmg_path).await?;
    Ok(dmg_path)
}
