//! macOS `.app` bundles and `.dmg` disk images.
//!
//! - `app` - `.app` directory layout and Info.plist
//! - `dmg` - wrapping the bundle into a compressed disk image with hdiutil

mod app;
mod dmg;

use app::create_app_bundle;

use super::EmitContext;
use crate::bundler::error::{ErrorExt, Result};
use std::path::PathBuf;

/// Bundle project as `.app`, then as `.dmg` unless disabled in settings.
///
/// # Returns
/// Path to the `.dmg` file, or to the renamed `.app` directory when DMG
/// output is off.
pub async fn bundle_project(ctx: &EmitContext<'_>) -> Result<PathBuf> {
    log::info!("Creating macOS bundle for {}", ctx.product);

    let app_path = create_app_bundle(ctx).await?;

    if ctx.settings.macos().dmg {
        return dmg::bundle_project(ctx, &app_path).await;
    }

    let artifact = ctx.staging_dir.join(ctx.file_name);
    tokio::fs::rename(&app_path, &artifact)
        .await
        .fs_context("renaming .app bundle", &artifact)?;
    Ok(artifact)
}
