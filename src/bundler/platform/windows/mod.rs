//! Windows single-file executable.

mod manifest;

pub use manifest::render_app_manifest;

use super::EmitContext;
use crate::bundler::error::{ErrorExt, Result};
use std::path::PathBuf;

/// Writes the frozen executable as `{Product}-Windows.exe`.
///
/// GUI-mode executables use the windowed subsystem, which the bootloader
/// reads from the payload's closure manifest. The requested execution level
/// comes from `app.manifest` at the payload root.
pub async fn bundle_project(ctx: &EmitContext<'_>) -> Result<PathBuf> {
    log::info!("Writing Windows executable for {}", ctx.product);

    let exe_path = ctx.staging_dir.join(ctx.file_name);
    tokio::fs::write(&exe_path, ctx.executable)
        .await
        .fs_context("writing Windows executable", &exe_path)?;

    Ok(exe_path)
}
