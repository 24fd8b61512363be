//! Linux single-file executable.

use super::EmitContext;
use crate::bundler::error::{ErrorExt, Result};
use std::path::PathBuf;

/// Writes the frozen executable as `{Product}-Linux` with mode 0755.
pub async fn bundle_project(ctx: &EmitContext<'_>) -> Result<PathBuf> {
    log::info!("Writing Linux executable for {}", ctx.product);

    let bin_path = ctx.staging_dir.join(ctx.file_name);
    tokio::fs::write(&bin_path, ctx.executable)
        .await
        .fs_context("writing Linux executable", &bin_path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(&bin_path, std::fs::Permissions::from_mode(0o755))
            .await
            .fs_context("setting executable permissions", &bin_path)?;
    }

    Ok(bin_path)
}
