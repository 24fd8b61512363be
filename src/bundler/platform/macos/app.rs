//! `.app` bundle layout.
//!
//! ```text
//! {Product}.app/
//!   Contents/
//!     Info.plist
//!     PkgInfo
//!     MacOS/{Product}     frozen executable
//!     Resources/
//! ```

use crate::bundler::{
    descriptor::Mode,
    error::{ErrorExt, Result},
    platform::EmitContext,
};
use plist::{Dictionary, Value};
use std::path::PathBuf;

/// Creates `{Product}.app` under `<staging>/app/` and returns its path.
pub async fn create_app_bundle(ctx: &EmitContext<'_>) -> Result<PathBuf> {
    let app_dir = ctx
        .staging_dir
        .join("app")
        .join(format!("{}.app", ctx.product));
    let contents = app_dir.join("Contents");
    let macos_dir = contents.join("MacOS");
    let resources_dir = contents.join("Resources");

    for dir in [&macos_dir, &resources_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .fs_context("creating .app structure", dir)?;
    }

    let exe = macos_dir.join(ctx.product);
    tokio::fs::write(&exe, ctx.executable)
        .await
        .fs_context("writing bundle executable", &exe)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755))
            .await
            .fs_context("setting executable permissions", &exe)?;
    }

    let pkg_info = contents.join("PkgInfo");
    tokio::fs::write(&pkg_info, b"APPL????")
        .await
        .fs_context("writing PkgInfo", &pkg_info)?;

    let plist_path = contents.join("Info.plist");
    Value::Dictionary(info_plist(ctx)).to_file_xml(&plist_path)?;

    log::debug!("Created {}", app_dir.display());
    Ok(app_dir)
}

/// Info.plist contents for the bundle.
///
/// `CFBundleVersion` carries the build time, so it differs between otherwise
/// identical builds.
pub fn info_plist(ctx: &EmitContext<'_>) -> Dictionary {
    let mode = ctx.descriptor.descriptor().mode;
    let mut dict = Dictionary::new();

    let mut put = |key: &str, value: Value| {
        dict.insert(key.to_string(), value);
    };

    put("CFBundleName", Value::String(ctx.product.to_string()));
    put("CFBundleDisplayName", Value::String(ctx.product.to_string()));
    put("CFBundleExecutable", Value::String(ctx.product.to_string()));
    put(
        "CFBundleIdentifier",
        Value::String(ctx.settings.identifier(mode)),
    );
    put("CFBundlePackageType", Value::String("APPL".into()));
    put("CFBundleInfoDictionaryVersion", Value::String("6.0".into()));
    put(
        "CFBundleShortVersionString",
        Value::String(ctx.settings.version_string().to_string()),
    );
    put(
        "CFBundleVersion",
        Value::String(ctx.built_at.format("%Y%m%d%H%M%S").to_string()),
    );

    if let Some(min) = &ctx.settings.macos().minimum_system_version {
        put("LSMinimumSystemVersion", Value::String(min.clone()));
    }
    if let Some(copyright) = &ctx.settings.package().copyright {
        put("NSHumanReadableCopyright", Value::String(copyright.clone()));
    }

    if mode == Mode::Gui {
        put("NSPrincipalClass", Value::String("NSApplication".into()));
        put("NSHighResolutionCapable", Value::Boolean(true));
        put("LSUIElement", Value::Boolean(false));
    }

    dict
}
