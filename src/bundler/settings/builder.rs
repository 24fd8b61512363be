//! Builder for constructing Settings.

use super::{MacOsSettings, PackageSettings, Settings, ToolchainSettings, WindowsSettings};
use chrono::{DateTime, Utc};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Builder for constructing [`Settings`].
///
/// # Examples
///
/// ```no_run
/// use cursorpro_packager::bundler::{PackageSettings, SettingsBuilder, ToolchainSettings};
///
/// # fn example() -> cursorpro_packager::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .project_root("/src/cursorpro")
///     .package_settings(PackageSettings {
///         product_name: "CursorPro".into(),
///         version: "1.2.0".into(),
///         ..Default::default()
///     })
///     .toolchain(ToolchainSettings::default())
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    project_root: Option<PathBuf>,
    package_settings: Option<PackageSettings>,
    toolchain: ToolchainSettings,
    macos: MacOsSettings,
    windows: WindowsSettings,
    build_timestamp: Option<DateTime<Utc>>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the project root relative paths resolve against.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn project_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.project_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets package metadata.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn package_settings(mut self, settings: PackageSettings) -> Self {
        self.package_settings = Some(settings);
        self
    }

    /// Sets bootloaders and search paths.
    pub fn toolchain(mut self, toolchain: ToolchainSettings) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Sets macOS options.
    pub fn macos(mut self, macos: MacOsSettings) -> Self {
        self.macos = macos;
        self
    }

    /// Sets Windows options.
    pub fn windows(mut self, windows: WindowsSettings) -> Self {
        self.windows = windows;
        self
    }

    /// Pins the build time embedded into artifacts.
    pub fn build_timestamp(mut self, timestamp: Option<DateTime<Utc>>) -> Self {
        self.build_timestamp = timestamp;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `project_root` or `package_settings` is missing,
    /// if either product name is not usable as a file name stem, if the GUI
    /// product name equals the CLI one, or if the version is not semver.
    pub fn build(self) -> crate::bundler::Result<Settings> {
        use crate::bundler::error::Context;

        let package = self
            .package_settings
            .context("package_settings is required")?;
        check_product_name("product_name", &package.product_name)?;
        let gui_name = package.gui_product_name();
        check_product_name("gui_product_name", &gui_name)?;
        if gui_name == package.product_name {
            crate::bail!(
                "gui_product_name must differ from product_name ('{}'), otherwise CLI and GUI artifacts share a file name",
                gui_name
            );
        }
        if let Err(e) = semver::Version::parse(&package.version) {
            crate::bail!("version '{}' is not valid semver: {}", package.version, e);
        }

        let root = self.project_root.context("project_root is required")?;
        let project_root = root.absolutize()?.into_owned();

        Ok(Settings::new(
            package,
            project_root,
            self.toolchain,
            self.macos,
            self.windows,
            self.build_timestamp,
        ))
    }
}

/// Product names become artifact file name stems, so they must be a single
/// plain path component.
fn check_product_name(field: &str, name: &str) -> crate::bundler::Result<()> {
    if name.trim().is_empty() {
        crate::bail!("{field} must not be empty");
    }
    if name.trim() != name {
        crate::bail!("{field} '{name}' has leading or trailing whitespace");
    }
    if name.contains("..") {
        crate::bail!("{field} '{name}' must not contain '..'");
    }
    if let Some(c) = name
        .chars()
        .find(|c| c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
    {
        crate::bail!("{field} '{name}' contains '{}', which is not allowed in file names", c.escape_default());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_with(product_name: &str, gui_product_name: Option<&str>) -> crate::bundler::Result<Settings> {
        SettingsBuilder::new()
            .project_root("/work")
            .package_settings(PackageSettings {
                product_name: product_name.into(),
                gui_product_name: gui_product_name.map(Into::into),
                version: "1.2.0".into(),
                ..Default::default()
            })
            .build()
    }

    #[test]
    fn accepts_distinct_plain_names() {
        let settings = build_with("CursorPro", Some("CursorPro GUI")).unwrap();
        assert_eq!(settings.product_name(crate::bundler::Mode::Gui), "CursorPro GUI");
        assert!(build_with("CursorPro", None).is_ok());
    }

    #[test]
    fn rejects_gui_name_equal_to_cli_name() {
        let err = build_with("CursorPro", Some("CursorPro")).unwrap_err();
        assert!(err.to_string().contains("must differ"), "{err}");
    }

    #[test]
    fn rejects_names_unusable_as_file_names() {
        for bad in ["", "  ", "../CursorPro", "Cursor/Pro", "Cursor\\Pro", "a..b", " CursorPro"] {
            assert!(build_with(bad, None).is_err(), "product_name {bad:?} accepted");
            assert!(
                build_with("CursorPro", Some(bad)).is_err(),
                "gui_product_name {bad:?} accepted"
            );
        }
    }
}
