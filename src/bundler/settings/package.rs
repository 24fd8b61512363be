//! Package metadata and configuration.

/// Package metadata and configuration.
///
/// Contains the product information shared by every artifact of a release.
/// Maps from the `[package]` table of `bundle.toml`.
///
/// # Examples
///
/// ```no_run
/// use cursorpro_packager::bundler::PackageSettings;
///
/// let settings = PackageSettings {
///     product_name: "CursorPro".into(),
///     version: "1.2.0".into(),
///     identifier: Some("com.cursor.pro".into()),
///     ..Default::default()
/// };
/// assert_eq!(settings.gui_product_name(), "CursorProGUI");
/// ```
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct PackageSettings {
    /// Product name of CLI-mode artifacts.
    ///
    /// Example: "CursorPro" produces `CursorPro-Windows.exe`.
    pub product_name: String,

    /// Product name of GUI-mode artifacts.
    ///
    /// Default: None (uses `{product_name}GUI`)
    #[serde(default)]
    pub gui_product_name: Option<String>,

    /// Version string in semantic versioning format.
    ///
    /// Example: "1.2.0"
    pub version: String,

    /// Brief description of the application.
    #[serde(default)]
    pub description: String,

    /// Bundle identifier in reverse domain notation (macOS `CFBundleIdentifier`).
    ///
    /// Default: None (derived from the product name)
    #[serde(default)]
    pub identifier: Option<String>,

    /// Copyright notice written into macOS bundles.
    #[serde(default)]
    pub copyright: Option<String>,
}

impl PackageSettings {
    /// Product name used for GUI-mode artifacts.
    pub fn gui_product_name(&self) -> String {
        self.gui_product_name
            .clone()
            .unwrap_or_else(|| format!("{}GUI", self.product_name))
    }
}
