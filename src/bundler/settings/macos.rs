//! macOS platform-specific settings.

/// macOS application bundle (.app) configuration.
///
/// # Configuration
///
/// Add to `bundle.toml`:
///
/// ```toml
/// [macos]
/// dmg = true
/// minimum_system_version = "10.13.0"
/// ```
#[derive(Clone, Debug, serde::Deserialize)]
pub struct MacOsSettings {
    /// Wrap the `.app` bundle into a compressed `.dmg` with `hdiutil`.
    ///
    /// When disabled the `.app` directory itself is the artifact, which lets
    /// non-macOS hosts produce (unsigned) bundles.
    ///
    /// Default: true
    #[serde(default = "default_dmg")]
    pub dmg: bool,

    /// Minimum macOS version required (LSMinimumSystemVersion).
    ///
    /// Default: None (key omitted)
    #[serde(default)]
    pub minimum_system_version: Option<String>,
}

fn default_dmg() -> bool {
    true
}

impl Default for MacOsSettings {
    fn default() -> Self {
        Self {
            dmg: default_dmg(),
            minimum_system_version: None,
        }
    }
}
