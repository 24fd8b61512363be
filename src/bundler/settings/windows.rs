//! Windows platform-specific settings.

use serde::Deserialize;
use std::fmt;

/// Privilege level requested in the application manifest
/// (`requestedExecutionLevel`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum ExecutionLevel {
    /// Runs with the caller's token.
    #[serde(rename = "asInvoker")]
    AsInvoker,
    /// Elevates when the user is an administrator.
    #[serde(rename = "highestAvailable")]
    HighestAvailable,
    /// Always prompts for elevation.
    #[default]
    #[serde(rename = "requireAdministrator")]
    RequireAdministrator,
}

impl fmt::Display for ExecutionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecutionLevel::AsInvoker => "asInvoker",
            ExecutionLevel::HighestAvailable => "highestAvailable",
            ExecutionLevel::RequireAdministrator => "requireAdministrator",
        })
    }
}

/// Windows executable configuration.
///
/// # Configuration
///
/// Add to `bundle.toml`:
///
/// ```toml
/// [windows]
/// execution_level = "asInvoker"
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowsSettings {
    /// Execution level written into `app.manifest`.
    ///
    /// Default: `requireAdministrator`
    #[serde(default)]
    pub execution_level: ExecutionLevel,
}
