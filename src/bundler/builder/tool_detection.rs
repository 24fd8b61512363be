//! External tool availability checking.
//!
//! Lookups run once per process and are cached; a missing tool surfaces as
//! `PlatformToolchainUnavailable` for the descriptors that need it.

use std::sync::LazyLock;

/// Check if hdiutil is available for DMG creation.
pub static HAS_HDIUTIL: LazyLock<bool> = LazyLock::new(|| detect("hdiutil"));

/// Whether a named external tool can be used on this host.
pub fn tool_available(tool: &str) -> bool {
    match tool {
        "hdiutil" => *HAS_HDIUTIL,
        other => detect(other),
    }
}

fn detect(tool: &str) -> bool {
    match which::which(tool) {
        Ok(path) => {
            log::debug!("Found {} at: {}", tool, path.display());
            true
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}", tool, e);
            false
        }
    }
}
