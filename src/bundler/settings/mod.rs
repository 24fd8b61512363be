//! Configuration structures for packaging operations.
//!
//! Package metadata, toolchain locations and platform options, plus the
//! builder that assembles them into a [`Settings`] value.

mod arch;
mod builder;
mod core;
mod macos;
mod package;
mod toolchain;
mod windows;

pub use arch::Arch;
pub use builder::SettingsBuilder;
pub use core::Settings;
pub use macos::MacOsSettings;
pub use package::PackageSettings;
pub use toolchain::{BootloaderSettings, ToolchainSettings};
pub use windows::{ExecutionLevel, WindowsSettings};
