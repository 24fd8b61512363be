//! Pre-build descriptor validation.

use super::{TargetDescriptor, TargetId};
use crate::bundler::Settings;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Descriptor is malformed. Fatal to that descriptor, reported before any
/// build attempt.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Entry point does not exist or is not a regular file.
    #[error("{target}: entry point not found: {}", path.display())]
    MissingEntryPoint {
        /// Offending target.
        target: TargetId,
        /// Resolved entry-point path.
        path: PathBuf,
    },

    /// Bundled source is missing or unreadable.
    #[error("{target}: bundled file not found or unreadable: {}", path.display())]
    MissingBundledFile {
        /// Offending target.
        target: TargetId,
        /// Resolved source path.
        path: PathBuf,
    },

    /// Destination is absolute or climbs out of the data tree.
    #[error("{target}: invalid bundle destination '{}'", destination.display())]
    InvalidDestination {
        /// Offending target.
        target: TargetId,
        /// Declared destination.
        destination: PathBuf,
    },

    /// Dependency name is not a dotted identifier.
    #[error("{target}: invalid dependency name '{name}'")]
    InvalidDependencyName {
        /// Offending target.
        target: TargetId,
        /// Declared name.
        name: String,
    },

    /// Sidecar output name is not a single plain file name, or repeats one.
    #[error("{target}: invalid sidecar file name '{name}'")]
    InvalidSidecarName {
        /// Offending target.
        target: TargetId,
        /// Declared output name.
        name: String,
    },
}

impl ValidationError {
    /// Target the error refers to.
    pub fn target(&self) -> TargetId {
        match self {
            ValidationError::MissingEntryPoint { target, .. }
            | ValidationError::MissingBundledFile { target, .. }
            | ValidationError::InvalidDestination { target, .. }
            | ValidationError::InvalidDependencyName { target, .. }
            | ValidationError::InvalidSidecarName { target, .. } => *target,
        }
    }
}

/// A descriptor whose paths are resolved and checked.
///
/// Only [`validate`] constructs this type.
#[derive(Clone, Debug)]
pub struct ValidDescriptor {
    descriptor: TargetDescriptor,
    entry_point: PathBuf,
    bundled_files: Vec<(PathBuf, PathBuf)>,
    sidecar_files: Vec<(PathBuf, String)>,
}

impl ValidDescriptor {
    /// The original descriptor.
    pub fn descriptor(&self) -> &TargetDescriptor {
        &self.descriptor
    }

    /// Target identifier.
    pub fn id(&self) -> TargetId {
        self.descriptor.id()
    }

    /// Absolute entry-point path.
    pub fn entry_point(&self) -> &Path {
        &self.entry_point
    }

    /// `(absolute source, relative destination)` pairs in declaration order.
    pub fn bundled_files(&self) -> &[(PathBuf, PathBuf)] {
        &self.bundled_files
    }

    /// `(absolute source, output file name)` pairs in declaration order.
    pub fn sidecar_files(&self) -> &[(PathBuf, String)] {
        &self.sidecar_files
    }
}

/// Checks a descriptor against the filesystem without modifying anything.
///
/// The dependency check is advisory: a declared dependency the entry point
/// never mentions is logged, not rejected.
pub fn validate(
    descriptor: &TargetDescriptor,
    settings: &Settings,
) -> Result<ValidDescriptor, ValidationError> {
    let target = descriptor.id();

    let entry_point = settings.resolve_path(&descriptor.entry_point);
    if !entry_point.is_file() {
        return Err(ValidationError::MissingEntryPoint {
            target,
            path: entry_point,
        });
    }

    let mut bundled_files = Vec::with_capacity(descriptor.bundled_files.len());
    for file in &descriptor.bundled_files {
        let source = settings.resolve_path(&file.source);
        if !is_readable(&source) {
            return Err(ValidationError::MissingBundledFile {
                target,
                path: source,
            });
        }
        if !is_contained(&file.destination) {
            return Err(ValidationError::InvalidDestination {
                target,
                destination: file.destination.clone(),
            });
        }
        bundled_files.push((source, file.destination.clone()));
    }

    let mut sidecar_files = Vec::with_capacity(descriptor.sidecar_files.len());
    for file in &descriptor.sidecar_files {
        let source = settings.resolve_path(&file.source);
        if !source.is_file() || !is_readable(&source) {
            return Err(ValidationError::MissingBundledFile {
                target,
                path: source,
            });
        }
        let repeated = sidecar_files.iter().any(|(_, name)| name == &file.name);
        if repeated || !is_plain_file_name(&file.name) {
            return Err(ValidationError::InvalidSidecarName {
                target,
                name: file.name.clone(),
            });
        }
        sidecar_files.push((source, file.name.clone()));
    }

    for name in &descriptor.declared_dependencies {
        if !is_dotted_identifier(name) {
            return Err(ValidationError::InvalidDependencyName {
                target,
                name: name.clone(),
            });
        }
    }

    warn_unreferenced_dependencies(descriptor, &entry_point);

    Ok(ValidDescriptor {
        descriptor: descriptor.clone(),
        entry_point,
        bundled_files,
        sidecar_files,
    })
}

fn is_readable(path: &Path) -> bool {
    if path.is_file() {
        std::fs::File::open(path).is_ok()
    } else if path.is_dir() {
        std::fs::read_dir(path).is_ok()
    } else {
        false
    }
}

/// Relative, non-escaping path. `.` is allowed and means the data root.
fn is_contained(path: &Path) -> bool {
    if path.as_os_str().is_empty() {
        return false;
    }
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Exactly one normal path component, e.g. `config.ini` or `.env`.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

fn is_dotted_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        })
}

fn warn_unreferenced_dependencies(descriptor: &TargetDescriptor, entry_point: &Path) {
    if descriptor.declared_dependencies.is_empty() {
        return;
    }
    let Ok(source) = std::fs::read(entry_point) else {
        return;
    };
    let source = String::from_utf8_lossy(&source);
    for name in &descriptor.declared_dependencies {
        let leaf = name.rsplit('.').next().unwrap_or(name);
        if !source.contains(leaf) {
            log::warn!(
                "{}: declared dependency '{}' is not referenced by {}",
                descriptor.id(),
                name,
                entry_point.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::descriptor::Mode;
    use crate::bundler::platform::Platform;
    use crate::bundler::{PackageSettings, SettingsBuilder};

    fn settings(root: &Path) -> Settings {
        SettingsBuilder::new()
            .project_root(root)
            .package_settings(PackageSettings {
                product_name: "CursorPro".into(),
                version: "1.2.0".into(),
                ..Default::default()
            })
            .build()
            .unwrap()
    }

    #[test]
    fn resolves_relative_paths_against_project_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.py"), "import helper\n").unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();

        let descriptor = TargetDescriptor::new(Platform::Linux, Mode::Cli, "main.py")
            .with_file("assets", "assets")
            .with_dependency("helper");

        let valid = validate(&descriptor, &settings(dir.path())).unwrap();
        assert_eq!(valid.entry_point(), dir.path().join("main.py"));
        assert_eq!(valid.bundled_files()[0].0, dir.path().join("assets"));
    }

    #[test]
    fn sidecar_names_must_be_plain_file_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.py"), "").unwrap();
        std::fs::write(dir.path().join(".env.example"), "KEY=").unwrap();
        let settings = settings(dir.path());

        let ok = TargetDescriptor::new(Platform::Windows, Mode::Cli, "main.py")
            .with_sidecar(".env.example", ".env");
        let valid = validate(&ok, &settings).unwrap();
        assert_eq!(
            valid.sidecar_files(),
            &[(dir.path().join(".env.example"), ".env".to_string())]
        );

        for bad in ["", "..", "../.env", "conf/.env", "/etc/.env"] {
            let descriptor = TargetDescriptor::new(Platform::Windows, Mode::Cli, "main.py")
                .with_sidecar(".env.example", bad);
            let err = validate(&descriptor, &settings).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidSidecarName { .. }),
                "{bad:?}: {err}"
            );
        }

        let repeated = TargetDescriptor::new(Platform::Windows, Mode::Cli, "main.py")
            .with_sidecar(".env.example", ".env")
            .with_sidecar(".env.example", ".env");
        assert!(matches!(
            validate(&repeated, &settings).unwrap_err(),
            ValidationError::InvalidSidecarName { .. }
        ));

        let missing = TargetDescriptor::new(Platform::Windows, Mode::Cli, "main.py")
            .with_sidecar("absent.ini", "config.ini");
        assert!(matches!(
            validate(&missing, &settings).unwrap_err(),
            ValidationError::MissingBundledFile { .. }
        ));
    }

    #[test]
    fn missing_entry_point() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = TargetDescriptor::new(Platform::Windows, Mode::Cli, "nope.py");

        let err = validate(&descriptor, &settings(dir.path())).unwrap_err();
        assert!(matches!(err, ValidationError::MissingEntryPoint { .. }));
    }

    #[test]
    fn entry_point_must_be_a_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("pkg")).unwrap();
        let descriptor = TargetDescriptor::new(Platform::Windows, Mode::Cli, "pkg");

        let err = validate(&descriptor, &settings(dir.path())).unwrap_err();
        assert!(matches!(err, ValidationError::MissingEntryPoint { .. }));
    }

    #[test]
    fn missing_bundled_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.py"), "").unwrap();
        let descriptor = TargetDescriptor::new(Platform::Linux, Mode::Cli, "main.py")
            .with_file("config.ini.example", ".");

        let err = validate(&descriptor, &settings(dir.path())).unwrap_err();
        assert!(matches!(err, ValidationError::MissingBundledFile { .. }));
    }

    #[test]
    fn destination_may_not_escape() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.py"), "").unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();

        for bad in ["../outside", "/etc", ""] {
            let descriptor = TargetDescriptor::new(Platform::Linux, Mode::Cli, "main.py")
                .with_file("a.txt", bad);
            let err = validate(&descriptor, &settings(dir.path())).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidDestination { .. }),
                "{bad:?} should be rejected"
            );
        }

        let descriptor =
            TargetDescriptor::new(Platform::Linux, Mode::Cli, "main.py").with_file("a.txt", ".");
        assert!(validate(&descriptor, &settings(dir.path())).is_ok());
    }

    #[test]
    fn rejects_malformed_dependency_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.py"), "").unwrap();

        for bad in ["", "a..b", "a/b", ".hidden"] {
            let descriptor =
                TargetDescriptor::new(Platform::Linux, Mode::Cli, "main.py").with_dependency(bad);
            let err = validate(&descriptor, &settings(dir.path())).unwrap_err();
            assert!(matches!(err, ValidationError::InvalidDependencyName { .. }));
        }
    }

    #[test]
    fn unreferenced_dependency_is_only_advisory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.py"), "print('hi')\n").unwrap();
        let descriptor = TargetDescriptor::new(Platform::Linux, Mode::Cli, "main.py")
            .with_dependency("never_imported");

        assert!(validate(&descriptor, &settings(dir.path())).is_ok());
    }
}
