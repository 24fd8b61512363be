//! Dependency closure of a frozen executable.
//!
//! Declared dependencies are dotted module names. `a.b` resolves, under each
//! search root in order, to `<root>/a/b` (file or package directory) or to a
//! file in `<root>/a` whose stem is `b` (`b.py`, `b.so`, ...). The first root
//! with a match wins.

use crate::bundler::{Mode, TargetId};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A declared dependency located on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedDependency {
    /// Name as declared.
    pub name: String,
    /// Absolute path of the file or package directory.
    pub source: PathBuf,
    /// Path relative to its search root; also its location under `lib/`.
    pub relative: PathBuf,
}

/// Resolves `name` against `roots`, returning `None` when no root has it.
pub fn resolve_dependency(name: &str, roots: &[PathBuf]) -> Option<ResolvedDependency> {
    let segments: Vec<&str> = name.split('.').collect();
    let (leaf, parents) = segments.split_last()?;
    let parent_rel: PathBuf = parents.iter().collect();

    for root in roots {
        let exact_rel = parent_rel.join(leaf);
        let exact = root.join(&exact_rel);
        if exact.exists() {
            return Some(ResolvedDependency {
                name: name.to_string(),
                source: exact,
                relative: exact_rel,
            });
        }

        if let Some(file_name) = find_by_stem(&root.join(&parent_rel), leaf) {
            let relative = parent_rel.join(&file_name);
            return Some(ResolvedDependency {
                name: name.to_string(),
                source: root.join(&relative),
                relative,
            });
        }
    }
    None
}

/// First regular file in `dir` (by name) whose stem equals `stem`.
fn find_by_stem(dir: &Path, stem: &str) -> Option<std::ffi::OsString> {
    let mut matches: Vec<_> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter(|entry| entry.path().file_stem().is_some_and(|s| s == stem))
        .map(|entry| entry.file_name())
        .collect();
    matches.sort();
    matches.into_iter().next()
}

/// `closure.json`, read by the bootloader at startup.
#[derive(Clone, Debug, Serialize)]
pub struct ClosureManifest {
    /// Target the payload was frozen for.
    #[serde(flatten)]
    pub target: TargetId,
    /// Entry point relative to the payload root.
    pub entry_point: String,
    /// `console` for CLI mode, `windows` for GUI mode.
    pub subsystem: &'static str,
    /// Data directories relative to the payload root, in declaration order.
    pub data: Vec<String>,
    /// Frozen dependencies, sorted by name.
    pub dependencies: Vec<ClosureEntry>,
    /// Application manifest relative to the payload root (Windows).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_manifest: Option<String>,
}

/// One frozen dependency.
#[derive(Clone, Debug, Serialize)]
pub struct ClosureEntry {
    /// Declared name.
    pub name: String,
    /// Location relative to the payload root.
    pub path: String,
    /// SHA-256 of the file or directory tree.
    pub sha256: String,
}

/// Subsystem the bootloader starts the interpreter in.
pub fn subsystem(mode: Mode) -> &'static str {
    match mode {
        Mode::Cli => "console",
        Mode::Gui => "windows",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_package_directory_and_module_file() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("pkg/sub")).unwrap();
        std::fs::write(root.path().join("pkg/sub/__init__.py"), "").unwrap();
        std::fs::write(root.path().join("helper.py"), "").unwrap();
        let roots = vec![root.path().to_path_buf()];

        let sub = resolve_dependency("pkg.sub", &roots).unwrap();
        assert_eq!(sub.relative, PathBuf::from("pkg/sub"));
        assert!(sub.source.is_dir());

        let helper = resolve_dependency("helper", &roots).unwrap();
        assert_eq!(helper.relative, PathBuf::from("helper.py"));
    }

    #[test]
    fn first_root_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(first.path().join("dup.py"), "first").unwrap();
        std::fs::write(second.path().join("dup.py"), "second").unwrap();

        let resolved = resolve_dependency(
            "dup",
            &[first.path().to_path_buf(), second.path().to_path_buf()],
        )
        .unwrap();
        assert_eq!(resolved.source, first.path().join("dup.py"));
    }

    #[test]
    fn falls_through_to_later_roots() {
        let empty = tempfile::tempdir().unwrap();
        let vendor = tempfile::tempdir().unwrap();
        std::fs::write(vendor.path().join("colorama.py"), "").unwrap();

        let resolved = resolve_dependency(
            "colorama",
            &[empty.path().to_path_buf(), vendor.path().to_path_buf()],
        )
        .unwrap();
        assert_eq!(resolved.source, vendor.path().join("colorama.py"));
    }

    #[test]
    fn unknown_name_is_unresolved() {
        let root = tempfile::tempdir().unwrap();
        assert!(resolve_dependency("missing.module", &[root.path().to_path_buf()]).is_none());
    }
}
