//! Release notes generation.
//!
//! Renders `RELEASE_NOTES.md` from a template using Handlebars.

use crate::bundler::{BuildArtifact, Result, Settings};
use handlebars::Handlebars;
use serde_json::json;

const NOTES_TEMPLATE: &str = r#"# {{product}} {{tag}}

Version {{version}}{{#if description}}: {{description}}{{/if}}

| Artifact | Target | Size (bytes) | SHA-256 |
|----------|--------|--------------|---------|
{{#each artifacts}}
| `{{name}}` | {{target}} | {{size}} | `{{checksum}}` |
{{/each}}
"#;

/// Renders release notes listing every artifact with its size and checksum.
///
/// Artifacts appear in the order given.
pub fn render_release_notes(
    settings: &Settings,
    tag: &str,
    artifacts: &[BuildArtifact],
) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.register_template_string("notes", NOTES_TEMPLATE)?;

    let rows: Vec<_> = artifacts
        .iter()
        .map(|a| {
            json!({
                "name": a.file_name(),
                "target": a.id().to_string(),
                "size": a.size,
                "checksum": a.checksum,
            })
        })
        .collect();

    let package = settings.package();
    let data = json!({
        "product": package.product_name,
        "tag": tag,
        "version": settings.version_string(),
        "description": package.description,
        "artifacts": rows,
    });

    Ok(handlebars.render("notes", &data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{Mode, PackageSettings, Platform, SettingsBuilder, TargetDescriptor};

    #[test]
    fn lists_artifacts_with_checksums() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SettingsBuilder::new()
            .project_root(dir.path())
            .package_settings(PackageSettings {
                product_name: "CursorPro".into(),
                version: "1.2.0".into(),
                ..Default::default()
            })
            .build()
            .unwrap();
        let artifact = BuildArtifact {
            descriptor: TargetDescriptor::new(Platform::Windows, Mode::Gui, "gui.py"),
            binary_path: dir.path().join("CursorProGUI-Windows.exe"),
            produced_at: chrono::Utc::now(),
            size: 42,
            checksum: "abc123".into(),
            sidecars: Vec::new(),
        };

        let notes = render_release_notes(&settings, "v1.2.0", &[artifact]).unwrap();

        assert!(notes.starts_with("# CursorPro v1.2.0"));
        assert!(notes.contains("| `CursorProGUI-Windows.exe` | windows-gui | 42 | `abc123` |"));
    }
}
