//! Windows application manifest (`app.manifest`).
//!
//! Rendered with Handlebars from the product metadata and the configured
//! [`ExecutionLevel`](crate::bundler::ExecutionLevel). Values go through the
//! default HTML escaper, which is also valid XML escaping.

use crate::bundler::{Mode, Result, Settings};
use handlebars::Handlebars;
use serde_json::json;

/// `supportedOS` ids: Vista, 7, 8, 8.1, 10/11.
const SUPPORTED_OS: [&str; 5] = [
    "e2011457-1546-43c5-a5fe-008deee3d3f0",
    "35138b9a-5d96-4fbd-8e2d-a2440225f93a",
    "4a2f28e3-53b9-4441-ba9c-d69d4a4a6e38",
    "1f676c76-80e1-4239-95bb-83d0f6d0da78",
    "8e0f7a12-bfb3-4fe8-b9a5-48fd50a15a9a",
];

const MANIFEST_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<assembly xmlns="urn:schemas-microsoft-com:asm.v1" manifestVersion="1.0">
  <assemblyIdentity type="win32" name="{{name}}" version="{{version}}" processorArchitecture="*"/>
  <trustInfo xmlns="urn:schemas-microsoft-com:asm.v3">
    <security>
      <requestedPrivileges>
        <requestedExecutionLevel level="{{execution_level}}" uiAccess="false"/>
      </requestedPrivileges>
    </security>
  </trustInfo>
  <compatibility xmlns="urn:schemas-microsoft-com:compatibility.v1">
    <application>
{{#each supported_os}}
      <supportedOS Id="{{this}}"/>
{{/each}}
    </application>
  </compatibility>
</assembly>
"#;

/// Renders the application manifest for `mode`'s product.
pub fn render_app_manifest(settings: &Settings, mode: Mode) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_template_string("app.manifest", MANIFEST_TEMPLATE)?;

    let data = json!({
        "name": settings.product_name(mode),
        "version": four_part_version(settings.version_string()),
        "execution_level": settings.windows().execution_level.to_string(),
        "supported_os": SUPPORTED_OS.iter().map(|id| format!("{{{id}}}")).collect::<Vec<_>>(),
    });

    Ok(handlebars.render("app.manifest", &data)?)
}

/// `major.minor.patch.0`; pre-release and build metadata are dropped.
fn four_part_version(version: &str) -> String {
    match semver::Version::parse(version) {
        Ok(v) => format!("{}.{}.{}.0", v.major, v.minor, v.patch),
        Err(_) => "0.0.0.0".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{ExecutionLevel, PackageSettings, SettingsBuilder, WindowsSettings};

    fn settings(level: ExecutionLevel) -> Settings {
        SettingsBuilder::new()
            .project_root(".")
            .package_settings(PackageSettings {
                product_name: "Cursor & Pro".into(),
                version: "1.2.0-beta.1".into(),
                ..Default::default()
            })
            .windows(WindowsSettings {
                execution_level: level,
            })
            .build()
            .unwrap()
    }

    #[test]
    fn requests_configured_execution_level() {
        let xml = render_app_manifest(&settings(ExecutionLevel::AsInvoker), Mode::Cli).unwrap();
        assert!(xml.contains(r#"<requestedExecutionLevel level="asInvoker" uiAccess="false"/>"#));

        let xml = render_app_manifest(&settings(ExecutionLevel::default()), Mode::Cli).unwrap();
        assert!(xml.contains(r#"level="requireAdministrator""#));
    }

    #[test]
    fn lists_every_supported_os_and_escapes_names() {
        let xml = render_app_manifest(&settings(ExecutionLevel::default()), Mode::Cli).unwrap();

        for id in SUPPORTED_OS {
            assert!(xml.contains(&format!(r#"<supportedOS Id="{{{id}}}"/>"#)), "{id}");
        }
        assert!(xml.contains(r#"name="Cursor &amp; Pro""#));
        assert!(xml.contains(r#"version="1.2.0.0""#));
    }
}
