//! `package.json` fields needed to find a package's entry point.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use crate::runtime::Runtime;

/// Conditions tried, in order, when `exports` is a conditions object.
const EXPORT_CONDITIONS: &[&str] = &["import", "node", "require", "default"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub main: Option<String>,
    pub exports: Option<Value>,
}

impl PackageManifest {
    /// Load `package.json` from a package directory. A missing manifest is not
    /// an error, the package just has no metadata.
    pub fn load<R: Runtime + ?Sized>(runtime: &R, package_dir: &Path) -> Result<Self> {
        let path = package_dir.join("package.json");
        if !runtime.is_file(&path) {
            return Ok(Self::default());
        }
        let content = runtime.read_to_string(&path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Target of `exports` for a subpath key ("." or "./lib/x.js").
    pub fn export_target(&self, key: &str) -> Option<String> {
        let exports = self.exports.as_ref()?;
        match exports {
            Value::String(target) if key == "." => Some(target.clone()),
            Value::Object(map) => {
                if map.keys().all(|k| k.starts_with('.')) {
                    map.get(key).and_then(select_condition)
                } else if key == "." {
                    // Conditions object that applies to the root only
                    select_condition(exports)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

fn select_condition(value: &Value) -> Option<String> {
    match value {
        Value::String(target) => Some(target.clone()),
        Value::Object(map) => EXPORT_CONDITIONS
            .iter()
            .find_map(|condition| map.get(*condition).and_then(select_condition)),
        Value::Array(targets) => targets.iter().find_map(select_condition),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest(exports: Value) -> PackageManifest {
        PackageManifest {
            exports: Some(exports),
            ..Default::default()
        }
    }

    #[test]
    fn test_string_exports() {
        let m = manifest(json!("./dist/index.mjs"));
        assert_eq!(m.export_target("."), Some("./dist/index.mjs".into()));
        assert_eq!(m.export_target("./other"), None);
    }

    #[test]
    fn test_subpath_exports_with_conditions() {
        let m = manifest(json!({
            ".": { "require": "./index.cjs", "import": "./index.mjs" },
            "./fp": "./fp/index.js",
            "./nested": { "types": "./n.d.ts", "default": "./n.js" }
        }));
        assert_eq!(m.export_target("."), Some("./index.mjs".into()));
        assert_eq!(m.export_target("./fp"), Some("./fp/index.js".into()));
        assert_eq!(m.export_target("./nested"), Some("./n.js".into()));
        assert_eq!(m.export_target("./missing"), None);
    }

    #[test]
    fn test_root_conditions_object() {
        let m = manifest(json!({ "node": "./node.js", "default": "./browser.js" }));
        assert_eq!(m.export_target("."), Some("./node.js".into()));
        assert_eq!(m.export_target("./x"), None);
    }

    #[test]
    fn test_no_exports() {
        let m = PackageManifest::default();
        assert_eq!(m.export_target("."), None);
    }

    #[test]
    fn test_deserialize_ignores_unknown_fields() {
        let m: PackageManifest = serde_json::from_str(
            r#"{"name":"left-pad","version":"1.3.0","main":"index.js","license":"WTFPL"}"#,
        )
        .unwrap();
        assert_eq!(m.name.as_deref(), Some("left-pad"));
        assert_eq!(m.version.as_deref(), Some("1.3.0"));
        assert_eq!(m.main.as_deref(), Some("index.js"));
    }
}
