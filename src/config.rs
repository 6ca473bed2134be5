//! Settings for an importer.

use semver::Version;
use std::path::PathBuf;

/// Oldest npm whose `npx` understands `-y -p <pkg>`.
pub const MINIMUM_NPM_VERSION: Version = Version::new(8, 0, 0);

#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    /// Command used to run packages temporarily
    pub npx: String,
    /// Command used inside the npx environment to print PATH
    pub node: String,
    /// Directory local packages are resolved from (defaults to the current directory)
    pub working_dir: Option<PathBuf>,
    pub minimum_npm_version: Version,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            npx: "npx".to_string(),
            node: "node".to_string(),
            working_dir: None,
            minimum_npm_version: MINIMUM_NPM_VERSION,
        }
    }
}

impl ImportConfig {
    pub fn with_npx(mut self, npx: impl Into<String>) -> Self {
        self.npx = npx.into();
        self
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = node.into();
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_minimum_npm_version(mut self, version: Version) -> Self {
        self.minimum_npm_version = version;
        self
    }

    /// The command that reports the npx version.
    pub fn version_command(&self) -> String {
        format!("{} --version", self.npx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ImportConfig::default();
        assert_eq!(config.npx, "npx");
        assert_eq!(config.node, "node");
        assert_eq!(config.working_dir, None);
        assert_eq!(config.minimum_npm_version, Version::new(8, 0, 0));
        assert_eq!(config.version_command(), "npx --version");
    }

    #[test]
    fn test_builder_overrides() {
        let config = ImportConfig::default()
            .with_npx("/opt/node/bin/npx")
            .with_node("nodejs")
            .with_working_dir("/srv/app")
            .with_minimum_npm_version(Version::new(9, 0, 0));
        assert_eq!(config.version_command(), "/opt/node/bin/npx --version");
        assert_eq!(config.node, "nodejs");
        assert_eq!(config.working_dir, Some(PathBuf::from("/srv/app")));
        assert_eq!(config.minimum_npm_version.major, 9);
    }
}
