//! npx version gate.

use log::debug;
use semver::Version;

use super::Installer;
use crate::error::{ImportError, Result};
use crate::runtime::Runtime;

/// The line of `npx --version` output that carries the version.
///
/// Uses the last non-empty line, since some setups print notices first.
fn version_line(output: &str) -> Option<&str> {
    output.lines().rev().map(str::trim).find(|l| !l.is_empty())
}

/// Parse the version printed by `npx --version`.
pub fn parse_tool_version(output: &str) -> Option<Version> {
    let line = version_line(output)?;
    Version::parse(line.strip_prefix('v').unwrap_or(line)).ok()
}

impl<R: Runtime> Installer<'_, R> {
    /// Fail unless npx runs and reports at least the configured minimum version.
    #[tracing::instrument(skip(self))]
    pub async fn check_version(&self) -> Result<()> {
        let command = self.config.version_command();
        let output = match self.runtime.run_shell(&command).await {
            Ok(output) if output.success => output,
            Ok(output) => {
                return Err(ImportError::ToolUnavailable {
                    command,
                    output: output.failure_text(),
                });
            }
            Err(e) => {
                return Err(ImportError::ToolUnavailable {
                    command,
                    output: format!("{:#}", e),
                });
            }
        };

        let reported = version_line(&output.stdout).unwrap_or_default().to_string();
        let version =
            parse_tool_version(&reported).ok_or_else(|| ImportError::ToolUnavailable {
                command: command.clone(),
                output: format!("Unrecognized version output '{}'", output.stdout.trim()),
            })?;
        debug!("{} reported version {}", command, version);

        if version < self.config.minimum_npm_version {
            return Err(ImportError::ToolVersionTooOld {
                version: reported,
                command,
                minimum: self.config.minimum_npm_version.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportConfig;
    use crate::package_manager::PackageManager;
    use crate::runtime::{CommandOutput, MockRuntime};
    use mockall::predicate::eq;

    fn runtime_reporting(output: anyhow::Result<CommandOutput>) -> MockRuntime {
        let mut runtime = MockRuntime::new();
        let mut output = Some(output);
        runtime
            .expect_run_shell()
            .with(eq("npx --version"))
            .times(1)
            .returning(move |_| output.take().unwrap());
        runtime
    }

    #[test]
    fn test_parse_tool_version() {
        assert_eq!(parse_tool_version("10.2.4\n"), Some(Version::new(10, 2, 4)));
        assert_eq!(parse_tool_version("v8.0.0"), Some(Version::new(8, 0, 0)));
        assert_eq!(
            parse_tool_version("npm notice: update available\n9.1.0\n\n"),
            Some(Version::new(9, 1, 0))
        );
        assert_eq!(parse_tool_version("not a version"), None);
        assert_eq!(parse_tool_version(""), None);
    }

    #[tokio::test]
    async fn test_check_version_accepts_new_npm() {
        let runtime = runtime_reporting(Ok(CommandOutput::success("10.2.4\n")));
        let config = ImportConfig::default();
        let installer = Installer::new(&runtime, &config, PackageManager::Npm);
        installer.check_version().await.unwrap();
    }

    #[tokio::test]
    async fn test_check_version_accepts_exact_minimum() {
        let runtime = runtime_reporting(Ok(CommandOutput::success("8.0.0")));
        let config = ImportConfig::default();
        let installer = Installer::new(&runtime, &config, PackageManager::Npm);
        installer.check_version().await.unwrap();
    }

    #[tokio::test]
    async fn test_check_version_rejects_old_npm() {
        let runtime = runtime_reporting(Ok(CommandOutput::success("6.14.17\n")));
        let config = ImportConfig::default();
        let installer = Installer::new(&runtime, &config, PackageManager::Npm);

        let err = installer.check_version().await.unwrap_err();
        match &err {
            ImportError::ToolVersionTooOld {
                version, command, ..
            } => {
                assert_eq!(version, "6.14.17");
                assert_eq!(command, "npx --version");
            }
            other => panic!("Expected ToolVersionTooOld, got {:?}", other),
        }
        let msg = err.to_string();
        assert!(msg.contains("6.14.17"));
        assert!(msg.contains("npx --version"));
    }

    #[tokio::test]
    async fn test_check_version_too_old_reports_only_the_version_line() {
        let runtime = runtime_reporting(Ok(CommandOutput::success(
            "npm notice: new major version available\n7.24.2\n",
        )));
        let config = ImportConfig::default();
        let installer = Installer::new(&runtime, &config, PackageManager::Npm);

        match installer.check_version().await {
            Err(ImportError::ToolVersionTooOld { version, .. }) => assert_eq!(version, "7.24.2"),
            other => panic!("Expected ToolVersionTooOld, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_check_version_prerelease_is_too_old() {
        let runtime = runtime_reporting(Ok(CommandOutput::success("8.0.0-pre.1")));
        let config = ImportConfig::default();
        let installer = Installer::new(&runtime, &config, PackageManager::Npm);
        assert!(matches!(
            installer.check_version().await,
            Err(ImportError::ToolVersionTooOld { .. })
        ));
    }

    #[tokio::test]
    async fn test_check_version_command_failure() {
        let runtime = runtime_reporting(Ok(CommandOutput::failure(
            "",
            "sh: 1: npx: not found",
        )));
        let config = ImportConfig::default();
        let installer = Installer::new(&runtime, &config, PackageManager::Npm);

        let err = installer.check_version().await.unwrap_err();
        assert!(matches!(err, ImportError::ToolUnavailable { .. }));
        let msg = err.to_string();
        assert!(msg.contains("`npx --version`"));
        assert!(msg.contains("npx: not found"));
    }

    #[tokio::test]
    async fn test_check_version_spawn_failure() {
        let runtime = runtime_reporting(Err(anyhow::anyhow!("no shell")));
        let config = ImportConfig::default();
        let installer = Installer::new(&runtime, &config, PackageManager::Npm);

        let err = installer.check_version().await.unwrap_err();
        assert!(matches!(err, ImportError::ToolUnavailable { .. }));
        assert!(err.to_string().contains("no shell"));
    }

    #[tokio::test]
    async fn test_check_version_garbage_output() {
        let runtime = runtime_reporting(Ok(CommandOutput::success("command not understood")));
        let config = ImportConfig::default();
        let installer = Installer::new(&runtime, &config, PackageManager::Npm);

        let err = installer.check_version().await.unwrap_err();
        assert!(err.to_string().contains("command not understood"));
    }
}
