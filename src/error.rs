//! Error types for npx-import operations.
//!
//! Validation errors abort a call before anything is probed. Every failure
//! after the version gate starts is reported as a single
//! [`ImportError::OrchestrationFailed`] wrapping the underlying cause, so a
//! caller either gets every module it asked for or one error naming every
//! missing package.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    /// Relative paths and malformed specifiers.
    #[error("npx-import can only import packages, got '{specifier}': {reason}")]
    InvalidSpecifier { specifier: String, reason: String },

    #[error("'{name}' is a core module and is always available, there is nothing to npx-import")]
    CoreModuleNotImportable { name: String },

    #[error("Invalid package name '{name}': {}", .reasons.join("; "))]
    InvalidPackageName { name: String, reasons: Vec<String> },

    #[error(
        "npx-import cannot import the same package twice in one call, '{name}' was requested more than once"
    )]
    DuplicatePackageRequest { name: String },

    #[error("Couldn't execute `{command}`. Got:\n{output}")]
    ToolUnavailable { command: String, output: String },

    #[error("Require npm version {minimum}+. Got '{version}' when running `{command}`")]
    ToolVersionTooOld {
        version: String,
        command: String,
        minimum: String,
    },

    #[error("Failed installing {} using: {command}\n{output}", .packages.join(", "))]
    InstallFailed {
        packages: Vec<String>,
        command: String,
        output: String,
    },

    #[error(
        "Failed to find temporary install directory. Looking for paths matching {} in:\n{}",
        .patterns.iter().map(|p| format!("'{}'", p)).collect::<Vec<_>>().join(" or "),
        .candidates.join("\n")
    )]
    TempDirNotFound {
        patterns: Vec<String>,
        candidates: Vec<String>,
    },

    #[error(
        "Found npx temporary path '{}' but expected to find a node_modules directory in '..'",
        .path.display()
    )]
    UnexpectedInstallLayout { path: PathBuf },

    #[error("Installed '{specifier}' into {} but could not load it: {message}", .dir.display())]
    ImportFromInstallFailed {
        specifier: String,
        dir: PathBuf,
        message: String,
    },

    #[error(
        "npx-import failed for {}. Check the error message below and try running it manually: {suggestion}\n\n{source}",
        describe_packages(.packages)
    )]
    OrchestrationFailed {
        packages: Vec<String>,
        suggestion: String,
        source: Box<ImportError>,
    },

    #[error("You must call import for '{name}' before calling resolve_path")]
    ResolveBeforeImport { name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn describe_packages(packages: &[String]) -> String {
    let quoted = packages
        .iter()
        .map(|p| format!("'{}'", p))
        .collect::<Vec<_>>()
        .join(", ");
    if packages.len() == 1 {
        format!("package {}", quoted)
    } else {
        format!("packages {}", quoted)
    }
}

impl ImportError {
    /// True for errors raised while checking specifiers, before any probing.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ImportError::InvalidSpecifier { .. }
                | ImportError::CoreModuleNotImportable { .. }
                | ImportError::InvalidPackageName { .. }
                | ImportError::DuplicatePackageRequest { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_package_name_lists_every_reason() {
        let err = ImportError::InvalidPackageName {
            name: "Bad Name".into(),
            reasons: vec![
                "name can no longer contain capital letters".into(),
                "name can only contain URL-friendly characters".into(),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("'Bad Name'"));
        assert!(msg.contains("capital letters; name can only contain URL-friendly"));
    }

    #[test]
    fn tool_version_too_old_includes_version_and_command() {
        let err = ImportError::ToolVersionTooOld {
            version: "6.14.17".into(),
            command: "npx --version".into(),
            minimum: "8.0.0".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'6.14.17'"));
        assert!(msg.contains("`npx --version`"));
        assert!(msg.contains("8.0.0+"));
    }

    #[test]
    fn temp_dir_not_found_lists_candidates() {
        let err = ImportError::TempDirNotFound {
            patterns: vec!["/.npm/_npx/".into()],
            candidates: vec!["/usr/bin".into(), "/bin".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'/.npm/_npx/'"));
        assert!(msg.contains("/usr/bin\n/bin"));
    }

    #[test]
    fn orchestration_failed_embeds_cause_and_suggestion() {
        let err = ImportError::OrchestrationFailed {
            packages: vec!["left-pad".into()],
            suggestion: "pnpm add -D left-pad@latest".into(),
            source: Box::new(ImportError::InstallFailed {
                packages: vec!["left-pad".into()],
                command: "npx -y -p left-pad@latest".into(),
                output: "npm ERR! 404".into(),
            }),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("npx-import failed for package 'left-pad'."));
        assert!(msg.contains("pnpm add -D left-pad@latest"));
        assert!(msg.contains("npm ERR! 404"));
    }

    #[test]
    fn orchestration_failed_pluralizes_packages() {
        let err = ImportError::OrchestrationFailed {
            packages: vec!["a".into(), "b".into()],
            suggestion: "npm install --save-dev a@latest b@latest".into(),
            source: Box::new(ImportError::ToolUnavailable {
                command: "npx --version".into(),
                output: "not found".into(),
            }),
        };
        assert!(err.to_string().contains("packages 'a', 'b'"));
    }

    #[test]
    fn validation_classification() {
        assert!(
            ImportError::DuplicatePackageRequest { name: "a".into() }.is_validation()
        );
        assert!(!ImportError::ResolveBeforeImport { name: "a".into() }.is_validation());
    }
}
