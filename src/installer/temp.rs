//! Batch installation into npx's temporary cache.
//!
//! npx installs the requested packages into a cache directory and puts its
//! `node_modules/.bin` on the PATH of the command it runs. Running a command
//! that prints PATH therefore tells us where the packages ended up.

use log::{debug, info};
use std::path::{Path, PathBuf};

use super::Installer;
use crate::error::{ImportError, Result};
use crate::logger::Logger;
use crate::package_manager::quote_for_shell;
use crate::runtime::{PATH_LIST_SEPARATOR, Runtime};
use crate::specifier::PackageSpecifier;

/// Path fragments that identify npx's temporary install cache.
pub const TEMP_DIR_PATTERNS: &[&str] = &["/.npm/_npx/", "\\npm-cache\\_npx\\"];

/// Command, run inside the npx environment, that prints PATH.
pub fn emit_path_command(node: &str) -> String {
    if cfg!(windows) {
        format!("{} -e \"console.log(process.env.PATH)\"", node)
    } else {
        format!("{} -e 'console.log(process.env.PATH)'", node)
    }
}

/// `npx -y -p a@1 -p b@latest`, in the order given.
pub fn install_command(npx: &str, packages: &[&PackageSpecifier]) -> String {
    let mut command = format!("{} -y", npx);
    for package in packages {
        command.push_str(" -p ");
        command.push_str(&quote_for_shell(&package.install_spec()));
    }
    command
}

/// Find the `node_modules` directory npx installed into from the PATH it printed.
pub fn find_install_dir(path_output: &str) -> Result<PathBuf> {
    // Only the last line is PATH, anything before it came from the packages
    let path_line = path_output
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();

    let candidates: Vec<&str> = path_line
        .split(PATH_LIST_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect();

    let temp_path = candidates
        .iter()
        .find(|segment| TEMP_DIR_PATTERNS.iter().any(|p| segment.contains(p)))
        .ok_or_else(|| ImportError::TempDirNotFound {
            patterns: TEMP_DIR_PATTERNS.iter().map(|p| p.to_string()).collect(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
        })?;
    debug!("npx temporary path: {}", temp_path);

    let temp_path = Path::new(temp_path);
    match temp_path.parent() {
        Some(dir) if dir.file_name().is_some_and(|name| name == "node_modules") => {
            Ok(dir.to_path_buf())
        }
        _ => Err(ImportError::UnexpectedInstallLayout {
            path: temp_path.to_path_buf(),
        }),
    }
}

impl<R: Runtime> Installer<'_, R> {
    /// Install every package in one npx invocation and return the directory
    /// they were installed into.
    #[tracing::instrument(skip(self, packages, logger))]
    pub async fn install(
        &self,
        packages: &[&PackageSpecifier],
        logger: &dyn Logger,
    ) -> Result<PathBuf> {
        let install = install_command(&self.config.npx, packages);
        logger.log(&format!("Installing... ({})", install));

        let full_command = format!("{} {}", install, emit_path_command(&self.config.node));
        let failed = |output: String| ImportError::InstallFailed {
            packages: packages.iter().map(|p| p.name.clone()).collect(),
            command: install.clone(),
            output,
        };

        let output = match self.runtime.run_shell(&full_command).await {
            Ok(output) if output.success => output,
            Ok(output) => return Err(failed(output.failure_text())),
            Err(e) => return Err(failed(format!("{:#}", e))),
        };

        let install_dir = find_install_dir(&output.stdout)?;
        info!("Installed {} package(s) into {}", packages.len(), install_dir.display());

        logger.log(&format!("Installed into {}.", install_dir.display()));
        logger.log(&format!(
            "To skip this step in future, run: {}",
            self.package_manager.install_instructions(packages.iter().copied())
        ));
        Ok(install_dir)
    }
}
