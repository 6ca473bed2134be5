//! Temporary installation of packages through `npx`.
//!
//! - `version` - checks that the available npx is recent enough
//! - `temp` - installs a batch of packages and finds where npx put them

mod temp;
mod version;

pub use temp::{TEMP_DIR_PATTERNS, emit_path_command, find_install_dir, install_command};
pub use version::parse_tool_version;

use crate::config::ImportConfig;
use crate::package_manager::PackageManager;
use crate::runtime::Runtime;

/// Runs npx on behalf of an import.
pub struct Installer<'a, R: Runtime> {
    runtime: &'a R,
    config: &'a ImportConfig,
    package_manager: PackageManager,
}

impl<'a, R: Runtime> Installer<'a, R> {
    pub fn new(runtime: &'a R, config: &'a ImportConfig, package_manager: PackageManager) -> Self {
        Self {
            runtime,
            config,
            package_manager,
        }
    }
}
