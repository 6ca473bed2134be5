//! Detection of the package manager used by the host project.
//!
//! Only used to phrase the "install this permanently" suggestion. Detection is
//! best effort, checked in this order:
//!
//! 1. `npm_config_user_agent` (e.g. "pnpm/8.6.0 npm/? node/v18.16.0")
//! 2. `npm_execpath`
//! 3. the path of the main executable
//! 4. npm

use log::debug;
use std::fmt;

use crate::runtime::Runtime;
use crate::specifier::PackageSpecifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageManager::Npm => write!(f, "npm"),
            PackageManager::Pnpm => write!(f, "pnpm"),
            PackageManager::Yarn => write!(f, "yarn"),
        }
    }
}

impl PackageManager {
    /// Detect the package manager from the environment.
    #[tracing::instrument(skip(runtime))]
    pub fn detect<R: Runtime + ?Sized>(runtime: &R) -> Self {
        let from_agent = runtime
            .env_var("npm_config_user_agent")
            .ok()
            .and_then(|agent| Self::from_user_agent(&agent));
        if let Some(pm) = from_agent {
            debug!("Detected {} from npm_config_user_agent", pm);
            return pm;
        }

        let from_exec_path = runtime
            .env_var("npm_execpath")
            .ok()
            .and_then(|exec_path| Self::from_exec_path(&exec_path));
        if let Some(pm) = from_exec_path {
            debug!("Detected {} from npm_execpath", pm);
            return pm;
        }

        let from_main_path = runtime
            .main_module_path()
            .and_then(|path| Self::from_main_path(&path.to_string_lossy()));
        if let Some(pm) = from_main_path {
            debug!("Detected {} from main module path", pm);
            return pm;
        }

        PackageManager::Npm
    }

    fn from_user_agent(agent: &str) -> Option<Self> {
        let tool = agent.split('/').next()?.trim();
        match tool {
            "pnpm" => Some(PackageManager::Pnpm),
            "yarn" => Some(PackageManager::Yarn),
            "npm" => Some(PackageManager::Npm),
            _ => None,
        }
    }

    fn from_exec_path(exec_path: &str) -> Option<Self> {
        if exec_path.contains("pnpm") {
            Some(PackageManager::Pnpm)
        } else if exec_path.contains("yarn") {
            Some(PackageManager::Yarn)
        } else {
            None
        }
    }

    fn from_main_path(path: &str) -> Option<Self> {
        let path = path.replace('\\', "/");
        if path.contains("/.pnpm/") || path.contains("/pnpm/") {
            Some(PackageManager::Pnpm)
        } else if path.contains("/.yarn/") || path.contains("/yarn/") {
            Some(PackageManager::Yarn)
        } else {
            None
        }
    }

    /// Command prefix that adds a dev dependency.
    pub fn add_dev_command(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm install --save-dev",
            PackageManager::Pnpm => "pnpm add -D",
            PackageManager::Yarn => "yarn add -D",
        }
    }

    /// A ready-to-paste command that installs `packages` permanently.
    pub fn install_instructions<'a>(
        &self,
        packages: impl IntoIterator<Item = &'a PackageSpecifier>,
    ) -> String {
        let specs = packages
            .into_iter()
            .map(|p| quote_for_shell(&p.install_spec()))
            .collect::<Vec<_>>();
        format!("{} {}", self.add_dev_command(), specs.join(" "))
    }
}

/// Characters that never need quoting in a `name@version` argument.
fn is_shell_safe(c: char) -> bool {
    // cmd treats '^' as its escape character
    c.is_ascii_alphanumeric() || "@/._~=+:,-".contains(c) || (c == '^' && !cfg!(windows))
}

/// Quote a single `name@version` argument if a shell would otherwise
/// interpret parts of it.
pub fn quote_for_shell(spec: &str) -> String {
    if !spec.is_empty() && spec.chars().all(is_shell_safe) {
        return spec.to_string();
    }
    if cfg!(windows) {
        format!("\"{}\"", spec.replace('"', "\"\""))
    } else {
        format!("'{}'", spec.replace('\'', r"'\''"))
    }
}
