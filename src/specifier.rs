//! Package specifier parsing and validation.
//!
//! Format: `name`, `name@tag`, `name@version/sub/path`, with `name` optionally
//! scoped (`@scope/name`).

use std::fmt;
use std::str::FromStr;

use crate::error::{ImportError, Result};

/// Version used when a specifier carries none.
pub const DEFAULT_TAG: &str = "latest";

const MAX_NAME_LENGTH: usize = 214;

const BLACKLISTED_NAMES: &[&str] = &["node_modules", "favicon.ico"];

/// Modules that ship with Node itself.
pub const BUILTIN_MODULES: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// A validated package specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpecifier {
    /// Package name, possibly scoped (e.g. "@scope/name")
    pub name: String,
    /// Version, range or dist-tag (defaults to "latest")
    pub version: String,
    /// Path inside the package, without a leading slash (may be empty)
    pub subpath: String,
}

impl PackageSpecifier {
    /// Parse and validate a raw specifier.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.starts_with('.') || raw.starts_with('/') {
            return Err(ImportError::InvalidSpecifier {
                specifier: raw.to_string(),
                reason: "relative paths cannot be imported".to_string(),
            });
        }

        let spec = split_specifier(raw).ok_or_else(|| ImportError::InvalidSpecifier {
            specifier: raw.to_string(),
            reason: "expected 'name', 'name@version' or 'name@version/sub/path'".to_string(),
        })?;

        check_name(&spec.name)?;
        Ok(spec)
    }

    /// Name plus subpath, without the version. This is what gets loaded.
    pub fn package_with_path(&self) -> String {
        if self.subpath.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.name, self.subpath)
        }
    }

    /// `name@version`, as passed to an installer.
    pub fn install_spec(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

impl fmt::Display for PackageSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)?;
        if !self.subpath.is_empty() {
            write!(f, "/{}", self.subpath)?;
        }
        Ok(())
    }
}

impl FromStr for PackageSpecifier {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn split_specifier(raw: &str) -> Option<PackageSpecifier> {
    // A scoped name keeps its first '/' and ends at the next '@' or '/'
    let name_start = if raw.starts_with('@') {
        let slash = raw.find('/')?;
        if slash == 1 {
            return None;
        }
        slash + 1
    } else {
        0
    };

    let name_len = raw[name_start..]
        .find(['@', '/'])
        .unwrap_or(raw.len() - name_start);
    if name_len == 0 {
        return None;
    }
    let name_end = name_start + name_len;
    let name = &raw[..name_end];
    let rest = &raw[name_end..];

    let (version, subpath) = match rest.strip_prefix('@') {
        Some(after_at) => {
            let (version, subpath) = match after_at.find('/') {
                Some(slash) => (&after_at[..slash], &after_at[slash + 1..]),
                None => (after_at, ""),
            };
            if version.is_empty() {
                return None;
            }
            (version, subpath)
        }
        None => (DEFAULT_TAG, rest.strip_prefix('/').unwrap_or(rest)),
    };

    Some(PackageSpecifier {
        name: name.to_string(),
        version: version.to_string(),
        subpath: subpath.trim_end_matches('/').to_string(),
    })
}

/// Outcome of checking a name against npm's package naming rules.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NameValidation {
    /// Problems that make the name unusable for any package
    pub errors: Vec<String>,
    /// Problems that only old, grandfathered packages may have
    pub warnings: Vec<String>,
    pub is_core_module: bool,
}

impl NameValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Check a package name against npm's rules for new packages.
pub fn validate_name(name: &str) -> NameValidation {
    let mut result = NameValidation::default();

    if name.is_empty() {
        result.errors.push("name length must be greater than zero".into());
        return result;
    }
    if name.starts_with('.') {
        result.errors.push("name cannot start with a period".into());
    }
    if name.starts_with('_') {
        result.errors.push("name cannot start with an underscore".into());
    }
    if name.trim() != name {
        result
            .errors
            .push("name cannot contain leading or trailing spaces".into());
    }
    let lower = name.to_lowercase();
    if BLACKLISTED_NAMES.contains(&lower.as_str()) {
        result.errors.push(format!("{} is a blacklisted name", lower));
    }

    if let Some(module) = name.strip_prefix("node:") {
        result.is_core_module = true;
        result.warnings.push(format!("{} is a core module name", module));
    } else if BUILTIN_MODULES.contains(&lower.as_str()) {
        result.is_core_module = true;
        result.warnings.push(format!("{} is a core module name", name));
    }
    if name.len() > MAX_NAME_LENGTH {
        result.warnings.push(format!(
            "name can no longer contain more than {} characters",
            MAX_NAME_LENGTH
        ));
    }
    if lower != name {
        result
            .warnings
            .push("name can no longer contain capital letters".into());
    }
    let last_segment = name.rsplit('/').next().unwrap_or(name);
    if last_segment.contains(['~', '\'', '!', '(', ')', '*']) {
        result
            .warnings
            .push("name can no longer contain special characters (\"~'!()*\")".into());
    }

    if !result.is_core_module && !is_url_friendly_name(name) {
        result
            .errors
            .push("name can only contain URL-friendly characters".into());
    }

    result
}

fn is_url_friendly_name(name: &str) -> bool {
    let (scope, package) = match name.strip_prefix('@') {
        Some(scoped) => match scoped.split_once('/') {
            Some((scope, package)) => (Some(scope), package),
            None => return false,
        },
        None => (None, name),
    };
    scope.is_none_or(|s| !s.is_empty() && is_url_safe(s)) && !package.is_empty() && is_url_safe(package)
}

// Characters left untouched by JavaScript's encodeURIComponent
fn is_url_safe(segment: &str) -> bool {
    segment.chars().all(|c| {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '!' | '~' | '*' | '\'' | '(' | ')')
    })
}

fn check_name(name: &str) -> Result<()> {
    let validation = validate_name(name);
    if validation.is_valid() {
        return Ok(());
    }
    if validation.is_core_module {
        return Err(ImportError::CoreModuleNotImportable {
            name: name.to_string(),
        });
    }
    let mut reasons = validation.errors;
    reasons.extend(validation.warnings);
    Err(ImportError::InvalidPackageName {
        name: name.to_string(),
        reasons,
    })
}
