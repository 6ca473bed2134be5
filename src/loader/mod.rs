//! Module loading and path resolution.
//!
//! [`ModuleLoader`] is the seam between the import engine and the thing that
//! actually loads packages. [`NodeModuleLoader`] resolves packages the way
//! Node does, by searching `node_modules` directories upwards from a base
//! directory.

mod manifest;

use anyhow::{Result, anyhow};
use log::debug;
use std::path::{Path, PathBuf};

pub use manifest::PackageManifest;

use crate::runtime::Runtime;

/// Extensions tried, in order, for an extensionless file reference.
const FILE_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "json"];

/// A loaded package module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// What was loaded: package name plus optional subpath
    pub specifier: String,
    /// Root directory of the package
    pub package_dir: PathBuf,
    /// The file the specifier resolved to
    pub entry: PathBuf,
    /// Version from the package manifest, if it declares one
    pub version: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
pub trait ModuleLoader: Send + Sync {
    /// Load `specifier` (name plus optional subpath, no version) as seen from `base`.
    fn load(&self, specifier: &str, base: &Path) -> Result<Module>;

    /// Absolute path of the file `specifier` resolves to from `base`.
    fn resolve(&self, specifier: &str, base: &Path) -> Result<PathBuf>;
}

/// Resolves packages through `node_modules` directories on disk.
pub struct NodeModuleLoader<R: Runtime> {
    runtime: R,
}

impl<R: Runtime> NodeModuleLoader<R> {
    pub fn new(runtime: R) -> Self {
        Self { runtime }
    }

    /// Directories searched for `specifier` from `base`, nearest first.
    ///
    /// Directories that are themselves named `node_modules` are skipped, so a
    /// base of `/tmp/x/node_modules` searches `/tmp/x/node_modules` first.
    pub fn search_paths(base: &Path) -> Vec<PathBuf> {
        base.ancestors()
            .filter(|dir| dir.file_name().is_none_or(|name| name != "node_modules"))
            .map(|dir| dir.join("node_modules"))
            .collect()
    }

    fn find_package_dir(&self, name: &str, base: &Path) -> Option<PathBuf> {
        Self::search_paths(base)
            .into_iter()
            .map(|modules| modules.join(name))
            .find(|candidate| self.runtime.is_dir(candidate))
    }

    fn resolve_entry(
        &self,
        manifest: &PackageManifest,
        package_dir: &Path,
        subpath: &str,
    ) -> Option<PathBuf> {
        if subpath.is_empty() {
            if let Some(target) = manifest.export_target(".") {
                return self.resolve_file(&package_dir.join(target));
            }
            return manifest
                .main
                .as_ref()
                .and_then(|main| self.resolve_file(&package_dir.join(main)))
                .or_else(|| self.resolve_file(&package_dir.join("index.js")));
        }

        if let Some(target) = manifest.export_target(&format!("./{}", subpath)) {
            return self.resolve_file(&package_dir.join(target));
        }
        self.resolve_file(&package_dir.join(subpath))
    }

    fn resolve_file(&self, path: &Path) -> Option<PathBuf> {
        if self.runtime.is_file(path) {
            return Some(path.to_path_buf());
        }
        let with_extension = FILE_EXTENSIONS.iter().find_map(|ext| {
            let mut candidate = path.as_os_str().to_owned();
            candidate.push(".");
            candidate.push(ext);
            let candidate = PathBuf::from(candidate);
            self.runtime.is_file(&candidate).then_some(candidate)
        });
        if with_extension.is_some() {
            return with_extension;
        }
        let index = path.join("index.js");
        self.runtime.is_file(&index).then_some(index)
    }
}

/// Split "name/sub/path" or "@scope/name/sub/path" into name and subpath.
fn split_name(specifier: &str) -> (&str, &str) {
    let name_segments = if specifier.starts_with('@') { 2 } else { 1 };
    let mut end = 0;
    for (seen, (idx, _)) in specifier.match_indices('/').enumerate() {
        if seen + 1 == name_segments {
            end = idx;
            break;
        }
    }
    if end == 0 {
        (specifier, "")
    } else {
        (&specifier[..end], &specifier[end + 1..])
    }
}

impl<R: Runtime> ModuleLoader for NodeModuleLoader<R> {
    #[tracing::instrument(skip(self))]
    fn load(&self, specifier: &str, base: &Path) -> Result<Module> {
        let (name, subpath) = split_name(specifier);
        let package_dir = self.find_package_dir(name, base).ok_or_else(|| {
            anyhow!(
                "Cannot find package '{}' from {}",
                name,
                base.display()
            )
        })?;
        debug!("Found {} at {}", name, package_dir.display());

        let manifest = PackageManifest::load(&self.runtime, &package_dir)?;
        let entry = self
            .resolve_entry(&manifest, &package_dir, subpath)
            .ok_or_else(|| {
                anyhow!(
                    "Cannot find module '{}' in {}",
                    specifier,
                    package_dir.display()
                )
            })?;
        let entry = self.runtime.canonicalize(&entry)?;

        Ok(Module {
            specifier: specifier.to_string(),
            package_dir,
            entry,
            version: manifest.version,
        })
    }

    fn resolve(&self, specifier: &str, base: &Path) -> Result<PathBuf> {
        Ok(self.load(specifier, base)?.entry)
    }
}
