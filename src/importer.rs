//! Import orchestration.
//!
//! An import validates every specifier, probes which packages can already be
//! loaded from the working directory, installs the rest with one npx call, and
//! loads them from npx's install directory.
//!
//! ```text
//! validate -> probe -> (all local) done
//!                   -> (some missing) version gate -> install -> load -> record
//! ```

use anyhow::anyhow;
use log::debug;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::cache::{Resolution, ResolutionCache};
use crate::config::ImportConfig;
use crate::error::{ImportError, Result};
use crate::installer::Installer;
use crate::loader::{Module, ModuleLoader, NodeModuleLoader};
use crate::logger::{Logger, StdoutLogger};
use crate::package_manager::PackageManager;
use crate::runtime::{RealRuntime, Runtime};
use crate::specifier::PackageSpecifier;

/// What an import was asked for: one specifier, or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Specifiers {
    One(String),
    Many(Vec<String>),
}

impl Specifiers {
    fn into_parts(self) -> (Vec<String>, bool) {
        match self {
            Specifiers::One(s) => (vec![s], true),
            Specifiers::Many(list) => (list, false),
        }
    }
}

impl From<&str> for Specifiers {
    fn from(s: &str) -> Self {
        Specifiers::One(s.to_string())
    }
}

impl From<String> for Specifiers {
    fn from(s: String) -> Self {
        Specifiers::One(s)
    }
}

impl From<Vec<String>> for Specifiers {
    fn from(list: Vec<String>) -> Self {
        Specifiers::Many(list)
    }
}

impl From<Vec<&str>> for Specifiers {
    fn from(list: Vec<&str>) -> Self {
        Specifiers::Many(list.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for Specifiers {
    fn from(list: &[&str]) -> Self {
        Specifiers::Many(list.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Specifiers {
    fn from(list: [&str; N]) -> Self {
        Specifiers::Many(list.iter().map(|s| s.to_string()).collect())
    }
}

/// Result of an import, shaped like the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imported {
    One(Module),
    Many(Vec<Module>),
}

impl Imported {
    /// The module of a single-specifier import.
    pub fn into_one(self) -> Option<Module> {
        match self {
            Imported::One(module) => Some(module),
            Imported::Many(_) => None,
        }
    }

    /// All modules, in request order.
    pub fn into_vec(self) -> Vec<Module> {
        match self {
            Imported::One(module) => vec![module],
            Imported::Many(modules) => modules,
        }
    }
}

/// Progress of one package through an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportState {
    /// Loaded from the working directory
    Local(Module),
    /// Loaded from npx's install directory
    Installed(Module),
    /// Not loadable locally, not installed yet
    Unresolved,
}

/// One package of an import call.
#[derive(Debug, Clone)]
pub struct PackageRequest {
    pub specifier: PackageSpecifier,
    pub state: ImportState,
}

impl PackageRequest {
    pub fn is_local(&self) -> bool {
        matches!(self.state, ImportState::Local(_))
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self.state, ImportState::Unresolved)
    }

    fn into_module(self) -> Option<Module> {
        match self.state {
            ImportState::Local(module) | ImportState::Installed(module) => Some(module),
            ImportState::Unresolved => None,
        }
    }
}

/// Parse and validate every specifier, rejecting repeated package names.
pub fn parse_requests(raw: &[String]) -> Result<Vec<PackageSpecifier>> {
    let mut seen = HashSet::new();
    let mut specs = Vec::with_capacity(raw.len());
    for s in raw {
        let spec = PackageSpecifier::parse(s)?;
        if !seen.insert(spec.name.clone()) {
            return Err(ImportError::DuplicatePackageRequest { name: spec.name });
        }
        specs.push(spec);
    }
    Ok(specs)
}

fn missing_summary(missing: &[&PackageSpecifier]) -> String {
    let names = missing
        .iter()
        .map(|p| p.package_with_path())
        .collect::<Vec<_>>();
    let subject = if names.len() == 1 {
        format!("Package {}", names[0])
    } else {
        format!("Packages {}", names.join(", "))
    };
    format!(
        "{} not available locally. Attempting to use npx to install temporarily.",
        subject
    )
}

/// Imports packages, installing missing ones temporarily through npx.
///
/// The importer owns the resolution cache used by [`NpxImporter::resolve_path`],
/// so keep one importer around for as long as paths need resolving.
pub struct NpxImporter<R: Runtime, L: ModuleLoader> {
    runtime: R,
    loader: L,
    config: ImportConfig,
    cache: ResolutionCache,
}

impl NpxImporter<RealRuntime, NodeModuleLoader<RealRuntime>> {
    /// An importer backed by the real system and Node's resolution rules.
    pub fn with_config(config: ImportConfig) -> Self {
        Self::new(RealRuntime, NodeModuleLoader::new(RealRuntime), config)
    }
}

impl Default for NpxImporter<RealRuntime, NodeModuleLoader<RealRuntime>> {
    fn default() -> Self {
        Self::with_config(ImportConfig::default())
    }
}

impl<R: Runtime, L: ModuleLoader> NpxImporter<R, L> {
    pub fn new(runtime: R, loader: L, config: ImportConfig) -> Self {
        Self {
            runtime,
            loader,
            config,
            cache: ResolutionCache::new(),
        }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    fn working_dir(&self) -> Result<PathBuf> {
        match &self.config.working_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(self.runtime.current_dir()?),
        }
    }

    /// Import packages, printing progress to stdout.
    pub async fn import(&self, specifiers: impl Into<Specifiers>) -> Result<Imported> {
        self.import_with_logger(specifiers, &StdoutLogger::default())
            .await
    }

    /// Import packages, sending progress messages to `logger`.
    ///
    /// Returns one module per specifier, in request order. Either every
    /// package is imported or the call fails as a whole.
    #[tracing::instrument(skip(self, specifiers, logger))]
    pub async fn import_with_logger(
        &self,
        specifiers: impl Into<Specifiers>,
        logger: &dyn Logger,
    ) -> Result<Imported> {
        let (raw, single) = specifiers.into().into_parts();
        let specs = parse_requests(&raw)?;
        let working_dir = self.working_dir()?;

        let mut requests = self.probe(specs, &working_dir);
        let missing: Vec<PackageSpecifier> = requests
            .iter()
            .filter(|r| r.is_unresolved())
            .map(|r| r.specifier.clone())
            .collect();

        if !missing.is_empty() {
            let missing: Vec<&PackageSpecifier> = missing.iter().collect();
            logger.log(&missing_summary(&missing));

            let package_manager = PackageManager::detect(&self.runtime);
            let (install_dir, modules) =
                match self.install_missing(&missing, package_manager, logger).await {
                    Ok(installed) => installed,
                    Err(source) => {
                        return Err(ImportError::OrchestrationFailed {
                            packages: missing.iter().map(|p| p.name.clone()).collect(),
                            suggestion: package_manager
                                .install_instructions(missing.iter().copied()),
                            source: Box::new(source),
                        });
                    }
                };

            let unresolved = requests.iter_mut().filter(|r| r.is_unresolved());
            for (request, module) in unresolved.zip(modules) {
                request.state = ImportState::Installed(module);
            }
            self.record(&requests, &install_dir);
        }

        let mut modules = Vec::with_capacity(requests.len());
        for request in requests {
            let name = request.specifier.name.clone();
            let module = request
                .into_module()
                .ok_or_else(|| anyhow!("Package '{}' was not imported", name))?;
            modules.push(module);
        }

        if single {
            let module = modules
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("Nothing was imported"))?;
            Ok(Imported::One(module))
        } else {
            Ok(Imported::Many(modules))
        }
    }

    /// Try loading each package from the working directory. Load failures
    /// only mean the package is missing.
    fn probe(&self, specs: Vec<PackageSpecifier>, working_dir: &Path) -> Vec<PackageRequest> {
        specs
            .into_iter()
            .map(|specifier| {
                let state = match self
                    .loader
                    .load(&specifier.package_with_path(), working_dir)
                {
                    Ok(module) => ImportState::Local(module),
                    Err(e) => {
                        debug!("{} is not available locally: {:#}", specifier, e);
                        ImportState::Unresolved
                    }
                };
                PackageRequest { specifier, state }
            })
            .collect()
    }

    async fn install_missing(
        &self,
        missing: &[&PackageSpecifier],
        package_manager: PackageManager,
        logger: &dyn Logger,
    ) -> Result<(PathBuf, Vec<Module>)> {
        let installer = Installer::new(&self.runtime, &self.config, package_manager);
        installer.check_version().await?;
        let install_dir = installer.install(missing, logger).await?;

        let modules = missing
            .iter()
            .map(|spec| {
                let specifier = spec.package_with_path();
                self.loader
                    .load(&specifier, &install_dir)
                    .map_err(|e| ImportError::ImportFromInstallFailed {
                        specifier,
                        dir: install_dir.clone(),
                        message: format!("{:#}", e),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((install_dir, modules))
    }

    // Calls where everything was already local never reach this, so their
    // packages stay unknown to resolve_path.
    fn record(&self, requests: &[PackageRequest], install_dir: &Path) {
        for request in requests {
            let resolution = if request.is_local() {
                Resolution::Local
            } else {
                Resolution::InstalledAt(install_dir.to_path_buf())
            };
            self.cache.record(&request.specifier.name, resolution);
        }
    }

    /// Path of the file `specifier` resolves to, from wherever an earlier
    /// import of the same package found it.
    #[tracing::instrument(skip(self))]
    pub fn resolve_path(&self, specifier: &str) -> Result<PathBuf> {
        let spec = PackageSpecifier::parse(specifier)?;
        let base = match self.cache.get(&spec.name) {
            Some(Resolution::Local) => self.working_dir()?,
            Some(Resolution::InstalledAt(dir)) => dir,
            None => {
                return Err(ImportError::ResolveBeforeImport { name: spec.name });
            }
        };
        Ok(self.loader.resolve(&spec.package_with_path(), &base)?)
    }
}
