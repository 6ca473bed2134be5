//! Import npm packages on demand.
//!
//! Packages that can already be resolved from the working directory are used
//! as-is. Missing ones are installed in a single `npx` call into npx's
//! temporary cache and loaded from there.

pub mod cache;
pub mod config;
pub mod error;
pub mod importer;
pub mod installer;
pub mod loader;
pub mod logger;
pub mod package_manager;
pub mod runtime;
pub mod specifier;

pub use cache::{Resolution, ResolutionCache};
pub use config::ImportConfig;
pub use error::{ImportError, Result};
pub use importer::{Imported, NpxImporter, Specifiers};
pub use loader::{Module, ModuleLoader, NodeModuleLoader};
pub use logger::{Logger, SilentLogger, StdoutLogger};
pub use package_manager::PackageManager;
pub use specifier::PackageSpecifier;
