//! Where each imported package was loaded from.
//!
//! The cache lives as long as the importer that owns it and only ever grows.
//! It is a memo for [`crate::NpxImporter::resolve_path`], so later path lookups
//! agree with the module an earlier import returned.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Source of an imported package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Found through normal resolution from the working directory
    Local,
    /// Installed by npx into this `node_modules` directory
    InstalledAt(PathBuf),
}

#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: Mutex<HashMap<String, Resolution>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record where `name` came from. The first recorded source for a name
    /// wins; returns false if the name was already known.
    pub fn record(&self, name: &str, resolution: Resolution) -> bool {
        let mut entries = self.lock();
        if entries.contains_key(name) {
            return false;
        }
        entries.insert(name.to_string(), resolution);
        true
    }

    pub fn get(&self, name: &str) -> Option<Resolution> {
        self.lock().get(name).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Resolution>> {
        // Entries are inserted whole, so a poisoned map is still consistent
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
