// crates/informe-config/src/store.rs
// ============================================================================
// Module: Informe Pack Store
// Description: Load-once, read-only store of rule packs.
// Purpose: Provide the injected immutable configuration the runtime shares.
// Dependencies: crate::pack, informe-core
// ============================================================================

//! ## Overview
//! The pack store loads every pack under a root directory exactly once at
//! construction and is immutable afterwards. Concurrent generation requests
//! read packs by shared reference; no locking is needed because nothing is
//! ever written after `open` returns. This replaces hidden process-wide
//! memoization with an explicit store passed to components by reference.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use informe_core::PluginId;
use informe_core::RulePack;

use crate::pack::MANIFEST_FILE;
use crate::pack::PackError;
use crate::pack::load_pack;

// ============================================================================
// SECTION: Pack Store
// ============================================================================

/// Read-only store of loaded rule packs keyed by plugin id.
///
/// # Invariants
/// - Contents are fixed at `open` time; the store hands out shared
///   references only.
#[derive(Debug)]
pub struct PackStore {
    /// Root directory the packs were loaded from.
    root: PathBuf,
    /// Loaded packs keyed by plugin id.
    packs: BTreeMap<PluginId, RulePack>,
}

impl PackStore {
    /// Loads every pack directory under the given root.
    ///
    /// A subdirectory is a pack when it contains `manifest.yaml`;
    /// directories are visited in sorted order so load failures are
    /// reported deterministically.
    ///
    /// # Errors
    ///
    /// Returns [`PackError`] when the root cannot be read or any pack
    /// fails to load.
    pub fn open(root: &Path) -> Result<Self, PackError> {
        if !root.is_dir() {
            return Err(PackError::NotFound {
                path: root.display().to_string(),
            });
        }

        let mut pack_dirs = Vec::new();
        let entries = fs::read_dir(root).map_err(|err| PackError::Io {
            file: root.display().to_string(),
            detail: err.to_string(),
        })?;
        for entry in entries {
            let entry = entry.map_err(|err| PackError::Io {
                file: root.display().to_string(),
                detail: err.to_string(),
            })?;
            let path = entry.path();
            if path.is_dir() && path.join(MANIFEST_FILE).is_file() {
                pack_dirs.push(path);
            }
        }
        pack_dirs.sort();

        let mut packs = BTreeMap::new();
        for dir in pack_dirs {
            let pack = load_pack(&dir)?;
            packs.insert(pack.plugin_id.clone(), pack);
        }

        Ok(Self {
            root: root.to_path_buf(),
            packs,
        })
    }

    /// Returns the root directory the store was opened on.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Looks up a loaded pack by plugin id.
    #[must_use]
    pub fn get(&self, plugin_id: &PluginId) -> Option<&RulePack> {
        self.packs.get(plugin_id)
    }

    /// Returns loaded plugin ids in sorted order.
    #[must_use]
    pub fn plugin_ids(&self) -> Vec<&PluginId> {
        self.packs.keys().collect()
    }

    /// Returns the number of loaded packs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packs.len()
    }

    /// Returns whether the store holds no packs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }
}
