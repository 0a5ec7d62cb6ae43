use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dual_index::{DualIndex, StorageMode};
use crate::adapters::private_file::write_private;
use crate::core::errors::{KontrolError, Result};
use crate::core::models::key_pair::KeyPair;
use crate::core::traits::key_pair_storage::KeyPairStorage;

/// Current on-disk format of the registry file.
pub const REGISTRY_FORMAT_VERSION: u32 = 1;

/// File-based key pair storage that persists both indexes as JSON.
///
/// The file is read on open. Every mutation takes an exclusive advisory lock
/// on a sibling `<file>.lock`, reloads the registry from disk, applies the
/// change and rewrites the file before the lock is released, so processes
/// sharing one registry do not drop each other's writes. Lookups answer from
/// the copy loaded by the last open or mutation.
///
/// Both indexes are saved so a legacy-mode stale public mapping survives a
/// reload. The file holds private keys and is written owner-only (0600).
///
/// Example `keypairs.json`:
/// ```text
/// {
///   "format_version": 1,
///   "by_id": { "h1": { "id": "h1", "public": "age1...", "private": "AGE-SECRET-KEY-1..." } },
///   "by_public": { "age1...": { "id": "h1", "public": "age1...", "private": "AGE-SECRET-KEY-1..." } }
/// }
/// ```
pub struct FileKeyPairStorage {
    path: PathBuf,
    mode: StorageMode,
    index: RwLock<DualIndex>,
}

#[derive(Serialize, Deserialize)]
struct RegistryFile {
    format_version: u32,
    #[serde(flatten)]
    index: DualIndex,
}

impl FileKeyPairStorage {
    /// Open the registry at `path`. A missing file is an empty registry.
    pub fn open(path: PathBuf, mode: StorageMode) -> Result<Self> {
        let index = Self::load(&path)?;
        debug!(
            path = %path.display(),
            entries = index.by_id.len(),
            "registry loaded"
        );
        Ok(Self {
            path,
            mode,
            index: RwLock::new(index),
        })
    }

    /// Return the file path this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Public keys that still resolve but no longer match the record under their id.
    pub fn stale_public_keys(&self) -> Vec<String> {
        self.index.read().stale_public_keys()
    }

    /// Write the current registry to disk, creating the file if needed.
    pub fn flush(&self) -> Result<()> {
        self.mutate(|_| Ok(()))
    }

    fn load(path: &Path) -> Result<DualIndex> {
        if !path.exists() {
            return Ok(DualIndex::default());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(DualIndex::default());
        }

        let file: RegistryFile =
            serde_json::from_str(&content).map_err(|e| KontrolError::Corrupt {
                detail: format!("failed to parse {}: {e}", path.display()),
            })?;

        if file.format_version > REGISTRY_FORMAT_VERSION {
            return Err(KontrolError::FormatVersionTooNew {
                project_version: file.format_version,
                supported_version: REGISTRY_FORMAT_VERSION,
            });
        }

        file.index.check_integrity()?;
        Ok(file.index)
    }

    /// Write the registry to a sibling temp file, then rename it into place.
    fn save(&self, index: &DualIndex) -> Result<()> {
        let file = RegistryFile {
            format_version: REGISTRY_FORMAT_VERSION,
            index: index.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| KontrolError::Corrupt {
            detail: format!("failed to serialize registry: {e}"),
        })?;

        let tmp = self.sibling(".tmp");
        write_private(&tmp, (json + "\n").as_bytes())?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// `<registry file name><suffix>` in the registry's directory.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Take the cross-process registry lock. Released when the file drops.
    fn lock(&self) -> Result<File> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.sibling(".lock"))?;
        file.lock()?;
        Ok(file)
    }

    /// Reload the registry under the file lock, apply `op` to a copy and
    /// commit it only if saving works, so a failed write never leaves memory
    /// ahead of disk.
    fn mutate(&self, op: impl FnOnce(&mut DualIndex) -> Result<()>) -> Result<()> {
        let mut guard = self.index.write();
        let _lock = self.lock()?;

        *guard = Self::load(&self.path)?;
        let mut next = guard.clone();
        op(&mut next)?;
        self.save(&next)?;
        *guard = next;
        Ok(())
    }
}

impl KeyPairStorage for FileKeyPairStorage {
    fn add_key(&self, key_pair: &KeyPair) -> Result<()> {
        self.mutate(|index| index.insert(key_pair, self.mode))?;
        debug!(id = %key_pair.id, path = %self.path.display(), "key pair persisted");
        Ok(())
    }

    fn add_key_if_absent(&self, key_pair: &KeyPair) -> Result<()> {
        self.mutate(|index| index.insert_new(key_pair, self.mode))?;
        debug!(id = %key_pair.id, path = %self.path.display(), "key pair persisted");
        Ok(())
    }

    fn delete_key(&self, key_pair: &KeyPair) -> Result<()> {
        self.mutate(|index| index.remove(key_pair, self.mode))?;
        debug!(id = %key_pair.id, path = %self.path.display(), "key pair removed");
        Ok(())
    }

    fn get_key_from_id(&self, id: &str) -> Result<KeyPair> {
        self.index.read().get_by_id(id)
    }

    fn get_key_from_public(&self, public: &str) -> Result<KeyPair> {
        self.index.read().get_by_public(public)
    }

    fn list(&self) -> Result<Vec<KeyPair>> {
        Ok(self.index.read().list())
    }
}
