use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::errors::{KontrolError, Result};
use crate::core::models::key_pair::KeyPair;

/// How overwrites and deletes treat public-key mappings that no longer
/// belong to the record stored under their id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Overwriting an id with a new public key leaves the old public
    /// mapping in place. It stays valid until deleted explicitly.
    #[default]
    Legacy,
    /// Stale public mappings are removed on overwrite and on delete.
    Strict,
}

/// The two lookup paths onto one logical set of key pairs.
///
/// Both maps are owned by one value so a single lock guards every
/// composite mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualIndex {
    pub by_id: HashMap<String, KeyPair>,
    pub by_public: HashMap<String, KeyPair>,
}

impl DualIndex {
    /// Validate and store `key_pair` under its id and its public key.
    pub fn insert(&mut self, key_pair: &KeyPair, mode: StorageMode) -> Result<()> {
        key_pair.validate()?;

        if mode == StorageMode::Strict {
            self.evict_conflicts(key_pair);
        }

        self.by_id.insert(key_pair.id.clone(), key_pair.clone());
        self.by_public
            .insert(key_pair.public.clone(), key_pair.clone());
        Ok(())
    }

    /// Like [`insert`](Self::insert), but fails with `KeyAlreadyExists` when
    /// the id is already taken.
    pub fn insert_new(&mut self, key_pair: &KeyPair, mode: StorageMode) -> Result<()> {
        key_pair.validate()?;
        if self.by_id.contains_key(&key_pair.id) {
            return Err(KontrolError::KeyAlreadyExists {
                id: key_pair.id.clone(),
            });
        }
        self.insert(key_pair, mode)
    }

    /// Remove the entry for `request.id`, resolving its public key from the
    /// id index when the request does not carry one.
    pub fn remove(&mut self, request: &KeyPair, mode: StorageMode) -> Result<()> {
        if request.public.is_empty() {
            let current = self
                .by_id
                .get(&request.id)
                .ok_or_else(|| KontrolError::KeyNotFound {
                    key: request.id.clone(),
                })?;
            let public = current.public.clone();
            self.by_public.remove(&public);
        } else {
            self.by_public.remove(&request.public);
            if mode == StorageMode::Strict {
                self.remove_public_owned_by(&request.id);
            }
        }

        self.by_id.remove(&request.id);
        Ok(())
    }

    pub fn get_by_id(&self, id: &str) -> Result<KeyPair> {
        self.by_id
            .get(id)
            .cloned()
            .ok_or_else(|| KontrolError::KeyNotFound { key: id.to_string() })
    }

    pub fn get_by_public(&self, public: &str) -> Result<KeyPair> {
        self.by_public
            .get(public)
            .cloned()
            .ok_or_else(|| KontrolError::KeyNotFound {
                key: public.to_string(),
            })
    }

    /// Records of the id index, sorted by id.
    pub fn list(&self) -> Vec<KeyPair> {
        let mut all: Vec<KeyPair> = self.by_id.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Public keys whose record is no longer the one stored under its id.
    pub fn stale_public_keys(&self) -> Vec<String> {
        let mut stale: Vec<String> = self
            .by_public
            .iter()
            .filter(|(public, kp)| {
                self.by_id
                    .get(&kp.id)
                    .is_none_or(|current| &current.public != *public)
            })
            .map(|(public, _)| public.clone())
            .collect();
        stale.sort();
        stale
    }

    /// Check that every stored record is keyed under its own id and public
    /// key and is structurally valid.
    pub fn check_integrity(&self) -> Result<()> {
        for (id, kp) in &self.by_id {
            kp.validate().map_err(|e| KontrolError::Corrupt {
                detail: format!("record under id '{id}': {e}"),
            })?;
            if &kp.id != id {
                return Err(KontrolError::Corrupt {
                    detail: format!("record '{}' is indexed under id '{id}'", kp.id),
                });
            }
        }
        for (public, kp) in &self.by_public {
            kp.validate().map_err(|e| KontrolError::Corrupt {
                detail: format!("record under public key '{public}': {e}"),
            })?;
            if &kp.public != public {
                return Err(KontrolError::Corrupt {
                    detail: format!(
                        "record '{}' is indexed under public key '{public}'",
                        kp.id
                    ),
                });
            }
        }
        Ok(())
    }

    /// Strict mode: drop mappings that would go stale once `incoming` lands.
    fn evict_conflicts(&mut self, incoming: &KeyPair) {
        if let Some(previous) = self.by_id.get(&incoming.id)
            && previous.public != incoming.public
        {
            let old_public = previous.public.clone();
            if self
                .by_public
                .get(&old_public)
                .is_some_and(|kp| kp.id == incoming.id)
            {
                self.by_public.remove(&old_public);
            }
        }

        if let Some(holder) = self.by_public.get(&incoming.public)
            && holder.id != incoming.id
        {
            let other_id = holder.id.clone();
            if self
                .by_id
                .get(&other_id)
                .is_some_and(|kp| kp.public == incoming.public)
            {
                self.by_id.remove(&other_id);
            }
        }
    }

    fn remove_public_owned_by(&mut self, id: &str) {
        if let Some(current) = self.by_id.get(id) {
            let public = current.public.clone();
            if self.by_public.get(&public).is_some_and(|kp| kp.id == id) {
                self.by_public.remove(&public);
            }
        }
    }
}
