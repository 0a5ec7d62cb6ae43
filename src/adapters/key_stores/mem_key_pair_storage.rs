use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::dual_index::{DualIndex, StorageMode};
use crate::core::errors::Result;
use crate::core::models::key_pair::KeyPair;
use crate::core::traits::key_pair_storage::KeyPairStorage;

/// In-memory key pair storage with two lookup paths: by id and by public key.
///
/// Both indexes sit behind one [`parking_lot::RwLock`], so an add or delete
/// is never observed half-applied and delete-by-id resolves and removes
/// under the same guard.
///
/// Cloning is cheap; all clones share the same indexes.
#[derive(Clone, Default)]
pub struct MemKeyPairStorage {
    index: Arc<RwLock<DualIndex>>,
    mode: StorageMode,
}

impl MemKeyPairStorage {
    /// Legacy-mode storage: overwritten ids keep their old public mapping.
    pub fn new() -> Self {
        Self::with_mode(StorageMode::Legacy)
    }

    /// Storage that removes stale public mappings on overwrite and delete.
    pub fn strict() -> Self {
        Self::with_mode(StorageMode::Strict)
    }

    pub fn with_mode(mode: StorageMode) -> Self {
        Self {
            index: Arc::new(RwLock::new(DualIndex::default())),
            mode,
        }
    }

    /// Number of entries in the id index.
    pub fn len(&self) -> usize {
        self.index.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Public keys that still resolve but no longer match the record under their id.
    pub fn stale_public_keys(&self) -> Vec<String> {
        self.index.read().stale_public_keys()
    }
}

impl KeyPairStorage for MemKeyPairStorage {
    fn add_key(&self, key_pair: &KeyPair) -> Result<()> {
        self.index.write().insert(key_pair, self.mode)?;
        debug!(id = %key_pair.id, public = %key_pair.public, "key pair added");
        Ok(())
    }

    fn add_key_if_absent(&self, key_pair: &KeyPair) -> Result<()> {
        self.index.write().insert_new(key_pair, self.mode)?;
        debug!(id = %key_pair.id, public = %key_pair.public, "key pair added");
        Ok(())
    }

    fn delete_key(&self, key_pair: &KeyPair) -> Result<()> {
        self.index.write().remove(key_pair, self.mode)?;
        debug!(id = %key_pair.id, "key pair deleted");
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

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::core::errors::{KontrolError, ValidationError};

    fn sample(id: &str, public: &str) -> KeyPair {
        KeyPair::new(id, public, format!("priv-{id}"))
    }

    fn assert_not_found<T: std::fmt::Debug>(result: Result<T>) {
        assert!(
            matches!(result, Err(KontrolError::KeyNotFound { .. })),
            "expected KeyNotFound, got {result:?}"
        );
    }

    #[test]
    fn add_then_get_by_either_key() {
        let store = MemKeyPairStorage::new();
        let kp = KeyPair::new("h1", "pub1", "priv1");

        store.add_key(&kp).unwrap();

        assert_eq!(store.get_key_from_id("h1").unwrap(), kp);
        assert_eq!(store.get_key_from_public("pub1").unwrap(), kp);
    }

    #[test]
    fn add_with_empty_field_leaves_store_unchanged() {
        let store = MemKeyPairStorage::new();
        let cases = [
            (KeyPair::new("", "pub1", "priv1"), ValidationError::EmptyId),
            (KeyPair::new("h1", "", "priv1"), ValidationError::EmptyPublic),
            (KeyPair::new("h1", "pub1", ""), ValidationError::EmptyPrivate),
        ];

        for (kp, expected) in cases {
            match store.add_key(&kp) {
                Err(KontrolError::Validation(err)) => assert_eq!(err, expected),
                other => panic!("expected validation error, got {other:?}"),
            }
        }

        assert!(store.is_empty());
        assert_not_found(store.get_key_from_id("h1"));
        assert_not_found(store.get_key_from_public("pub1"));
    }

    #[test]
    fn delete_with_public_removes_both_indexes() {
        let store = MemKeyPairStorage::new();
        let kp = sample("h1", "pub1");
        store.add_key(&kp).unwrap();

        store.delete_key(&kp).unwrap();

        assert_not_found(store.get_key_from_id("h1"));
        assert_not_found(store.get_key_from_public("pub1"));
    }

    #[test]
    fn delete_by_id_resolves_public_key() {
        let store = MemKeyPairStorage::new();
        store.add_key(&sample("h1", "pub1")).unwrap();

        store.delete_key(&KeyPair::from_id("h1")).unwrap();

        assert_not_found(store.get_key_from_id("h1"));
        assert_not_found(store.get_key_from_public("pub1"));
        assert_not_found(store.is_valid("pub1"));
    }

    #[test]
    fn delete_by_id_of_unknown_id_fails() {
        let store = MemKeyPairStorage::new();
        assert_not_found(store.delete_key(&KeyPair::from_id("ghost")));
    }

    #[test]
    fn is_valid_tracks_presence() {
        let store = MemKeyPairStorage::new();
        assert_not_found(store.is_valid("pub1"));

        store.add_key(&sample("h1", "pub1")).unwrap();
        assert!(store.is_valid("pub1").is_ok());

        store.delete_key(&sample("h1", "pub1")).unwrap();
        assert_not_found(store.is_valid("pub1"));
    }

    #[test]
    fn legacy_overwrite_keeps_old_public_mapping() {
        let store = MemKeyPairStorage::new();
        let first = sample("h1", "pub1");
        let second = sample("h1", "pub2");

        store.add_key(&first).unwrap();
        store.add_key(&second).unwrap();

        assert_eq!(store.get_key_from_id("h1").unwrap(), second);
        assert_eq!(store.get_key_from_public("pub2").unwrap(), second);
        // the old mapping is not cleaned up
        assert_eq!(store.get_key_from_public("pub1").unwrap(), first);
        assert!(store.is_valid("pub1").is_ok());
        assert_eq!(store.stale_public_keys(), vec!["pub1".to_string()]);

        store.delete_key(&KeyPair::from_id("h1")).unwrap();
        assert_not_found(store.get_key_from_public("pub2"));
        assert!(store.is_valid("pub1").is_ok());
    }

    #[test]
    fn strict_overwrite_drops_old_public_mapping() {
        let store = MemKeyPairStorage::strict();
        store.add_key(&sample("h1", "pub1")).unwrap();
        store.add_key(&sample("h1", "pub2")).unwrap();

        assert_not_found(store.get_key_from_public("pub1"));
        assert!(store.stale_public_keys().is_empty());
    }

    #[test]
    fn list_is_sorted_by_id() {
        let store = MemKeyPairStorage::new();
        store.add_key(&sample("h2", "pub2")).unwrap();
        store.add_key(&sample("h1", "pub1")).unwrap();

        let ids: Vec<String> = store.list().unwrap().into_iter().map(|k| k.id).collect();
        assert_eq!(ids, vec!["h1", "h2"]);
    }

    #[test]
    fn clones_share_state() {
        let store = MemKeyPairStorage::new();
        let other = store.clone();
        store.add_key(&sample("h1", "pub1")).unwrap();
        assert!(other.is_valid("pub1").is_ok());
    }

    #[test]
    fn concurrent_add_if_absent_admits_one_writer() {
        let store = MemKeyPairStorage::new();
        let handles: Vec<_> = (0..16)
            .map(|t| {
                let store = store.clone();
                thread::spawn(move || {
                    store
                        .add_key_if_absent(&KeyPair::new("h1", format!("pub-{t}"), "priv"))
                        .is_ok()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(store.len(), 1);
        assert!(store.stale_public_keys().is_empty());
    }

    #[test]
    fn concurrent_mutations_keep_indexes_consistent() {
        let store = MemKeyPairStorage::strict();
        let mut handles = Vec::new();

        for t in 0..8 {
            let store = store.clone();
            handles.push(thread::spawn(move || {
                for i in 0..200 {
                    let id = format!("h{}", i % 16);
                    let kp = KeyPair::new(id.clone(), format!("pub-{t}-{i}"), "priv");
                    store.add_key(&kp).unwrap();
                    let _ = store.get_key_from_public(&kp.public);
                    if i % 3 == 0 {
                        let _ = store.delete_key(&KeyPair::from_id(id));
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let index = store.index.read();
        assert_eq!(index.by_id.len(), index.by_public.len());
        for (id, kp) in &index.by_id {
            assert_eq!(&kp.id, id);
            assert_eq!(index.by_public.get(&kp.public), Some(kp));
        }
    }
}
