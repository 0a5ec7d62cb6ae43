use tracing::{debug, info};

use crate::core::errors::Result;
use crate::core::models::key_pair::KeyPair;
use crate::core::traits::key_issuer::KeyIssuer;
use crate::core::traits::key_pair_storage::KeyPairStorage;

/// Authority-side management of registered key pairs through a
/// `KeyPairStorage` backend.
pub struct KeyPairService<S: KeyPairStorage> {
    pub storage: S,
}

impl<S: KeyPairStorage> KeyPairService<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Issue fresh key material for `id` and store it.
    ///
    /// Fails with `KeyAlreadyExists` if `id` is registered; updates are
    /// delete-then-add.
    pub fn issue<I: KeyIssuer + ?Sized>(&self, issuer: &I, id: &str) -> Result<KeyPair> {
        let key_pair = issuer.issue(id)?;
        self.storage.add_key_if_absent(&key_pair)?;
        info!(id, issuer = issuer.name(), "issued key pair");
        Ok(key_pair)
    }

    /// Store a key pair issued elsewhere.
    pub fn import(&self, key_pair: &KeyPair) -> Result<()> {
        self.storage.add_key_if_absent(key_pair)?;
        info!(id = %key_pair.id, "imported key pair");
        Ok(())
    }

    /// Remove the key pair registered under `id`.
    pub fn revoke(&self, id: &str) -> Result<()> {
        self.storage.delete_key(&KeyPair::from_id(id))?;
        info!(id, "revoked key pair");
        Ok(())
    }

    /// Remove the key pair under `id` using the caller's public key rather
    /// than resolving it from the id index.
    pub fn revoke_with_public(&self, id: &str, public: &str) -> Result<()> {
        let request = KeyPair {
            id: id.to_string(),
            public: public.to_string(),
            private: String::new(),
        };
        self.storage.delete_key(&request)?;
        info!(id, public, "revoked key pair");
        Ok(())
    }

    /// Check that `public` is known and return the id it belongs to.
    pub fn authenticate(&self, public: &str) -> Result<String> {
        self.storage.is_valid(public)?;
        let key_pair = self.storage.get_key_from_public(public)?;
        debug!(id = %key_pair.id, "public key authenticated");
        Ok(key_pair.id)
    }

    pub fn find_by_id(&self, id: &str) -> Result<KeyPair> {
        self.storage.get_key_from_id(id)
    }

    pub fn find_by_public(&self, public: &str) -> Result<KeyPair> {
        self.storage.get_key_from_public(public)
    }

    pub fn list(&self) -> Result<Vec<KeyPair>> {
        self.storage.list()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::adapters::issuers::age_issuer::AgeKeyIssuer;
    use crate::adapters::key_stores::mem_key_pair_storage::MemKeyPairStorage;
    use crate::core::errors::KontrolError;

    struct FixedIssuer;

    impl KeyIssuer for FixedIssuer {
        fn issue(&self, id: &str) -> Result<KeyPair> {
            Ok(KeyPair::new(id, format!("pub-{id}"), format!("priv-{id}")))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn service() -> KeyPairService<MemKeyPairStorage> {
        KeyPairService::new(MemKeyPairStorage::new())
    }

    #[test]
    fn issue_stores_key_pair() {
        let svc = service();
        let kp = svc.issue(&FixedIssuer, "h1").unwrap();

        assert_eq!(svc.find_by_id("h1").unwrap(), kp);
        assert_eq!(svc.authenticate("pub-h1").unwrap(), "h1");
    }

    #[test]
    fn issue_with_age_keys() {
        let svc = service();
        let kp = svc.issue(&AgeKeyIssuer::new(), "h1").unwrap();

        assert_eq!(svc.find_by_public(&kp.public).unwrap().id, "h1");
    }

    #[test]
    fn issue_for_registered_id_fails() {
        let svc = service();
        svc.issue(&FixedIssuer, "h1").unwrap();

        let result = svc.issue(&FixedIssuer, "h1");
        assert!(matches!(result, Err(KontrolError::KeyAlreadyExists { .. })));
    }

    #[test]
    fn concurrent_issue_for_one_id_has_one_winner() {
        let svc = Arc::new(service());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let svc = Arc::clone(&svc);
                thread::spawn(move || svc.issue(&AgeKeyIssuer::new(), "h1"))
            })
            .collect();

        let issued: Vec<KeyPair> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap().ok())
            .collect();

        assert_eq!(issued.len(), 1);
        assert_eq!(svc.find_by_id("h1").unwrap(), issued[0]);
        assert_eq!(svc.authenticate(&issued[0].public).unwrap(), "h1");
    }

    #[test]
    fn import_validates_first() {
        let svc = service();
        let result = svc.import(&KeyPair::new("h1", "pub1", ""));

        assert!(matches!(result, Err(KontrolError::Validation(_))));
        assert!(svc.list().unwrap().is_empty());
    }

    #[test]
    fn revoke_invalidates_public_key() {
        let svc = service();
        svc.import(&KeyPair::new("h1", "pub1", "priv1")).unwrap();

        svc.revoke("h1").unwrap();

        assert!(matches!(
            svc.authenticate("pub1"),
            Err(KontrolError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn revoke_with_public_removes_both_indexes() {
        let svc = service();
        svc.import(&KeyPair::new("h1", "pub1", "priv1")).unwrap();

        svc.revoke_with_public("h1", "pub1").unwrap();

        assert!(svc.find_by_id("h1").is_err());
        assert!(svc.find_by_public("pub1").is_err());
    }

    #[test]
    fn revoke_unknown_id_fails() {
        let svc = service();
        assert!(matches!(
            svc.revoke("ghost"),
            Err(KontrolError::KeyNotFound { .. })
        ));
    }
}
