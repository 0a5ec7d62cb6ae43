use crate::core::errors::Result;
use crate::core::models::key_pair::KeyPair;

/// Port for storing key pairs, reachable both by id and by public key.
///
/// Implementations live in `adapters::key_stores` (e.g. MemKeyPairStorage,
/// FileKeyPairStorage). Callers only depend on this trait.
pub trait KeyPairStorage: Send + Sync {
    /// Validate and store the key pair under both its id and its public key.
    /// An existing entry with the same id is overwritten.
    fn add_key(&self, key_pair: &KeyPair) -> Result<()>;

    /// Validate and store the key pair only if its id is not taken yet,
    /// failing with `KeyAlreadyExists` otherwise. The check and the insert
    /// happen under one guard.
    fn add_key_if_absent(&self, key_pair: &KeyPair) -> Result<()>;

    /// Delete the key pair with the given id. When `public` is empty it is
    /// resolved from the id index first, failing with `KeyNotFound` if the
    /// id is unknown.
    fn delete_key(&self, key_pair: &KeyPair) -> Result<()>;

    /// Look up a key pair by id.
    fn get_key_from_id(&self, id: &str) -> Result<KeyPair>;

    /// Look up a key pair by public key.
    fn get_key_from_public(&self, public: &str) -> Result<KeyPair>;

    /// All key pairs reachable through the id index, sorted by id.
    fn list(&self) -> Result<Vec<KeyPair>>;

    /// A known public key returns `Ok(())`; otherwise the lookup error.
    fn is_valid(&self, public: &str) -> Result<()> {
        self.get_key_from_public(public).map(|_| ())
    }
}
