use crate::core::errors::Result;
use crate::core::models::key_pair::KeyPair;

/// Port for generating fresh key material on the authority side.
pub trait KeyIssuer: Send + Sync {
    /// Generate a new key pair identified by `id`.
    fn issue(&self, id: &str) -> Result<KeyPair>;

    /// Human-readable name of this issuer (e.g. "age").
    fn name(&self) -> &str;
}
