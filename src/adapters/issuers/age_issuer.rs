use age::secrecy::ExposeSecret;

use crate::core::errors::{Result, ValidationError};
use crate::core::models::key_pair::KeyPair;
use crate::core::traits::key_issuer::KeyIssuer;

/// Issues X25519 key pairs through `age`.
///
/// The public half is the `age1...` recipient string, the private half the
/// `AGE-SECRET-KEY-1...` identity string.
#[derive(Debug, Default, Clone, Copy)]
pub struct AgeKeyIssuer;

impl AgeKeyIssuer {
    pub fn new() -> Self {
        Self
    }

    /// Derive the public key of an `AGE-SECRET-KEY-1...` string.
    pub fn public_key_of(private: &str) -> Option<String> {
        private
            .trim()
            .parse::<age::x25519::Identity>()
            .ok()
            .map(|identity| identity.to_public().to_string())
    }
}

impl KeyIssuer for AgeKeyIssuer {
    fn issue(&self, id: &str) -> Result<KeyPair> {
        if id.is_empty() {
            return Err(ValidationError::EmptyId.into());
        }

        let identity = age::x25519::Identity::generate();
        let public = identity.to_public().to_string();
        let private = identity.to_string().expose_secret().to_string();

        Ok(KeyPair::new(id, public, private))
    }

    fn name(&self) -> &str {
        "age"
    }
}
