use serde::{Deserialize, Serialize};

use crate::core::errors::ValidationError;

/// A registered host's credential: identifier plus public/private key material.
///
/// The private half never leaves the storage boundary, so `Debug` redacts it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyPair {
    /// Unique id of the key pair (usually the host or kite name).
    pub id: String,
    /// Used to validate tokens.
    pub public: String,
    /// Used to sign tokens.
    pub private: String,
}

impl KeyPair {
    pub fn new(
        id: impl Into<String>,
        public: impl Into<String>,
        private: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            public: public.into(),
            private: private.into(),
        }
    }

    /// A request carrying only the id, for delete-by-id.
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            public: String::new(),
            private: String::new(),
        }
    }

    /// Check that all three fields are present, in the order id, public, private.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if self.public.is_empty() {
            return Err(ValidationError::EmptyPublic);
        }
        if self.private.is_empty() {
            return Err(ValidationError::EmptyPrivate);
        }
        Ok(())
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("id", &self.id)
            .field("public", &self.public)
            .field("private", &"[redacted]")
            .finish()
    }
}

impl std::fmt::Display for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.public)
    }
}
