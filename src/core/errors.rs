/// Field-level failures reported by `KeyPair::validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("KeyPair id field is empty")]
    EmptyId,

    #[error("KeyPair public field is empty")]
    EmptyPublic,

    #[error("KeyPair private field is empty")]
    EmptyPrivate,
}

/// All domain errors for Kontrol.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum KontrolError {
    #[error("Invalid key pair: {0}")]
    Validation(#[from] ValidationError),

    #[error(
        "Key '{key}' not found in registry\n\n  \
         Run 'kontrol keys list' to see registered key pairs."
    )]
    KeyNotFound { key: String },

    #[error(
        "Key pair '{id}' already exists in registry\n\n  \
         Updates are delete-then-add:\n    \
         → kontrol keys remove {id}\n    \
         → kontrol keys issue {id}"
    )]
    KeyAlreadyExists { id: String },

    #[error(
        "Registry is corrupt: {detail}\n\n  \
         The stored key pairs could not be read back safely.\n  \
         Restore the registry file from a backup or remove it to start empty."
    )]
    Corrupt { detail: String },

    #[error(
        "Registration failed: {reason}\n\n  \
         Check that the authority is reachable and the URL is correct:\n    \
         → kontrol register --to <url>"
    )]
    RegistrationFailed { reason: String },

    #[error("Authority returned a malformed response: {detail}")]
    MalformedAuthorityResponse { detail: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "This project uses format version {project_version}, but your Kontrol \
         only supports up to version {supported_version}."
    )]
    FormatVersionTooNew {
        project_version: u32,
        supported_version: u32,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl KontrolError {
    /// True for errors a caller may expect during normal operation
    /// (bad input, missing entry), false for state that needs attention.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            KontrolError::Validation(_)
                | KontrolError::KeyNotFound { .. }
                | KontrolError::KeyAlreadyExists { .. }
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, KontrolError>;
