use crate::core::errors::Result;
use crate::core::models::registration::RegisterRequest;

/// Port for the request/response exchange with a remote authority.
pub trait Registrar {
    /// Submit the request and return the opaque credential the authority issued.
    fn register(&self, request: &RegisterRequest) -> Result<String>;
}

/// Port for the host's local credential (the kite key).
pub trait CredentialStore {
    /// Read the stored credential, `None` if this host was never registered.
    fn read(&self) -> Result<Option<String>>;

    /// Persist the credential, replacing any previous one.
    fn write(&self, credential: &str) -> Result<()>;
}
