use tracing::{info, warn};

use crate::core::errors::{KontrolError, Result};
use crate::core::models::registration::RegisterRequest;
use crate::core::traits::registrar::{CredentialStore, Registrar};

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub credential: String,
    /// True if an earlier credential was replaced.
    pub replaced: bool,
}

/// Registers this host with an authority and stores the returned credential.
pub struct RegistrationService<R: Registrar, C: CredentialStore> {
    pub registrar: R,
    pub credentials: C,
}

impl<R: Registrar, C: CredentialStore> RegistrationService<R, C> {
    /// Run the exchange for `hostname`. An unreadable existing credential is
    /// replaced; any later error aborts the flow and nothing is written.
    pub fn register(&self, hostname: &str) -> Result<Registration> {
        if hostname.trim().is_empty() {
            return Err(KontrolError::InvalidConfig {
                detail: "hostname is empty".into(),
            });
        }

        let replaced = match self.credentials.read() {
            Ok(Some(_)) => {
                warn!("Already registered. Registering again...");
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "Existing kite key is unreadable. Registering again...");
                true
            }
        };

        let request = RegisterRequest {
            hostname: hostname.to_string(),
        };
        let credential = self.registrar.register(&request)?;
        if credential.trim().is_empty() {
            return Err(KontrolError::MalformedAuthorityResponse {
                detail: "empty credential".into(),
            });
        }

        self.credentials.write(&credential)?;
        info!(hostname, "registered with authority");

        Ok(Registration {
            credential,
            replaced,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct FakeRegistrar {
        response: Result<String>,
        seen: RefCell<Vec<RegisterRequest>>,
    }

    impl FakeRegistrar {
        fn answering(credential: &str) -> Self {
            Self {
                response: Ok(credential.to_string()),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err(KontrolError::RegistrationFailed {
                    reason: "connection refused".into(),
                }),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Registrar for FakeRegistrar {
        fn register(&self, request: &RegisterRequest) -> Result<String> {
            self.seen.borrow_mut().push(request.clone());
            match &self.response {
                Ok(c) => Ok(c.clone()),
                Err(e) => Err(KontrolError::RegistrationFailed {
                    reason: e.to_string(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct MemCredentials {
        stored: RefCell<Option<String>>,
    }

    impl CredentialStore for MemCredentials {
        fn read(&self) -> Result<Option<String>> {
            Ok(self.stored.borrow().clone())
        }

        fn write(&self, credential: &str) -> Result<()> {
            *self.stored.borrow_mut() = Some(credential.to_string());
            Ok(())
        }
    }

    #[test]
    fn register_sends_hostname_and_stores_credential() {
        let svc = RegistrationService {
            registrar: FakeRegistrar::answering("token-1"),
            credentials: MemCredentials::default(),
        };

        let reg = svc.register("host-a").unwrap();

        assert_eq!(reg.credential, "token-1");
        assert!(!reg.replaced);
        assert_eq!(svc.registrar.seen.borrow()[0].hostname, "host-a");
        assert_eq!(svc.credentials.read().unwrap().as_deref(), Some("token-1"));
    }

    #[test]
    fn register_again_replaces_credential() {
        let svc = RegistrationService {
            registrar: FakeRegistrar::answering("token-2"),
            credentials: MemCredentials::default(),
        };
        svc.credentials.write("token-1").unwrap();

        let reg = svc.register("host-a").unwrap();

        assert!(reg.replaced);
        assert_eq!(svc.credentials.read().unwrap().as_deref(), Some("token-2"));
    }

    #[test]
    fn unreadable_kite_key_is_replaced() {
        use crate::adapters::registration::kite_key_file::KiteKeyFile;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kite.key");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let svc = RegistrationService {
            registrar: FakeRegistrar::answering("token-new"),
            credentials: KiteKeyFile::new(path),
        };
        assert!(svc.credentials.read().is_err());

        let reg = svc.register("host-a").unwrap();

        assert!(reg.replaced);
        assert_eq!(
            svc.credentials.read().unwrap().as_deref(),
            Some("token-new")
        );
    }

    #[test]
    fn transport_failure_writes_nothing() {
        let svc = RegistrationService {
            registrar: FakeRegistrar::failing(),
            credentials: MemCredentials::default(),
        };

        let result = svc.register("host-a");

        assert!(matches!(result, Err(KontrolError::RegistrationFailed { .. })));
        assert_eq!(svc.credentials.read().unwrap(), None);
    }

    #[test]
    fn empty_credential_is_malformed() {
        let svc = RegistrationService {
            registrar: FakeRegistrar::answering("  "),
            credentials: MemCredentials::default(),
        };

        let result = svc.register("host-a");

        assert!(matches!(
            result,
            Err(KontrolError::MalformedAuthorityResponse { .. })
        ));
        assert_eq!(svc.credentials.read().unwrap(), None);
    }

    #[test]
    fn empty_hostname_is_rejected_before_dialing() {
        let svc = RegistrationService {
            registrar: FakeRegistrar::answering("token"),
            credentials: MemCredentials::default(),
        };

        assert!(svc.register("").is_err());
        assert!(svc.registrar.seen.borrow().is_empty());
    }
}
