use serde::{Deserialize, Serialize};

/// Body sent to the authority when registering a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub hostname: String,
}
