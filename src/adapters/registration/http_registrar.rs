use std::time::Duration;

use crate::core::errors::{KontrolError, Result};
use crate::core::models::registration::RegisterRequest;
use crate::core::traits::registrar::Registrar;

/// Default registration endpoint of a local authority.
pub const DEFAULT_REGISTRATION_URL: &str = "http://localhost:8080/regserv";

/// Timeout for the whole exchange with the authority.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Registers a host by POSTing JSON to the authority.
///
/// Request body: `{"hostname": "..."}`. The response body must be a JSON
/// string holding the credential.
pub struct HttpRegistrar {
    url: String,
    timeout: Duration,
}

impl HttpRegistrar {
    /// Create a registrar for `url`. `ws://` and `wss://` URLs are mapped to
    /// their HTTP equivalents.
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            url: normalize_url(url)?,
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn build_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(format!("kontrol/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| KontrolError::RegistrationFailed {
                reason: format!("Failed to create HTTP client: {e}"),
            })
    }
}

impl Registrar for HttpRegistrar {
    fn register(&self, request: &RegisterRequest) -> Result<String> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| KontrolError::RegistrationFailed {
                reason: format!("Failed to create async runtime: {e}"),
            })?;

        rt.block_on(async {
            let client = self.build_client()?;
            let resp = client
                .post(&self.url)
                .json(request)
                .send()
                .await
                .map_err(|e| KontrolError::RegistrationFailed {
                    reason: format!("Could not reach {}: {e}", self.url),
                })?;

            if !resp.status().is_success() {
                return Err(KontrolError::RegistrationFailed {
                    reason: format!("Authority returned status {}", resp.status()),
                });
            }

            let body = resp
                .text()
                .await
                .map_err(|e| KontrolError::RegistrationFailed {
                    reason: format!("Failed to read response: {e}"),
                })?;

            parse_credential(&body)
        })
    }
}

/// Parse the authority's response body into the credential string.
fn parse_credential(body: &str) -> Result<String> {
    serde_json::from_str::<String>(body).map_err(|e| KontrolError::MalformedAuthorityResponse {
        detail: format!("expected a JSON string: {e}"),
    })
}

fn normalize_url(url: &str) -> Result<String> {
    let url = url.trim();
    let mapped = if let Some(rest) = url.strip_prefix("ws://") {
        format!("http://{rest}")
    } else if let Some(rest) = url.strip_prefix("wss://") {
        format!("https://{rest}")
    } else if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        return Err(KontrolError::InvalidConfig {
            detail: format!(
                "Unsupported registration URL '{url}'. Use http(s):// or ws(s)://"
            ),
        });
    };
    Ok(mapped)
}
