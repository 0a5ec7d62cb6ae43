use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::adapters::key_stores::dual_index::StorageMode;
use crate::adapters::registration::http_registrar::{DEFAULT_REGISTRATION_URL, DEFAULT_TIMEOUT};
use crate::core::errors::{KontrolError, Result};

/// Current format version supported by this build of Kontrol.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// Top-level configuration read from `.kontrol/config.toml`.
///
/// Every section is optional; a missing file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub kontrol: KontrolSection,
    #[serde(default)]
    pub registry: RegistrySection,
    #[serde(default)]
    pub register: RegisterSection,
}

impl AppConfig {
    /// Load `config.toml` from `kontrol_dir`, falling back to defaults when absent.
    pub fn load(kontrol_dir: &Path) -> Result<Self> {
        let config_path = kontrol_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&config_path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| KontrolError::InvalidConfig {
            detail: format!("Failed to parse config.toml: {e}"),
        })?;

        if config.kontrol.format_version > CURRENT_FORMAT_VERSION {
            return Err(KontrolError::FormatVersionTooNew {
                project_version: config.kontrol.format_version,
                supported_version: CURRENT_FORMAT_VERSION,
            });
        }

        crate::cli::context::validate_simple_filename(&config.registry.file, "registry file")?;

        Ok(config)
    }

    /// Path of the registry file inside `kontrol_dir`.
    pub fn registry_path(&self, kontrol_dir: &Path) -> PathBuf {
        kontrol_dir.join(&self.registry.file)
    }

    pub fn register_timeout(&self) -> Duration {
        Duration::from_secs(self.register.timeout_secs)
    }
}

/// The `[kontrol]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct KontrolSection {
    #[serde(default = "default_version")]
    pub version: String,
    /// Format version for backward compatibility. Defaults to 1 if missing.
    #[serde(default = "default_format_version")]
    pub format_version: u32,
}

impl Default for KontrolSection {
    fn default() -> Self {
        Self {
            version: default_version(),
            format_version: default_format_version(),
        }
    }
}

/// The `[registry]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySection {
    /// Registry file name inside the kontrol directory.
    #[serde(default = "default_registry_file")]
    pub file: String,
    #[serde(default)]
    pub mode: StorageMode,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            file: default_registry_file(),
            mode: StorageMode::default(),
        }
    }
}

/// The `[register]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterSection {
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Kite key location; `~/.kite/kite.key` when unset.
    pub kite_key: Option<PathBuf>,
}

impl Default for RegisterSection {
    fn default() -> Self {
        Self {
            server: default_server(),
            timeout_secs: default_timeout_secs(),
            kite_key: None,
        }
    }
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_format_version() -> u32 {
    1
}

fn default_registry_file() -> String {
    "keypairs.json".to_string()
}

fn default_server() -> String {
    DEFAULT_REGISTRATION_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

/// Default `config.toml` written by `kontrol init`.
pub fn default_config_toml() -> String {
    format!(
        r#"[kontrol]
version = "{version}"
format_version = {CURRENT_FORMAT_VERSION}

[registry]
file = "keypairs.json"
# "legacy" keeps an overwritten id's old public key valid; "strict" drops it
mode = "legacy"

[register]
server = "{DEFAULT_REGISTRATION_URL}"
timeout_secs = {timeout}
"#,
        version = env!("CARGO_PKG_VERSION"),
        timeout = DEFAULT_TIMEOUT.as_secs(),
    )
}
