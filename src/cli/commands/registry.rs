use std::path::Path;

use crate::adapters::key_stores::file_key_pair_storage::FileKeyPairStorage;
use crate::config::app_config::AppConfig;
use crate::core::errors::{KontrolError, Result};
use crate::core::services::key_pair_service::KeyPairService;

/// Open the registry configured for `kontrol_dir`.
pub fn open(kontrol_dir: &Path, config: &AppConfig) -> Result<FileKeyPairStorage> {
    FileKeyPairStorage::open(config.registry_path(kontrol_dir), config.registry.mode)
}

/// Write the registry file if it does not exist yet.
pub fn ensure_created(registry: &FileKeyPairStorage) -> Result<()> {
    if !registry.path().exists() {
        registry.flush()?;
    }
    Ok(())
}

/// Load config and registry for a `kontrol keys` command.
pub fn service() -> Result<KeyPairService<FileKeyPairStorage>> {
    let kontrol_dir = crate::cli::context::kontrol_dir();
    if !kontrol_dir.exists() {
        return Err(KontrolError::InvalidConfig {
            detail: format!(
                "Kontrol not initialized ({} missing). Run 'kontrol init' first.",
                kontrol_dir.display()
            ),
        });
    }

    let config = AppConfig::load(kontrol_dir)?;
    Ok(KeyPairService::new(open(kontrol_dir, &config)?))
}
