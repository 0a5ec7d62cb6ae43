use std::path::{Path, PathBuf};

use crate::adapters::private_file::write_private;
use crate::core::errors::{KontrolError, Result};
use crate::core::traits::registrar::CredentialStore;

/// The host's kite key: a single-line credential file, `~/.kite/kite.key` by default.
pub struct KiteKeyFile {
    path: PathBuf,
}

impl KiteKeyFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default kite key location: `~/.kite/kite.key`.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| KontrolError::InvalidConfig {
            detail: "Could not determine home directory".into(),
        })?;
        Ok(home.join(".kite").join("kite.key"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for KiteKeyFile {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let credential = content.trim();
        if credential.is_empty() {
            return Ok(None);
        }
        Ok(Some(credential.to_string()))
    }

    fn write(&self, credential: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_private(&self.path, format!("{credential}\n").as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_key() -> (tempfile::TempDir, KiteKeyFile) {
        let dir = tempfile::tempdir().unwrap();
        let key = KiteKeyFile::new(dir.path().join(".kite").join("kite.key"));
        (dir, key)
    }

    #[test]
    fn missing_file_reads_none() {
        let (_dir, key) = temp_key();
        assert_eq!(key.read().unwrap(), None);
    }

    #[test]
    fn write_creates_parent_and_reads_back() {
        let (_dir, key) = temp_key();
        key.write("token-abc").unwrap();

        assert_eq!(key.read().unwrap().as_deref(), Some("token-abc"));
    }

    #[test]
    fn write_replaces_previous_credential() {
        let (_dir, key) = temp_key();
        key.write("old").unwrap();
        key.write("new").unwrap();

        assert_eq!(key.read().unwrap().as_deref(), Some("new"));
    }

    #[cfg(unix)]
    #[test]
    fn written_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, key) = temp_key();
        key.write("token").unwrap();
        let mode = std::fs::metadata(key.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
