use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::core::errors::{KontrolError, Result};

static KONTROL_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Initialize the global kontrol directory path.
/// If `custom` is provided, uses that path; otherwise defaults to `.kontrol`.
pub fn init(custom: Option<&str>) {
    let dir = custom
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".kontrol"));
    let _ = KONTROL_DIR.set(dir);
}

/// Get the current kontrol directory path.
pub fn kontrol_dir() -> &'static Path {
    KONTROL_DIR
        .get()
        .map(|p| p.as_path())
        .unwrap_or(Path::new(".kontrol"))
}

/// Reject names that could point outside the kontrol directory.
pub fn validate_simple_filename(name: &str, what: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if invalid {
        return Err(KontrolError::InvalidConfig {
            detail: format!("Invalid {what} name '{name}': must be a plain file name"),
        });
    }
    Ok(())
}
