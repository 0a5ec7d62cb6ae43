use std::path::PathBuf;

use crate::adapters::registration::http_registrar::HttpRegistrar;
use crate::adapters::registration::kite_key_file::KiteKeyFile;
use crate::cli::output;
use crate::config::app_config::AppConfig;
use crate::core::errors::{KontrolError, Result};
use crate::core::services::registration_service::RegistrationService;

/// Execute the `kontrol register` command.
///
/// Sends this host's name to the authority and stores the returned
/// credential as the local kite key. Any failure aborts without retrying.
pub fn execute(to: Option<&str>, hostname: Option<&str>, kite_key: Option<&str>) -> Result<()> {
    let config = AppConfig::load(crate::cli::context::kontrol_dir())?;

    let url = to.unwrap_or(&config.register.server);
    let hostname = match hostname {
        Some(h) => h.to_string(),
        None => local_hostname()?,
    };
    let kite_key_path = match kite_key {
        Some(p) => PathBuf::from(p),
        None => match &config.register.kite_key {
            Some(p) => p.clone(),
            None => KiteKeyFile::default_path()?,
        },
    };

    let service = RegistrationService {
        registrar: HttpRegistrar::new(url, config.register_timeout())?,
        credentials: KiteKeyFile::new(kite_key_path),
    };

    let sp = output::spinner(&format!("Registering {hostname} at {}...", service.registrar.url()));
    let registration = match service.register(&hostname) {
        Ok(r) => r,
        Err(e) => {
            output::abandon_spinner(sp);
            return Err(e);
        }
    };
    output::finish_spinner(sp, "Registered successfully");

    if registration.replaced {
        output::warning("Previous registration was replaced.");
    }
    output::success(&format!(
        "Kite key saved to {}",
        service.credentials.path().display()
    ));
    Ok(())
}

/// Hostname of this machine from `$HOSTNAME` or `/etc/hostname`.
fn local_hostname() -> Result<String> {
    if let Ok(name) = std::env::var("HOSTNAME")
        && !name.trim().is_empty()
    {
        return Ok(name.trim().to_string());
    }

    if let Ok(content) = std::fs::read_to_string("/etc/hostname")
        && !content.trim().is_empty()
    {
        return Ok(content.trim().to_string());
    }

    Err(KontrolError::InvalidConfig {
        detail: "Could not determine hostname. Pass --hostname <name>.".into(),
    })
}
