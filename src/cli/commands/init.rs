use std::io::Write;
use std::path::Path;

use crate::cli::output;
use crate::config::app_config::{AppConfig, default_config_toml};
use crate::core::errors::{KontrolError, Result};

/// Execute the `kontrol init` command.
///
/// Creates the kontrol directory with a default `config.toml` and an empty
/// registry, and keeps the registry (it holds private keys) out of git.
pub fn execute(verbose: bool) -> Result<()> {
    let kontrol_dir = crate::cli::context::kontrol_dir();

    if kontrol_dir.join("config.toml").exists() {
        return Err(KontrolError::InvalidConfig {
            detail: format!(
                "Kontrol is already initialized here ({} exists)",
                kontrol_dir.display()
            ),
        });
    }

    output::header("Kontrol — Initializing registry");

    std::fs::create_dir_all(kontrol_dir)?;
    output::success(&format!("Created {}/", kontrol_dir.display()));

    std::fs::write(kontrol_dir.join("config.toml"), default_config_toml())?;
    output::success("Generated config.toml with defaults");

    let config = AppConfig::load(kontrol_dir)?;
    let registry = crate::cli::commands::registry::open(kontrol_dir, &config)?;
    crate::cli::commands::registry::ensure_created(&registry)?;
    output::success(&format!("Created empty registry {}", config.registry.file));

    add_to_gitignore(&config.registry_path(kontrol_dir))?;

    output::success("Registry ready.\n");
    print_next_steps(verbose, kontrol_dir, &config);

    Ok(())
}

/// Add an entry to .gitignore if not already present.
fn add_to_gitignore(registry_path: &Path) -> Result<()> {
    let gitignore = Path::new(".gitignore");
    let entry = registry_path.to_string_lossy().replace('\\', "/");

    if gitignore.exists() {
        let content = std::fs::read_to_string(gitignore)?;
        if content.lines().any(|l| l.trim() == entry) {
            output::success(&format!("{entry} already in .gitignore"));
            return Ok(());
        }
        let mut file = std::fs::OpenOptions::new().append(true).open(gitignore)?;
        writeln!(file, "\n# Kontrol: the registry holds private keys\n{entry}")?;
    } else {
        std::fs::write(
            gitignore,
            format!("# Kontrol: the registry holds private keys\n{entry}\n"),
        )?;
    }

    output::success(&format!("Added {entry} to .gitignore"));
    Ok(())
}

/// Print next steps after init.
fn print_next_steps(verbose: bool, kontrol_dir: &Path, config: &AppConfig) {
    println!("  Next steps:");
    println!("     1. Issue a key pair: kontrol keys issue <host>");
    println!("     2. Check a public key: kontrol keys verify <public-key>");

    if verbose {
        println!();
        println!("  Files created:");
        println!(
            "     {}/config.toml    — Kontrol configuration",
            kontrol_dir.display()
        );
        println!(
            "     {}/{}  — Key pair registry (never commit)",
            kontrol_dir.display(),
            config.registry.file
        );
    }
}
