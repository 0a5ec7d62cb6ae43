use crate::adapters::issuers::age_issuer::AgeKeyIssuer;
use crate::cli::output;
use crate::cli::{KeysAction, Lookup};
use crate::core::errors::Result;
use crate::core::models::key_pair::KeyPair;

/// Execute the `kontrol keys` command.
pub fn execute(action: &KeysAction) -> Result<()> {
    match action {
        KeysAction::Issue { id } => execute_issue(id),
        KeysAction::Add {
            id,
            public,
            private,
        } => execute_add(KeyPair::new(id.as_str(), public.as_str(), private.as_str())),
        KeysAction::List => execute_list(),
        KeysAction::Show {
            lookup,
            reveal_private,
        } => execute_show(lookup, *reveal_private),
        KeysAction::Verify { public } => execute_verify(public),
        KeysAction::Remove { id, public } => execute_remove(id, public.as_deref()),
    }
}

/// Generate a fresh key pair for `id`.
fn execute_issue(id: &str) -> Result<()> {
    let service = super::registry::service()?;
    let kp = service.issue(&AgeKeyIssuer::new(), id)?;

    output::success(&format!("Issued key pair: {}", kp.id));
    output::success(&format!("Public key: {}", kp.public));
    println!("\n  The private key is stored in the registry only.");
    println!("  Reveal it with: kontrol keys show --id {} --reveal-private", kp.id);
    Ok(())
}

/// Store an externally issued key pair.
fn execute_add(kp: KeyPair) -> Result<()> {
    let service = super::registry::service()?;

    if let Some(derived) = AgeKeyIssuer::public_key_of(&kp.private)
        && derived != kp.public
    {
        output::warning("The private key does not match the given public key.");
    }

    service.import(&kp)?;
    output::success(&format!("Added key pair: {kp}"));
    Ok(())
}

/// List all registered key pairs.
fn execute_list() -> Result<()> {
    let service = super::registry::service()?;
    let keys = service.list()?;

    if keys.is_empty() {
        output::warning("No key pairs registered.");
        println!("  Run 'kontrol keys issue <id>' to create one.");
        return Ok(());
    }

    output::header(&format!("Registered key pairs ({})", keys.len()));
    for kp in &keys {
        println!("  • {}  {}", kp.id, kp.public);
    }

    let stale = service.storage.stale_public_keys();
    if !stale.is_empty() {
        println!();
        output::warning(&format!(
            "{} public key(s) still valid from overwritten entries:",
            stale.len()
        ));
        for public in &stale {
            println!("    {public}");
        }
        println!("  Remove them with 'kontrol keys remove <id> --public <key>'");
        println!("  or set mode = \"strict\" in config.toml.");
    }

    Ok(())
}

/// Show one key pair, looked up by id or public key.
fn execute_show(lookup: &Lookup, reveal_private: bool) -> Result<()> {
    let service = super::registry::service()?;
    // clap requires exactly one of --id / --public
    let kp = match &lookup.id {
        Some(id) => service.find_by_id(id)?,
        None => service.find_by_public(lookup.public.as_deref().unwrap_or_default())?,
    };

    println!("  id:      {}", kp.id);
    println!("  public:  {}", kp.public);
    if reveal_private {
        println!("  private: {}", kp.private);
    }
    Ok(())
}

/// Exit successfully iff `public` is registered.
fn execute_verify(public: &str) -> Result<()> {
    let service = super::registry::service()?;
    let id = service.authenticate(public)?;
    output::success(&format!("Valid public key (id: {id})"));
    Ok(())
}

/// Remove a key pair, resolving its public key unless given.
fn execute_remove(id: &str, public: Option<&str>) -> Result<()> {
    let service = super::registry::service()?;
    match public {
        Some(public) => service.revoke_with_public(id, public)?,
        None => service.revoke(id)?,
    }
    output::success(&format!("Removed key pair: {id}"));
    Ok(())
}
