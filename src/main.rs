use clap::Parser;
use tracing_subscriber::EnvFilter;

use kontrol::cli::{self, Cli, Commands};

fn main() {
    let args = Cli::parse();

    init_logging(args.verbose, args.quiet);
    cli::context::init(args.config.as_deref());

    let result = match &args.command {
        Commands::Init => cli::commands::init::execute(args.verbose),
        Commands::Keys { action } => cli::commands::keys::execute(action),
        Commands::Register {
            to,
            hostname,
            kite_key,
        } => cli::commands::register::execute(
            to.as_deref(),
            hostname.as_deref(),
            kite_key.as_deref(),
        ),
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        // 1: the request was refused and can be corrected; 2: the registry,
        // config or environment is broken.
        std::process::exit(if e.is_recoverable() { 1 } else { 2 });
    }
}

/// Log to stderr. `RUST_LOG` wins; otherwise `--verbose` means debug,
/// `--quiet` means errors only, and the default is warnings.
fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "kontrol=debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
