pub mod commands;
pub mod context;
pub mod output;

use clap::{Args, Parser, Subcommand};

/// Key pair registry and host registration for a kite authority.
#[derive(Parser, Debug)]
#[command(name = "kontrol", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to alternative kontrol directory
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a key pair registry in the current directory
    Init,

    /// Manage registered key pairs
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },

    /// Register this host to a kite authority
    Register {
        /// Target registration server
        #[arg(long)]
        to: Option<String>,
        /// Hostname to register (default: this machine's hostname)
        #[arg(long, env = "KONTROL_HOSTNAME")]
        hostname: Option<String>,
        /// Where to store the kite key (default: ~/.kite/kite.key)
        #[arg(long)]
        kite_key: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeysAction {
    /// Generate and store a new key pair
    Issue {
        /// Id of the key pair (host or kite name)
        id: String,
    },
    /// Store an externally issued key pair
    Add {
        id: String,
        public: String,
        private: String,
    },
    /// List registered key pairs
    List,
    /// Show a single key pair
    Show {
        #[command(flatten)]
        lookup: Lookup,
        /// Also print the private key
        #[arg(long)]
        reveal_private: bool,
    },
    /// Check whether a public key is registered
    Verify {
        public: String,
    },
    /// Remove a key pair
    Remove {
        id: String,
        /// Public key to remove; resolved from the id when omitted
        #[arg(long)]
        public: Option<String>,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct Lookup {
    /// Look up by id
    #[arg(long)]
    pub id: Option<String>,
    /// Look up by public key
    #[arg(long)]
    pub public: Option<String>,
}
