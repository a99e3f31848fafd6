//! CLI argument definitions using clap

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "claim-registrar",
    version,
    about = "Claim Registrar - record actor-scoped ownership claims over external properties",
    long_about = None
)]
pub struct Cli {
    /// Identity to act as (overrides config)
    #[arg(short, long, global = true)]
    pub identity: Option<String>,

    /// Custom data directory for the database and identities
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Path to config file (default: ~/.claim-registrar/config.json)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize or manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Identity management commands
    Identity {
        #[command(subcommand)]
        action: IdentityAction,
    },

    /// Create or update a claim
    Claim {
        #[command(flatten)]
        claim: ClaimArgs,

        /// Password to unlock the identity
        #[arg(short, long)]
        password: String,
    },

    /// Create or update a permanent registration
    Register {
        #[command(flatten)]
        claim: ClaimArgs,

        /// Password to unlock the identity
        #[arg(short, long)]
        password: String,
    },

    /// Set the external reference (pass empty strings to clear it)
    ClaimWithExternal {
        /// Storage provider name (e.g. "arweave")
        #[arg(short, long, default_value = "")]
        storage_name: String,

        /// Lookup key within the storage provider
        #[arg(short, long, default_value = "")]
        key: String,

        /// Password to unlock the identity
        #[arg(short, long)]
        password: String,
    },

    /// List claim keys and the external reference of an actor
    ListClaimKeys {
        /// Actor id (defaults to the selected identity's actor)
        #[arg(short, long)]
        actor: Option<String>,
    },

    /// List registration keys of an actor
    ListClaims {
        /// Actor id (defaults to the selected identity's actor)
        #[arg(short, long)]
        actor: Option<String>,
    },

    /// Show the record stored under a claim key
    AllClaims {
        /// Claim key (64 hex chars, optional 0x prefix)
        claim_key: String,
    },
}

/// Claim fields shared by `claim` and `register`
#[derive(clap::Args, Debug)]
pub struct ClaimArgs {
    /// Property type (e.g. "Domain")
    #[arg(short = 't', long)]
    pub property_type: String,

    /// Property identifier (e.g. "example.com")
    #[arg(short = 'd', long)]
    pub property_id: String,

    /// Supporting evidence
    #[arg(short, long, default_value = "")]
    pub evidence: String,

    /// Verification method (e.g. "TXT")
    #[arg(short, long, default_value = "")]
    pub method: String,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Initialize configuration file with defaults
    Init,
}

#[derive(Subcommand, Debug)]
pub enum IdentityAction {
    /// Create a new identity with a generated key
    Create {
        /// Name of the identity
        name: String,

        /// Password to encrypt the identity key
        #[arg(short, long)]
        password: String,
    },

    /// Show an identity's actor id and public key
    Show {
        /// Name of the identity (defaults to the selected identity)
        name: Option<String>,
    },

    /// List all identities
    List,
}
