//! Claim Registrar CLI
//!
//! Command-line interface for recording and querying property claims

use clap::Parser;
use claim_registrar::cli::args::{Cli, Commands, ConfigAction, IdentityAction};
use claim_registrar::cli::commands;
use claim_registrar::config::ConfigOverrides;
use std::path::PathBuf;
use std::process;

fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    // Build config overrides from global arguments
    let overrides = ConfigOverrides {
        data_dir: cli.data_dir.clone(),
        database_file: None,
        identity: cli.identity.clone(),
    };
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let config_path = config_path.as_deref();

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Init => commands::config::init(config_path).map_err(Into::into),
        },

        Commands::Identity { action } => match action {
            IdentityAction::Create { name, password } => {
                commands::identity::create(name, password, config_path, overrides)
                    .map_err(Into::into)
            }

            IdentityAction::Show { name } => {
                commands::identity::show(name, config_path, overrides).map_err(Into::into)
            }

            IdentityAction::List => {
                commands::identity::list(config_path, overrides).map_err(Into::into)
            }
        },

        Commands::Claim { claim, password } => {
            commands::claims::claim(claim, password, config_path, overrides).map_err(Into::into)
        }

        Commands::Register { claim, password } => {
            commands::claims::register(claim, password, config_path, overrides)
                .map_err(Into::into)
        }

        Commands::ClaimWithExternal {
            storage_name,
            key,
            password,
        } => commands::claims::claim_with_external(
            storage_name,
            key,
            password,
            config_path,
            overrides,
        )
        .map_err(Into::into),

        Commands::ListClaimKeys { actor } => {
            commands::claims::list_claim_keys(actor, config_path, overrides).map_err(Into::into)
        }

        Commands::ListClaims { actor } => {
            commands::claims::list_claims(actor, config_path, overrides).map_err(Into::into)
        }

        Commands::AllClaims { claim_key } => {
            commands::claims::all_claims(claim_key, config_path, overrides).map_err(Into::into)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
