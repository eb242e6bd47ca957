//! dotenv-keyvault - resolve kv: references in .env files from Azure Key Vault.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dotenv_keyvault::cli::output;
use dotenv_keyvault::cli::{execute, Cli};
use dotenv_keyvault::core::constants::LOG_ENV_VAR;
use dotenv_keyvault::error::{ConfigError, DotenvError, Error};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| {
        if cli.global.verbose {
            EnvFilter::new("dotenv_keyvault=debug")
        } else {
            EnvFilter::new("dotenv_keyvault=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli.command, &cli.global) {
        let suggestion = match &e {
            Error::Dotenv(DotenvError::NotFound(_)) => Some("pass --env-file or create a .env file"),
            Error::Identity(_) => {
                Some("set MSI_ENDPOINT and MSI_SECRET, or pass --token / --token-command")
            }
            Error::SecretFetch(_) => Some("run with --verbose to see each failed fetch"),
            Error::Config(ConfigError::ConflictingTokenSources) => {
                Some("AAD_ACCESS_TOKEN counts as --token; unset it to use --token-command")
            }
            Error::EmptyCommand => Some("usage: dotenv-keyvault run -- <command> [args...]"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
