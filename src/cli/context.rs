//! Per-invocation settings resolved from flags, environment and the
//! settings file.

use std::future::Future;
use std::path::PathBuf;

use crate::cli::GlobalArgs;
use crate::config::Settings;
use crate::core::constants::ENV_FILE;
use crate::core::enrich::{KeyVault, Options};
use crate::core::token::TokenSource;
use crate::core::types::EnvMap;
use crate::error::{ConfigError, Result};

/// Everything a command needs to run.
#[derive(Debug)]
pub struct Context {
    pub env_file: PathBuf,
    pub options: Options,
}

impl Context {
    /// Resolve flags against the settings file.
    ///
    /// Flags and their environment variables win over the settings file.
    pub fn from_args(args: &GlobalArgs) -> Result<Self> {
        let settings = Settings::load(args.config.as_deref())?;
        Self::merge(args, settings)
    }

    fn merge(args: &GlobalArgs, settings: Settings) -> Result<Self> {
        if args.token.is_some() && args.token_command.is_some() {
            return Err(ConfigError::ConflictingTokenSources.into());
        }

        let env_file = args
            .env_file
            .clone()
            .or(settings.env_file)
            .unwrap_or_else(|| PathBuf::from(ENV_FILE));

        let aad_access_token = match (&args.token, &args.token_command, settings.token_command) {
            (Some(token), _, _) => TokenSource::literal(token.as_str()),
            (None, Some(command), _) => TokenSource::command(command.as_str()),
            (None, None, Some(command)) => TokenSource::command(command),
            (None, None, None) => TokenSource::Absent,
        };

        Ok(Self {
            env_file,
            options: Options {
                aad_access_token,
                debug: args.verbose,
            },
        })
    }

    /// Enrich `parsed` against Key Vault, updating the process environment.
    pub fn enrich(&self, parsed: &EnvMap) -> Result<EnvMap> {
        let vault = KeyVault::new(self.options.clone());
        block_on(vault.enrich(parsed))?
    }
}

/// Drive `future` to completion on a single-threaded runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(rt.block_on(future))
}
