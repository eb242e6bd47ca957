//! Command-line interface.

pub mod check;
pub mod completions;
pub mod context;
pub mod output;
pub mod resolve;
pub mod run;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub use context::Context;

/// dotenv-keyvault - resolve kv: references in .env files from Azure Key Vault.
#[derive(Parser)]
#[command(
    name = "dotenv-keyvault",
    about = "Resolve kv: references in .env files from Azure Key Vault",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Path to the .env file [default: .env]
    #[arg(short = 'f', long, global = true, env = "DOTENV_KEYVAULT_FILE")]
    pub env_file: Option<PathBuf>,

    /// Access token for Key Vault requests
    #[arg(long, global = true, env = "AAD_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Shell command that prints an access token
    #[arg(long, global = true)]
    pub token_command: Option<String>,

    /// Settings file [default: .dotenv-keyvault.toml if present]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Print the .env file with kv: references resolved
    Resolve {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a command with resolved variables in its environment
    Run {
        /// Command and arguments to run
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// List kv: references without contacting Key Vault
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Execute a command.
pub fn execute(command: Command, global: &GlobalArgs) -> crate::error::Result<()> {
    use Command::*;

    match command {
        Resolve { json } => resolve::execute(&Context::from_args(global)?, json),
        Run { command } => run::execute(&Context::from_args(global)?, &command),
        Check { json } => check::execute(&Context::from_args(global)?, json),
        Completions { shell } => completions::execute(shell),
    }
}
