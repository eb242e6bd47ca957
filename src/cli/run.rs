//! Run command.
//!
//! Executes a command with the resolved `.env` mapping in its environment.

use tracing::debug;
use zeroize::Zeroizing;

use crate::cli::Context;
use crate::dotenv;
use crate::error::{Error, Result};

/// Run a command with resolved variables and exit with its status.
pub fn execute(ctx: &Context, command: &[String]) -> Result<()> {
    let exit_code = run_with_env(ctx, command)?;
    std::process::exit(exit_code);
}

fn run_with_env(ctx: &Context, command: &[String]) -> Result<i32> {
    let Some((program, args)) = command.split_first() else {
        return Err(Error::EmptyCommand);
    };

    let parsed = dotenv::parse_file(&ctx.env_file)?;
    // Resolved secrets are written into this process's environment and
    // inherited by the child.
    let resolved = ctx.enrich(&parsed)?;

    let mut cmd = std::process::Command::new(program);
    cmd.args(args);

    // Variables already in the environment keep their values
    for (key, value) in resolved {
        let value = Zeroizing::new(value);
        if std::env::var_os(&key).is_none() {
            cmd.env(&key, value.as_str());
        }
    }

    debug!(program = %program, "spawning command");
    let status = cmd.status()?;
    // Killed by a signal: no code available
    Ok(status.code().unwrap_or(1))
}
