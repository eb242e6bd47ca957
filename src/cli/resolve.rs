//! Resolve command.
//!
//! Prints the `.env` file with every `kv:` reference replaced by its Key
//! Vault value.

use std::io::Write;

use zeroize::Zeroizing;

use crate::cli::Context;
use crate::dotenv;
use crate::error::Result;

/// Print the resolved mapping as dotenv lines or JSON.
pub fn execute(ctx: &Context, json: bool) -> Result<()> {
    let parsed = dotenv::parse_file(&ctx.env_file)?;
    let resolved = ctx.enrich(&parsed)?;

    let rendered = Zeroizing::new(if json {
        let mut out = dotenv::render_json(&resolved)?;
        out.push('\n');
        out
    } else {
        dotenv::render_dotenv(&resolved)
    });

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
