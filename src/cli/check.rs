//! Check command.
//!
//! Lists the `kv:` references in the `.env` file and where each would be
//! fetched from. Never contacts Key Vault.

use serde::Serialize;

use crate::cli::{output, Context};
use crate::core::env::{EnvStore, ProcessEnv};
use crate::core::reference::{secret_keys, secret_url};
use crate::core::types::EnvMap;
use crate::dotenv;
use crate::error::Result;

/// A secret reference as it would be fetched.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PlannedFetch {
    pub key: String,
    pub url: String,
    /// Whether the reference came from the environment instead of the file.
    pub from_environment: bool,
}

/// The fetches `parsed` would trigger, in launch order.
pub fn plan(parsed: &EnvMap, env: &dyn EnvStore) -> Vec<PlannedFetch> {
    secret_keys(parsed)
        .into_iter()
        .map(|key| {
            let override_value = env.get_non_empty(key);
            let lookup = override_value.as_deref().unwrap_or(&parsed[key]);
            PlannedFetch {
                key: key.to_string(),
                url: secret_url(lookup),
                from_environment: override_value.is_some(),
            }
        })
        .collect()
}

/// Print the planned fetches.
pub fn execute(ctx: &Context, json: bool) -> Result<()> {
    let parsed = dotenv::parse_file(&ctx.env_file)?;
    let planned = plan(&parsed, &ProcessEnv);

    if json {
        println!("{}", serde_json::to_string_pretty(&planned)?);
        return Ok(());
    }

    if planned.is_empty() {
        output::dimmed("no kv: references found");
        return Ok(());
    }

    output::header(&format!(
        "{} of {} variables reference Key Vault",
        planned.len(),
        parsed.len()
    ));
    for fetch in &planned {
        output::kv(&fetch.key, &fetch.url);
        if fetch.from_environment {
            output::warn(&format!("{} is overridden by the environment", fetch.key));
        }
    }
    Ok(())
}
