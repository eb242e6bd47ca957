//! Settings file (`.dotenv-keyvault.toml`).
//!
//! ```toml
//! env_file = ".env.production"
//! token_command = "az account get-access-token --resource https://vault.azure.net --query accessToken -o tsv"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::constants::CONFIG_FILE;
use crate::error::{ConfigError, Result};

/// Persistent CLI settings. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// `.env` file to read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_file: Option<PathBuf>,

    /// Shell command printing a Key Vault access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_command: Option<String>,
}

impl Settings {
    /// Default settings path in the current directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE)
    }

    /// Load settings.
    ///
    /// With an explicit `path` the file must exist. Without one, a missing
    /// default file yields empty settings.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.display().to_string()).into());
                }
                Self::from_file(path)
            }
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents, path)
    }

    /// Parse settings from TOML. `path` labels errors.
    pub fn parse(contents: &str, path: &Path) -> Result<Self> {
        toml::from_str(contents).map_err(|e| {
            ConfigError::Parse {
                path: path.display().to_string(),
                message: e.message().to_string(),
            }
            .into()
        })
    }
}
