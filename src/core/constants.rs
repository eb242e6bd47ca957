//! Constants used throughout dotenv-keyvault.
//!
//! Centralizes magic strings and protocol values.

/// Prefix marking a value as a Key Vault secret reference.
pub const SECRET_MARKER: &str = "kv:";

/// Key Vault data-plane API version appended to every secret URL.
pub const KEYVAULT_API_VERSION: &str = "2016-10-01";

/// Managed identity token endpoint API version.
pub const MSI_API_VERSION: &str = "2017-09-01";

/// Audience requested from the managed identity endpoint.
pub const KEYVAULT_RESOURCE: &str = "https://vault.azure.net";

/// Environment variable holding the managed identity endpoint base URL.
pub const MSI_ENDPOINT_VAR: &str = "MSI_ENDPOINT";

/// Environment variable holding the managed identity shared secret.
pub const MSI_SECRET_VAR: &str = "MSI_SECRET";

/// Default `.env` file name.
pub const ENV_FILE: &str = ".env";

/// Default settings file name.
pub const CONFIG_FILE: &str = ".dotenv-keyvault.toml";

/// Environment variable read for the log filter.
pub const LOG_ENV_VAR: &str = "DOTENV_KEYVAULT_LOG";
