//! dotenv-keyvault - resolve `kv:` references in dotenv files from Azure Key Vault.
//!
//! A value such as `kv:https://myvault.vault.azure.net/secrets/db-password`
//! is replaced by the secret stored at that URL. The bearer token comes
//! from a literal, a token provider, or the managed identity endpoint.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── resolve       # Print the resolved .env
//! │   ├── run           # Run a command with resolved variables
//! │   ├── check         # List references without network access
//! │   └── completions   # Shell completions
//! ├── core/             # Core library components
//! │   ├── enrich        # KeyVault enricher
//! │   ├── token         # Token sources and managed identity
//! │   ├── transport     # HTTP seam (reqwest)
//! │   ├── reference     # kv: detection and secret URLs
//! │   └── env           # Environment stores
//! ├── config            # .dotenv-keyvault.toml settings
//! ├── dotenv            # .env parsing and rendering
//! └── error             # Error types
//! ```
//!
//! # Example
//!
//! ```no_run
//! use dotenv_keyvault::{EnvMap, KeyVault, Options, TokenSource};
//!
//! # async fn demo() -> dotenv_keyvault::error::Result<()> {
//! let parsed = dotenv_keyvault::dotenv::parse_file(".env".as_ref())?;
//! let vault = KeyVault::new(Options {
//!     aad_access_token: TokenSource::literal("eyJ0eXAi..."),
//!     debug: false,
//! });
//! let env: EnvMap = vault.enrich(&parsed).await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod dotenv;
pub mod error;

pub use crate::core::enrich::{KeyVault, KeyVaultBuilder, Options};
pub use crate::core::env::{EnvStore, MemoryEnv, ProcessEnv};
pub use crate::core::token::{TokenProvider, TokenSource};
pub use crate::core::transport::{HttpRequest, ReqwestTransport, Transport};
pub use crate::core::types::{AccessToken, EnvMap};
pub use crate::error::{AggregateSecretFetchError, Error, Result};
