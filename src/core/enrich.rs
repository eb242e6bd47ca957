//! Key Vault enrichment of parsed dotenv values.
//!
//! [`KeyVault::enrich`] resolves a token once, fetches every `kv:` value
//! concurrently, writes each fetched secret into the [`EnvStore`] and
//! returns a copy of the input with secret references replaced.
//!
//! ```ignore
//! let parsed = dotenv::parse_file(".env")?;
//! let vault = KeyVault::new(Options::default());
//! let env = vault.enrich(&parsed).await?;
//! ```

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info};

use super::env::{EnvStore, ProcessEnv};
use super::reference::{secret_keys, secret_url};
use super::token::{self, TokenSource};
use super::transport::{string_field, HttpRequest, ReqwestTransport, Transport};
use super::types::{AccessToken, EnvMap};
use crate::error::{AggregateSecretFetchError, FetchError, Result, SecretFetchFailure};

/// Enrichment options.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Token used for Key Vault requests.
    pub aad_access_token: TokenSource,
    /// Log a summary of populated variables at info level.
    pub debug: bool,
}

/// Resolves `kv:` references against Azure Key Vault.
pub struct KeyVault {
    token: TokenSource,
    transport: Arc<dyn Transport>,
    env: Arc<dyn EnvStore>,
    debug: bool,
}

impl KeyVault {
    /// Enricher using `reqwest` and the process environment.
    pub fn new(options: Options) -> Self {
        Self::builder()
            .token(options.aad_access_token)
            .debug(options.debug)
            .build()
    }

    pub fn builder() -> KeyVaultBuilder {
        KeyVaultBuilder::default()
    }

    /// The store secrets are written into.
    pub fn env(&self) -> &Arc<dyn EnvStore> {
        &self.env
    }

    /// Enrich a mapping that may be missing; a missing mapping is empty.
    pub async fn enrich_parsed(&self, parsed: Option<&EnvMap>) -> Result<EnvMap> {
        match parsed {
            Some(parsed) => self.enrich(parsed).await,
            None => self.enrich(&EnvMap::new()).await,
        }
    }

    /// Replace every secret reference in `parsed` with its Key Vault value.
    ///
    /// Each fetched value is also written into the env store as soon as it
    /// arrives. If any fetch fails the whole call fails with every failure
    /// collected, though successful fetches will already have been written
    /// to the env store.
    pub async fn enrich(&self, parsed: &EnvMap) -> Result<EnvMap> {
        let token = token::resolve(
            &self.token,
            parsed,
            self.transport.as_ref(),
            self.env.as_ref(),
        )
        .await?;

        let mut enriched = parsed.clone();
        let Some(token) = token else {
            return Ok(enriched);
        };

        let keys = secret_keys(parsed);
        debug!(count = keys.len(), "fetching Key Vault secrets");

        let fetches = keys.iter().map(|&key| {
            // a value already in the environment wins over the .env file
            let lookup = self
                .env
                .get_non_empty(key)
                .unwrap_or_else(|| parsed[key].clone());
            let token = &token;
            async move { (key, self.fetch_secret(key, &lookup, token).await) }
        });
        let results = join_all(fetches).await;

        let mut failures = Vec::new();
        for (key, result) in results {
            match result {
                Ok(value) => {
                    enriched.insert(key.to_string(), value);
                }
                Err(source) => failures.push(SecretFetchFailure {
                    key: key.to_string(),
                    source,
                }),
            }
        }

        if !failures.is_empty() {
            return Err(AggregateSecretFetchError::new(failures).into());
        }

        if self.debug {
            info!(keys = ?keys, "populated Key Vault backed variables");
        }
        Ok(enriched)
    }

    async fn fetch_secret(
        &self,
        key: &str,
        lookup: &str,
        token: &AccessToken,
    ) -> std::result::Result<String, FetchError> {
        let request = secret_request(lookup, token);
        debug!(key, url = %request.url, "fetching secret");

        let fetched = match self.transport.get_json(&request).await {
            Ok(body) => string_field(&request.url, &body, "value").map_err(FetchError::from),
            Err(e) => Err(e.into()),
        };
        let stored = fetched.and_then(|value| {
            self.env.set(key, &value)?;
            Ok(value)
        });

        match stored {
            Ok(value) => Ok(value),
            Err(e) => {
                error!(key, error = %e, "problem fetching Key Vault secret");
                Err(e)
            }
        }
    }
}

/// Secret fetch request for a lookup value.
pub fn secret_request(lookup: &str, token: &AccessToken) -> HttpRequest {
    HttpRequest::get(secret_url(lookup)).header("Authorization", token.bearer())
}

/// Builder for [`KeyVault`] with injectable collaborators.
#[derive(Default)]
pub struct KeyVaultBuilder {
    token: TokenSource,
    transport: Option<Arc<dyn Transport>>,
    env: Option<Arc<dyn EnvStore>>,
    debug: bool,
}

impl KeyVaultBuilder {
    pub fn token(mut self, token: TokenSource) -> Self {
        self.token = token;
        self
    }

    pub fn transport(self, transport: impl Transport + 'static) -> Self {
        self.shared_transport(Arc::new(transport))
    }

    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn env(self, env: impl EnvStore + 'static) -> Self {
        self.shared_env(Arc::new(env))
    }

    pub fn shared_env(mut self, env: Arc<dyn EnvStore>) -> Self {
        self.env = Some(env);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn build(self) -> KeyVault {
        KeyVault {
            token: self.token,
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(ReqwestTransport::new())),
            env: self.env.unwrap_or_else(|| Arc::new(ProcessEnv)),
            debug: self.debug,
        }
    }
}
