//! Bearer token acquisition.
//!
//! A token comes from exactly one [`TokenSource`]: a literal string, a
//! caller-supplied [`TokenProvider`], or, when neither is configured, the
//! managed identity endpoint named by `MSI_ENDPOINT` / `MSI_SECRET`.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::constants::{KEYVAULT_RESOURCE, MSI_API_VERSION, MSI_ENDPOINT_VAR, MSI_SECRET_VAR};
use super::env::EnvStore;
use super::reference::has_secret_references;
use super::transport::{string_field, HttpRequest, Transport};
use super::types::{AccessToken, EnvMap};
use crate::error::{Error, Result, TokenError, TransportError};

/// Produces a bearer token on demand.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn provide(&self) -> std::result::Result<AccessToken, TokenError>;
}

/// [`TokenProvider`] over an async closure.
pub struct FnTokenProvider<F>(F);

impl<F> FnTokenProvider<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F, Fut> TokenProvider for FnTokenProvider<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<AccessToken, TokenError>> + Send,
{
    async fn provide(&self) -> std::result::Result<AccessToken, TokenError> {
        (self.0)().await
    }
}

/// [`TokenProvider`] that runs a shell command and reads the token from
/// its standard output.
///
/// ```ignore
/// CommandTokenProvider::new(
///     "az account get-access-token --resource https://vault.azure.net --query accessToken -o tsv",
/// );
/// ```
#[derive(Debug, Clone)]
pub struct CommandTokenProvider {
    command: String,
}

impl CommandTokenProvider {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn shell(&self) -> tokio::process::Command {
        #[cfg(windows)]
        {
            let mut cmd = tokio::process::Command::new("cmd");
            cmd.arg("/C").arg(&self.command);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = tokio::process::Command::new("sh");
            cmd.arg("-c").arg(&self.command);
            cmd
        }
    }
}

#[async_trait]
impl TokenProvider for CommandTokenProvider {
    async fn provide(&self) -> std::result::Result<AccessToken, TokenError> {
        debug!(command = %self.command, "running token command");

        let output = self
            .shell()
            .stdin(std::process::Stdio::null())
            .output()
            .await
            .map_err(|e| TokenError::CommandFailed(format!("{}: {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TokenError::CommandFailed(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| TokenError::CommandFailed(format!("non UTF-8 output: {}", e)))?;
        let token = stdout.trim();
        if token.is_empty() {
            return Err(TokenError::Empty);
        }
        Ok(AccessToken::new(token))
    }
}

/// Where the bearer token comes from.
#[derive(Clone, Default)]
pub enum TokenSource {
    /// Use the managed identity endpoint.
    #[default]
    Absent,
    /// Ask a provider, once per enrichment.
    Provider(Arc<dyn TokenProvider>),
    /// Use this token verbatim.
    Literal(AccessToken),
}

impl TokenSource {
    pub fn literal(token: impl Into<String>) -> Self {
        Self::Literal(AccessToken::new(token))
    }

    pub fn provider(provider: impl TokenProvider + 'static) -> Self {
        Self::Provider(Arc::new(provider))
    }

    /// Provider from an async closure.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<AccessToken, TokenError>> + Send + 'static,
    {
        Self::provider(FnTokenProvider::new(f))
    }

    /// Provider running a shell command.
    pub fn command(command: impl Into<String>) -> Self {
        Self::provider(CommandTokenProvider::new(command))
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Absent => "managed-identity",
            Self::Provider(_) => "provider",
            Self::Literal(t) if t.is_empty() => "managed-identity",
            Self::Literal(_) => "literal",
        }
    }
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Provider(_) => f.write_str("Provider(..)"),
            Self::Literal(t) => f.debug_tuple("Literal").field(t).finish(),
        }
    }
}

/// Resolve the token for one enrichment.
///
/// Returns `Ok(None)` without consulting `source` when no value in
/// `parsed` is a secret reference. An empty literal counts as absent.
pub async fn resolve(
    source: &TokenSource,
    parsed: &EnvMap,
    transport: &dyn Transport,
    env: &dyn EnvStore,
) -> Result<Option<AccessToken>> {
    if !has_secret_references(parsed) {
        debug!("no secret references, skipping token acquisition");
        return Ok(None);
    }

    debug!(source = source.kind(), "resolving access token");
    let token = match source {
        TokenSource::Literal(token) if !token.is_empty() => token.clone(),
        TokenSource::Provider(provider) => provider.provide().await?,
        TokenSource::Absent | TokenSource::Literal(_) => {
            let endpoint = env.get(MSI_ENDPOINT_VAR).unwrap_or_default();
            let secret = env.get(MSI_SECRET_VAR).unwrap_or_default();
            acquire_token(transport, &endpoint, &secret, KEYVAULT_RESOURCE)
                .await
                .map_err(Error::Identity)?
        }
    };

    Ok(Some(token))
}

/// Managed identity token request for `resource`.
pub fn identity_request(endpoint: &str, secret: &str, resource: &str) -> HttpRequest {
    HttpRequest::get(format!(
        "{}/?resource={}&api-version={}",
        endpoint, resource, MSI_API_VERSION
    ))
    .header("Secret", secret)
}

/// Fetch an access token from the managed identity endpoint.
///
/// Failures are returned exactly as the transport reports them.
pub async fn acquire_token(
    transport: &dyn Transport,
    endpoint: &str,
    secret: &str,
    resource: &str,
) -> std::result::Result<AccessToken, TransportError> {
    let request = identity_request(endpoint, secret, resource);
    debug!(url = %request.url, "requesting managed identity token");

    let body = transport.get_json(&request).await?;
    let token = string_field(&request.url, &body, "access_token")?;
    Ok(AccessToken::new(token))
}
