//! Error types for dotenv-keyvault.
//!
//! One top-level [`Error`] with a variant per failure domain. Identity-token
//! failures keep the transport error untouched; secret-fetch failures are
//! folded into an [`AggregateSecretFetchError`].

use std::fmt;

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    /// The managed-identity token request failed. Carries the transport
    /// error exactly as the transport reported it.
    #[error("managed identity token request failed: {0}")]
    Identity(TransportError),

    /// A caller-supplied token provider failed.
    #[error(transparent)]
    TokenProvider(#[from] TokenError),

    /// One or more Key Vault secret fetches failed.
    #[error(transparent)]
    SecretFetch(#[from] AggregateSecretFetchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dotenv(#[from] DotenvError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no command specified")]
    EmptyCommand,
}

/// Failure reported by an HTTP transport.
///
/// Holds rendered messages rather than the underlying client error so it
/// can be cloned and compared.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("request to {url} returned status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl TransportError {
    /// URL of the request that failed.
    pub fn url(&self) -> &str {
        match self {
            Self::Request { url, .. } | Self::Status { url, .. } | Self::Decode { url, .. } => url,
        }
    }

    /// HTTP status code, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Rejected environment variable writes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("invalid environment variable name '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("value for {key} contains a NUL byte")]
    InvalidValue { key: String },
}

/// Why a single secret could not be populated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Env(#[from] EnvError),
}

impl FetchError {
    /// HTTP status code, when Key Vault answered with an error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status(),
            Self::Env(_) => None,
        }
    }
}

/// Token provider errors.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token command failed: {0}")]
    CommandFailed(String),

    #[error("token provider returned an empty token")]
    Empty,

    #[error("token provider failed: {0}")]
    Provider(String),
}

/// A single failed secret fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretFetchFailure {
    /// Variable whose secret could not be fetched.
    pub key: String,
    pub source: FetchError,
}

impl fmt::Display for SecretFetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.source)
    }
}

/// Every secret fetch that failed during one enrichment.
///
/// Failures are kept in launch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSecretFetchError {
    failures: Vec<SecretFetchFailure>,
}

impl AggregateSecretFetchError {
    pub(crate) fn new(failures: Vec<SecretFetchFailure>) -> Self {
        debug_assert!(!failures.is_empty());
        Self { failures }
    }

    /// All failures, in launch order.
    pub fn failures(&self) -> &[SecretFetchFailure] {
        &self.failures
    }

    /// The earliest-launched failure.
    pub fn first(&self) -> &SecretFetchFailure {
        &self.failures[0]
    }

    /// Keys that could not be populated.
    pub fn keys(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.key.as_str()).collect()
    }
}

impl fmt::Display for AggregateSecretFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unable to populate Key Vault backed variable {}", self.first())?;
        if self.failures.len() > 1 {
            write!(f, " (and {} more)", self.failures.len() - 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateSecretFetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.first().source)
    }
}

/// Settings file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("invalid config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("--token and --token-command cannot be used together")]
    ConflictingTokenSources,
}

/// `.env` parsing errors.
#[derive(Error, Debug)]
pub enum DotenvError {
    #[error("env file not found: {0}")]
    NotFound(String),

    #[error("{path}:{line}: {reason}")]
    InvalidLine {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },
}

/// Result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
