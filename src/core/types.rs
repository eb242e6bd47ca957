//! Domain types.
//!
//! Semantic aliases plus the bearer token wrapper.

use std::collections::BTreeMap;
use std::fmt;

use zeroize::Zeroizing;

/// A variable name (e.g., DATABASE_URL).
pub type VarName = String;

/// Parsed dotenv mapping from variable name to raw value.
///
/// Iteration order is the order in which secret fetches are launched.
pub type EnvMap = BTreeMap<VarName, String>;

/// An opaque bearer credential for Key Vault requests.
///
/// The value is wiped on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Authorization` header value for this token.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.as_str())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

impl From<&str> for AccessToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}
