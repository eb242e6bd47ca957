//! Secret reference detection.
//!
//! A value is a secret reference when it starts with `kv:`. The rest of
//! the value is the Key Vault secret URL.

use super::constants::{KEYVAULT_API_VERSION, SECRET_MARKER};
use super::types::EnvMap;

/// Whether `value` is a secret reference. Case-sensitive prefix match.
pub fn is_secret_reference(value: &str) -> bool {
    value.starts_with(SECRET_MARKER)
}

/// Whether any value in `parsed` is a secret reference.
pub fn has_secret_references(parsed: &EnvMap) -> bool {
    parsed.values().any(|v| is_secret_reference(v))
}

/// Keys whose values are secret references, in map order.
pub fn secret_keys(parsed: &EnvMap) -> Vec<&str> {
    parsed
        .iter()
        .filter(|(_, v)| is_secret_reference(v))
        .map(|(k, _)| k.as_str())
        .collect()
}

/// Secret URL for a lookup value.
///
/// Strips a leading `kv:` if present and appends the Key Vault API
/// version. A lookup value without the marker (an override taken from the
/// environment) is used as-is.
pub fn secret_url(lookup: &str) -> String {
    let location = lookup.strip_prefix(SECRET_MARKER).unwrap_or(lookup);
    format!("{}?api-version={}", location, KEYVAULT_API_VERSION)
}
