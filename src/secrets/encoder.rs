//! Conversion between resource-facing secret data and the store payload.
//!
//! The structured [`SecretData`] map is the primary representation.
//! [`decode_legacy`] exists only for resource models that still carry the
//! old string encoding:
//!
//! ```text
//! 'username=admin', 'password=hunter2'
//! ```
//!
//! Pairs are separated by the literal `', '`; each pair loses its
//! surrounding single quotes and is split once on the first `=`. Neither
//! keys nor values may contain the separator, and keys may not contain `=`.

use crate::errors::{Error, Result};

use super::types::{SecretData, SecretString};

/// Separator between pairs in the legacy encoding.
pub const LEGACY_PAIR_SEPARATOR: &str = "', '";

/// Key used for a generated secret.
pub const GENERATED_KEY: &str = "value";

/// Decode the legacy `'k=v', 'k2=v2'` string into a map.
///
/// A blank input decodes to an empty map. Later duplicates of a key win.
pub fn decode_legacy(encoded: &str) -> Result<SecretData> {
    let mut data = SecretData::new();
    if encoded.trim().is_empty() {
        return Ok(data);
    }

    for item in encoded.split(LEGACY_PAIR_SEPARATOR) {
        let pair = item.trim_matches('\'');
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            Error::invalid_data(format!("pair without '=' in secret data: '{}'", redact_pair(pair)))
        })?;
        if key.is_empty() {
            return Err(Error::invalid_data("pair with an empty key in secret data"));
        }
        data.insert(key.to_string(), value.to_string());
    }

    Ok(data)
}

/// Wrap a generated value as the single-entry payload `{"value": ...}`.
pub fn generated(value: SecretString) -> SecretData {
    let mut data = SecretData::new();
    data.insert(GENERATED_KEY.to_string(), value.into_inner());
    data
}

// A pair without '=' might be a bare secret value; keep only a short prefix.
fn redact_pair(pair: &str) -> String {
    let prefix: String = pair.chars().take(3).collect();
    if pair.chars().count() > 3 {
        format!("{}...", prefix)
    } else {
        prefix
    }
}
