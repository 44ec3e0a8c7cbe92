//! Random secret generation.
//!
//! Values are drawn from the operating system CSPRNG and encoded with the
//! URL-safe base64 alphabet (`A-Z`, `a-z`, `0-9`, `-`, `_`), then cut to
//! exactly the requested number of characters.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use std::num::NonZeroUsize;

use crate::errors::{Error, Result};

use super::types::SecretString;

/// Length used when the caller does not ask for one.
pub const DEFAULT_SECRET_LENGTH: usize = 32;

/// Longest value that will be generated.
pub const MAX_SECRET_LENGTH: usize = 4096;

/// Resolve an optional requested length to the one actually generated.
pub fn effective_length(length: Option<NonZeroUsize>) -> usize {
    length.map_or(DEFAULT_SECRET_LENGTH, NonZeroUsize::get)
}

/// Reject lengths above [`MAX_SECRET_LENGTH`].
pub fn check_length(length: usize) -> Result<usize> {
    if length > MAX_SECRET_LENGTH {
        return Err(Error::invalid_request(format!(
            "secret length {} exceeds the maximum of {}",
            length, MAX_SECRET_LENGTH
        )));
    }
    Ok(length)
}

/// Generate a URL-safe random secret of `length` characters (default 32).
///
/// # Errors
///
/// - [`Error::InvalidRequest`] if `length` exceeds [`MAX_SECRET_LENGTH`]
pub fn generate(length: Option<NonZeroUsize>) -> Result<SecretString> {
    let length = check_length(effective_length(length))?;

    // Each base64 character carries 6 bits; 3 bytes encode to 4 characters.
    let mut bytes = vec![0u8; length.div_ceil(4) * 3];
    OsRng.fill_bytes(&mut bytes);

    let mut encoded = URL_SAFE_NO_PAD.encode(&bytes);
    encoded.truncate(length);

    bytes.fill(0);
    Ok(SecretString::new(encoded))
}

/// Whether every character is in the URL-safe base64 alphabet.
pub fn is_url_safe(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
