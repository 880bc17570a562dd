//! PEM framing removal.

use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::borrow::Cow;

const PEM_PREFIX: &[u8] = b"-----BEGIN";

/// True if `input` looks like PEM text rather than raw DER.
pub fn is_pem(input: &[u8]) -> bool {
    input.trim_ascii_start().starts_with(PEM_PREFIX)
}

/// Decode the base64 body of a PEM document.
///
/// Every line starting with `-----` (BEGIN/END markers) is dropped; the
/// remaining lines are concatenated and base64-decoded. The label is not
/// checked.
pub fn unpem(text: &str) -> Result<Vec<u8>> {
    let body: String = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("-----"))
        .collect();

    BASE64.decode(body).map_err(|_| Error::MalformedPem)
}

/// Return the DER bytes of a key container given either PEM text or raw DER.
pub fn container_bytes(input: &[u8]) -> Result<Cow<'_, [u8]>> {
    if !is_pem(input) {
        return Ok(Cow::Borrowed(input));
    }
    let text = std::str::from_utf8(input).map_err(|_| Error::MalformedPem)?;
    unpem(text).map(Cow::Owned)
}
