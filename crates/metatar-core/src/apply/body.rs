//! Resolving the effective body of an entry.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::MetatarError;
use crate::Result;
use crate::metadata::Entry;

/// Decodes the inline body of an entry and checks it against `Size`.
///
/// Returns `Ok(None)` if the entry has no inline body.
///
/// # Errors
///
/// Returns [`MetatarError::MalformedBody`] if the body is not valid base64
/// and [`MetatarError::SizeMismatch`] if a non-zero declared size differs
/// from the decoded length.
pub fn decode_inline(entry: &Entry) -> Result<Option<Vec<u8>>> {
    let Some(encoded) = entry.encoded_body.as_deref() else {
        return Ok(None);
    };
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| MetatarError::MalformedBody {
            path: entry.path.clone(),
        })?;
    let actual = decoded.len() as u64;
    if entry.declared_size != 0 && entry.declared_size != actual {
        return Err(MetatarError::SizeMismatch {
            path: entry.path.clone(),
            declared: entry.declared_size,
            actual,
        });
    }
    Ok(Some(decoded))
}

/// The body an entry will be written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBody {
    /// Body bytes, `None` if no source provides one.
    pub bytes: Option<Vec<u8>>,
    /// Regular file with no body from any source.
    pub empty_regular: bool,
}

impl ResolvedBody {
    /// Wraps a possibly missing body for an entry.
    #[must_use]
    pub fn new(entry: &Entry, bytes: Option<Vec<u8>>) -> Self {
        let empty_regular = bytes.is_none() && entry.kind.is_regular();
        Self {
            bytes,
            empty_regular,
        }
    }

    /// Returns the body, empty if none was found.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.bytes.as_deref().unwrap_or_default()
    }
}
