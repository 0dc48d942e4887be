//! Signature text encodings.
//!
//! Signatures are exchanged as lowercase hex. Base64 is accepted on input
//! because transparency-log servers return it.

use crate::CryptoError;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Decode a hex (preferred) or base64 signature.
pub fn decode_signature(text: &str) -> Result<Vec<u8>, CryptoError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CryptoError::InvalidSignature("empty signature".into()));
    }
    if let Ok(bytes) = hex::decode(trimmed) {
        return Ok(bytes);
    }
    STANDARD
        .decode(trimmed)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))
}
