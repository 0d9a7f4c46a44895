use crate::error::{Error, Result};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use subtle::ConstantTimeEq;

fn signature(random_bytes: &[u8], secret: &str) -> Result<Vec<u8>> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::Internal(format!("Failed to create HMAC: {}", e)))?;
    mac.update(random_bytes);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Generates a signed session token.
///
/// Format: `<random_32_bytes_hex>:<hmac_signature_hex>` (129 characters). Only
/// the SHA-256 of the whole token is persisted; the signature lets the
/// middleware reject forged cookies without touching the database.
///
/// # Example
/// ```rust
/// use vetportal::services::session_tokens::{generate_session_token, verify_session_token};
///
/// let token = generate_session_token("secret").unwrap();
/// assert!(verify_session_token(&token, "secret").is_ok());
/// assert!(verify_session_token(&token, "other").is_err());
/// ```
pub fn generate_session_token(secret: &str) -> Result<String> {
    // 256 bits of entropy
    let mut rng = rand::rng();
    let mut random_bytes = [0u8; 32];
    rng.fill(&mut random_bytes);

    let signature = signature(&random_bytes, secret)?;

    Ok(format!("{}:{}", hex::encode(random_bytes), hex::encode(signature)))
}

/// Verifies a session token's HMAC signature.
///
/// # Errors
/// `Error::InvalidToken` when the structure, encoding or signature is wrong.
pub fn verify_session_token(token: &str, secret: &str) -> Result<()> {
    let (random_hex, provided_signature_hex) = token
        .split_once(':')
        .ok_or_else(|| Error::InvalidToken("Invalid token format".to_string()))?;

    if random_hex.len() != 64 || provided_signature_hex.len() != 64 {
        return Err(Error::InvalidToken("Invalid token length".to_string()));
    }

    let random_bytes = hex::decode(random_hex)
        .map_err(|_| Error::InvalidToken("Invalid token encoding".to_string()))?;
    let provided_signature = hex::decode(provided_signature_hex)
        .map_err(|_| Error::InvalidToken("Invalid signature encoding".to_string()))?;

    let expected_signature = signature(&random_bytes, secret)?;

    // Constant-time comparison
    if expected_signature.as_slice().ct_eq(&provided_signature[..]).into() {
        Ok(())
    } else {
        Err(Error::InvalidToken("Invalid token signature".to_string()))
    }
}
