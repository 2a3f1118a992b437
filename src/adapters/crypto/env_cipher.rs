//! Development SecretCipher reading plaintext-marked secrets.
//!
//! Blobs use a `plain:` prefix so a production config that accidentally
//! carries unmarked plaintext fails loudly instead of being accepted.
//! The production deployment swaps in the external secret store's adapter.

use secrecy::SecretString;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::SecretCipher;

/// Cipher for development and tests: `plain:<value>` round-trips, anything
/// else is rejected.
pub struct EnvSecretCipher;

const PREFIX: &str = "plain:";

impl SecretCipher for EnvSecretCipher {
    fn decrypt(&self, ciphertext: &str) -> Result<SecretString, DomainError> {
        ciphertext
            .strip_prefix(PREFIX)
            .map(|plain| SecretString::new(plain.to_string()))
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::CryptoError,
                    "Credential blob is not in development format",
                )
            })
    }

    fn encrypt(&self, plaintext: &str) -> Result<String, DomainError> {
        Ok(format!("{}{}", PREFIX, plaintext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let cipher = EnvSecretCipher;
        let blob = cipher.encrypt("hello world").unwrap();
        let secret = cipher.decrypt(&blob).unwrap();
        assert_eq!(secret.expose_secret(), "hello world");
    }

    #[test]
    fn unmarked_blob_is_rejected() {
        let cipher = EnvSecretCipher;
        assert!(cipher.decrypt("raw-secret").is_err());
    }
}
