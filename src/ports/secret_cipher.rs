//! SecretCipher port - the encrypted-secret store boundary.
//!
//! Gateway credentials are stored encrypted in configuration records and
//! decrypted on demand. Encryption itself is owned by the secret store
//! outside this core.

use secrecy::SecretString;

use crate::domain::foundation::DomainError;

/// Port for decrypting (and re-encrypting) stored gateway credentials.
///
/// Synchronous by design: implementations are local cipher operations, not
/// network calls.
pub trait SecretCipher: Send + Sync {
    /// Decrypt an opaque stored blob into a secret string.
    fn decrypt(&self, ciphertext: &str) -> Result<SecretString, DomainError>;

    /// Encrypt a plaintext secret for storage.
    fn encrypt(&self, plaintext: &str) -> Result<String, DomainError>;
}
