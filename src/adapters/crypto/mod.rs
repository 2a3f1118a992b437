//! SecretCipher adapters.
//!
//! The production secret store lives outside this service and implements
//! the `SecretCipher` port over its own key management. This module ships
//! the development stand-in.

mod env_cipher;

pub use env_cipher::EnvSecretCipher;
