//! Opaque email transform.
//!
//! Email flows obscure the address before transmission. The transform is a
//! one-way black box from the session manager's point of view - the server
//! owns the reverse side of the contract - so it sits behind the
//! [`EmailCipher`] trait and callers may substitute their own implementation.

use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::RngCore;

use crate::api::AuthError;

/// Nonce size for ChaCha20-Poly1305
const NONCE_LEN: usize = 12;

/// One-way transform applied to an email address before it is transmitted
/// on signup/login/pre-shared-credential flows.
pub trait EmailCipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<String, AuthError>;
}

/// Identity transform for servers that expect cleartext addresses.
pub struct PlainCipher;

impl EmailCipher for PlainCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, AuthError> {
        Ok(plaintext.to_string())
    }
}

/// ChaCha20-Poly1305 transform with an argon2-derived key.
/// Output is `base64url(nonce || ciphertext)`; the nonce is random, so two
/// encryptions of the same address differ.
pub struct PassphraseCipher {
    key: [u8; 32],
}

impl PassphraseCipher {
    /// Derive the cipher key from a passphrase and salt.
    /// The salt must match the server side and be at least 8 bytes
    /// (argon2's minimum).
    pub fn new(passphrase: &str, salt: &[u8]) -> Result<Self, AuthError> {
        let mut key = [0u8; 32];
        Argon2::default()
            .hash_password_into(passphrase.as_bytes(), salt, &mut key)
            .map_err(|error| AuthError::Cipher(error.to_string()))?;
        Ok(Self { key })
    }
}

impl EmailCipher for PassphraseCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, AuthError> {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.key));

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|error| AuthError::Cipher(error.to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(URL_SAFE_NO_PAD.encode(out))
    }
}
