use crate::domain::errors::{CheckoutError, CheckoutResult};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use rand::RngCore;

const NONCE_LEN: usize = 12;

/// AES-256-GCM sealing for data that must be opaque outside this process:
/// staged payment input in the session and profile tokens at rest.
#[derive(Clone)]
pub struct SecretSealer {
    key: [u8; 32],
}

impl SecretSealer {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Reads the base64-encoded 32-byte key from `CHECKOUT_SECRET_KEY`.
    pub fn from_env() -> CheckoutResult<Self> {
        let encoded = std::env::var("CHECKOUT_SECRET_KEY").map_err(|_| {
            CheckoutError::Configuration("CHECKOUT_SECRET_KEY must be set".to_string())
        })?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| CheckoutError::Crypto(format!("Key decode error: {e}")))?;
        let key: [u8; 32] = bytes.try_into().map_err(|_| {
            CheckoutError::Crypto("CHECKOUT_SECRET_KEY must decode to 32 bytes".to_string())
        })?;
        Ok(Self::new(key))
    }

    /// Encrypts and returns base64(nonce || ciphertext).
    pub fn seal(&self, plaintext: &[u8]) -> CheckoutResult<String> {
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| CheckoutError::Crypto(format!("AES init error: {e}")))?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| CheckoutError::Crypto(format!("Encrypt error: {e}")))?;

        let mut sealed = nonce_bytes.to_vec();
        sealed.extend(ciphertext);
        Ok(base64::engine::general_purpose::STANDARD.encode(sealed))
    }

    /// Decrypts a value produced by `seal`.
    pub fn open(&self, sealed: &str) -> CheckoutResult<Vec<u8>> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(sealed)
            .map_err(|e| CheckoutError::Crypto(format!("Base64 decode error: {e}")))?;

        if bytes.len() < NONCE_LEN {
            return Err(CheckoutError::Crypto("Sealed value too short".to_string()));
        }
        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_LEN);

        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| CheckoutError::Crypto(format!("AES init error: {e}")))?;

        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| CheckoutError::Crypto(format!("Decrypt error: {e}")))
    }
}
