//! Credential encryption for the vault.
//!
//! Keys are derived with Argon2id from a passphrase and a per-vault salt and
//! used for AES-256-GCM. A ciphertext string is `v1:` followed by the base64
//! encoding of `nonce || sealed bytes`.

use aes_gcm::{
    Aes256Gcm, KeyInit, Nonce,
    aead::{Aead, AeadCore, OsRng},
};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use base64ct::{Base64, Encoding};
use rand::Rng;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::SecurityConfig;
use crate::constants;

/// Nonce length for AES-GCM (12 bytes standard)
pub const NONCE_LENGTH: usize = 12;

/// Derived key length for AES-256 (32 bytes)
pub const KEY_LENGTH: usize = 32;

const CIPHERTEXT_PREFIX: &str = "v1:";

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Failed to decrypt secret: {0}")]
    Decryption(String),

    #[error("Failed to encrypt secret: {0}")]
    Encryption(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub memory_cost_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::from(&SecurityConfig::default())
    }
}

impl From<&SecurityConfig> for KdfParams {
    fn from(config: &SecurityConfig) -> Self {
        Self {
            memory_cost_kib: config.argon2_memory_cost_kib,
            time_cost: config.argon2_time_cost,
            parallelism: config.argon2_parallelism,
        }
    }
}

impl KdfParams {
    fn argon2(&self) -> Result<Argon2<'static>, CryptoError> {
        let params = Params::new(
            self.memory_cost_kib,
            self.time_cost,
            self.parallelism,
            Some(KEY_LENGTH),
        )
        .map_err(|e| CryptoError::KeyDerivation(format!("Invalid Argon2 params: {e}")))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Symmetric cipher holding a derived key for the lifetime of a session.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CredentialCipher {
    key: [u8; KEY_LENGTH],
}

impl std::fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCipher").finish_non_exhaustive()
    }
}

impl CredentialCipher {
    /// Derives the key from `passphrase` and `salt`.
    ///
    /// This is CPU-heavy; async callers should run it on a blocking thread.
    pub fn derive(passphrase: &str, salt: &str, params: KdfParams) -> Result<Self, CryptoError> {
        let mut key = [0u8; KEY_LENGTH];
        params
            .argon2()?
            .hash_password_into(passphrase.as_bytes(), salt.as_bytes(), &mut key)
            .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

        Ok(Self { key })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| CryptoError::Encryption(format!("Failed to create cipher: {e}")))?;

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        let mut payload = Vec::with_capacity(NONCE_LENGTH + sealed.len());
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&sealed);

        Ok(format!("{CIPHERTEXT_PREFIX}{}", Base64::encode_string(&payload)))
    }

    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError> {
        let encoded = ciphertext
            .strip_prefix(CIPHERTEXT_PREFIX)
            .ok_or_else(|| CryptoError::Decryption("unrecognized ciphertext format".to_string()))?;

        let payload = Base64::decode_vec(encoded)
            .map_err(|e| CryptoError::Decryption(format!("invalid base64: {e}")))?;

        if payload.len() <= NONCE_LENGTH {
            return Err(CryptoError::Decryption("ciphertext too short".to_string()));
        }

        let (nonce, sealed) = payload.split_at(NONCE_LENGTH);
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| CryptoError::Decryption(format!("Failed to create cipher: {e}")))?;

        let mut plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CryptoError::Decryption("wrong key or corrupted data".to_string()))?;

        let text = String::from_utf8(plaintext.clone())
            .map_err(|_| CryptoError::Decryption("plaintext is not valid UTF-8".to_string()));
        plaintext.zeroize();
        text
    }
}

/// Heuristic check used when importing data that may or may not be encrypted.
#[must_use]
pub fn is_encrypted(value: &str) -> bool {
    value
        .strip_prefix(CIPHERTEXT_PREFIX)
        .is_some_and(|rest| Base64::decode_vec(rest).is_ok_and(|b| b.len() > NONCE_LENGTH))
}

/// Random hex salt for key derivation.
#[must_use]
pub fn generate_salt() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; constants::crypto::SALT_BYTES] = rng.random();

    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

/// PHC-format Argon2id hash of a master password, used only for verification.
pub fn hash_password(password: &str, params: KdfParams) -> Result<String, CryptoError> {
    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);

    let hash = params
        .argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CryptoError::KeyDerivation(format!("Failed to hash password: {e}")))?;

    Ok(hash.to_string())
}

/// Checks `password` against a stored PHC hash.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, CryptoError> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| CryptoError::KeyDerivation(format!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
