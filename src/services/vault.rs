//! Vault lifecycle: key material, master password and full wipe.
//!
//! Without a master password the cipher key is derived from a device salt and
//! a fixed application passphrase. With one, the key is derived from the
//! password and a separate user salt; only a verification hash is stored.

use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use zeroize::Zeroizing;

use crate::constants::{crypto as crypto_consts, storage};
use crate::crypto::{self, CredentialCipher, CryptoError, KdfParams};
use crate::db::KeyValueStore;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("No master password is configured")]
    NotConfigured,

    #[error("A master password is already configured")]
    AlreadyConfigured,

    #[error("Invalid master password")]
    InvalidPassword,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for VaultError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Result of a best-effort wipe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WipeReport {
    pub removed: Vec<&'static str>,
    pub failed: Vec<(&'static str, String)>,
}

impl WipeReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

fn validate_master_password(password: &str) -> Result<(), VaultError> {
    if password.chars().count() < crypto_consts::MIN_MASTER_PASSWORD_LEN {
        return Err(VaultError::Validation(format!(
            "Master password must be at least {} characters",
            crypto_consts::MIN_MASTER_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub struct Vault {
    store: Arc<dyn KeyValueStore>,
    params: KdfParams,
}

impl Vault {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, params: KdfParams) -> Self {
        Self { store, params }
    }

    async fn derive(
        &self,
        passphrase: Zeroizing<String>,
        salt: String,
    ) -> Result<CredentialCipher, VaultError> {
        let params = self.params;
        tokio::task::spawn_blocking(move || CredentialCipher::derive(&passphrase, &salt, params))
            .await
            .map_err(|e| CryptoError::KeyDerivation(format!("Key derivation task failed: {e}")))?
            .map_err(VaultError::from)
    }

    async fn load_or_create_salt(&self, key: &str) -> Result<String, VaultError> {
        if let Some(salt) = self.store.get(key).await? {
            return Ok(salt);
        }

        let salt = crypto::generate_salt();
        self.store.set(key, &salt).await?;
        info!(key, "Generated new vault salt");
        Ok(salt)
    }

    /// Cipher keyed from the device salt, created on first use.
    pub async fn device_cipher(&self) -> Result<CredentialCipher, VaultError> {
        let salt = self.load_or_create_salt(storage::DEVICE_SALT).await?;
        self.derive(
            Zeroizing::new(crypto_consts::APP_PASSPHRASE.to_string()),
            salt,
        )
        .await
    }

    pub async fn has_master_password(&self) -> Result<bool, VaultError> {
        Ok(self.store.get(storage::PASSWORD_HASH).await?.is_some())
    }

    /// Stores a verification hash and a fresh user salt, returning the
    /// password-keyed cipher.
    ///
    /// Refused while accounts encrypted under the device key exist, since
    /// they could not be decrypted afterwards.
    pub async fn setup_master_password(
        &self,
        password: &str,
    ) -> Result<CredentialCipher, VaultError> {
        validate_master_password(password)?;

        if self.has_master_password().await? {
            return Err(VaultError::AlreadyConfigured);
        }

        if self.store.get(storage::ACCOUNTS).await?.is_some() {
            return Err(VaultError::Validation(
                "Vault already holds accounts; reset it before enabling a master password"
                    .to_string(),
            ));
        }

        let params = self.params;
        let owned = Zeroizing::new(password.to_string());
        let hash = tokio::task::spawn_blocking(move || crypto::hash_password(&owned, params))
            .await
            .map_err(|e| CryptoError::KeyDerivation(format!("Hashing task failed: {e}")))??;

        let salt = crypto::generate_salt();
        self.store.set(storage::USER_SALT, &salt).await?;
        // The hash marks the vault as configured and must be written last.
        if let Err(e) = self.store.set(storage::PASSWORD_HASH, &hash).await {
            if let Err(cleanup) = self.store.remove(storage::USER_SALT).await {
                warn!(error = %cleanup, "Failed to remove orphaned user salt");
            }
            return Err(e.into());
        }
        info!("Master password configured");

        self.derive(Zeroizing::new(password.to_string()), salt).await
    }

    pub async fn unlock(&self, password: &str) -> Result<CredentialCipher, VaultError> {
        let hash = self
            .store
            .get(storage::PASSWORD_HASH)
            .await?
            .ok_or(VaultError::NotConfigured)?;

        let owned = Zeroizing::new(password.to_string());
        let valid = tokio::task::spawn_blocking(move || crypto::verify_password(&owned, &hash))
            .await
            .map_err(|e| CryptoError::KeyDerivation(format!("Verification task failed: {e}")))??;

        if !valid {
            warn!("Rejected vault unlock attempt");
            return Err(VaultError::InvalidPassword);
        }

        let salt = self
            .store
            .get(storage::USER_SALT)
            .await?
            .ok_or_else(|| VaultError::Storage("User salt is missing".to_string()))?;

        self.derive(Zeroizing::new(password.to_string()), salt).await
    }

    /// Cipher for the current vault mode: the master password when one is
    /// configured, the device key otherwise.
    pub async fn open(&self, master_password: Option<&str>) -> Result<CredentialCipher, VaultError> {
        match (self.has_master_password().await?, master_password) {
            (true, Some(password)) => self.unlock(password).await,
            (true, None) => Err(VaultError::InvalidPassword),
            (false, Some(_)) => Err(VaultError::NotConfigured),
            (false, None) => self.device_cipher().await,
        }
    }

    /// Forgotten-password flow: wipes everything, then configures
    /// `new_password`.
    pub async fn reset(
        &self,
        new_password: &str,
    ) -> Result<(CredentialCipher, WipeReport), VaultError> {
        validate_master_password(new_password)?;

        let report = self.wipe_all().await;
        if !report.is_complete() {
            return Err(VaultError::Storage(format!(
                "Vault wipe incomplete: {} key(s) could not be removed",
                report.failed.len()
            )));
        }

        let cipher = self.setup_master_password(new_password).await?;
        Ok((cipher, report))
    }

    /// Removes every persisted key. A failing key is logged and reported and
    /// does not stop the others.
    pub async fn wipe_all(&self) -> WipeReport {
        let mut report = WipeReport::default();

        for &key in storage::ALL {
            match self.store.remove(key).await {
                Ok(()) => report.removed.push(key),
                Err(e) => {
                    error!(key, error = %e, "Failed to remove vault key");
                    report.failed.push((key, e.to_string()));
                }
            }
        }

        info!(
            removed = report.removed.len(),
            failed = report.failed.len(),
            "Vault wipe finished"
        );
        report
    }
}
