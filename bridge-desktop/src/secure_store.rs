//! Secure Credential Storage using OS Keychain

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SecureStore,
};
use keyring::Entry;
use tracing::{debug, error};

const DEFAULT_SERVICE_NAME: &str = "wearther";

/// Keyring-based secure storage implementation
///
/// Uses platform-specific secure storage:
/// - macOS: Keychain
/// - Windows: Credential Manager (DPAPI)
/// - Linux: kernel keyutils (kept until the user logs out or reboots)
///
/// Platform stores are enabled through keyring's `apple-native`,
/// `windows-native` and `linux-native` features at workspace level.
///
/// Values are base64 encoded because keyring entries only hold strings.
pub struct KeyringSecureStore {
    service_name: String,
}

impl KeyringSecureStore {
    /// Create a new secure store with default service name
    pub fn new() -> Self {
        Self::with_service_name(DEFAULT_SERVICE_NAME)
    }

    /// Create a new secure store with custom service name
    pub fn with_service_name(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Secure store whose entries are scoped to one application profile
    pub fn for_profile(profile: &str) -> Self {
        Self::with_service_name(format!("{}.{}", DEFAULT_SERVICE_NAME, profile))
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service_name, key).map_err(Self::map_keyring_error)
    }

    fn map_keyring_error(e: keyring::Error) -> BridgeError {
        match e {
            keyring::Error::NoStorageAccess(inner) => {
                BridgeError::NotAvailable(format!("Keyring unavailable: {}", inner))
            }
            keyring::Error::PlatformFailure(inner) => {
                BridgeError::NotAvailable(format!("Keyring platform failure: {}", inner))
            }
            other => BridgeError::OperationFailed(format!("Keyring error: {}", other)),
        }
    }
}

impl Default for KeyringSecureStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecureStore for KeyringSecureStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
        let encoded = STANDARD.encode(value);

        self.entry(key)?
            .set_password(&encoded)
            .map_err(Self::map_keyring_error)?;

        debug!(key = key, "Stored secret in keyring");
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.entry(key)?.get_password() {
            Ok(encoded) => {
                let decoded = STANDARD.decode(encoded).map_err(|e| {
                    error!(key = key, error = %e, "Failed to decode secret");
                    BridgeError::OperationFailed(format!("Failed to decode secret: {}", e))
                })?;

                debug!(key = key, "Retrieved secret from keyring");
                Ok(Some(decoded))
            }
            Err(keyring::Error::NoEntry) => {
                debug!(key = key, "Secret not found in keyring");
                Ok(None)
            }
            Err(e) => Err(Self::map_keyring_error(e)),
        }
    }

    async fn delete_secret(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) => {
                debug!(key = key, "Deleted secret from keyring");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => {
                debug!(key = key, "Secret not found (already deleted)");
                Ok(())
            }
            Err(e) => Err(Self::map_keyring_error(e)),
        }
    }

    async fn has_secret(&self, key: &str) -> Result<bool> {
        match self.entry(key)?.get_password() {
            Ok(_) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(Self::map_keyring_error(e)),
        }
    }
}
