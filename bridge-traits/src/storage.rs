//! Storage Abstractions
//!
//! Provides platform-agnostic traits for private key-value settings storage
//! and secure credential storage.

use async_trait::async_trait;

use crate::error::Result;

/// Secure credential storage trait
///
/// Abstracts secure storage mechanisms:
/// - macOS/iOS: Keychain
/// - Android: Keystore (hardware-backed when available)
/// - Windows: Credential Manager
/// - Linux: Secret Service / libsecret
///
/// # Security Requirements
///
/// Implementations MUST:
/// - Use platform-provided secure storage when available
/// - Never log or expose stored values
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SecureStore;
///
/// async fn store_token(store: &dyn SecureStore, token: &str) -> Result<()> {
///     store.set_secret("jwt", token.as_bytes()).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Store a secret value, replacing any previous value for `key`
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Retrieve a secret value
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Delete a secret. Deleting a missing key succeeds.
    async fn delete_secret(&self, key: &str) -> Result<()>;

    /// Check if a secret exists without retrieving it
    async fn has_secret(&self, key: &str) -> Result<bool> {
        Ok(self.get_secret(key).await?.is_some())
    }
}

/// Private key-value settings storage trait
///
/// Abstracts platform-specific preferences storage scoped to one application
/// install and device profile:
/// - Android: SharedPreferences (`MODE_PRIVATE`)
/// - iOS: UserDefaults
/// - Desktop: SQLite file under the user's data directory
///
/// A successful `set_string` must be durable before it returns: a later
/// `get_string`, even from a new process, observes the value.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SettingsStore;
///
/// async fn save_preference(store: &dyn SettingsStore) -> Result<()> {
///     store.set_string("theme", "dark").await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Store a string value, replacing any previous value for `key`
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Delete a setting. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a setting exists
    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.get_string(key).await?.is_some())
    }

    /// List all setting keys
    async fn list_keys(&self) -> Result<Vec<String>>;
}
