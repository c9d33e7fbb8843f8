//! Session Credential Storage
//!
//! Persists the backend-issued session credential under the key `jwt` in a
//! host-provided store, and keeps a write-through snapshot so that request
//! authentication never waits on I/O.
//!
//! ## Backends
//!
//! - [`StorageBackend::Settings`]: private per-profile key/value settings
//!   (the default, equivalent to app-private preferences)
//! - [`StorageBackend::Secure`]: OS keychain / keystore
//!
//! ## Consistency
//!
//! Writers are serialised, and the snapshot is only replaced after the
//! durable write succeeded. A failed write therefore leaves the previous
//! credential (or its absence) readable.
//!
//! ## Example
//!
//! ```no_run
//! use core_auth::{CredentialStore, SessionCredential, StorageBackend};
//! # use bridge_traits::storage::SettingsStore;
//! # use std::sync::Arc;
//! # async fn example(settings: Arc<dyn SettingsStore>) -> core_auth::Result<()> {
//! let store = CredentialStore::open(StorageBackend::Settings(settings)).await?;
//!
//! if let Some(credential) = SessionCredential::new("issued-by-backend") {
//!     store.put(credential).await?;
//! }
//! assert!(store.is_present());
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result, StoreWriteError};
use crate::types::SessionCredential;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::storage::{SecureStore, SettingsStore};
use core_runtime::config::{CredentialBackend, SessionConfig};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Key the session credential is persisted under.
pub const STORAGE_KEY: &str = "jwt";

/// Durable store holding the credential.
#[derive(Clone)]
pub enum StorageBackend {
    Settings(Arc<dyn SettingsStore>),
    Secure(Arc<dyn SecureStore>),
}

impl StorageBackend {
    /// Select the backend named by `config.credential_backend`.
    ///
    /// # Errors
    ///
    /// `AuthError::Config` if the selected store was not provided; a built
    /// `SessionConfig` always has it, so this only fires for hand-edited
    /// configs.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let missing = |capability: &str| {
            AuthError::Config(core_runtime::Error::CapabilityMissing {
                capability: capability.to_string(),
                message: "selected credential backend has no store".to_string(),
            })
        };

        match config.credential_backend {
            CredentialBackend::Settings => config
                .settings_store
                .clone()
                .map(StorageBackend::Settings)
                .ok_or_else(|| missing("SettingsStore")),
            CredentialBackend::Secure => config
                .secure_store
                .clone()
                .map(StorageBackend::Secure)
                .ok_or_else(|| missing("SecureStore")),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            StorageBackend::Settings(_) => "settings",
            StorageBackend::Secure(_) => "secure",
        }
    }

    async fn read(&self) -> BridgeResult<Option<String>> {
        match self {
            StorageBackend::Settings(store) => store.get_string(STORAGE_KEY).await,
            StorageBackend::Secure(store) => {
                let Some(bytes) = store.get_secret(STORAGE_KEY).await? else {
                    return Ok(None);
                };

                match String::from_utf8(bytes) {
                    Ok(value) => Ok(Some(value)),
                    Err(_) => {
                        warn!("Stored credential is not valid UTF-8, treating as absent");
                        Ok(None)
                    }
                }
            }
        }
    }

    async fn write(&self, value: &str) -> BridgeResult<()> {
        match self {
            StorageBackend::Settings(store) => store.set_string(STORAGE_KEY, value).await,
            StorageBackend::Secure(store) => store.set_secret(STORAGE_KEY, value.as_bytes()).await,
        }
    }

    async fn remove(&self) -> BridgeResult<()> {
        match self {
            StorageBackend::Settings(store) => store.delete(STORAGE_KEY).await,
            StorageBackend::Secure(store) => store.delete_secret(STORAGE_KEY).await,
        }
    }
}

struct Inner {
    backend: StorageBackend,
    snapshot: RwLock<Option<SessionCredential>>,
    write_lock: Mutex<()>,
}

/// Shared handle to the device profile's session credential.
///
/// Cloning is cheap and every clone observes the same credential.
#[derive(Clone)]
pub struct CredentialStore {
    inner: Arc<Inner>,
}

impl CredentialStore {
    /// Open the store and load any persisted credential.
    ///
    /// A blank persisted value loads as absent.
    ///
    /// # Errors
    ///
    /// `AuthError::StoreUnavailable` if the durable store cannot be read.
    pub async fn open(backend: StorageBackend) -> Result<Self> {
        let stored = backend.read().await.map_err(|e| {
            warn!(backend = backend.name(), error = %e, "Failed to read stored credential");
            AuthError::StoreUnavailable(e.to_string())
        })?;

        let credential = stored.and_then(SessionCredential::new);

        debug!(
            backend = backend.name(),
            present = credential.is_some(),
            "Opened credential store"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                backend,
                snapshot: RwLock::new(credential),
                write_lock: Mutex::new(()),
            }),
        })
    }

    /// Open the store selected by `config`.
    ///
    /// Every call yields an independent handle: writes through one are not
    /// seen by another's snapshot. Open once and clone the handle.
    pub async fn from_config(config: &SessionConfig) -> Result<Self> {
        Self::open(StorageBackend::from_config(config)?).await
    }

    /// Durably store `credential`, replacing any previous one.
    ///
    /// On success every later [`get`](Self::get) observes the new credential.
    /// On failure the previous credential, if any, remains readable.
    pub async fn put(&self, credential: SessionCredential) -> std::result::Result<(), StoreWriteError> {
        let _writer = self.inner.write_lock.lock().await;

        if let Err(e) = self.inner.backend.write(credential.expose()).await {
            warn!(
                backend = self.inner.backend.name(),
                error = %e,
                "Failed to persist session credential"
            );
            return Err(StoreWriteError::new(e.to_string()));
        }

        let len = credential.len();
        *self
            .inner
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credential);

        info!(
            backend = self.inner.backend.name(),
            credential_len = len,
            "Stored session credential"
        );
        Ok(())
    }

    /// Current credential, or `None` when absent.
    pub fn get(&self) -> Option<SessionCredential> {
        self.inner
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_present(&self) -> bool {
        self.inner
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Remove the stored credential.
    ///
    /// The session core never calls this; it exists for the host's logout
    /// flow.
    pub async fn clear(&self) -> std::result::Result<(), StoreWriteError> {
        let _writer = self.inner.write_lock.lock().await;

        self.inner.backend.remove().await.map_err(|e| {
            warn!(backend = self.inner.backend.name(), error = %e, "Failed to clear session credential");
            StoreWriteError::new(e.to_string())
        })?;

        *self
            .inner
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;

        info!(backend = self.inner.backend.name(), "Cleared session credential");
        Ok(())
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("backend", &self.inner.backend.name())
            .field("present", &self.is_present())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::BridgeError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Mock implementation of SettingsStore for testing
    #[derive(Default)]
    struct MockSettingsStore {
        values: tokio::sync::Mutex<HashMap<String, String>>,
        fail_writes: AtomicBool,
        fail_reads: AtomicBool,
    }

    impl MockSettingsStore {
        fn with_value(key: &str, value: &str) -> Self {
            let store = Self::default();
            store
                .values
                .try_lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            store
        }
    }

    #[async_trait]
    impl SettingsStore for MockSettingsStore {
        async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(BridgeError::DatabaseError("disk full".to_string()));
            }
            self.values
                .lock()
                .await
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(BridgeError::NotAvailable("locked".to_string()));
            }
            Ok(self.values.lock().await.get(key).cloned())
        }

        async fn delete(&self, key: &str) -> BridgeResult<()> {
            self.values.lock().await.remove(key);
            Ok(())
        }

        async fn list_keys(&self) -> BridgeResult<Vec<String>> {
            Ok(self.values.lock().await.keys().cloned().collect())
        }
    }

    /// Mock implementation of SecureStore for testing
    #[derive(Default)]
    struct MockSecureStore {
        secrets: tokio::sync::Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl SecureStore for MockSecureStore {
        async fn set_secret(&self, key: &str, value: &[u8]) -> BridgeResult<()> {
            self.secrets
                .lock()
                .await
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn get_secret(&self, key: &str) -> BridgeResult<Option<Vec<u8>>> {
            Ok(self.secrets.lock().await.get(key).cloned())
        }

        async fn delete_secret(&self, key: &str) -> BridgeResult<()> {
            self.secrets.lock().await.remove(key);
            Ok(())
        }
    }

    fn credential(value: &str) -> SessionCredential {
        SessionCredential::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let settings = Arc::new(MockSettingsStore::default());
        let store = CredentialStore::open(StorageBackend::Settings(settings.clone()))
            .await
            .unwrap();

        assert!(!store.is_present());
        assert_eq!(store.get(), None);

        store.put(credential("abc.def.ghi")).await.unwrap();

        assert!(store.is_present());
        assert_eq!(store.get(), Some(credential("abc.def.ghi")));
        assert_eq!(
            settings.get_string(STORAGE_KEY).await.unwrap().as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[tokio::test]
    async fn test_put_overwrites_previous_credential() {
        let store = CredentialStore::open(StorageBackend::Settings(Arc::new(
            MockSettingsStore::default(),
        )))
        .await
        .unwrap();

        store.put(credential("first")).await.unwrap();
        store.put(credential("second")).await.unwrap();

        assert_eq!(store.get(), Some(credential("second")));
    }

    #[tokio::test]
    async fn test_open_loads_persisted_credential() {
        let settings = Arc::new(MockSettingsStore::with_value(STORAGE_KEY, "persisted"));
        let store = CredentialStore::open(StorageBackend::Settings(settings))
            .await
            .unwrap();

        assert_eq!(store.get(), Some(credential("persisted")));
    }

    #[tokio::test]
    async fn test_blank_persisted_value_loads_as_absent() {
        let settings = Arc::new(MockSettingsStore::with_value(STORAGE_KEY, "   "));
        let store = CredentialStore::open(StorageBackend::Settings(settings))
            .await
            .unwrap();

        assert!(!store.is_present());
    }

    #[tokio::test]
    async fn test_open_read_failure_is_store_unavailable() {
        let settings = MockSettingsStore::default();
        settings.fail_reads.store(true, Ordering::SeqCst);

        let result = CredentialStore::open(StorageBackend::Settings(Arc::new(settings))).await;
        assert!(matches!(result, Err(AuthError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_failed_put_keeps_previous_credential() {
        let settings = Arc::new(MockSettingsStore::default());
        let store = CredentialStore::open(StorageBackend::Settings(settings.clone()))
            .await
            .unwrap();

        store.put(credential("old")).await.unwrap();
        settings.fail_writes.store(true, Ordering::SeqCst);

        let err = store.put(credential("new")).await.unwrap_err();
        assert!(err.reason.contains("disk full"));
        assert_eq!(store.get(), Some(credential("old")));
    }

    #[tokio::test]
    async fn test_failed_first_put_leaves_store_empty() {
        let settings = MockSettingsStore::default();
        settings.fail_writes.store(true, Ordering::SeqCst);
        let store = CredentialStore::open(StorageBackend::Settings(Arc::new(settings)))
            .await
            .unwrap();

        assert!(store.put(credential("new")).await.is_err());
        assert!(!store.is_present());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = CredentialStore::open(StorageBackend::Settings(Arc::new(
            MockSettingsStore::default(),
        )))
        .await
        .unwrap();
        let other = store.clone();

        store.put(credential("shared")).await.unwrap();
        assert_eq!(other.get(), Some(credential("shared")));
    }

    #[tokio::test]
    async fn test_clear_removes_credential() {
        let settings = Arc::new(MockSettingsStore::default());
        let store = CredentialStore::open(StorageBackend::Settings(settings.clone()))
            .await
            .unwrap();

        store.put(credential("bye")).await.unwrap();
        store.clear().await.unwrap();

        assert!(!store.is_present());
        assert_eq!(settings.get_string(STORAGE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_secure_backend_round_trip() {
        let secure = Arc::new(MockSecureStore::default());
        let store = CredentialStore::open(StorageBackend::Secure(secure.clone()))
            .await
            .unwrap();

        store.put(credential("keychain")).await.unwrap();

        assert_eq!(
            secure.get_secret(STORAGE_KEY).await.unwrap(),
            Some(b"keychain".to_vec())
        );

        let reopened = CredentialStore::open(StorageBackend::Secure(secure))
            .await
            .unwrap();
        assert_eq!(reopened.get(), Some(credential("keychain")));
    }

    #[tokio::test]
    async fn test_secure_backend_invalid_utf8_is_absent() {
        let secure = Arc::new(MockSecureStore::default());
        secure.set_secret(STORAGE_KEY, &[0xff, 0xfe]).await.unwrap();

        let store = CredentialStore::open(StorageBackend::Secure(secure))
            .await
            .unwrap();
        assert!(!store.is_present());
    }

    #[tokio::test]
    async fn test_concurrent_puts_end_consistent() {
        let settings = Arc::new(MockSettingsStore::default());
        let store = CredentialStore::open(StorageBackend::Settings(settings.clone()))
            .await
            .unwrap();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.put(credential(&format!("c{}", i))).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let durable = settings.get_string(STORAGE_KEY).await.unwrap().unwrap();
        assert_eq!(store.get().unwrap().expose(), durable);
    }

    #[tokio::test]
    async fn test_debug_does_not_leak_credential() {
        let store = CredentialStore::open(StorageBackend::Settings(Arc::new(
            MockSettingsStore::with_value(STORAGE_KEY, "top-secret"),
        )))
        .await
        .unwrap();

        let debug = format!("{:?}", store);
        assert!(debug.contains("present: true"));
        assert!(!debug.contains("top-secret"));
    }
}
