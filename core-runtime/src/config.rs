//! # Session Configuration Module
//!
//! Provides configuration management for the session core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `SessionConfig` holding the backend location, exchange policy and the host
//! capabilities the session core depends on. Validation is fail-fast: every
//! problem is reported by [`SessionConfigBuilder::build`] before any network
//! or storage work happens.
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - Performs the token exchange and authenticated requests
//! - `SettingsStore` - Persists the session credential (default backend)
//! - `SecureStore` - Persists the session credential (opt-in backend)
//!
//! Only the store selected by [`CredentialBackend`] is required. When the
//! `desktop-shims` feature is enabled, desktop-ready defaults are injected
//! for whichever of these is missing.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::SessionConfig;
//! use std::time::Duration;
//!
//! let config = SessionConfig::builder()
//!     .backend_base_url("https://api.example.com")
//!     .exchange_timeout(Duration::from_secs(15))
//!     .build()?;
//!
//! assert_eq!(config.exchange_url(), "https://api.example.com/auth/exchange");
//! # Ok::<(), core_runtime::Error>(())
//! ```
//!
//! ### From the environment
//!
//! ```ignore
//! use core_runtime::config::SessionConfigBuilder;
//!
//! // Reads `.env` if present, then WEARTHER_* variables
//! let config = SessionConfigBuilder::from_env()?.build()?;
//! # Ok::<(), core_runtime::Error>(())
//! ```

use crate::error::{Error, Result};
use bridge_traits::{HttpClient, SecureStore, SettingsStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Application name used to namespace default on-disk and keychain storage.
pub const APP_NAME: &str = "wearther";

/// Path of the token exchange endpoint relative to the backend base URL.
pub const DEFAULT_EXCHANGE_PATH: &str = "/auth/exchange";

/// Default upper bound on a single exchange attempt.
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest accepted exchange timeout.
pub const MAX_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(300);

/// Device profile used when none is configured.
pub const DEFAULT_PROFILE: &str = "default";

pub const ENV_BACKEND_URL: &str = "WEARTHER_BACKEND_URL";
pub const ENV_EXCHANGE_PATH: &str = "WEARTHER_EXCHANGE_PATH";
pub const ENV_EXCHANGE_TIMEOUT_SECS: &str = "WEARTHER_EXCHANGE_TIMEOUT_SECS";
pub const ENV_PROFILE: &str = "WEARTHER_PROFILE";

/// Which host store keeps the session credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialBackend {
    /// Private per-profile key/value settings (SharedPreferences equivalent)
    #[default]
    Settings,
    /// OS keychain / keystore
    Secure,
}

/// Session core configuration.
///
/// Use [`SessionConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct SessionConfig {
    /// Backend origin, e.g. `https://api.example.com`
    pub backend_base_url: String,

    /// Exchange endpoint path relative to `backend_base_url`
    pub exchange_path: String,

    /// Upper bound on one exchange attempt
    pub exchange_timeout: Duration,

    /// Device profile the credential is scoped to
    pub profile: String,

    /// Store selected for the session credential
    pub credential_backend: CredentialBackend,

    /// HTTP client used for the exchange and wrapped for authenticated requests
    pub http_client: Arc<dyn HttpClient>,

    /// Settings store (present when `credential_backend` is `Settings`)
    pub settings_store: Option<Arc<dyn SettingsStore>>,

    /// Secure store (present when `credential_backend` is `Secure`)
    pub secure_store: Option<Arc<dyn SecureStore>>,

    /// Buffer size of the session event bus
    pub event_bus_capacity: usize,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("backend_base_url", &self.backend_base_url)
            .field("exchange_path", &self.exchange_path)
            .field("exchange_timeout", &self.exchange_timeout)
            .field("profile", &self.profile)
            .field("credential_backend", &self.credential_backend)
            .field("http_client", &"HttpClient { ... }")
            .field(
                "settings_store",
                &self.settings_store.as_ref().map(|_| "SettingsStore { ... }"),
            )
            .field(
                "secure_store",
                &self.secure_store.as_ref().map(|_| "SecureStore { ... }"),
            )
            .field("event_bus_capacity", &self.event_bus_capacity)
            .finish()
    }
}

impl SessionConfig {
    /// Creates a new builder for constructing a `SessionConfig`.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Full URL of the exchange endpoint.
    ///
    /// Base and path are joined with exactly one `/` regardless of trailing
    /// or leading slashes on either side.
    pub fn exchange_url(&self) -> String {
        format!(
            "{}/{}",
            self.backend_base_url.trim_end_matches('/'),
            self.exchange_path.trim_start_matches('/')
        )
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Backend URL is an absolute http(s) URL with a host
    /// - Exchange path is not empty
    /// - Exchange timeout is within (0, 5 min]
    /// - Profile is a single non-empty path segment
    /// - The selected credential backend has a store
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.backend_base_url).map_err(|e| {
            Error::Config(format!(
                "Backend URL '{}' is not a valid URL: {}",
                self.backend_base_url, e
            ))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Backend URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(Error::Config("Backend URL must include a host".to_string()));
        }

        if self.exchange_path.trim_matches('/').trim().is_empty() {
            return Err(Error::Config("Exchange path cannot be empty".to_string()));
        }

        if self.exchange_timeout.is_zero() {
            return Err(Error::Config(
                "Exchange timeout must be greater than zero".to_string(),
            ));
        }

        if self.exchange_timeout > MAX_EXCHANGE_TIMEOUT {
            return Err(Error::Config(format!(
                "Exchange timeout exceeds maximum of {} seconds",
                MAX_EXCHANGE_TIMEOUT.as_secs()
            )));
        }

        validate_profile(&self.profile)?;

        if self.event_bus_capacity == 0 {
            return Err(Error::Config(
                "Event bus capacity must be greater than zero".to_string(),
            ));
        }

        match self.credential_backend {
            CredentialBackend::Settings if self.settings_store.is_none() => {
                Err(settings_store_missing_error())
            }
            CredentialBackend::Secure if self.secure_store.is_none() => {
                Err(secure_store_missing_error())
            }
            _ => Ok(()),
        }
    }
}

fn validate_profile(profile: &str) -> Result<()> {
    if profile.trim().is_empty() {
        return Err(Error::Config("Profile name cannot be empty".to_string()));
    }

    if profile.contains(['/', '\\']) || profile == "." || profile == ".." {
        return Err(Error::Config(format!(
            "Profile name '{}' must be a single path segment",
            profile
        )));
    }

    Ok(())
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required for the token exchange. \
                 Desktop: enable the 'desktop-shims' feature to use the default ReqwestHttpClient. \
                 Mobile: inject the platform HTTP stack."
            .to_string(),
    }
}

fn settings_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SettingsStore".to_string(),
        message: "SettingsStore implementation is required for credential persistence. \
                 Desktop: enable the 'desktop-shims' feature to use the default SqliteSettingsStore. \
                 Mobile: inject platform-native private preferences (SharedPreferences/UserDefaults)."
            .to_string(),
    }
}

fn secure_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SecureStore".to_string(),
        message: "SecureStore implementation is required when the secure credential backend is selected. \
                 Desktop: enable the 'desktop-shims' feature to use the default KeyringSecureStore. \
                 Mobile: inject platform-native secure storage (Keychain/Keystore)."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::new().map_err(|e| {
        Error::Internal(format!("Failed to initialize default HttpClient: {}", e))
    })?;

    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_secure_store(profile: &str) -> Result<Arc<dyn SecureStore>> {
    use bridge_desktop::KeyringSecureStore;

    let store: Arc<dyn SecureStore> = Arc::new(KeyringSecureStore::for_profile(profile));
    Ok(store)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_secure_store(_profile: &str) -> Result<Arc<dyn SecureStore>> {
    Err(secure_store_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_settings_store(profile: &str) -> Result<Arc<dyn SettingsStore>> {
    use bridge_desktop::SqliteSettingsStore;
    use std::thread;
    use tokio::runtime::{Builder, Handle};

    let init_store = |profile: String| -> Result<SqliteSettingsStore> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                Error::Internal(format!(
                    "Failed to create Tokio runtime for default settings store: {}",
                    e
                ))
            })?;

        runtime
            .block_on(SqliteSettingsStore::for_profile(APP_NAME, &profile))
            .map_err(|e| {
                Error::Internal(format!("Failed to initialize default SettingsStore: {}", e))
            })
    };

    // block_on panics inside a runtime, so build the store on a helper thread
    let store = match Handle::try_current() {
        Ok(_) => {
            let profile = profile.to_string();
            thread::spawn(move || init_store(profile))
                .join()
                .map_err(|_| {
                    Error::Internal(
                        "Worker thread panicked while creating default SettingsStore".to_string(),
                    )
                })??
        }
        Err(_) => init_store(profile.to_string())?,
    };

    let store: Arc<dyn SettingsStore> = Arc::new(store);
    Ok(store)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_settings_store(_profile: &str) -> Result<Arc<dyn SettingsStore>> {
    Err(settings_store_missing_error())
}

/// Builder for constructing [`SessionConfig`] instances.
///
/// The builder validates required dependencies and provides helpful error
/// messages.
#[derive(Default)]
pub struct SessionConfigBuilder {
    backend_base_url: Option<String>,
    exchange_path: Option<String>,
    exchange_timeout: Option<Duration>,
    profile: Option<String>,
    credential_backend: CredentialBackend,
    http_client: Option<Arc<dyn HttpClient>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    secure_store: Option<Arc<dyn SecureStore>>,
    event_bus_capacity: Option<usize>,
}

impl SessionConfigBuilder {
    /// Seed a builder from `.env` and the process environment.
    ///
    /// Reads `WEARTHER_BACKEND_URL`, `WEARTHER_EXCHANGE_PATH`,
    /// `WEARTHER_EXCHANGE_TIMEOUT_SECS` and `WEARTHER_PROFILE`. Unset
    /// variables leave the builder default in place.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when the timeout is not a whole number of
    /// seconds.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = ?path, "Loaded environment file");
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::default();

        if let Some(url) = lookup(ENV_BACKEND_URL) {
            builder = builder.backend_base_url(url);
        }

        if let Some(path) = lookup(ENV_EXCHANGE_PATH) {
            builder = builder.exchange_path(path);
        }

        if let Some(raw) = lookup(ENV_EXCHANGE_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|e| {
                Error::Config(format!(
                    "{} must be a whole number of seconds, got '{}': {}",
                    ENV_EXCHANGE_TIMEOUT_SECS, raw, e
                ))
            })?;
            builder = builder.exchange_timeout(Duration::from_secs(secs));
        }

        if let Some(profile) = lookup(ENV_PROFILE) {
            builder = builder.profile(profile);
        }

        Ok(builder)
    }

    /// Sets the backend origin (required).
    pub fn backend_base_url(mut self, url: impl Into<String>) -> Self {
        self.backend_base_url = Some(url.into());
        self
    }

    /// Overrides the exchange endpoint path (default `/auth/exchange`).
    pub fn exchange_path(mut self, path: impl Into<String>) -> Self {
        self.exchange_path = Some(path.into());
        self
    }

    /// Sets the exchange timeout (default 30 seconds).
    pub fn exchange_timeout(mut self, timeout: Duration) -> Self {
        self.exchange_timeout = Some(timeout);
        self
    }

    /// Sets the device profile (default `"default"`).
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Selects where the session credential is kept.
    pub fn credential_backend(mut self, backend: CredentialBackend) -> Self {
        self.credential_backend = backend;
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    /// Sets the event bus buffer size (default 100).
    pub fn event_bus_capacity(mut self, capacity: usize) -> Self {
        self.event_bus_capacity = Some(capacity);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// - `Error::Config` if the backend URL is missing or any value is invalid
    /// - `Error::CapabilityMissing` if a required host capability was not
    ///   injected and no desktop default is available
    pub fn build(self) -> Result<SessionConfig> {
        let backend_base_url = self.backend_base_url.ok_or_else(|| {
            Error::Config(format!(
                "Backend URL is required. Use .backend_base_url() or set {}.",
                ENV_BACKEND_URL
            ))
        })?;

        let profile = self
            .profile
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        // Reject bad profiles before any default store touches the disk
        validate_profile(&profile)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let mut settings_store = self.settings_store;
        let mut secure_store = self.secure_store;

        match self.credential_backend {
            CredentialBackend::Settings if settings_store.is_none() => {
                settings_store = Some(provide_default_settings_store(&profile)?);
            }
            CredentialBackend::Secure if secure_store.is_none() => {
                secure_store = Some(provide_default_secure_store(&profile)?);
            }
            _ => {}
        }

        let config = SessionConfig {
            backend_base_url,
            exchange_path: self
                .exchange_path
                .unwrap_or_else(|| DEFAULT_EXCHANGE_PATH.to_string()),
            exchange_timeout: self.exchange_timeout.unwrap_or(DEFAULT_EXCHANGE_TIMEOUT),
            profile,
            credential_backend: self.credential_backend,
            http_client,
            settings_store,
            secure_store,
            event_bus_capacity: self
                .event_bus_capacity
                .unwrap_or(crate::events::DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::{BridgeError, HttpRequest, HttpResponse};
    use std::collections::HashMap;

    struct MockHttpClient;

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn execute(
            &self,
            _request: HttpRequest,
        ) -> std::result::Result<HttpResponse, BridgeError> {
            Err(BridgeError::NotAvailable("mock".to_string()))
        }
    }

    struct MockSecureStore;

    #[async_trait]
    impl SecureStore for MockSecureStore {
        async fn set_secret(
            &self,
            _key: &str,
            _value: &[u8],
        ) -> std::result::Result<(), BridgeError> {
            Ok(())
        }

        async fn get_secret(
            &self,
            _key: &str,
        ) -> std::result::Result<Option<Vec<u8>>, BridgeError> {
            Ok(None)
        }

        async fn delete_secret(&self, _key: &str) -> std::result::Result<(), BridgeError> {
            Ok(())
        }
    }

    struct MockSettingsStore;

    #[async_trait]
    impl SettingsStore for MockSettingsStore {
        async fn set_string(
            &self,
            _key: &str,
            _value: &str,
        ) -> std::result::Result<(), BridgeError> {
            Ok(())
        }

        async fn get_string(&self, _key: &str) -> std::result::Result<Option<String>, BridgeError> {
            Ok(None)
        }

        async fn delete(&self, _key: &str) -> std::result::Result<(), BridgeError> {
            Ok(())
        }

        async fn list_keys(&self) -> std::result::Result<Vec<String>, BridgeError> {
            Ok(Vec::new())
        }
    }

    fn builder_with_mocks() -> SessionConfigBuilder {
        SessionConfig::builder()
            .backend_base_url("https://api.example.com")
            .http_client(Arc::new(MockHttpClient))
            .settings_store(Arc::new(MockSettingsStore))
    }

    #[test]
    fn test_builder_with_all_required_fields() {
        let config = builder_with_mocks().build().unwrap();

        assert_eq!(config.exchange_path, DEFAULT_EXCHANGE_PATH);
        assert_eq!(config.exchange_timeout, DEFAULT_EXCHANGE_TIMEOUT);
        assert_eq!(config.profile, DEFAULT_PROFILE);
        assert_eq!(config.credential_backend, CredentialBackend::Settings);
        assert_eq!(config.event_bus_capacity, 100);
        assert!(config.secure_store.is_none());
    }

    #[test]
    fn test_builder_requires_backend_url() {
        let result = SessionConfig::builder()
            .http_client(Arc::new(MockHttpClient))
            .settings_store(Arc::new(MockSettingsStore))
            .build();

        let err = result.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("Backend URL is required"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_settings_store() {
        let err = SessionConfig::builder()
            .backend_base_url("https://api.example.com")
            .http_client(Arc::new(MockHttpClient))
            .build()
            .unwrap_err();

        assert!(matches!(err, Error::CapabilityMissing { ref capability, .. } if capability == "SettingsStore"));
        assert!(err.to_string().contains("credential persistence"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_http_client() {
        let err = SessionConfig::builder()
            .backend_base_url("https://api.example.com")
            .settings_store(Arc::new(MockSettingsStore))
            .build()
            .unwrap_err();

        assert!(matches!(err, Error::CapabilityMissing { ref capability, .. } if capability == "HttpClient"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_secure_backend_requires_secure_store() {
        let err = builder_with_mocks()
            .credential_backend(CredentialBackend::Secure)
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("SecureStore"));
    }

    #[test]
    fn test_secure_backend_with_secure_store() {
        let config = SessionConfig::builder()
            .backend_base_url("https://api.example.com")
            .http_client(Arc::new(MockHttpClient))
            .secure_store(Arc::new(MockSecureStore))
            .credential_backend(CredentialBackend::Secure)
            .build()
            .unwrap();

        assert!(config.secure_store.is_some());
        assert!(config.settings_store.is_none());
    }

    #[test]
    fn test_exchange_url_joins_with_single_slash() {
        let cases = [
            ("https://api.example.com", "/auth/exchange"),
            ("https://api.example.com/", "/auth/exchange"),
            ("https://api.example.com/", "auth/exchange"),
            ("https://api.example.com", "auth/exchange"),
        ];

        for (base, path) in cases {
            let config = builder_with_mocks()
                .backend_base_url(base)
                .exchange_path(path)
                .build()
                .unwrap();
            assert_eq!(config.exchange_url(), "https://api.example.com/auth/exchange");
        }
    }

    #[test]
    fn test_exchange_url_keeps_base_path() {
        let config = builder_with_mocks()
            .backend_base_url("http://10.0.2.2:8080/api/")
            .build()
            .unwrap();

        assert_eq!(config.exchange_url(), "http://10.0.2.2:8080/api/auth/exchange");
    }

    #[test]
    fn test_validate_rejects_non_http_url() {
        for url in ["ftp://example.com", "not a url", "file:///tmp/x"] {
            let err = builder_with_mocks().backend_base_url(url).build().unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{url} should be rejected");
        }
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let err = builder_with_mocks()
            .exchange_timeout(Duration::ZERO)
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_validate_rejects_excessive_timeout() {
        let err = builder_with_mocks()
            .exchange_timeout(Duration::from_secs(301))
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("maximum"));

        assert!(builder_with_mocks()
            .exchange_timeout(MAX_EXCHANGE_TIMEOUT)
            .build()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_profiles() {
        for profile in ["", "  ", "a/b", "a\\b", ".."] {
            let result = builder_with_mocks().profile(profile).build();
            assert!(result.is_err(), "profile {profile:?} should be rejected");
        }
    }

    #[test]
    fn test_validate_rejects_empty_exchange_path() {
        assert!(builder_with_mocks().exchange_path("/").build().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_event_capacity() {
        assert!(builder_with_mocks().event_bus_capacity(0).build().is_err());
    }

    #[test]
    fn test_from_lookup_reads_variables() {
        let vars: HashMap<&str, &str> = [
            (ENV_BACKEND_URL, "https://env.example.com"),
            (ENV_EXCHANGE_PATH, "/v2/exchange"),
            (ENV_EXCHANGE_TIMEOUT_SECS, "12"),
            (ENV_PROFILE, "work"),
        ]
        .into_iter()
        .collect();

        let config = SessionConfigBuilder::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap()
            .http_client(Arc::new(MockHttpClient))
            .settings_store(Arc::new(MockSettingsStore))
            .build()
            .unwrap();

        assert_eq!(config.exchange_url(), "https://env.example.com/v2/exchange");
        assert_eq!(config.exchange_timeout, Duration::from_secs(12));
        assert_eq!(config.profile, "work");
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let result = SessionConfigBuilder::from_lookup(|key| {
            (key == ENV_EXCHANGE_TIMEOUT_SECS).then(|| "soon".to_string())
        });

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_config_debug_hides_capabilities() {
        let config = builder_with_mocks().build().unwrap();
        let debug = format!("{:?}", config);

        assert!(debug.contains("https://api.example.com"));
        assert!(debug.contains("HttpClient { ... }"));
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = builder_with_mocks().build().unwrap();
        let cloned = config.clone();
        assert_eq!(cloned.exchange_url(), config.exchange_url());
    }
}
