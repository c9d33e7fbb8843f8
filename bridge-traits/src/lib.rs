//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the session core and the
//! platform-specific pieces it depends on. The core never talks to the
//! network, the keychain or a preferences file directly; it goes through the
//! traits below so that desktop, mobile and test hosts can each supply their
//! own adapters.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP request execution
//!
//! ### Storage
//! - [`SettingsStore`](storage::SettingsStore) - Private key-value store (SharedPreferences/UserDefaults)
//! - [`SecureStore`](storage::SecureStore) - Credential persistence (Keychain/Keystore)
//!
//! ### Diagnostics
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Available |
//! | Android  | host-provided       | 📋 Planned |
//! | iOS      | host-provided       | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Adapters
//! should keep transport problems (`Transport`, `Timeout`) apart from generic
//! operation failures so the core can classify them without string matching.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single adapter instance can be
//! shared across async tasks behind an `Arc`.
//!
//! ## Examples
//!
//! ### Implementing HttpClient
//!
//! ```ignore
//! use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct MyHttpClient {
//!     client: reqwest::Client,
//! }
//!
//! #[async_trait]
//! impl HttpClient for MyHttpClient {
//!     async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
//!         // Implementation
//!         todo!()
//!     }
//! }
//! ```

pub mod error;
pub mod http;
pub mod logging;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use storage::{SecureStore, SettingsStore};
