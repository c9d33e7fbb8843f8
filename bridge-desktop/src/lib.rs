//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides the host capabilities the session core needs,
//! backed by desktop-appropriate libraries:
//! - `HttpClient` using `reqwest`
//! - `SettingsStore` using a SQLite-backed key-value store
//! - `SecureStore` using the `keyring` crate
//!
//! ## Feature Flags
//!
//! - `secure-store`: Enable OS keychain integration (default)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SqliteSettingsStore};
//!
//! #[tokio::main]
//! async fn main() -> bridge_traits::error::Result<()> {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let settings = SqliteSettingsStore::for_profile("wearther", "default").await?;
//!
//!     // Use in session configuration
//!     Ok(())
//! }
//! ```

mod http;
mod settings;

#[cfg(feature = "secure-store")]
mod secure_store;

pub use http::ReqwestHttpClient;
pub use settings::SqliteSettingsStore;

#[cfg(feature = "secure-store")]
pub use secure_store::KeyringSecureStore;
