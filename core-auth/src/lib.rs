//! # Session Authentication
//!
//! Session credential lifecycle for a device profile.
//!
//! ## Overview
//!
//! A host signs the user in with a third-party identity provider and hands
//! the resulting identity token to [`SessionController::sign_in`]. The
//! controller trades it for a backend session credential, persists the
//! credential under a fixed key, and from then on every request sent through
//! [`SessionController::authenticated_client`] carries it as a bearer token.
//!
//! ## Components
//!
//! - [`CredentialStore`]: durable single-slot storage with a synchronous
//!   in-memory snapshot
//! - [`TokenExchangeClient`]: `POST /auth/exchange` with the identity token
//! - [`RequestAuthenticator`]: request stage injecting `Authorization`
//! - [`SessionController`]: sign-in orchestration and derived [`AuthState`]

pub mod credential_store;
pub mod error;
pub mod exchange;
pub mod pipeline;
pub mod session;
pub mod types;

pub use credential_store::{CredentialStore, StorageBackend, STORAGE_KEY};
pub use error::{AuthError, ExchangeError, Result, StoreWriteError};
pub use exchange::TokenExchangeClient;
pub use pipeline::{
    PassThrough, PipelineHttpClient, RequestAuthenticator, RequestPipeline, RequestStage,
};
pub use session::SessionController;
pub use types::{AuthState, ExchangeResponse, IdentityToken, SessionCredential};
