//! Session Controller
//!
//! Orchestrates sign-in: exchange the identity token, persist the resulting
//! session credential, and report the device profile's [`AuthState`].
//!
//! ## State
//!
//! The controller keeps no authentication state of its own. [`state`] is
//! derived from the [`CredentialStore`] on every call, so a credential
//! persisted in a previous run makes the controller `Authenticated` from the
//! start, and a failed write never makes it look signed in.
//!
//! ## Example
//!
//! ```no_run
//! use core_auth::{IdentityToken, SessionController};
//! use core_runtime::config::SessionConfig;
//! # async fn example() -> core_auth::Result<()> {
//! let config = SessionConfig::builder()
//!     .backend_base_url("https://api.example.com")
//!     .build()?;
//! let session = SessionController::from_config(&config).await?;
//!
//! // Identity token obtained from the host's sign-in flow
//! let state = session.sign_in(IdentityToken::new("id-token")).await?;
//! assert!(state.is_authenticated());
//!
//! // Collaborators send backend requests through the authenticated client
//! let client = session.authenticated_client(config.http_client.clone());
//! # Ok(())
//! # }
//! ```
//!
//! [`state`]: SessionController::state

use crate::credential_store::CredentialStore;
use crate::error::{AuthError, Result};
use crate::exchange::TokenExchangeClient;
use crate::pipeline::{PipelineHttpClient, RequestAuthenticator, RequestPipeline};
use crate::types::{AuthState, IdentityToken};
use bridge_traits::http::HttpClient;
use core_runtime::config::{SessionConfig, DEFAULT_PROFILE};
use core_runtime::events::{CoreEvent, EventBus, SessionEvent};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Decrements the in-flight counter when a sign-in attempt ends.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Drives the session credential lifecycle for one device profile.
///
/// Concurrent `sign_in` calls are not deduplicated: each performs its own
/// exchange, and the last successful store write wins.
pub struct SessionController {
    exchange_client: TokenExchangeClient,
    store: CredentialStore,
    event_bus: Option<EventBus>,
    profile: String,
    in_flight: AtomicUsize,
}

impl SessionController {
    pub fn new(exchange_client: TokenExchangeClient, store: CredentialStore) -> Self {
        Self {
            exchange_client,
            store,
            event_bus: None,
            profile: DEFAULT_PROFILE.to_string(),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Publish session events on `event_bus`.
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Name the device profile in logs and events.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Wire a controller from configuration.
    ///
    /// Opens the configured credential store, builds the exchange client on
    /// the raw HTTP client and attaches a fresh event bus.
    ///
    /// Each call opens a separate [`CredentialStore`] with its own snapshot.
    /// Build one controller per profile and share it, or use
    /// [`with_store`](Self::with_store) to wire several controllers to the
    /// same store handle.
    ///
    /// # Errors
    ///
    /// `AuthError::StoreUnavailable` if the stored credential cannot be read.
    pub async fn from_config(config: &SessionConfig) -> Result<Self> {
        let store = CredentialStore::from_config(config).await?;
        Ok(Self::with_store(config, store))
    }

    /// Wire a controller from configuration around an already opened store.
    pub fn with_store(config: &SessionConfig, store: CredentialStore) -> Self {
        let exchange_client = TokenExchangeClient::from_config(config);

        let controller = Self::new(exchange_client, store)
            .with_profile(config.profile.clone())
            .with_event_bus(EventBus::new(config.event_bus_capacity));

        info!(
            profile = %controller.profile,
            state = %controller.state(),
            "Session controller ready"
        );

        controller
    }

    /// Exchange `identity_token` for a session credential and persist it.
    ///
    /// The identity token is dropped as soon as the exchange completes.
    ///
    /// # Errors
    ///
    /// - `AuthError::Exchange` if the exchange failed; nothing is written
    /// - `AuthError::StoreWrite` if the credential could not be persisted;
    ///   the state stays whatever the store still holds
    #[instrument(skip(self, identity_token), fields(profile = %self.profile))]
    pub async fn sign_in(&self, identity_token: IdentityToken) -> Result<AuthState> {
        let overlapping = self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        if overlapping > 0 {
            debug!(overlapping, "Sign-in started while another attempt is in flight");
        }

        self.emit(SessionEvent::SigningIn {
            profile: self.profile.clone(),
        });

        let exchanged = self.exchange_client.exchange(&identity_token).await;
        drop(identity_token);

        let credential = match exchanged {
            Ok(credential) => credential,
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Sign-in failed during exchange");
                return Err(self.fail(e.into()));
            }
        };

        if let Err(e) = self.store.put(credential).await {
            warn!(error = %e, "Sign-in failed while persisting credential");
            return Err(self.fail(e.into()));
        }

        info!("Signed in");
        self.emit(SessionEvent::SignedIn {
            profile: self.profile.clone(),
        });

        Ok(AuthState::Authenticated)
    }

    fn fail(&self, error: AuthError) -> AuthError {
        self.emit(SessionEvent::SignInFailed {
            profile: self.profile.clone(),
            kind: error.kind().to_string(),
            recoverable: error.is_recoverable(),
        });
        error
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(bus) = &self.event_bus {
            // No subscribers is not an error
            let _ = bus.emit(CoreEvent::Session(event));
        }
    }

    /// Current state, read from the credential store.
    pub fn state(&self) -> AuthState {
        if self.store.is_present() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn credential_store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn event_bus(&self) -> Option<&EventBus> {
        self.event_bus.as_ref()
    }

    /// Authenticator stage reading this controller's credential store.
    pub fn authenticator(&self) -> RequestAuthenticator {
        RequestAuthenticator::new(self.store.clone())
    }

    /// Request pipeline with the authenticator as its only stage.
    pub fn pipeline(&self) -> RequestPipeline {
        RequestPipeline::new().with_stage(Arc::new(self.authenticator()))
    }

    /// Wrap `inner` so every request it sends carries the session credential
    /// once one is stored.
    pub fn authenticated_client(&self, inner: Arc<dyn HttpClient>) -> PipelineHttpClient {
        PipelineHttpClient::new(inner, self.pipeline())
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("profile", &self.profile)
            .field("state", &self.state())
            .field("exchange_client", &self.exchange_client)
            .finish()
    }
}
