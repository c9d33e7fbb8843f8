//! Identity Token Exchange
//!
//! Trades a third-party identity token for a backend session credential with
//! a single `POST <backend>/auth/exchange` call.
//!
//! ## Wire format
//!
//! ```text
//! POST /auth/exchange
//! Authorization: Bearer <identity token>
//! Content-Type: application/json
//! Accept: application/json
//! Content-Length: 0
//!
//! 200 OK
//! {"token": "<session credential>", ...}
//! ```
//!
//! Exactly one attempt is made. Retrying is the caller's decision, guided by
//! [`ExchangeError::is_recoverable`].

use crate::error::ExchangeError;
use crate::types::{ExchangeResponse, IdentityToken, SessionCredential};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, RetryPolicy};
use bytes::Bytes;
use core_runtime::config::SessionConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Client for the backend's token exchange endpoint.
///
/// Must be given the raw host HTTP client, not one wrapped in the
/// authenticated request pipeline: the exchange carries the identity token,
/// not the session credential.
#[derive(Clone)]
pub struct TokenExchangeClient {
    http_client: Arc<dyn HttpClient>,
    endpoint_url: String,
    timeout: Duration,
}

impl TokenExchangeClient {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        endpoint_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            endpoint_url: endpoint_url.into(),
            timeout,
        }
    }

    /// Client for `config.exchange_url()` using the configured HTTP client.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            Arc::clone(&config.http_client),
            config.exchange_url(),
            config.exchange_timeout,
        )
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn build_request(&self, identity_token: &IdentityToken) -> HttpRequest {
        HttpRequest::new(HttpMethod::Post, self.endpoint_url.clone())
            .bearer_token(identity_token.expose())
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .body(Bytes::new())
            .timeout(self.timeout)
    }

    /// Exchange `identity_token` for a session credential.
    ///
    /// # Errors
    ///
    /// - `ServerRejected(status)` for any non-2xx answer
    /// - `MalformedResponse` for a 2xx answer without a usable `token`
    /// - `TransportFailure` when no response arrived within the timeout
    #[instrument(skip(self, identity_token), fields(endpoint = %self.endpoint_url))]
    pub async fn exchange(
        &self,
        identity_token: &IdentityToken,
    ) -> Result<SessionCredential, ExchangeError> {
        let request = self.build_request(identity_token);

        debug!(timeout_ms = self.timeout.as_millis() as u64, "Sending token exchange request");

        let attempt = self
            .http_client
            .execute_with_retry(request, RetryPolicy::single_attempt());

        let response = match tokio::time::timeout(self.timeout, attempt).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(error = %e, "Token exchange request failed");
                return Err(ExchangeError::TransportFailure(e.to_string()));
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Token exchange timed out"
                );
                return Err(ExchangeError::TransportFailure(format!(
                    "no response within {} ms",
                    self.timeout.as_millis()
                )));
            }
        };

        if !response.is_success() {
            warn!(status = response.status, "Token exchange rejected");
            return Err(ExchangeError::ServerRejected(response.status));
        }

        let parsed = ExchangeResponse::from_body(&response.body).map_err(|e| {
            warn!(
                status = response.status,
                body_len = response.body.len(),
                error = %e,
                "Token exchange response unusable"
            );
            e
        })?;

        debug!(
            status = response.status,
            body_len = response.body.len(),
            "Token exchange succeeded"
        );

        Ok(parsed.token)
    }
}

impl std::fmt::Debug for TokenExchangeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenExchangeClient")
            .field("endpoint_url", &self.endpoint_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
