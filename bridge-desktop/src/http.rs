//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("wearther-core/", env!("CARGO_PKG_VERSION"));

/// Reqwest-based HTTP client implementation
///
/// Provides HTTP operations with:
/// - Connection pooling via reqwest (rustls TLS)
/// - Single-attempt `execute`, opt-in retry with exponential backoff
/// - Transport failures classified as `Transport` or `Timeout`
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a new HTTP client with custom timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_max_idle_per_host(10)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                BridgeError::NotAvailable(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// Wrap an already configured reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Convert bridge HttpMethod to reqwest Method
    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
        }
    }

    /// Build reqwest request from bridge request
    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }

    fn classify_error(e: reqwest::Error) -> BridgeError {
        if e.is_timeout() {
            BridgeError::Timeout("Request timed out".to_string())
        } else if e.is_connect() {
            BridgeError::Transport(format!("Connection failed: {}", e))
        } else {
            BridgeError::Transport(e.to_string())
        }
    }

    fn is_retryable_status(status: u16) -> bool {
        status >= 500 || status == 429
    }

    async fn into_response(response: reqwest::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();

        let body = response.bytes().await.map_err(Self::classify_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn backoff_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
        if policy.use_exponential_backoff {
            // Saturate to the cap instead of overflowing on long policies
            2u32.checked_pow(attempt.saturating_sub(1))
                .and_then(|factor| policy.base_delay.checked_mul(factor))
                .map_or(policy.max_delay, |delay| delay.min(policy.max_delay))
        } else {
            policy.base_delay
        }
    }

    async fn execute_with_retry_internal(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let is_last_attempt = attempt >= max_attempts;

            debug!(
                attempt,
                max_attempts,
                method = ?request.method,
                url = %request.url,
                "Executing HTTP request"
            );

            match self.build_request(request.clone()).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();

                    if !Self::is_retryable_status(status) || is_last_attempt {
                        return Self::into_response(response).await;
                    }

                    warn!(status, attempt, "HTTP request failed with retryable status");
                }
                Err(e) => {
                    let error = Self::classify_error(e);
                    warn!(error = %error, attempt, "HTTP request failed");

                    if is_last_attempt {
                        return Err(error);
                    }
                }
            }

            let delay = Self::backoff_delay(&policy, attempt);
            debug!(delay_ms = delay.as_millis() as u64, "Retrying after delay");
            sleep(delay).await;
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.execute_with_retry_internal(request, RetryPolicy::single_attempt())
            .await
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        self.execute_with_retry_internal(request, policy).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_creation() {
        assert!(ReqwestHttpClient::new().is_ok());
        assert!(ReqwestHttpClient::with_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Get),
            reqwest::Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Post),
            reqwest::Method::POST
        );
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(ReqwestHttpClient::is_retryable_status(503));
        assert!(ReqwestHttpClient::is_retryable_status(429));
        assert!(!ReqwestHttpClient::is_retryable_status(401));
        assert!(!ReqwestHttpClient::is_retryable_status(200));
    }

    #[test]
    fn test_backoff_delay_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
            use_exponential_backoff: true,
        };

        assert_eq!(
            ReqwestHttpClient::backoff_delay(&policy, 1),
            Duration::from_millis(100)
        );
        assert_eq!(
            ReqwestHttpClient::backoff_delay(&policy, 2),
            Duration::from_millis(200)
        );
        assert_eq!(
            ReqwestHttpClient::backoff_delay(&policy, 5),
            Duration::from_millis(350)
        );
    }

    #[test]
    fn test_backoff_delay_saturates_for_late_attempts() {
        let policy = RetryPolicy {
            max_attempts: 40,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            use_exponential_backoff: true,
        };

        for attempt in [33, 34, 40, u32::MAX] {
            assert_eq!(
                ReqwestHttpClient::backoff_delay(&policy, attempt),
                Duration::from_secs(30)
            );
        }
    }

    #[test]
    fn test_fixed_backoff_ignores_attempt() {
        let policy = RetryPolicy {
            max_attempts: 40,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(30),
            use_exponential_backoff: false,
        };

        assert_eq!(
            ReqwestHttpClient::backoff_delay(&policy, 39),
            Duration::from_millis(250)
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = ReqwestHttpClient::with_timeout(Duration::from_secs(2)).unwrap();
        // Port 9 on localhost is the discard port and is closed on test machines
        let request = HttpRequest::new(HttpMethod::Post, "http://127.0.0.1:9/auth/exchange");

        let err = client.execute(request).await.unwrap_err();
        assert!(err.is_transport());
    }
}
