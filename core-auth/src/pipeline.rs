//! Outbound Request Pipeline
//!
//! Every request a collaborator sends to the backend passes through a
//! [`RequestPipeline`], an ordered list of [`RequestStage`]s. Stages never
//! mutate the request they are given; each returns a new request derived
//! from it.
//!
//! The [`RequestAuthenticator`] stage attaches the stored session credential
//! as `Authorization: Bearer <credential>`. [`PipelineHttpClient`] wraps a
//! host `HttpClient` so that requests issued through it are prepared by the
//! pipeline before being sent.
//!
//! ```no_run
//! use core_auth::{CredentialStore, PipelineHttpClient, RequestAuthenticator, RequestPipeline};
//! use bridge_traits::http::HttpClient;
//! use std::sync::Arc;
//! # fn example(store: CredentialStore, raw: Arc<dyn HttpClient>) {
//! let pipeline = RequestPipeline::new()
//!     .with_stage(Arc::new(RequestAuthenticator::new(store)));
//! let client = PipelineHttpClient::new(raw, pipeline);
//! # }
//! ```

use crate::credential_store::CredentialStore;
use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
use std::sync::Arc;
use tracing::trace;

/// Transforms an outbound request before it is sent.
///
/// Implementations take the request by shared reference and return a new
/// value; the input must stay untouched. Stages cannot fail: a stage that
/// has nothing to add returns an identical copy.
#[async_trait]
pub trait RequestStage: Send + Sync {
    async fn apply(&self, request: &HttpRequest) -> HttpRequest;

    /// Short identifier used in diagnostics.
    fn name(&self) -> &'static str;
}

/// Stage that forwards requests unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

#[async_trait]
impl RequestStage for PassThrough {
    async fn apply(&self, request: &HttpRequest) -> HttpRequest {
        request.clone()
    }

    fn name(&self) -> &'static str {
        "pass_through"
    }
}

/// Stage that attaches the stored session credential.
///
/// With no credential stored the request passes through unmodified; this is
/// the normal state before sign-in. With a credential stored, the result
/// carries exactly one `Authorization: Bearer <credential>` header, replacing
/// any authorization header already present. The stage reads the store's
/// in-memory snapshot only: no network, no writes, no waiting on I/O.
#[derive(Debug, Clone)]
pub struct RequestAuthenticator {
    store: CredentialStore,
}

impl RequestAuthenticator {
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }

    /// Synchronous form of [`RequestStage::apply`].
    pub fn authorize(&self, request: &HttpRequest) -> HttpRequest {
        match self.store.get() {
            Some(credential) => request.clone().bearer_token(credential.expose()),
            None => {
                trace!(url = %request.url, "No session credential, request left unauthenticated");
                request.clone()
            }
        }
    }
}

#[async_trait]
impl RequestStage for RequestAuthenticator {
    async fn apply(&self, request: &HttpRequest) -> HttpRequest {
        self.authorize(request)
    }

    fn name(&self) -> &'static str {
        "authenticator"
    }
}

/// Ordered sequence of request stages, applied first to last.
#[derive(Clone, Default)]
pub struct RequestPipeline {
    stages: Vec<Arc<dyn RequestStage>>,
}

impl RequestPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: Arc<dyn RequestStage>) -> Self {
        self.push(stage);
        self
    }

    pub fn push(&mut self, stage: Arc<dyn RequestStage>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run `request` through every stage and return the result.
    pub async fn prepare(&self, request: &HttpRequest) -> HttpRequest {
        let mut prepared = request.clone();
        for stage in &self.stages {
            prepared = stage.apply(&prepared).await;
        }
        prepared
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// `HttpClient` that prepares every request with a pipeline before
/// delegating to an inner client.
#[derive(Clone)]
pub struct PipelineHttpClient {
    inner: Arc<dyn HttpClient>,
    pipeline: RequestPipeline,
}

impl PipelineHttpClient {
    pub fn new(inner: Arc<dyn HttpClient>, pipeline: RequestPipeline) -> Self {
        Self { inner, pipeline }
    }

    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }
}

#[async_trait]
impl HttpClient for PipelineHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let prepared = self.pipeline.prepare(&request).await;
        self.inner.execute(prepared).await
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> BridgeResult<HttpResponse> {
        let prepared = self.pipeline.prepare(&request).await;
        self.inner.execute_with_retry(prepared, policy).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential_store::{StorageBackend, STORAGE_KEY};
    use crate::types::SessionCredential;
    use bridge_traits::http::HttpMethod;
    use bridge_traits::storage::SettingsStore;
    use bytes::Bytes;
    use mockall::mock;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MockSettingsStore {
        values: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl SettingsStore for MockSettingsStore {
        async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
            self.values
                .lock()
                .await
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
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

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    async fn empty_store() -> CredentialStore {
        CredentialStore::open(StorageBackend::Settings(Arc::new(MockSettingsStore::default())))
            .await
            .unwrap()
    }

    async fn store_with(value: &str) -> CredentialStore {
        let store = empty_store().await;
        store
            .put(SessionCredential::new(value).unwrap())
            .await
            .unwrap();
        store
    }

    fn base_request() -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, "https://api.example.com/forecast")
            .header("Accept", "application/json")
    }

    fn ok_response() -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    #[tokio::test]
    async fn test_pass_through_returns_identical_request() {
        let request = base_request().body(Bytes::from_static(b"payload"));
        assert_eq!(PassThrough.apply(&request).await, request);
    }

    #[tokio::test]
    async fn test_authenticator_without_credential_passes_through() {
        let authenticator = RequestAuthenticator::new(empty_store().await);
        let request = base_request();

        let prepared = authenticator.apply(&request).await;

        assert_eq!(prepared, request);
        assert_eq!(prepared.header_value("authorization"), None);
    }

    #[tokio::test]
    async fn test_authenticator_injects_bearer_credential() {
        let authenticator = RequestAuthenticator::new(store_with("abc.def.ghi").await);
        let request = base_request();

        let prepared = authenticator.apply(&request).await;

        assert_eq!(
            prepared.header_value("Authorization"),
            Some("Bearer abc.def.ghi")
        );
        assert_eq!(prepared.header_value("accept"), Some("application/json"));
        assert_eq!(prepared.url, request.url);
        assert_eq!(prepared.method, request.method);
        // The base request is left untouched
        assert_eq!(request.header_value("authorization"), None);
    }

    #[tokio::test]
    async fn test_authenticator_is_idempotent() {
        let authenticator = RequestAuthenticator::new(store_with("tok").await);
        let base = base_request();

        let first = authenticator.apply(&base).await;
        let second = authenticator.apply(&base).await;

        assert_eq!(first.headers, second.headers);
        assert_eq!(first, second);
        assert_eq!(first.header_value("authorization"), Some("Bearer tok"));

        // The input request is left untouched by both calls
        assert_eq!(base, base_request());
        assert_eq!(base.header_value("authorization"), None);
    }

    #[tokio::test]
    async fn test_authenticator_reapplied_to_own_output_is_stable() {
        let authenticator = RequestAuthenticator::new(store_with("tok").await);
        let request = base_request();

        let once = authenticator.apply(&request).await;
        let twice = authenticator.apply(&once).await;

        assert_eq!(once, twice);
        let auth_headers = twice
            .headers
            .keys()
            .filter(|k| k.eq_ignore_ascii_case("authorization"))
            .count();
        assert_eq!(auth_headers, 1);
    }

    #[tokio::test]
    async fn test_authenticator_replaces_existing_authorization() {
        let authenticator = RequestAuthenticator::new(store_with("fresh").await);
        let request = base_request().header("authorization", "Basic dXNlcjpwYXNz");

        let prepared = authenticator.apply(&request).await;

        assert_eq!(prepared.header_value("AUTHORIZATION"), Some("Bearer fresh"));
        assert_eq!(prepared.headers.len(), 2);
    }

    #[tokio::test]
    async fn test_authenticator_sees_credential_stored_later() {
        let store = empty_store().await;
        let authenticator = RequestAuthenticator::new(store.clone());
        let request = base_request();

        assert_eq!(authenticator.apply(&request).await, request);

        store
            .put(SessionCredential::new("late").unwrap())
            .await
            .unwrap();

        assert_eq!(
            authenticator.apply(&request).await.header_value("authorization"),
            Some("Bearer late")
        );
    }

    #[tokio::test]
    async fn test_pipeline_applies_stages_in_order() {
        struct Tag(&'static str);

        #[async_trait]
        impl RequestStage for Tag {
            async fn apply(&self, request: &HttpRequest) -> HttpRequest {
                let trail = request.header_value("x-trail").unwrap_or_default().to_string();
                request.clone().header("X-Trail", format!("{}{}", trail, self.0))
            }

            fn name(&self) -> &'static str {
                self.0
            }
        }

        let pipeline = RequestPipeline::new()
            .with_stage(Arc::new(Tag("a")))
            .with_stage(Arc::new(PassThrough))
            .with_stage(Arc::new(Tag("b")));

        let prepared = pipeline.prepare(&base_request()).await;

        assert_eq!(prepared.header_value("x-trail"), Some("ab"));
        assert_eq!(pipeline.stage_names(), vec!["a", "pass_through", "b"]);
        assert_eq!(pipeline.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_pipeline_is_identity() {
        let pipeline = RequestPipeline::new();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.prepare(&base_request()).await, base_request());
    }

    #[tokio::test]
    async fn test_pipeline_client_sends_prepared_request() {
        let mut inner = MockHttpClient::new();
        inner
            .expect_execute()
            .times(1)
            .withf(|req| req.header_value("authorization") == Some("Bearer wired"))
            .returning(|_| Ok(ok_response()));

        let pipeline = RequestPipeline::new()
            .with_stage(Arc::new(RequestAuthenticator::new(store_with("wired").await)));
        let client = PipelineHttpClient::new(Arc::new(inner), pipeline);

        let response = client.execute(base_request()).await.unwrap();
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_pipeline_client_without_credential_sends_unmodified() {
        let mut inner = MockHttpClient::new();
        inner
            .expect_execute()
            .times(1)
            .withf(|req| req == &base_request())
            .returning(|_| Ok(ok_response()));

        let pipeline = RequestPipeline::new()
            .with_stage(Arc::new(RequestAuthenticator::new(empty_store().await)));
        let client = PipelineHttpClient::new(Arc::new(inner), pipeline);

        client
            .execute_with_retry(base_request(), RetryPolicy::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_credential_key_is_jwt() {
        let settings = Arc::new(MockSettingsStore::default());
        settings.set_string(STORAGE_KEY, "from-disk").await.unwrap();
        let store = CredentialStore::open(StorageBackend::Settings(settings))
            .await
            .unwrap();

        let prepared = RequestAuthenticator::new(store).authorize(&base_request());
        assert_eq!(STORAGE_KEY, "jwt");
        assert_eq!(prepared.header_value("authorization"), Some("Bearer from-disk"));
    }
}
