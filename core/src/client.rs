//! The request pipeline shared by every Volley API operation.
//!
//! # Design
//! A call moves through four steps, each usable on its own:
//! 1. [`VolleyClient::build_request`] turns method, path, query and body into
//!    a plain-data `HttpRequest`. Nothing touches the network yet.
//! 2. [`VolleyClient::authorize`] attaches the bearer token and, when a scope
//!    is in effect, `X-Organization-ID`.
//! 3. [`VolleyClient::dispatch`] hands the request to the configured
//!    [`Transport`] and returns the fully-read response.
//! 4. [`decode`] / [`decode_empty`] branch on the status and turn the body
//!    into a typed value or an [`Error`].
//!
//! Resource operations in `crate::resources` are thin compositions of these
//! steps. The organization scope is read from the client at the moment a
//! request is authorized and is never snapshotted elsewhere.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, debug_span, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Result};
use crate::http::{
    HttpMethod, HttpRequest, HttpResponse, APPLICATION_JSON, AUTHORIZATION, CONTENT_TYPE,
    ORGANIZATION_ID,
};
use crate::query::QueryParams;
use crate::transport::{Transport, UreqTransport};

/// Blocking client for the Volley API.
///
/// Cloning is cheap: clones share the underlying transport (and its
/// connection pool) but each carries its own organization scope.
#[derive(Clone)]
pub struct VolleyClient {
    base_url: String,
    api_token: String,
    organization_id: Option<u64>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for VolleyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VolleyClient")
            .field("base_url", &self.base_url)
            .field("organization_id", &self.organization_id)
            .finish_non_exhaustive()
    }
}

/// Builder for [`VolleyClient`].
pub struct VolleyClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl VolleyClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn organization_id(mut self, organization_id: u64) -> Self {
        self.config.organization_id = Some(organization_id);
        self
    }

    /// Timeout for the default transport. Ignored when a custom transport
    /// is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn transport(self, transport: impl Transport + 'static) -> Self {
        self.shared_transport(Arc::new(transport))
    }

    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> VolleyClient {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(UreqTransport::with_timeout(self.config.timeout)));
        VolleyClient {
            base_url: self.config.base_url.trim_end_matches('/').to_string(),
            api_token: self.config.api_token,
            organization_id: self.config.organization_id,
            transport,
        }
    }
}

impl VolleyClient {
    /// Client for the production API with default settings.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self::builder(api_token).build()
    }

    pub fn builder(api_token: impl Into<String>) -> VolleyClientBuilder {
        Self::builder_from_config(ClientConfig::new(api_token))
    }

    pub fn builder_from_config(config: ClientConfig) -> VolleyClientBuilder {
        VolleyClientBuilder {
            config,
            transport: None,
        }
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self::builder_from_config(config).build()
    }

    /// Client configured from `VOLLEY_*` environment variables.
    pub fn from_env() -> Result<Self> {
        ClientConfig::from_env().map(Self::from_config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn organization_id(&self) -> Option<u64> {
        self.organization_id
    }

    /// Scope every subsequent request to `organization_id`.
    pub fn set_organization_id(&mut self, organization_id: u64) {
        self.organization_id = Some(organization_id);
    }

    pub fn clear_organization_id(&mut self) {
        self.organization_id = None;
    }

    /// A clone of this client bound to a different organization.
    pub fn with_organization_id(&self, organization_id: u64) -> Self {
        let mut client = self.clone();
        client.organization_id = Some(organization_id);
        client
    }

    // -----------------------------------------------------------------------
    // Pipeline
    // -----------------------------------------------------------------------

    /// Absolute URL for `path` with `query` appended.
    pub fn endpoint(&self, path: &str, query: &QueryParams) -> Result<Url> {
        let raw = format!("{}{path}", self.base_url);
        let mut url = Url::parse(&raw).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))?;
        query.append_to(&mut url);
        Ok(url)
    }

    /// Build an unauthenticated request. The body, if any, is serialized
    /// here so serialization failures surface before any I/O.
    pub fn build_request<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        query: &QueryParams,
    ) -> Result<HttpRequest>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path, query)?;
        request_for(method, url, body)
    }

    /// Attach credentials. `organization_id` is the scope for this request,
    /// normally [`organization_id()`](Self::organization_id).
    pub fn authorize(&self, request: &mut HttpRequest, organization_id: Option<u64>) {
        request.set_header(AUTHORIZATION, format!("Bearer {}", self.api_token));
        request.set_header(CONTENT_TYPE, APPLICATION_JSON);
        if let Some(id) = organization_id {
            request.set_header(ORGANIZATION_ID, id.to_string());
        }
    }

    /// Execute `request` on the configured transport.
    pub fn dispatch(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let span = debug_span!("volley_request", method = %request.method, url = %request.url);
        let _guard = span.enter();

        match self.transport.execute(request) {
            Ok(response) => {
                debug!(status = response.status, bytes = response.body.len(), "response received");
                Ok(response)
            }
            Err(err) => {
                warn!(error = %err, "request failed");
                Err(err)
            }
        }
    }

    /// Build, authorize with the client's current scope, dispatch and decode.
    pub fn execute<B, T>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        query: &QueryParams,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute_scoped(method, path, body, query, self.organization_id)
    }

    pub(crate) fn execute_scoped<B, T>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        query: &QueryParams,
        organization_id: Option<u64>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.build_request(method, path, body, query)?;
        self.authorize(&mut request, organization_id);
        decode(self.dispatch(&request)?)
    }

    pub(crate) fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_with_query(path, &QueryParams::new())
    }

    pub(crate) fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &QueryParams,
    ) -> Result<T> {
        self.execute::<(), T>(HttpMethod::Get, path, None, query)
    }

    pub(crate) fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(HttpMethod::Post, path, Some(body), &QueryParams::new())
    }

    pub(crate) fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(HttpMethod::Put, path, Some(body), &QueryParams::new())
    }

    /// Delete `path`. The response body is never parsed on success.
    pub(crate) fn delete(&self, path: &str) -> Result<()> {
        let mut request = self.build_request::<()>(HttpMethod::Delete, path, None, &QueryParams::new())?;
        self.authorize(&mut request, self.organization_id);
        decode_empty(self.dispatch(&request)?)
    }
}

pub(crate) fn request_for<B>(method: HttpMethod, url: Url, body: Option<&B>) -> Result<HttpRequest>
where
    B: Serialize + ?Sized,
{
    let body = body
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| Error::Serialization(e.to_string()))?;
    let mut request = HttpRequest::new(method, url.into());
    request.set_header(CONTENT_TYPE, APPLICATION_JSON);
    request.body = body;
    Ok(request)
}

/// Decode a response into `T`, or into an error for status >= 400.
pub fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| Error::Deserialization(e.to_string()))
}

/// Check a response for an error status without parsing a success body.
pub fn decode_empty(response: HttpResponse) -> Result<()> {
    check_status(&response)
}

/// Map status >= 400 to `Error::Api` when the body is the error envelope,
/// or to `Error::UnexpectedResponse` with the raw body when it is not.
fn check_status(response: &HttpResponse) -> Result<()> {
    if !response.is_error() {
        return Ok(());
    }
    match serde_json::from_str::<ApiError>(&response.body) {
        Ok(mut api) => {
            api.status = response.status;
            Err(Error::Api(api))
        }
        Err(_) => Err(Error::UnexpectedResponse {
            status: response.status,
            body: response.body.clone(),
        }),
    }
}
