//! Shared HTTP plumbing for provider calls.
//!
//! One hyper client serves both providers. Every call is bounded by the
//! configured timeout; transport failures are reported as a small
//! transport-level error that each capability maps onto its own error kind.

use crate::error::{ExchangeError, ProfileError, RevokeError};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{CONTENT_TYPE, USER_AGENT};
use hyper::{Method, Request, StatusCode};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use std::time::Duration;
use tokio::time::timeout;

const USER_AGENT_VALUE: &str = concat!("menu-manager/", env!("CARGO_PKG_VERSION"));

type HttpsClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Transport-level failure of a single provider call.
#[derive(Debug)]
pub enum TransportError {
    Timeout(Duration),
    Network(String),
}

impl From<TransportError> for ExchangeError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout(d) => ExchangeError::Timeout(d),
            TransportError::Network(msg) => ExchangeError::Network(msg),
        }
    }
}

impl From<TransportError> for ProfileError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout(d) => ProfileError::Timeout(d),
            TransportError::Network(msg) => ProfileError::Network(msg),
        }
    }
}

impl From<TransportError> for RevokeError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout(d) => RevokeError::Timeout(d),
            TransportError::Network(msg) => RevokeError::Network(msg),
        }
    }
}

/// A fully-read provider response.
pub struct ProviderResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl ProviderResponse {
    /// A short body excerpt for error context. Upstream error pages can be
    /// large; the interesting part is at the front.
    pub fn context(&self) -> String {
        const MAX: usize = 256;
        let text = String::from_utf8_lossy(&self.body);
        text.chars().take(MAX).collect()
    }
}

/// Thin wrapper around a hyper client with a per-call deadline.
#[derive(Clone)]
pub struct ProviderHttp {
    client: HttpsClient,
    timeout: Duration,
}

impl ProviderHttp {
    /// Build a client that accepts both `https` (webpki roots) and plain
    /// `http` targets; the latter is what tests use to reach a local mock
    /// provider.
    pub fn new(call_timeout: Duration) -> Self {
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        Self {
            client: Client::builder(TokioExecutor::new()).build(https),
            timeout: call_timeout,
        }
    }

    pub async fn get(&self, url: &str) -> Result<ProviderResponse, TransportError> {
        self.send(Method::GET, url, None).await
    }

    pub async fn delete(&self, url: &str) -> Result<ProviderResponse, TransportError> {
        self.send(Method::DELETE, url, None).await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub async fn post_form(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<ProviderResponse, TransportError> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        self.send(Method::POST, url, Some(body)).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        form_body: Option<String>,
    ) -> Result<ProviderResponse, TransportError> {
        let mut builder = Request::builder()
            .method(method)
            .uri(url)
            .header(USER_AGENT, USER_AGENT_VALUE);
        if form_body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        }
        let request = builder
            .body(Full::new(Bytes::from(form_body.unwrap_or_default())))
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let response = timeout(self.timeout, async {
            let response = self
                .client
                .request(request)
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;
            let status = response.status();
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?
                .to_bytes();
            Ok::<_, TransportError>(ProviderResponse { status, body })
        })
        .await
        .map_err(|_| TransportError::Timeout(self.timeout))??;

        Ok(response)
    }
}

/// Append a query string to an endpoint URL.
pub fn with_query(endpoint: &str, params: &[(&str, &str)]) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{endpoint}?{query}")
}
