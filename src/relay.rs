//! Outbound HTTP calls to payment providers.
//!
//! Every completed HTTP exchange comes back as a [`RelayResponse`] envelope,
//! tagged by [`RelayOutcome`]. Failures below HTTP (dns, refused connections,
//! broken bodies) are a [`RelayError`] and never produce an envelope.

use reqwest::{
    Client, Method, StatusCode,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde_json::Value;

use crate::error::RelayError;

fn json_media() -> HeaderValue {
    HeaderValue::from_static("application/json")
}

#[derive(Debug, Clone)]
pub struct RelayRequest {
    url: String,
    method: Method,
    headers: HeaderMap,
    body: Option<Value>,
}

impl RelayRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Appends `headers`, keeping every value and its order.
    pub fn with_headers(mut self, headers: &HeaderMap) -> Self {
        for (name, value) in headers {
            self.headers.append(name.clone(), value.clone());
        }
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub body: String,
    pub headers: HeaderMap,
}

impl RelayResponse {
    /// Envelope for any HTTP-level provider error. A missing header set is
    /// replaced by an empty one; content type is always forced to json.
    pub fn provider_error(status: StatusCode, body: String, headers: Option<HeaderMap>) -> Self {
        let mut headers = headers.unwrap_or_default();
        headers.insert(CONTENT_TYPE, json_media());

        let response = Self {
            status,
            body,
            headers,
        };

        tracing::debug!(?response, "provider_error_envelope");

        response
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelayOutcome {
    Success(RelayResponse),
    ProviderError(RelayResponse),
}

impl RelayOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RelayOutcome::Success(_))
    }

    pub fn envelope(&self) -> &RelayResponse {
        match self {
            RelayOutcome::Success(res) | RelayOutcome::ProviderError(res) => res,
        }
    }

    pub fn into_envelope(self) -> RelayResponse {
        match self {
            RelayOutcome::Success(res) | RelayOutcome::ProviderError(res) => res,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Relay {
    client: Client,
}

impl Relay {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    #[tracing::instrument(skip_all, fields(method = %request.method(), url = request.url()))]
    pub async fn execute(&self, request: &RelayRequest) -> Result<RelayOutcome, RelayError> {
        let result = self.send(request).await;

        if let Err(err) = &result {
            tracing::error!(?err, "relay_err");
        }

        result
    }

    async fn send(&self, request: &RelayRequest) -> Result<RelayOutcome, RelayError> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.url())
            .headers(outbound_headers(request.headers()));

        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let res = builder.send().await?;

        let status = res.status();

        tracing::debug!(relay_status = ?status);

        let headers = res.headers().clone();
        // buffered so the envelope and the logs see the same body
        let body = res.text().await?;

        if status.is_success() {
            return Ok(RelayOutcome::Success(RelayResponse {
                status,
                body,
                headers,
            }));
        }

        Ok(RelayOutcome::ProviderError(RelayResponse::provider_error(
            status,
            body,
            Some(headers),
        )))
    }
}

/// Forced json content type and accept first, then caller headers.
/// Caller values for those two are dropped.
fn outbound_headers(caller: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(caller.len() + 2);
    headers.insert(CONTENT_TYPE, json_media());
    headers.insert(ACCEPT, json_media());

    for (name, value) in caller {
        if *name == CONTENT_TYPE || *name == ACCEPT {
            tracing::debug!(header = %name, "relay_header_ignored");
            continue;
        }

        headers.append(name.clone(), value.clone());
    }

    headers
}
