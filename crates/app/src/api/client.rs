//! HTTP client for the storefront REST backend.

use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned};
use storefront::identity::Identity;
use tracing::debug;
use url::Url;

use crate::api::ApiError;

/// Standard `{ message, data }` response wrapper.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, treating a missing one as a malformed response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when `data` is absent.
    pub fn into_data(self, what: &str) -> Result<T, ApiError> {
        self.data
            .ok_or_else(|| ApiError::malformed(format!("{what} is missing")))
    }
}

/// Thin wrapper over [`reqwest::Client`] rooted at the backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    http: Client,
}

impl ApiClient {
    /// Create a client for the backend at `base`.
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self::with_client(base, Client::new())
    }

    /// Create a client with a preconfigured [`reqwest::Client`].
    #[must_use]
    pub fn with_client(mut base: Url, http: Client) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Self { base, http }
    }

    /// Base URL every path is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve `path` against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the path does not form a valid URL.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|error| ApiError::Validation(format!("invalid request path {path}: {error}")))
    }

    /// Resolve `path` and append `segment` as one percent-encoded path segment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the path does not form a valid URL.
    pub fn url_with_segment(&self, path: &str, segment: &str) -> Result<Url, ApiError> {
        let mut url = self.url(path)?;

        url.path_segments_mut()
            .map_err(|()| ApiError::Validation(format!("cannot extend request path {path}")))?
            .pop_if_empty()
            .push(segment);

        Ok(url)
    }

    /// Start a request, attaching the identity header when one is given.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the path does not form a valid URL.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        identity: Option<&Identity>,
    ) -> Result<RequestBuilder, ApiError> {
        Ok(self.request_url(method, self.url(path)?, identity))
    }

    /// Start a request to an already resolved URL.
    pub fn request_url(
        &self,
        method: Method,
        url: Url,
        identity: Option<&Identity>,
    ) -> RequestBuilder {
        let mut request = self.http.request(method, url);

        if let Some(identity) = identity {
            let (name, value) = identity.header();
            request = request.header(name, value);
        }

        request
    }

    /// Send a request and decode the `{ message, data }` envelope.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an undecodable body.
    pub async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        self.send_raw(request).await
    }

    /// Send a request and decode the body as-is.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an undecodable body.
    pub async fn send_raw<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!(status = status.as_u16(), bytes = body.len(), "backend response");

        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &body));
        }

        decode(&body)
    }
}

/// Decode a success body; an empty body decodes as `{}`.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] when the body does not match `T`.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };

    serde_json::from_slice(body).map_err(ApiError::malformed)
}
