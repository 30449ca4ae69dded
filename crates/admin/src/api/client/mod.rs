//! HTTP plumbing for the store backend.
//!
//! Endpoint methods live in the sibling modules, one per resource; this file
//! holds the shared client, URL building and status handling.

use std::sync::Arc;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use storedesk_core::StoreId;

use crate::config::StoreApiConfig;

use super::{
    StoreApiError,
    types::{ErrorBody, PageEnvelope},
};

mod auth;
mod employees;
mod images;
mod notifications;
mod orders;
mod products;
mod promotions;
mod store;
mod templates;

/// Page size used when walking a listing with [`StoreApiClient::fetch_all`].
pub const FETCH_ALL_PAGE_SIZE: usize = 100;

/// Upper bound on pages walked by `fetch_all`, in case a backend keeps
/// reporting more pages than it has.
const MAX_PAGES: usize = 500;

/// Longest backend error body echoed into an error message.
const MAX_ERROR_BODY: usize = 300;

/// Store REST backend client.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct StoreApiClient {
    inner: Arc<StoreApiClientInner>,
}

struct StoreApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl StoreApiClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `StoreApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &StoreApiConfig) -> Result<Self, StoreApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("storedesk-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // `Url::join` drops the last segment unless the base ends in '/'.
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(StoreApiClientInner { client, base_url }),
        })
    }

    /// Base URL every endpoint path is joined onto.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Check the backend answers at all. Any HTTP response counts; only
    /// connection failures and timeouts are errors.
    ///
    /// # Errors
    ///
    /// Returns `StoreApiError::Http` if the backend cannot be reached.
    pub async fn ping(&self) -> Result<(), StoreApiError> {
        self.inner
            .client
            .get(self.inner.base_url.clone())
            .send()
            .await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(
        &self,
        method: reqwest::Method,
        token: Option<&str>,
        path: &str,
    ) -> Result<RequestBuilder, StoreApiError> {
        let builder = self.inner.client.request(method, self.endpoint(path)?);
        Ok(match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Send a request and decode a JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<T, StoreApiError> {
        let response = Self::check(request.send().await?, path).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send a request whose response body is irrelevant.
    async fn send_empty(&self, request: RequestBuilder, path: &str) -> Result<(), StoreApiError> {
        Self::check(request.send().await?, path).await?;
        Ok(())
    }

    /// Map non-success statuses onto `StoreApiError`.
    async fn check(response: Response, path: &str) -> Result<Response, StoreApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(StoreApiError::Unauthorized),
            StatusCode::NOT_FOUND => Err(StoreApiError::NotFound(path.to_string())),
            _ => {
                let body = response.text().await.unwrap_or_default();
                let message = error_message(status, &body);
                tracing::warn!(status = status.as_u16(), path, %message, "Backend request failed");
                Err(StoreApiError::Status {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, token: &str, path: &str) -> Result<T, StoreApiError> {
        let request = self.request(reqwest::Method::GET, Some(token), path)?;
        self.send_json(request, path).await
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        page: usize,
        size: usize,
    ) -> Result<PageEnvelope<T>, StoreApiError> {
        let request = self
            .request(reqwest::Method::GET, Some(token), path)?
            .query(&[("page", page), ("size", size)]);
        self.send_json(request, path).await
    }

    /// Walk a paging endpoint from the first page to the last and collect
    /// every item.
    ///
    /// # Errors
    ///
    /// Fails on the first page that fails; partial results are discarded.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
    ) -> Result<Vec<T>, StoreApiError> {
        let mut items = Vec::new();
        for page in 0..MAX_PAGES {
            let envelope: PageEnvelope<T> =
                self.get_page(token, path, page, FETCH_ALL_PAGE_SIZE).await?;
            let last = envelope.is_last();
            items.extend(envelope.content);
            if last {
                return Ok(items);
            }
        }
        tracing::warn!(path, max_pages = MAX_PAGES, "Stopped walking listing at page limit");
        Ok(items)
    }

    async fn post_json<B, T>(&self, token: &str, path: &str, body: &B) -> Result<T, StoreApiError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(reqwest::Method::POST, Some(token), path)?
            .json(body);
        self.send_json(request, path).await
    }

    async fn put_json<B, T>(&self, token: &str, path: &str, body: &B) -> Result<T, StoreApiError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(reqwest::Method::PUT, Some(token), path)?
            .json(body);
        self.send_json(request, path).await
    }

    async fn put_empty<B>(
        &self,
        token: &str,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), StoreApiError>
    where
        B: serde::Serialize + ?Sized,
    {
        let mut request = self.request(reqwest::Method::PUT, Some(token), path)?;
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send_empty(request, path).await
    }

    async fn delete(&self, token: &str, path: &str) -> Result<(), StoreApiError> {
        let request = self.request(reqwest::Method::DELETE, Some(token), path)?;
        self.send_empty(request, path).await
    }
}

/// Path of a resource collection under a store, with the id encoded.
fn store_path(store_id: &StoreId, rest: &str) -> String {
    let store = urlencoding::encode(store_id.as_str());
    if rest.is_empty() {
        format!("store/{store}")
    } else {
        format!("store/{store}/{rest}")
    }
}

/// Pull a human-readable message out of an error body.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(base: &str) -> StoreApiClient {
        StoreApiClient::new(&StoreApiConfig {
            base_url: Url::parse(base).unwrap(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = client("https://api.storedesk.test/v1");
        assert_eq!(
            api.endpoint("store/42/products").unwrap().as_str(),
            "https://api.storedesk.test/v1/store/42/products"
        );
        assert_eq!(
            api.endpoint("/store/auth/login").unwrap().as_str(),
            "https://api.storedesk.test/v1/store/auth/login"
        );
    }

    #[test]
    fn test_store_path_encodes_id() {
        assert_eq!(store_path(&StoreId::new("42"), "orders"), "store/42/orders");
        assert_eq!(store_path(&StoreId::new("a/b"), ""), "store/a%2Fb");
    }

    #[test]
    fn test_error_message_prefers_backend_message() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message":"Code already exists"}"#),
            "Code already exists"
        );
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "  "), "Bad Gateway");
        assert_eq!(error_message(StatusCode::CONFLICT, "plain text"), "plain text");
        assert_eq!(
            error_message(StatusCode::CONFLICT, &"x".repeat(1000)).len(),
            MAX_ERROR_BODY
        );
    }
}
