//! Integration tests for Storedesk.
//!
//! The tests run the real admin router in-process against [`StubBackend`],
//! an in-memory stand-in for the store REST backend that serves only the
//! endpoints the dashboard calls. No database or external service is
//! needed:
//!
//! ```bash
//! cargo test -p storedesk-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

use storedesk_admin::config::{AdminConfig, ImageLimits, StoreApiConfig};
use storedesk_admin::state::AppState;

/// Owner account accepted by the stub backend.
pub const OWNER_EMAIL: &str = "owner@shop.test";
/// Staff account accepted by the stub backend.
pub const STAFF_EMAIL: &str = "staff@shop.test";
/// Password for every stub account.
pub const PASSWORD: &str = "correct-horse-battery";
/// Store every stub account belongs to.
pub const STORE_ID: &str = "7";

const TOKEN: &str = "stub-token";
const SESSION_SECRET: &str =
    "b7Yq2LmZ9xVt4RcN8wPe3KsJ6hGd1FaU5oTi0QrXzCvBnMlKjHgFdSaPoIuYtRe4Wn8Hq";

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Default)]
struct StubData {
    products: Vec<Value>,
    next_id: u64,
    tokens_expired: bool,
}

/// In-memory store backend.
#[derive(Clone, Default)]
pub struct StubBackend {
    data: Arc<Mutex<StubData>>,
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default)]
    page: usize,
    #[serde(default = "default_size")]
    size: usize,
}

const fn default_size() -> usize {
    20
}

impl StubBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut StubData) -> R) -> R {
        let mut guard = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Seed a product and return its id.
    pub fn add_product(&self, name: &str, price: &str, in_stock: i64) -> String {
        self.with(|data| {
            data.next_id += 1;
            let id = data.next_id.to_string();
            data.products.push(json!({
                "id": data.next_id,
                "name": name,
                "category": "General",
                "price": price,
                "inStock": in_stock,
                "yellowLine": 10,
                "redLine": 3,
                "status": "ACTIVE",
                "images": [],
                "createdAt": "2026-01-15T09:30:00Z"
            }));
            id
        })
    }

    /// Products currently stored.
    #[must_use]
    pub fn products(&self) -> Vec<Value> {
        self.with(|data| data.products.clone())
    }

    /// Make every issued token invalid, as if it had expired.
    pub fn expire_tokens(&self) {
        self.with(|data| data.tokens_expired = true);
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        let expired = self.with(|data| data.tokens_expired);
        if bearer == Some(TOKEN) && !expired {
            Ok(())
        } else {
            Err(unauthorized("Token expired"))
        }
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/api/", get(|| async { "store backend" }))
            .route("/api/store/auth/login", post(login))
            .route("/api/store/{store_id}", get(store))
            .route(
                "/api/store/{store_id}/products",
                get(list_products).post(create_product),
            )
            .route("/api/store/{store_id}/products/{product_id}", get(get_product))
            .route("/api/store/{store_id}/{resource}", get(list_empty))
            .with_state(self.clone())
    }

    /// Serve the stub on an ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn spawn(&self) -> Result<SocketAddr, BoxError> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Ok(addr)
    }
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"message": message}))).into_response()
}

fn envelope(items: &[Value], page: usize, size: usize) -> Value {
    let size = size.max(1);
    let total_pages = items.len().div_ceil(size);
    let content: Vec<&Value> = items.iter().skip(page * size).take(size).collect();
    json!({
        "content": content,
        "page": page,
        "size": size,
        "totalElements": items.len(),
        "totalPages": total_pages
    })
}

async fn login(Json(body): Json<LoginBody>) -> Response {
    let role = match body.email.as_str() {
        OWNER_EMAIL => "OWNER",
        STAFF_EMAIL => "STAFF",
        _ => return unauthorized("Bad credentials"),
    };
    if body.password != PASSWORD {
        return unauthorized("Bad credentials");
    }
    Json(json!({
        "token": TOKEN,
        "storeId": STORE_ID.parse::<u64>().unwrap_or(7),
        "name": if role == "OWNER" { "Olivia Owner" } else { "Sam Staff" },
        "email": body.email,
        "role": role
    }))
    .into_response()
}

async fn store(
    State(stub): State<StubBackend>,
    headers: HeaderMap,
    Path(store_id): Path<String>,
) -> Response {
    if let Err(rejection) = stub.authorize(&headers) {
        return rejection;
    }
    Json(json!({
        "id": store_id,
        "name": "Corner Shop",
        "email": "hello@corner.test",
        "currency": "USD",
        "orderSettings": {"autoConfirm": false, "shippingFee": "5.00"}
    }))
    .into_response()
}

async fn list_products(
    State(stub): State<StubBackend>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    if let Err(rejection) = stub.authorize(&headers) {
        return rejection;
    }
    let products = stub.products();
    Json(envelope(&products, query.page, query.size)).into_response()
}

async fn create_product(
    State(stub): State<StubBackend>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Response {
    if let Err(rejection) = stub.authorize(&headers) {
        return rejection;
    }
    let product = stub.with(|data| {
        data.next_id += 1;
        let mut product = input;
        if let Some(fields) = product.as_object_mut() {
            fields.insert("id".to_string(), json!(data.next_id));
            fields.insert("images".to_string(), json!([]));
            fields.remove("imageIds");
        }
        data.products.push(product.clone());
        product
    });
    (StatusCode::CREATED, Json(product)).into_response()
}

async fn get_product(
    State(stub): State<StubBackend>,
    headers: HeaderMap,
    Path((_store_id, product_id)): Path<(String, String)>,
) -> Response {
    if let Err(rejection) = stub.authorize(&headers) {
        return rejection;
    }
    stub.products()
        .into_iter()
        .find(|p| p["id"].to_string() == product_id)
        .map_or_else(
            || (StatusCode::NOT_FOUND, Json(json!({"message": "No such product"}))).into_response(),
            |p| Json(p).into_response(),
        )
}

async fn list_empty(
    State(stub): State<StubBackend>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    if let Err(rejection) = stub.authorize(&headers) {
        return rejection;
    }
    Json(envelope(&[], query.page, query.size)).into_response()
}

/// Admin configuration pointing at a stub backend.
///
/// # Errors
///
/// Returns an error if the backend URL cannot be built.
pub fn test_config(backend: SocketAddr) -> Result<AdminConfig, BoxError> {
    Ok(AdminConfig {
        host: "127.0.0.1".parse()?,
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        session_secret: SecretString::from(SESSION_SECRET.to_string()),
        store_api: StoreApiConfig {
            base_url: Url::parse(&format!("http://{backend}/api/"))?,
            timeout: Duration::from_secs(5),
        },
        store_cache_ttl: Duration::from_secs(60),
        sync_poll_interval_ms: 2000,
        images: ImageLimits::default(),
        page_size: 20,
        static_dir: "../admin/static".to_string(),
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
        tls: None,
    })
}

/// The admin dashboard running against a fresh stub backend.
pub struct TestApp {
    pub base_url: String,
    pub backend: StubBackend,
    /// Keeps cookies; does not follow redirects so tests can assert them.
    pub client: reqwest::Client,
}

impl TestApp {
    /// Start a stub backend and the admin router on ephemeral ports.
    ///
    /// # Errors
    ///
    /// Returns an error if either server cannot start.
    pub async fn spawn() -> Result<Self, BoxError> {
        let backend = StubBackend::new();
        let backend_addr = backend.spawn().await?;

        let state = AppState::new(test_config(backend_addr)?)?;
        let app = storedesk_admin::app(state)?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            base_url: format!("http://{addr}"),
            backend,
            client,
        })
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sign in as `email` with the stub password.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub async fn login(&self, email: &str) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .post(self.url("/auth/login"))
            .form(&[("email", email), ("password", PASSWORD)])
            .send()
            .await
    }

    /// GET a path with the session cookie.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response, reqwest::Error> {
        self.client.get(self.url(path)).send().await
    }
}

/// `Location` header of a redirect, or `""`.
#[must_use]
pub fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use storedesk_admin::middleware::create_session_layer;

    #[test]
    fn test_fixture_secret_signs_cookies() {
        let config = test_config("127.0.0.1:9".parse().unwrap()).unwrap();
        assert!(SESSION_SECRET.len() >= 64);
        assert!(create_session_layer(&config).is_ok());
    }
}
