use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::USER_AGENT;
use crate::proxy::ProxySelector;
use crate::types::{ProductDetail, ProductId, ShopResponse};

/// Longest response body kept in a [`FetchError::Status`] message.
const MAX_ERROR_BODY: usize = 200;

/// Idle pooled connections are dropped after this long.
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Failure of a single shop request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// 404 carrying the shop's `{"status":"404","error":"Not Found"}` payload.
    #[error("404 - product not found")]
    NotFound,
    #[error("{status} - {body}")]
    Status { status: u16, body: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    fn status(status: u16, body: &str) -> Self {
        let body = match body.char_indices().nth(MAX_ERROR_BODY) {
            Some((idx, _)) => format!("{}...", &body[..idx]),
            None => body.to_string(),
        };
        Self::Status { status, body }
    }
}

/// Whether a 404 body is the shop's "product gone" payload rather than an
/// unrelated 404 (CDN, bad path).
pub fn is_not_found_payload(body: &str) -> bool {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return false;
    };
    let status_matches = match &value["status"] {
        serde_json::Value::String(s) => s == "404",
        serde_json::Value::Number(n) => n.as_u64() == Some(404),
        _ => false,
    };
    status_matches && value["error"].as_str() == Some("Not Found")
}

/// Remote catalog endpoints the monitor depends on.
#[async_trait]
pub trait ShopApi: Send + Sync {
    /// `GET /shop.json`: release week plus the full catalog.
    async fn shop(&self) -> Result<ShopResponse, FetchError>;

    /// `GET /shop/{id}.json`: per-style, per-size stock for one product.
    async fn product(&self, id: &ProductId) -> Result<ProductDetail, FetchError>;
}

/// `reqwest`-backed shop client. One pre-built client per proxy route.
pub struct ShopClient {
    base_url: String,
    direct: reqwest::Client,
    proxied: HashMap<String, reqwest::Client>,
    selector: ProxySelector,
}

impl ShopClient {
    pub fn new(base_url: &str, selector: ProxySelector) -> Result<Self> {
        let direct = build_client(None)?;
        let mut proxied = HashMap::new();
        if let Some(pool) = selector.pool() {
            for route in pool.routes() {
                proxied.insert(route.to_string(), build_client(Some(route))?);
            }
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            direct,
            proxied,
            selector,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn client(&self) -> &reqwest::Client {
        match self.selector.select() {
            Some(route) => self.proxied.get(route).unwrap_or(&self.direct),
            None => &self.direct,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let resp = self.client().get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        debug!("GET {url} -> {status} ({} bytes)", body.len());

        if status == reqwest::StatusCode::NOT_FOUND && is_not_found_payload(&body) {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::status(status.as_u16(), &body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ShopApi for ShopClient {
    async fn shop(&self) -> Result<ShopResponse, FetchError> {
        self.get_json(&format!("{}/shop.json", self.base_url)).await
    }

    async fn product(&self, id: &ProductId) -> Result<ProductDetail, FetchError> {
        self.get_json(&format!("{}/shop/{id}.json", self.base_url))
            .await
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
    headers.insert(
        header::ORIGIN,
        HeaderValue::from_static("https://www.supremenewyork.com"),
    );
    headers
}

/// Build a client with the shop's fixed headers, pinned to TLS 1.2.
fn build_client(proxy: Option<&str>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(default_headers())
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .min_tls_version(reqwest::tls::Version::TLS_1_2)
        .max_tls_version(reqwest::tls::Version::TLS_1_2)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT);

    if let Some(route) = proxy {
        let proxy = reqwest::Proxy::all(route)
            .with_context(|| format!("invalid proxy route {route}"))?;
        builder = builder.proxy(proxy);
    }

    builder.build().context("failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::ProxyPool;

    #[test]
    fn not_found_payload_with_string_status() {
        assert!(is_not_found_payload(r#"{"status":"404","error":"Not Found"}"#));
    }

    #[test]
    fn not_found_payload_with_numeric_status() {
        assert!(is_not_found_payload(r#"{"status":404,"error":"Not Found"}"#));
    }

    #[test]
    fn other_404_bodies_are_not_the_signal() {
        assert!(!is_not_found_payload("<html>Not Found</html>"));
        assert!(!is_not_found_payload(r#"{"status":"404","error":"Gone"}"#));
        assert!(!is_not_found_payload(r#"{"status":"500","error":"Not Found"}"#));
        assert!(!is_not_found_payload(""));
    }

    #[test]
    fn status_error_truncates_large_bodies() {
        let body = "x".repeat(1000);
        let err = FetchError::status(503, &body);
        let msg = err.to_string();
        assert!(msg.starts_with("503 - "));
        assert!(msg.ends_with("..."));
        assert!(msg.len() < 300);
        assert!(!err.is_not_found());
    }

    #[test]
    fn client_prebuilds_one_client_per_route() {
        let pool = ProxyPool::from_lines("1.2.3.4:8080\n1.2.3.4:8080\nlocalhost\n5.6.7.8:3128:u:p");
        let client =
            ShopClient::new("https://shop.test/", ProxySelector::with_pool(pool)).unwrap();
        assert_eq!(client.proxied.len(), 2);
        assert_eq!(client.base_url(), "https://shop.test");
    }
}
