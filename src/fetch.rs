//! HTTP transport abstraction behind the caching layer and the data client.
//!
//! Everything that talks to the network goes through the [`Fetcher`] trait so
//! tests can substitute scripted transports for the real reqwest client.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// How a request interacts with intermediate HTTP caches.
///
/// `Reload` maps to a `Cache-Control: no-cache` request header, the directive
/// the revalidation path uses to force a fresh copy from the origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CacheMode {
    #[default]
    Default,
    Reload,
}

/// An outgoing request, identified by method + URL.
#[derive(Clone, Debug)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub cache_mode: CacheMode,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            cache_mode: CacheMode::Default,
        }
    }

    pub fn with_cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// Identity of this request in the named caches.
    pub fn cache_key(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

/// A full response snapshot: status, headers and body.
///
/// Header names are stored lowercased. Snapshots are what the named caches
/// hold, so the body is `Bytes` and cloning is cheap.
#[derive(Clone, Debug)]
pub struct Response {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Errors surfaced by the fetch layer.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure reaching the network.
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// An API-policy request failed and no cached entry existed to fall
    /// back on. Propagated to the original caller, never swallowed.
    #[error("request failed with no cached fallback: {url}: {message}")]
    NoCachedFallback { url: String, message: String },
}

/// Asynchronous request transport.
///
/// Implemented by the real network client, by the caching layer wrapping it,
/// and by scripted stubs in tests.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: Request) -> Result<Response, FetchError>;
}

/// Real transport over reqwest.
pub struct NetworkFetcher {
    client: reqwest::Client,
}

impl NetworkFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for NetworkFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for NetworkFetcher {
    async fn fetch(&self, request: Request) -> Result<Response, FetchError> {
        let method = request
            .method
            .parse::<reqwest::Method>()
            .unwrap_or(reqwest::Method::GET);
        let mut builder = self.client.request(method, &request.url);
        if request.cache_mode == CacheMode::Reload {
            builder = builder.header(reqwest::header::CACHE_CONTROL, "no-cache");
        }

        let response = builder.send().await.map_err(|e| FetchError::Network {
            url: request.url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(|e| FetchError::Network {
            url: request.url.clone(),
            message: e.to_string(),
        })?;

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
