//! Request classification and the three cache strategies.
//!
//! Every outgoing request is classified by URL into exactly one policy,
//! evaluated in priority order: API endpoints, then media files, then
//! same-origin shell files, then passthrough. Each policy owns one named
//! cache and never touches the others.

use std::sync::Arc;

use async_trait::async_trait;

use crate::fetch::{FetchError, Fetcher, Request, Response};

use super::store::{API_CACHE, MEDIA_CACHE, NamedCache, SHELL_CACHE};

const API_ENDPOINTS: [&str; 2] = ["/wp-json/wp/v2/audio_tour", "/wp-json/wp/v2/media"];

const MEDIA_FILE_TYPES: [&str; 9] = [
    ".mp3", ".wav", ".mp4", ".webm", ".jpg", ".jpeg", ".png", ".gif", ".svg",
];

const SHELL_FILE_TYPES: [&str; 3] = [".js", ".css", ".html"];

/// Which policy claims a request. Total over all URLs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestClass {
    Api,
    Media,
    Shell,
    Passthrough,
}

/// Classify a request URL. First match wins; shell additionally requires
/// the request origin to equal the app's own origin.
pub fn classify(url: &str, app_origin: &str) -> RequestClass {
    let lowered = url.to_lowercase();

    if API_ENDPOINTS.iter().any(|m| lowered.contains(m)) {
        return RequestClass::Api;
    }
    if MEDIA_FILE_TYPES.iter().any(|ext| lowered.contains(ext)) {
        return RequestClass::Media;
    }
    if SHELL_FILE_TYPES.iter().any(|ext| lowered.contains(ext))
        && same_origin(&lowered, app_origin)
    {
        return RequestClass::Shell;
    }
    RequestClass::Passthrough
}

/// Scheme + authority of an absolute URL, or `None` for relative URLs.
fn origin_of(url: &str) -> Option<&str> {
    let scheme_end = url.find("://")?;
    let rest = &url[scheme_end + 3..];
    let authority_len = rest
        .find(['/', '?', '#'])
        .unwrap_or(rest.len());
    Some(&url[..scheme_end + 3 + authority_len])
}

fn same_origin(url: &str, app_origin: &str) -> bool {
    match origin_of(url) {
        Some(origin) => origin.eq_ignore_ascii_case(app_origin.trim_end_matches('/')),
        // Relative URLs can only have been issued against the app itself.
        None => true,
    }
}

/// Fetcher that applies the three-tier cache policy in front of an inner
/// transport.
pub struct CachingFetcher {
    inner: Arc<dyn Fetcher>,
    app_origin: String,
    api: NamedCache,
    media: NamedCache,
    shell: NamedCache,
}

impl CachingFetcher {
    pub fn new(inner: Arc<dyn Fetcher>, app_origin: impl Into<String>) -> Self {
        Self {
            inner,
            app_origin: app_origin.into(),
            api: NamedCache::new(API_CACHE),
            media: NamedCache::new(MEDIA_CACHE),
            shell: NamedCache::new(SHELL_CACHE),
        }
    }

    pub fn api_cache(&self) -> &NamedCache {
        &self.api
    }

    pub fn media_cache(&self) -> &NamedCache {
        &self.media
    }

    pub fn shell_cache(&self) -> &NamedCache {
        &self.shell
    }

    /// Stale-while-revalidate: a cached entry is served immediately and a
    /// detached refresh overwrites the entry for the next caller. Without a
    /// cached entry the caller waits on the network.
    async fn fetch_api(&self, request: Request) -> Result<Response, FetchError> {
        if let Some(cached) = self.api.get(&request).await {
            tracing::debug!(url = %request.url, "API cache hit, refreshing in background");
            let inner = self.inner.clone();
            let cache = self.api.clone();
            tokio::spawn(async move {
                match inner.fetch(request.clone()).await {
                    Ok(fresh) => cache.put(&request, fresh).await,
                    Err(e) => {
                        tracing::debug!(url = %request.url, error = %e, "Background API refresh failed")
                    }
                }
            });
            return Ok(cached);
        }

        match self.inner.fetch(request.clone()).await {
            Ok(response) => {
                self.api.put(&request, response.clone()).await;
                Ok(response)
            }
            Err(e) => Err(FetchError::NoCachedFallback {
                url: request.url.clone(),
                message: e.to_string(),
            }),
        }
    }

    /// Validate-cached-or-fetch: a hit must carry an audio content type;
    /// anything else (a captured error page, say) is evicted and refetched.
    /// First inserts are unconditional.
    async fn fetch_media(&self, request: Request) -> Result<Response, FetchError> {
        if let Some(cached) = self.media.get(&request).await {
            let valid = cached
                .content_type()
                .map(|ct| ct.starts_with("audio/"))
                .unwrap_or(false);
            if valid {
                return Ok(cached);
            }
            tracing::warn!(
                url = %request.url,
                content_type = ?cached.content_type(),
                "Evicting invalid media cache entry"
            );
            self.media.delete(&request).await;
        }

        let response = self.inner.fetch(request.clone()).await?;
        self.media.put(&request, response.clone()).await;
        Ok(response)
    }

    /// Cache-first: serve the cached entry if present, otherwise fetch,
    /// cache and serve.
    async fn fetch_shell(&self, request: Request) -> Result<Response, FetchError> {
        if let Some(cached) = self.shell.get(&request).await {
            return Ok(cached);
        }
        let response = self.inner.fetch(request.clone()).await?;
        self.shell.put(&request, response.clone()).await;
        Ok(response)
    }
}

#[async_trait]
impl Fetcher for CachingFetcher {
    async fn fetch(&self, request: Request) -> Result<Response, FetchError> {
        match classify(&request.url, &self.app_origin) {
            RequestClass::Api => self.fetch_api(request).await,
            RequestClass::Media => self.fetch_media(request).await,
            RequestClass::Shell => self.fetch_shell(request).await,
            RequestClass::Passthrough => self.inner.fetch(request).await,
        }
    }
}
