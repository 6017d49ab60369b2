//! Named response caches.
//!
//! Three disjoint session-scoped stores, keyed by request identity
//! (method + URL), holding full response snapshots. Writes overwrite;
//! last writer wins.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::fetch::{Request, Response};

pub const SHELL_CACHE: &str = "audio-tour-shell";
pub const MEDIA_CACHE: &str = "audio-tour-media";
pub const API_CACHE: &str = "audio-tour-api";

#[derive(Clone)]
pub struct NamedCache {
    name: &'static str,
    entries: Arc<RwLock<HashMap<String, Response>>>,
}

impl NamedCache {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn get(&self, request: &Request) -> Option<Response> {
        self.entries.read().await.get(&request.cache_key()).cloned()
    }

    pub async fn put(&self, request: &Request, response: Response) {
        tracing::trace!(cache = self.name, url = %request.url, status = response.status, "Cache write");
        self.entries
            .write()
            .await
            .insert(request.cache_key(), response);
    }

    pub async fn delete(&self, request: &Request) -> bool {
        self.entries
            .write()
            .await
            .remove(&request.cache_key())
            .is_some()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::response;

    #[tokio::test]
    async fn put_overwrites_and_delete_reports_presence() {
        let cache = NamedCache::new(MEDIA_CACHE);
        let request = Request::get("https://cdn.example.com/tour.mp3");

        assert!(cache.get(&request).await.is_none());

        cache.put(&request, response(200, "text/html", b"oops")).await;
        cache.put(&request, response(200, "audio/mpeg", b"riff")).await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(
            cache.get(&request).await.and_then(|r| r
                .content_type()
                .map(str::to_string)),
            Some("audio/mpeg".to_string())
        );

        assert!(cache.delete(&request).await);
        assert!(!cache.delete(&request).await);
        assert!(cache.is_empty().await);
    }
}
