//! WordPress REST client that assembles tour items.
//!
//! The backend exposes the tour as a custom post collection whose `acf`
//! block carries either resolved media objects or bare attachment ids; ids
//! are resolved in one batched `/media?include=...` lookup.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::fetch::{Fetcher, Request, Response};
use crate::{log_api_request, log_api_result};

use super::types::{MediaRef, Section, TourItem};

/// Raw collection record as the REST API returns it.
#[derive(Debug, Deserialize)]
struct TourRecord {
    id: u64,
    #[serde(default)]
    title: Rendered,
    #[serde(default)]
    acf: Acf,
}

#[derive(Debug, Default, Deserialize)]
struct Rendered {
    #[serde(default)]
    rendered: String,
}

#[derive(Debug, Default, Deserialize)]
struct Acf {
    #[serde(default)]
    sectie: Option<String>,
    #[serde(default)]
    naam: Option<String>,
    #[serde(default)]
    functie: Option<String>,
    #[serde(default)]
    beschrijving: Option<String>,
    #[serde(default)]
    visuals: Option<AcfMedia>,
    #[serde(default)]
    audio: Option<AcfMedia>,
}

/// An ACF media field: a bare attachment id, an already-resolved object, or
/// whatever else the CMS decides to send (treated as absent).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AcfMedia {
    Id(u64),
    Resolved { url: String, mime_type: String },
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
struct MediaItem {
    id: u64,
    source_url: String,
    mime_type: String,
}

/// Client for the audio tour collection endpoint.
///
/// All requests go through the injected [`Fetcher`], so they are subject to
/// whatever caching layer the host installed.
#[derive(Clone)]
pub struct WordPressClient {
    fetcher: Arc<dyn Fetcher>,
    base_url: String,
}

impl WordPressClient {
    /// `base_url` points at the `wp/v2` namespace, e.g.
    /// `https://cms.example.org/wp-json/wp/v2`.
    pub fn new(fetcher: Arc<dyn Fetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the full tour collection and assemble [`TourItem`]s.
    ///
    /// Two-phase: a `per_page=1` probe for the `X-WP-Total` header, then one
    /// request for the whole collection, then one batched media lookup.
    pub async fn fetch_audio_tours(&self) -> Result<Vec<TourItem>> {
        log_api_request!("fetch_audio_tours", base = %self.base_url);

        let result = self.fetch_audio_tours_inner().await;
        log_api_result!("fetch_audio_tours", result);
        result
    }

    async fn fetch_audio_tours_inner(&self) -> Result<Vec<TourItem>> {
        let probe = self
            .get(format!("{}/audio_tour?per_page=1", self.base_url))
            .await?;
        let total: usize = probe
            .header("x-wp-total")
            .and_then(|v| v.parse().ok())
            .context("collection response is missing the X-WP-Total header")?;

        let all = self
            .get(format!("{}/audio_tour?per_page={total}", self.base_url))
            .await?;
        let records: Vec<TourRecord> = all
            .json()
            .context("malformed audio tour collection payload")?;

        let attachment_ids: BTreeSet<u64> = records
            .iter()
            .flat_map(|r| [r.acf.visuals.as_ref(), r.acf.audio.as_ref()])
            .flatten()
            .filter_map(|field| match field {
                AcfMedia::Id(id) => Some(*id),
                _ => None,
            })
            .collect();

        let media_map = if attachment_ids.is_empty() {
            HashMap::new()
        } else {
            self.resolve_media(&attachment_ids).await?
        };

        let items: Vec<TourItem> = records
            .into_iter()
            .filter_map(|record| Self::into_item(record, &media_map))
            .collect();

        tracing::info!(count = items.len(), "Assembled tour items");
        Ok(items)
    }

    /// Resolve attachment ids to `{url, mime_type}` in one batch.
    async fn resolve_media(&self, ids: &BTreeSet<u64>) -> Result<HashMap<u64, MediaRef>> {
        let joined = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let response = self
            .get(format!(
                "{}/media?include={joined}&per_page=100",
                self.base_url
            ))
            .await?;
        let media: Vec<MediaItem> = response.json().context("malformed media lookup payload")?;

        tracing::debug!(requested = ids.len(), resolved = media.len(), "Media batch resolved");
        Ok(media
            .into_iter()
            .map(|m| {
                (
                    m.id,
                    MediaRef {
                        url: m.source_url,
                        mime_type: m.mime_type,
                    },
                )
            })
            .collect())
    }

    async fn get(&self, url: String) -> Result<Response> {
        let response = self.fetcher.fetch(Request::get(url.clone())).await?;
        if !response.is_success() {
            bail!("request to {url} failed with status {}", response.status);
        }
        Ok(response)
    }

    /// Warm the media cache: one fetch per audio URL and per video visual.
    ///
    /// Failures are logged and ignored; preloading is best-effort.
    pub async fn preload_media(&self, items: &[TourItem]) {
        let urls: Vec<String> = items
            .iter()
            .flat_map(|item| {
                let audio = item.audio_url.clone();
                let video = item
                    .visuals
                    .as_ref()
                    .filter(|v| v.is_video())
                    .map(|v| v.url.clone());
                [audio, video]
            })
            .flatten()
            .collect();

        tracing::debug!(count = urls.len(), "Preloading media");
        let fetches = urls.into_iter().map(|url| {
            let fetcher = self.fetcher.clone();
            async move {
                if let Err(e) = fetcher.fetch(Request::get(url.clone())).await {
                    tracing::debug!(url = %url, error = %e, "Media preload failed");
                }
            }
        });
        futures::future::join_all(fetches).await;
    }

    fn into_item(record: TourRecord, media_map: &HashMap<u64, MediaRef>) -> Option<TourItem> {
        // Records outside the known sections never reach the page.
        let section = Section::from_slug(record.acf.sectie.as_deref()?)?;

        let name = match record.acf.naam {
            Some(naam) if !naam.is_empty() => naam,
            _ => record.title.rendered,
        };

        let visuals = Self::resolve_ref(record.acf.visuals, media_map);
        let audio = Self::resolve_ref(record.acf.audio, media_map);

        Some(TourItem {
            id: record.id,
            name,
            section,
            visuals,
            audio_url: audio.map(|m| m.url),
            functie: record.acf.functie,
            beschrijving: record.acf.beschrijving,
        })
    }

    fn resolve_ref(
        field: Option<AcfMedia>,
        media_map: &HashMap<u64, MediaRef>,
    ) -> Option<MediaRef> {
        match field? {
            AcfMedia::Id(id) => media_map.get(&id).cloned(),
            AcfMedia::Resolved { url, mime_type } => Some(MediaRef { url, mime_type }),
            AcfMedia::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::{StubFetcher, response};

    const BASE: &str = "https://cms.example.org/wp-json/wp/v2";

    fn collection_json() -> String {
        serde_json::json!([
            {
                "id": 11,
                "title": { "rendered": "Willem" },
                "acf": {
                    "sectie": "ons_verhaal",
                    "naam": "Willem",
                    "functie": "Oprichter",
                    "beschrijving": "Over het begin.",
                    "visuals": 101,
                    "audio": 201
                }
            },
            {
                "id": 12,
                "title": { "rendered": "Atrium" },
                "acf": {
                    "sectie": "over_het_kantoor",
                    "naam": "",
                    "visuals": { "url": "https://cdn.example.com/atrium.jpg", "mime_type": "image/jpeg" },
                    "audio": { "url": "https://cdn.example.com/atrium.mp3", "mime_type": "audio/mpeg" }
                }
            },
            {
                "id": 13,
                "title": { "rendered": "Verdwaald" },
                "acf": { "sectie": "archief", "audio": 202 }
            },
            {
                "id": 14,
                "title": { "rendered": "Stil" },
                "acf": { "sectie": "onze_filosofie", "visuals": false, "audio": false }
            }
        ])
        .to_string()
    }

    fn media_json() -> String {
        serde_json::json!([
            { "id": 101, "source_url": "https://cdn.example.com/willem.jpg", "mime_type": "image/jpeg" },
            { "id": 201, "source_url": "https://cdn.example.com/willem.mp3", "mime_type": "audio/mpeg" }
        ])
        .to_string()
    }

    fn stub() -> StubFetcher {
        StubFetcher::new(|request| {
            let url = request.url.as_str();
            if url.contains("/audio_tour?per_page=1") {
                let mut probe = response(200, "application/json", b"[]");
                probe
                    .headers
                    .insert("x-wp-total".to_string(), "4".to_string());
                Ok(probe)
            } else if url.contains("/audio_tour?per_page=4") {
                Ok(response(200, "application/json", collection_json().as_bytes()))
            } else if url.contains("/media?include=") {
                Ok(response(200, "application/json", media_json().as_bytes()))
            } else {
                Ok(response(404, "text/html", b"not found"))
            }
        })
    }

    #[tokio::test]
    async fn assembles_items_resolving_numeric_and_object_refs() {
        let fetcher = Arc::new(stub());
        let client = WordPressClient::new(fetcher.clone(), BASE);

        let items = client.fetch_audio_tours().await.unwrap();
        // Record 13 has an unknown section and is dropped.
        assert_eq!(items.len(), 3);

        let willem = &items[0];
        assert_eq!(willem.id, 11);
        assert_eq!(
            willem.audio_url.as_deref(),
            Some("https://cdn.example.com/willem.mp3")
        );
        assert_eq!(
            willem.visuals.as_ref().map(|v| v.url.as_str()),
            Some("https://cdn.example.com/willem.jpg")
        );

        // Empty `naam` falls back to the rendered title.
        let atrium = &items[1];
        assert_eq!(atrium.name, "Atrium");
        assert_eq!(
            atrium.audio_url.as_deref(),
            Some("https://cdn.example.com/atrium.mp3")
        );

        // ACF `false` media fields read as absent.
        let stil = &items[2];
        assert!(stil.visuals.is_none());
        assert!(stil.audio_url.is_none());
    }

    #[tokio::test]
    async fn batches_distinct_attachment_ids_into_one_lookup() {
        let fetcher = Arc::new(stub());
        let client = WordPressClient::new(fetcher.clone(), BASE);
        client.fetch_audio_tours().await.unwrap();

        let media_requests: Vec<_> = fetcher
            .requests()
            .into_iter()
            .filter(|r| r.url.contains("/media?include="))
            .collect();
        assert_eq!(media_requests.len(), 1);
        assert!(media_requests[0].url.contains("include=101,201,202"));
        assert!(media_requests[0].url.contains("per_page=100"));
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_failure() {
        let fetcher = Arc::new(StubFetcher::new(|_| {
            Ok(response(503, "text/html", b"maintenance"))
        }));
        let client = WordPressClient::new(fetcher, BASE);

        let err = client.fetch_audio_tours().await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn preload_touches_audio_and_video_urls_only() {
        let fetcher = Arc::new(StubFetcher::new(|_| {
            Ok(response(200, "audio/mpeg", b"data"))
        }));
        let client = WordPressClient::new(fetcher.clone(), BASE);

        let items = vec![
            TourItem {
                id: 1,
                name: "Willem".to_string(),
                section: Section::OnsVerhaal,
                visuals: Some(MediaRef {
                    url: "https://cdn.example.com/willem.jpg".to_string(),
                    mime_type: "image/jpeg".to_string(),
                }),
                audio_url: Some("https://cdn.example.com/willem.mp3".to_string()),
                functie: None,
                beschrijving: None,
            },
            TourItem {
                id: 2,
                name: "Atrium".to_string(),
                section: Section::OverHetKantoor,
                visuals: Some(MediaRef {
                    url: "https://cdn.example.com/atrium.mp4".to_string(),
                    mime_type: "video/mp4".to_string(),
                }),
                audio_url: None,
                functie: None,
                beschrijving: None,
            },
        ];

        client.preload_media(&items).await;

        let urls: Vec<_> = fetcher.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls.len(), 2);
        assert!(urls.contains(&"https://cdn.example.com/willem.mp3".to_string()));
        // The image visual is not preloaded, the video visual is.
        assert!(urls.contains(&"https://cdn.example.com/atrium.mp4".to_string()));
    }
}
