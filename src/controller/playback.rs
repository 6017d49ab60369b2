//! Tour and single-item playback control methods

use crate::fetch::{CacheMode, Request};
use crate::media::MediaSource;
use crate::model::{ItemId, SectionedTours, StepOutcome};

use super::TourController;

impl TourController {
    /// Tri-state tour toggle: pause while playing, resume while paused,
    /// otherwise build a fresh queue and start from step zero.
    pub async fn start_or_toggle_tour(&self) {
        let model = self.model.lock().await;

        if model.is_tour_playing().await {
            if let Some(item) = model.pause_tour().await {
                drop(model);
                if let Some(element) = self.media.element(item.id).await {
                    if !element.is_paused() {
                        element.pause();
                    }
                }
                tracing::info!(item = %item.name, "Tour paused");
            }
            return;
        }

        if model.is_tour_paused().await {
            if let Some(item) = model.resume_tour().await {
                drop(model);
                if let Some(element) = self.media.element(item.id).await {
                    if element.is_paused() {
                        element.play();
                    }
                }
                tracing::info!(item = %item.name, "Tour resumed");
            }
            return;
        }

        // Idle: build a fresh queue across the sections in fixed order.
        let tours = model.tours().await;
        let queue = SectionedTours::group(&tours).build_queue();
        if queue.is_empty() {
            tracing::debug!("No audio-bearing items, tour not started");
            return;
        }

        let Some(first) = model.start_tour(queue).await else {
            return;
        };
        model.set_active_item(Some(first.id)).await;
        drop(model);

        // Halt everything else before the first item sounds.
        self.media.stop_all_except(Some(first.id)).await;
        if let Some(element) = self.media.element(first.id).await {
            element.rewind();
            element.play();
        }
        self.media.reveal(first.id).await;
        tracing::info!(item = %first.name, "Tour started");
    }

    /// Toggle a single item's playback, independent of the tour queue.
    ///
    /// Every other sounding element is halted first, including the tour's
    /// current one; the queue and step are left untouched.
    pub async fn play_single(&self, item_id: ItemId) {
        self.media.stop_all_except(Some(item_id)).await;

        let Some(element) = self.media.element(item_id).await else {
            return;
        };

        let model = self.model.lock().await;
        if model.active_item().await == Some(item_id) && !element.is_paused() {
            element.pause();
            model.set_active_item(None).await;
            tracing::debug!(item_id, "Single playback paused");
        } else {
            element.play();
            model.set_active_item(Some(item_id)).await;
            drop(model);
            self.media.reveal(item_id).await;
            tracing::debug!(item_id, "Single playback started");
        }
    }

    /// The current step is over, either naturally or because recovery gave
    /// up. Move the tour forward.
    pub(crate) async fn finish_current_step(&self) {
        let model = self.model.lock().await;
        match model.finish_step().await {
            StepOutcome::Advanced(item) => {
                model.set_active_item(Some(item.id)).await;
                drop(model);
                self.media.stop_all_except(Some(item.id)).await;
                if let Some(element) = self.media.element(item.id).await {
                    element.rewind();
                    element.play();
                }
                self.media.reveal(item.id).await;
                tracing::info!(item = %item.name, "Advanced to next tour step");
            }
            StepOutcome::Finished => {
                model.set_active_item(None).await;
                drop(model);
                self.media.stop_all_except(None).await;
                tracing::info!("Tour finished");
            }
            StepOutcome::NotPlaying => {}
        }
    }

    /// Re-fetch an audio asset past every cached copy and materialize it as
    /// a blob source, or `None` if the response is not playable audio.
    pub(crate) async fn refresh_audio_source(&self, audio_url: &str) -> Option<MediaSource> {
        let request = Request::get(cache_busted(audio_url)).with_cache_mode(CacheMode::Reload);

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                let content_type = response.content_type().unwrap_or_default().to_string();
                if response.is_success() && content_type.starts_with("audio/") {
                    tracing::debug!(url = %audio_url, "Audio source revalidated");
                    Some(MediaSource::Blob {
                        bytes: response.body.clone(),
                        mime_type: content_type,
                    })
                } else {
                    tracing::warn!(
                        url = %audio_url,
                        status = response.status,
                        content_type = %content_type,
                        "Audio revalidation rejected"
                    );
                    None
                }
            }
            Err(e) => {
                tracing::warn!(url = %audio_url, error = %e, "Audio revalidation fetch failed");
                None
            }
        }
    }
}

/// Append a timestamp query parameter so the request misses every cache
/// keyed by URL.
fn cache_busted(url: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!(
        "{url}{separator}_cb={}",
        chrono::Utc::now().timestamp_millis()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_busting_picks_the_right_separator() {
        let plain = cache_busted("https://cdn.example.com/tour.mp3");
        assert!(plain.starts_with("https://cdn.example.com/tour.mp3?_cb="));

        let with_query = cache_busted("https://cdn.example.com/tour.mp3?v=2");
        assert!(with_query.starts_with("https://cdn.example.com/tour.mp3?v=2&_cb="));
    }
}
