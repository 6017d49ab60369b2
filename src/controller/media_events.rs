//! Listener for host-reported media events
//!
//! The rendering layer forwards each element's `ended`/`error` occurrence
//! through the registry channel; this task turns them into tour state
//! transitions. Each event is handled exactly once.

use tokio::sync::mpsc::UnboundedReceiver;

use crate::media::MediaEvent;
use crate::model::ItemId;

use super::TourController;

impl TourController {
    pub fn start_media_event_listener(&self, mut events: UnboundedReceiver<MediaEvent>) {
        let controller = self.clone();
        tracing::info!("Starting media event listener");

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    MediaEvent::Ended(item_id) => {
                        tracing::debug!(item_id, "MediaEvent::Ended");
                        controller.handle_media_ended(item_id).await;
                    }
                    MediaEvent::Error(item_id) => {
                        tracing::debug!(item_id, "MediaEvent::Error");
                        controller.handle_media_error(item_id).await;
                    }
                }
            }
            tracing::debug!("Media event channel closed, listener shutting down");
        });
    }

    pub(crate) async fn handle_media_ended(&self, item_id: ItemId) {
        let model = self.model.lock().await;

        if model.current_step_item().await.map(|item| item.id) == Some(item_id) {
            if model.is_tour_playing().await {
                drop(model);
                self.finish_current_step().await;
            }
            // A paused tour ignores stray end events for its current item.
            return;
        }

        // A single-played item ran out; it is no longer audible.
        if model.active_item().await == Some(item_id) {
            model.set_active_item(None).await;
        }
    }

    /// Media error for an item. The tour's current step gets one recovery
    /// attempt (re-fetch past the caches, swap the source, play again);
    /// anything beyond that behaves like natural end-of-media.
    pub(crate) async fn handle_media_error(&self, item_id: ItemId) {
        let model = self.model.lock().await;

        let is_current_step = model.is_tour_playing().await
            && model.current_step_item().await.map(|item| item.id) == Some(item_id);
        if !is_current_step {
            // Errors outside the running tour just silence the item.
            if model.active_item().await == Some(item_id) {
                model.set_active_item(None).await;
            }
            return;
        }

        if !model.arm_step_retry().await {
            // The single recovery attempt for this step is spent; move on.
            drop(model);
            self.finish_current_step().await;
            return;
        }

        let audio_url = model
            .current_step_item()
            .await
            .and_then(|item| item.audio_url);
        drop(model);

        let Some(audio_url) = audio_url else {
            self.finish_current_step().await;
            return;
        };

        match self.refresh_audio_source(&audio_url).await {
            Some(source) => {
                if let Some(element) = self.media.element(item_id).await {
                    element.set_source(source);
                    element.play();
                    // If the retried playback fails too, the next error event
                    // finds the retry spent and the step is skipped.
                } else {
                    self.finish_current_step().await;
                }
            }
            None => self.finish_current_step().await,
        }
    }
}
