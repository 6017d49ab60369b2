//! Media element handles and the registry the rendering layer populates.
//!
//! The sequencer never constructs playback elements itself. The host creates
//! one element per card, registers it here by item id, and reports `ended`/
//! `error` through the registry's event channel. The controller only ever
//! addresses elements through this registry, which is also where the
//! one-audible-item invariant is enforced: everything except the item about
//! to sound is halted first.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{RwLock, mpsc};

use crate::model::ItemId;

/// Source for a media element: a remote URL, or an in-memory blob
/// materialized by the revalidation path.
#[derive(Clone, Debug)]
pub enum MediaSource {
    Url(String),
    Blob { bytes: Bytes, mime_type: String },
}

/// Playback element owned by the rendering layer.
///
/// Commands are fire-and-forget; outcomes come back as [`MediaEvent`]s.
pub trait MediaElement: Send + Sync {
    fn play(&self);
    fn pause(&self);
    /// Seek back to position zero.
    fn rewind(&self);
    fn is_paused(&self) -> bool;
    fn set_source(&self, source: MediaSource);
}

/// The visual card hosting an element. Revealed (scrolled into view and
/// focused) whenever its item becomes active.
pub trait CardHandle: Send + Sync {
    fn scroll_into_view(&self);
    fn focus(&self);
}

/// Discrete playback events reported by the host, one per occurrence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaEvent {
    Ended(ItemId),
    Error(ItemId),
}

#[derive(Clone)]
pub struct MediaRegistry {
    elements: Arc<RwLock<HashMap<ItemId, Arc<dyn MediaElement>>>>,
    cards: Arc<RwLock<HashMap<ItemId, Arc<dyn CardHandle>>>>,
    events: mpsc::UnboundedSender<MediaEvent>,
}

impl MediaRegistry {
    /// Create a registry together with the event stream the controller
    /// listens on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MediaEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let registry = Self {
            elements: Arc::new(RwLock::new(HashMap::new())),
            cards: Arc::new(RwLock::new(HashMap::new())),
            events,
        };
        (registry, receiver)
    }

    /// Called by the rendering layer when a card mounts.
    pub async fn register(
        &self,
        id: ItemId,
        element: Arc<dyn MediaElement>,
        card: Option<Arc<dyn CardHandle>>,
    ) {
        self.elements.write().await.insert(id, element);
        if let Some(card) = card {
            self.cards.write().await.insert(id, card);
        }
        tracing::trace!(id, "Media element registered");
    }

    /// Called by the rendering layer when a card unmounts.
    pub async fn unregister(&self, id: ItemId) {
        self.elements.write().await.remove(&id);
        self.cards.write().await.remove(&id);
    }

    pub async fn element(&self, id: ItemId) -> Option<Arc<dyn MediaElement>> {
        self.elements.read().await.get(&id).cloned()
    }

    /// Sender the host uses to report `ended`/`error` occurrences.
    pub fn emitter(&self) -> mpsc::UnboundedSender<MediaEvent> {
        self.events.clone()
    }

    /// Halt (pause + rewind) every element except `keep`.
    ///
    /// Runs before anything new starts sounding, so two items never overlap
    /// even transiently.
    pub async fn stop_all_except(&self, keep: Option<ItemId>) {
        let elements = self.elements.read().await;
        for (id, element) in elements.iter() {
            if Some(*id) == keep {
                continue;
            }
            element.pause();
            element.rewind();
        }
    }

    /// Bring the item's card into view and give it input focus.
    pub async fn reveal(&self, id: ItemId) {
        if let Some(card) = self.cards.read().await.get(&id) {
            card.scroll_into_view();
            card.focus();
        }
    }
}
