//! Controller module - Tour sequencing and media event handling
//!
//! This module contains the controller that drives tour playback against
//! the host-registered media elements. It is organized into submodules by
//! responsibility:
//!
//! - `playback`: Tour and single-item playback control methods
//! - `media_events`: Listener for host-reported media events

mod media_events;
mod playback;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::fetch::Fetcher;
use crate::media::MediaRegistry;
use crate::model::AppModel;

#[derive(Clone)]
pub struct TourController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) media: MediaRegistry,
    pub(crate) fetcher: Arc<dyn Fetcher>,
}

impl TourController {
    pub fn new(model: Arc<Mutex<AppModel>>, media: MediaRegistry, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            model,
            media,
            fetcher,
        }
    }
}
