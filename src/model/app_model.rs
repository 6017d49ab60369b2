//! Main application model with state management

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};

use super::playback::{PlayQueue, StepOutcome, TourState};
use super::types::{ItemId, TourItem, UiState};

/// Shared application state: the tour collection, the playback state
/// machine, the single active (audible) item and the UI flags.
pub struct AppModel {
    tours: Arc<RwLock<Vec<TourItem>>>,
    tour_state: Arc<Mutex<TourState>>,
    active_item: Arc<Mutex<Option<ItemId>>>,
    ui_state: Arc<Mutex<UiState>>,
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            tours: Arc::new(RwLock::new(Vec::new())),
            tour_state: Arc::new(Mutex::new(TourState::default())),
            active_item: Arc::new(Mutex::new(None)),
            ui_state: Arc::new(Mutex::new(UiState::default())),
        }
    }

    // ========================================================================
    // Tour collection
    // ========================================================================

    pub async fn set_tours(&self, tours: Vec<TourItem>) {
        *self.tours.write().await = tours;
    }

    pub async fn tours(&self) -> Vec<TourItem> {
        self.tours.read().await.clone()
    }

    // ========================================================================
    // Tour playback state
    // ========================================================================

    pub async fn is_tour_playing(&self) -> bool {
        self.tour_state.lock().await.is_playing()
    }

    pub async fn is_tour_paused(&self) -> bool {
        self.tour_state.lock().await.is_paused()
    }

    pub async fn current_step(&self) -> Option<usize> {
        self.tour_state.lock().await.step()
    }

    pub async fn current_step_item(&self) -> Option<TourItem> {
        self.tour_state.lock().await.current_item().cloned()
    }

    pub async fn start_tour(&self, queue: PlayQueue) -> Option<TourItem> {
        self.tour_state.lock().await.start(queue)
    }

    pub async fn pause_tour(&self) -> Option<TourItem> {
        self.tour_state.lock().await.pause()
    }

    pub async fn resume_tour(&self) -> Option<TourItem> {
        self.tour_state.lock().await.resume()
    }

    pub async fn finish_step(&self) -> StepOutcome {
        self.tour_state.lock().await.finish_step()
    }

    pub async fn arm_step_retry(&self) -> bool {
        self.tour_state.lock().await.arm_retry()
    }

    // ========================================================================
    // Active (audible) item
    // ========================================================================

    pub async fn active_item(&self) -> Option<ItemId> {
        *self.active_item.lock().await
    }

    pub async fn set_active_item(&self, id: Option<ItemId>) {
        *self.active_item.lock().await = id;
    }

    // ========================================================================
    // UI state
    // ========================================================================

    pub async fn set_loading(&self, loading: bool) {
        let mut state = self.ui_state.lock().await;
        state.is_loading = loading;
    }

    pub async fn is_loading(&self) -> bool {
        self.ui_state.lock().await.is_loading
    }

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn error_message(&self) -> Option<String> {
        self.ui_state.lock().await.error_message.clone()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed().as_secs() > 5 {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}
