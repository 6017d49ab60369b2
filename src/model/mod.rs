//! Model module - Application state and data types
//!
//! This module contains the data structures and state management for the
//! tour. It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (sections, items, UI state)
//! - `playback`: The tour playback state machine and play queue
//! - `tour`: Section grouping and play-queue construction
//! - `wordpress`: WordPress REST client assembling tour items
//! - `app_model`: Main application model with state management methods

mod app_model;
mod playback;
mod tour;
mod types;
mod wordpress;

pub use types::{ItemId, MediaRef, Section, TourItem, UiState};

pub use playback::{PlayQueue, StepOutcome, TourState};

pub use tour::SectionedTours;

pub use wordpress::WordPressClient;

pub use app_model::AppModel;
