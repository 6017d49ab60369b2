//! Audio tour playback core.
//!
//! Two cooperating components connected only by the requests the host
//! issues: the tour sequencer (queue playback with pause/resume,
//! auto-advance and a single-retry recovery path) and the caching fetch
//! layer (three named caches with per-request-class strategies). The
//! rendering layer stays outside: it registers media-element and card
//! handles with [`media::MediaRegistry`] and feeds playback events back
//! through the registry's event channel.

pub mod cache;
pub mod controller;
pub mod fetch;
pub mod logging;
pub mod media;
pub mod model;

pub use controller::TourController;
pub use model::AppModel;
