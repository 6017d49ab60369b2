//! Tour playback state machine.
//!
//! Pure state: no media elements, no clocks, no channels. The controller
//! feeds it events (toggle, end-of-media, error) and drives whatever item
//! the transition hands back. This keeps every transition testable without
//! a media backend.

use super::types::TourItem;

/// Ordered queue of audio-bearing items for one tour run.
///
/// Built once per tour start, never mutated in place during playback.
#[derive(Clone, Debug, Default)]
pub struct PlayQueue {
    items: Vec<TourItem>,
}

impl PlayQueue {
    /// Items without audio are dropped; order is otherwise preserved.
    pub fn new(items: Vec<TourItem>) -> Self {
        Self {
            items: items.into_iter().filter(TourItem::has_audio).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, step: usize) -> Option<&TourItem> {
        self.items.get(step)
    }

    pub fn items(&self) -> &[TourItem] {
        &self.items
    }
}

/// Playback state of the tour.
///
/// `step` indexes into the queue and only ever moves forward while playing.
/// `retried` guards the single recovery attempt per step; it resets on every
/// step change and survives a pause/resume.
#[derive(Clone, Debug, Default)]
pub enum TourState {
    #[default]
    Idle,
    Playing {
        queue: PlayQueue,
        step: usize,
        retried: bool,
    },
    Paused {
        queue: PlayQueue,
        step: usize,
        retried: bool,
    },
}

/// What completing the current step means for the caller.
#[derive(Clone, Debug)]
pub enum StepOutcome {
    /// The tour moved to the next step; start this item from zero.
    Advanced(TourItem),
    /// The last step completed; the tour is idle again.
    Finished,
    /// Not playing; nothing to do.
    NotPlaying,
}

impl TourState {
    pub fn is_playing(&self) -> bool {
        matches!(self, TourState::Playing { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, TourState::Paused { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, TourState::Idle)
    }

    pub fn step(&self) -> Option<usize> {
        match self {
            TourState::Playing { step, .. } | TourState::Paused { step, .. } => Some(*step),
            TourState::Idle => None,
        }
    }

    /// The item at the current step, playing or paused.
    pub fn current_item(&self) -> Option<&TourItem> {
        match self {
            TourState::Playing { queue, step, .. } | TourState::Paused { queue, step, .. } => {
                queue.get(*step)
            }
            TourState::Idle => None,
        }
    }

    /// Begin a fresh run at step zero. An empty queue is a no-op and the
    /// state stays idle.
    pub fn start(&mut self, queue: PlayQueue) -> Option<TourItem> {
        let first = queue.get(0).cloned()?;
        *self = TourState::Playing {
            queue,
            step: 0,
            retried: false,
        };
        Some(first)
    }

    /// Playing -> Paused at the same step. Returns the item whose element
    /// should be paused.
    pub fn pause(&mut self) -> Option<TourItem> {
        match std::mem::take(self) {
            TourState::Playing {
                queue,
                step,
                retried,
            } => {
                let item = queue.get(step).cloned();
                *self = TourState::Paused {
                    queue,
                    step,
                    retried,
                };
                item
            }
            other => {
                *self = other;
                None
            }
        }
    }

    /// Paused -> Playing at the same step. Returns the item whose element
    /// should resume from its current position.
    pub fn resume(&mut self) -> Option<TourItem> {
        match std::mem::take(self) {
            TourState::Paused {
                queue,
                step,
                retried,
            } => {
                let item = queue.get(step).cloned();
                *self = TourState::Playing {
                    queue,
                    step,
                    retried,
                };
                item
            }
            other => {
                *self = other;
                None
            }
        }
    }

    /// The current step is done (natural end, or a recovery that gave up).
    /// Advances by exactly one step or finishes the tour.
    pub fn finish_step(&mut self) -> StepOutcome {
        match std::mem::take(self) {
            TourState::Playing { queue, step, .. } => match queue.get(step + 1).cloned() {
                Some(item) => {
                    *self = TourState::Playing {
                        queue,
                        step: step + 1,
                        retried: false,
                    };
                    StepOutcome::Advanced(item)
                }
                None => StepOutcome::Finished,
            },
            other => {
                *self = other;
                StepOutcome::NotPlaying
            }
        }
    }

    /// Claim the single recovery attempt for the current step. Returns
    /// `true` the first time per step while playing, `false` after that.
    pub fn arm_retry(&mut self) -> bool {
        match self {
            TourState::Playing { retried, .. } if !*retried => {
                *retried = true;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Section;

    fn item(id: u64, audio: bool) -> TourItem {
        TourItem {
            id,
            name: format!("Item {id}"),
            section: Section::OnsVerhaal,
            visuals: None,
            audio_url: audio.then(|| format!("https://cms.example.org/uploads/{id}.mp3")),
            functie: None,
            beschrijving: None,
        }
    }

    #[test]
    fn queue_drops_items_without_audio() {
        let queue = PlayQueue::new(vec![item(1, false), item(2, true), item(3, true)]);
        let ids: Vec<_> = queue.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn start_begins_at_step_zero() {
        let mut state = TourState::default();
        let first = state.start(PlayQueue::new(vec![item(1, true), item(2, true)]));
        assert_eq!(first.map(|i| i.id), Some(1));
        assert_eq!(state.step(), Some(0));
        assert!(state.is_playing());
    }

    #[test]
    fn start_with_empty_queue_stays_idle() {
        let mut state = TourState::default();
        assert!(state.start(PlayQueue::new(vec![item(1, false)])).is_none());
        assert!(state.is_idle());
    }

    #[test]
    fn pause_and_resume_preserve_step() {
        let mut state = TourState::default();
        state.start(PlayQueue::new(vec![item(1, true), item(2, true)]));
        state.finish_step();
        assert_eq!(state.step(), Some(1));

        let paused = state.pause();
        assert_eq!(paused.map(|i| i.id), Some(2));
        assert!(state.is_paused());
        assert_eq!(state.step(), Some(1));

        let resumed = state.resume();
        assert_eq!(resumed.map(|i| i.id), Some(2));
        assert!(state.is_playing());
        assert_eq!(state.step(), Some(1));
    }

    #[test]
    fn pause_from_idle_is_a_no_op() {
        let mut state = TourState::default();
        assert!(state.pause().is_none());
        assert!(state.is_idle());
        assert!(state.resume().is_none());
        assert!(state.is_idle());
    }

    #[test]
    fn finish_step_advances_by_exactly_one() {
        let mut state = TourState::default();
        state.start(PlayQueue::new(vec![item(1, true), item(2, true), item(3, true)]));

        match state.finish_step() {
            StepOutcome::Advanced(next) => assert_eq!(next.id, 2),
            other => panic!("expected advance, got {other:?}"),
        }
        assert_eq!(state.step(), Some(1));
    }

    #[test]
    fn finish_last_step_returns_to_idle() {
        let mut state = TourState::default();
        state.start(PlayQueue::new(vec![item(1, true)]));
        assert!(matches!(state.finish_step(), StepOutcome::Finished));
        assert!(state.is_idle());
        assert!(state.current_item().is_none());
    }

    #[test]
    fn finish_step_while_paused_does_nothing() {
        let mut state = TourState::default();
        state.start(PlayQueue::new(vec![item(1, true), item(2, true)]));
        state.pause();
        assert!(matches!(state.finish_step(), StepOutcome::NotPlaying));
        assert_eq!(state.step(), Some(0));
        assert!(state.is_paused());
    }

    #[test]
    fn retry_arms_once_per_step() {
        let mut state = TourState::default();
        state.start(PlayQueue::new(vec![item(1, true), item(2, true)]));

        assert!(state.arm_retry());
        assert!(!state.arm_retry());

        // Advancing resets the guard for the next step.
        state.finish_step();
        assert!(state.arm_retry());
        assert!(!state.arm_retry());
    }

    #[test]
    fn retry_guard_survives_pause_resume() {
        let mut state = TourState::default();
        state.start(PlayQueue::new(vec![item(1, true), item(2, true)]));
        assert!(state.arm_retry());
        state.pause();
        state.resume();
        assert!(!state.arm_retry());
    }

    #[test]
    fn retry_never_arms_outside_playing() {
        let mut state = TourState::default();
        assert!(!state.arm_retry());
        state.start(PlayQueue::new(vec![item(1, true)]));
        state.pause();
        assert!(!state.arm_retry());
    }
}
