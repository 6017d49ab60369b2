//! Section grouping and play-queue construction.

use super::playback::PlayQueue;
use super::types::{Section, TourItem};

/// Tour items bucketed per section, in the fixed section order.
#[derive(Clone, Debug)]
pub struct SectionedTours {
    sections: Vec<(Section, Vec<TourItem>)>,
}

impl SectionedTours {
    /// Group items by section. The first section is sorted by name
    /// (case-insensitive); the others keep backend order.
    pub fn group(items: &[TourItem]) -> Self {
        let mut sections: Vec<(Section, Vec<TourItem>)> = Section::ORDER
            .iter()
            .map(|section| (*section, Vec::new()))
            .collect();

        for item in items {
            if let Some((_, bucket)) = sections.iter_mut().find(|(s, _)| *s == item.section) {
                bucket.push(item.clone());
            }
        }

        if let Some((_, bucket)) = sections.first_mut() {
            bucket.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        }

        Self { sections }
    }

    pub fn section(&self, section: Section) -> &[TourItem] {
        self.sections
            .iter()
            .find(|(s, _)| *s == section)
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Section, &[TourItem])> {
        self.sections
            .iter()
            .map(|(section, items)| (*section, items.as_slice()))
    }

    /// Flatten the sections in fixed order into a queue of audio-bearing
    /// items.
    pub fn build_queue(&self) -> PlayQueue {
        let flattened: Vec<TourItem> = self
            .sections
            .iter()
            .flat_map(|(_, items)| items.iter().cloned())
            .collect();
        PlayQueue::new(flattened)
    }
}
