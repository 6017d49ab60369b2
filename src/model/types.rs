//! Core tour types

use std::time::Instant;

/// WordPress post id of a tour item.
pub type ItemId = u64;

/// Fixed category partition used for play-queue ordering.
///
/// The variants mirror the backend section slugs; the tour always flattens
/// them in [`Section::ORDER`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    OnsVerhaal,
    OverHetKantoor,
    OnzeFilosofie,
}

impl Section {
    pub const ORDER: [Section; 3] = [
        Section::OnsVerhaal,
        Section::OverHetKantoor,
        Section::OnzeFilosofie,
    ];

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "ons_verhaal" => Some(Section::OnsVerhaal),
            "over_het_kantoor" => Some(Section::OverHetKantoor),
            "onze_filosofie" => Some(Section::OnzeFilosofie),
            _ => None,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Section::OnsVerhaal => "ons_verhaal",
            Section::OverHetKantoor => "over_het_kantoor",
            Section::OnzeFilosofie => "onze_filosofie",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::OnsVerhaal => "Ons verhaal",
            Section::OverHetKantoor => "Over het Kantoor",
            Section::OnzeFilosofie => "Onze filosofie",
        }
    }
}

/// A resolved media attachment (image, video or audio).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaRef {
    pub url: String,
    pub mime_type: String,
}

impl MediaRef {
    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video")
    }
}

/// One narrated card, immutable once built from backend data.
#[derive(Clone, Debug)]
pub struct TourItem {
    pub id: ItemId,
    pub name: String,
    pub section: Section,
    pub visuals: Option<MediaRef>,
    pub audio_url: Option<String>,
    pub functie: Option<String>,
    pub beschrijving: Option<String>,
}

impl TourItem {
    pub fn has_audio(&self) -> bool {
        self.audio_url.is_some()
    }
}

/// UI-facing state: error banner and initial-load flag.
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub is_loading: bool,
}
