use foundation::ids::DayNumber;
use formats::{AgendaItem, DayRecord};

use crate::config::{DayWording, PhotoConvention, ViewerConfig};

/// Everything the detail panel shows for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPanel {
    pub day: DayNumber,
    /// "Day 3 of 16 - Zion"; filled by the caller that knows the trip length.
    pub breadcrumb: Option<String>,
    pub title: String,
    pub wake: Option<String>,
    pub sleep: Option<String>,
    /// `None` when the record has no travel or says "none".
    pub travel: Option<String>,
    pub narrative: String,
    pub agenda: Vec<AgendaItem>,
    pub photo: PhotoRef,
}

/// Photo of a day, with its two candidate files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef {
    pub primary: String,
    pub secondary: String,
    /// Alt text and caption: the record's caption, else the title.
    pub alt: String,
}

impl PhotoRef {
    pub fn src(&self, attempt: PhotoAttempt) -> Option<&str> {
        match attempt {
            PhotoAttempt::Primary => Some(&self.primary),
            PhotoAttempt::Secondary => Some(&self.secondary),
            PhotoAttempt::Unavailable => None,
        }
    }
}

/// Which photo candidate is currently displayed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PhotoAttempt {
    Primary,
    Secondary,
    /// Both files failed; the host shows a "no image available" placeholder.
    Unavailable,
}

impl PhotoAttempt {
    /// Next candidate after the current one failed to load.
    pub fn after_failure(self) -> PhotoAttempt {
        match self {
            PhotoAttempt::Primary => PhotoAttempt::Secondary,
            PhotoAttempt::Secondary | PhotoAttempt::Unavailable => PhotoAttempt::Unavailable,
        }
    }
}

/// Renders the detail panel of one day. Pure.
pub fn render(record: &DayRecord, config: &ViewerConfig) -> DetailPanel {
    render_with(record, &config.wording, &config.photos)
}

pub fn render_with(
    record: &DayRecord,
    wording: &DayWording,
    photos: &PhotoConvention,
) -> DetailPanel {
    let title = record
        .title()
        .map(str::to_string)
        .unwrap_or_else(|| wording.fallback_title(record.day));
    let alt = record
        .photo_caption
        .clone()
        .unwrap_or_else(|| title.clone());

    DetailPanel {
        day: record.day,
        breadcrumb: None,
        wake: record.wake.clone(),
        sleep: record.sleep.clone(),
        travel: record.travel_summary().map(str::to_string),
        narrative: record.narrative.clone(),
        agenda: record.agenda_items(),
        photo: PhotoRef {
            primary: photos.primary(record.day),
            secondary: photos.secondary(record.day),
            alt,
        },
        title,
    }
}

/// "Day 3 of 16 - Zion": the record's own day number over the number of
/// loaded days.
pub fn render_breadcrumb(record: &DayRecord, total: usize, wording: &DayWording) -> String {
    let head = format!("{} {} {} {}", wording.singular, record.day, wording.of, total);
    match record.place.as_deref().or_else(|| record.title()) {
        Some(name) => format!("{head} - {name}"),
        None => head,
    }
}
