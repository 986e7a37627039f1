use std::time::Duration;

use foundation::ids::DayNumber;

/// Behaviour knobs of the trip viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Re-selecting the active day collapses it instead of re-showing it.
    pub toggle_on_reselect: bool,
    /// Zoom level used when flying to a day.
    pub focus_zoom: f64,
    /// Nominal duration of the fly-to animation.
    pub transition: Duration,
    /// Extra wait after `transition` before the fallback popup reveal, used
    /// only when the map cannot report transition completion.
    pub reveal_grace: Duration,
    pub photos: PhotoConvention,
    pub wording: DayWording,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            toggle_on_reselect: false,
            focus_zoom: 10.0,
            transition: Duration::from_millis(1000),
            reveal_grace: Duration::from_millis(50),
            photos: PhotoConvention::default(),
            wording: DayWording::default(),
        }
    }
}

/// File naming of day photos: `{base}{prefix}{n}.{ext}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoConvention {
    pub base: String,
    pub prefix: String,
    pub primary_ext: String,
    pub secondary_ext: String,
}

impl Default for PhotoConvention {
    fn default() -> Self {
        Self {
            base: String::new(),
            prefix: "day-".to_string(),
            primary_ext: "jpg".to_string(),
            secondary_ext: "png".to_string(),
        }
    }
}

impl PhotoConvention {
    pub fn primary(&self, day: DayNumber) -> String {
        self.file(day, &self.primary_ext)
    }

    pub fn secondary(&self, day: DayNumber) -> String {
        self.file(day, &self.secondary_ext)
    }

    fn file(&self, day: DayNumber, ext: &str) -> String {
        format!("{}{}{}.{}", self.base, self.prefix, day, ext)
    }
}

/// User-facing words for day labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayWording {
    pub singular: String,
    pub plural: String,
    /// Joins position and total in breadcrumbs ("Day 3 of 16").
    pub of: String,
}

impl Default for DayWording {
    fn default() -> Self {
        Self {
            singular: "Day".to_string(),
            plural: "Days".to_string(),
            of: "of".to_string(),
        }
    }
}

impl DayWording {
    /// "Day 3" for one day, "Days 3, 7" for several (in the given order).
    pub fn label(&self, days: &[DayNumber]) -> String {
        match days {
            [] => String::new(),
            [one] => format!("{} {one}", self.singular),
            many => {
                let joined = many
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{} {joined}", self.plural)
            }
        }
    }

    pub fn fallback_title(&self, day: DayNumber) -> String {
        format!("{} {day}", self.singular)
    }
}
