use foundation::geo::Coordinate;
use foundation::ids::DayNumber;
use serde::Deserialize;
use serde_json::Value;

/// Well-known path of the itinerary feed, relative to the site root.
pub const ITINERARY_FILE_NAME: &str = "itinerary.json";

/// Case-insensitive values of `travel` that mean "no travel that day".
pub const NO_TRAVEL_SENTINELS: &[&str] = &["aucun", "none"];

/// Separator between the time label and the activity of an agenda entry.
pub const AGENDA_SEPARATOR: &str = " : ";

/// One validated itinerary day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRecord {
    pub day: DayNumber,
    pub title: Option<String>,
    pub place: Option<String>,
    pub narrative: String,
    pub agenda: Vec<String>,
    pub travel: Option<String>,
    pub wake: Option<String>,
    pub sleep: Option<String>,
    pub coordinate: Coordinate,
    pub photo_caption: Option<String>,
}

impl DayRecord {
    /// Minimal record, mostly useful for tests and fixtures.
    pub fn new(day: DayNumber, coordinate: Coordinate) -> Self {
        Self {
            day,
            title: None,
            place: None,
            narrative: String::new(),
            agenda: Vec::new(),
            travel: None,
            wake: None,
            sleep: None,
            coordinate,
            photo_caption: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Travel line to display, or `None` when empty or a "none" sentinel.
    pub fn travel_summary(&self) -> Option<&str> {
        let travel = self.travel.as_deref()?.trim();
        if travel.is_empty() {
            return None;
        }
        let lowered = travel.to_lowercase();
        if NO_TRAVEL_SENTINELS.contains(&lowered.as_str()) {
            return None;
        }
        Some(travel)
    }

    /// Agenda split into `(time, activity)` rows.
    pub fn agenda_items(&self) -> Vec<AgendaItem> {
        self.agenda.iter().map(|e| AgendaItem::parse(e)).collect()
    }
}

/// One agenda line, optionally split on [`AGENDA_SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgendaItem {
    Timed { time: String, activity: String },
    Plain(String),
}

impl AgendaItem {
    pub fn parse(entry: &str) -> Self {
        match entry.split_once(AGENDA_SEPARATOR) {
            Some((time, activity)) if !time.trim().is_empty() => AgendaItem::Timed {
                time: time.trim().to_string(),
                activity: activity.trim().to_string(),
            },
            _ => AgendaItem::Plain(entry.trim().to_string()),
        }
    }
}

/// Wire shape of a feed entry. Field names accept both the English keys and
/// the keys used by the historical French feed.
#[derive(Debug, Deserialize)]
struct RawDay {
    day: Option<u32>,
    #[serde(default, alias = "jour")]
    title: Option<String>,
    #[serde(default, alias = "name")]
    place: Option<String>,
    #[serde(default, alias = "explication", alias = "narrativeText")]
    narrative: Option<String>,
    #[serde(default)]
    agenda: Option<Vec<String>>,
    #[serde(default, alias = "travelSummary")]
    travel: Option<String>,
    #[serde(default, alias = "wakeLocation")]
    wake: Option<String>,
    #[serde(default, alias = "sleepLocation")]
    sleep: Option<String>,
    #[serde(default, alias = "latitude")]
    lat: Option<f64>,
    #[serde(default, alias = "lon", alias = "longitude")]
    lng: Option<f64>,
    #[serde(default, alias = "photoCaption")]
    photo: Option<String>,
}

/// Why a feed entry was set aside instead of loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    Shape(String),
    MissingDay,
    ZeroDay,
    DuplicateDay(DayNumber),
    MissingCoordinate,
    CoordinateOutOfRange,
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::Shape(msg) => write!(f, "unexpected record shape: {msg}"),
            RecordError::MissingDay => write!(f, "missing day number"),
            RecordError::ZeroDay => write!(f, "day number must be positive"),
            RecordError::DuplicateDay(d) => write!(f, "day {d} already defined"),
            RecordError::MissingCoordinate => write!(f, "missing lat/lng"),
            RecordError::CoordinateOutOfRange => write!(f, "lat/lng out of range"),
        }
    }
}

impl std::error::Error for RecordError {}

/// A feed entry that failed validation, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct QuarantinedRecord {
    /// Position in the source array.
    pub index: usize,
    pub error: RecordError,
}

/// Fatal failure to obtain the itinerary. Terminal for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    Transport(String),
    Timeout { after_ms: u64 },
    HttpStatus(u16),
    Malformed(String),
    NotAnArray,
    NoDays { quarantined: usize },
}

impl LoadError {
    pub fn transport(msg: impl std::fmt::Display) -> Self {
        LoadError::Transport(msg.to_string())
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Transport(msg) => write!(f, "could not reach the itinerary feed: {msg}"),
            LoadError::Timeout { after_ms } => {
                write!(f, "itinerary feed did not answer within {after_ms} ms")
            }
            LoadError::HttpStatus(code) => write!(f, "itinerary feed returned HTTP {code}"),
            LoadError::Malformed(msg) => write!(f, "itinerary feed is not valid JSON: {msg}"),
            LoadError::NotAnArray => write!(f, "itinerary feed must be a JSON array of days"),
            LoadError::NoDays { quarantined: 0 } => write!(f, "itinerary contains no days"),
            LoadError::NoDays { quarantined } => write!(
                f,
                "itinerary contains no valid days ({quarantined} invalid records)"
            ),
        }
    }
}

impl std::error::Error for LoadError {}

/// The loaded itinerary: validated days in feed order plus quarantined entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripData {
    days: Vec<DayRecord>,
    quarantined: Vec<QuarantinedRecord>,
}

impl TripData {
    /// Builds trip data from already-validated records.
    ///
    /// Later records reusing a day number are quarantined.
    pub fn from_records(records: Vec<DayRecord>) -> Self {
        let mut out = TripData::default();
        for (index, rec) in records.into_iter().enumerate() {
            out.push_unique(index, rec);
        }
        out
    }

    /// Interprets an HTTP response from the feed.
    pub fn from_http(status: u16, body: &str) -> Result<Self, LoadError> {
        if !(200..300).contains(&status) {
            return Err(LoadError::HttpStatus(status));
        }
        Self::from_json_str(body)
    }

    pub fn from_json_str(payload: &str) -> Result<Self, LoadError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| LoadError::Malformed(e.to_string()))?;
        Self::from_json_value(value)
    }

    pub fn from_json_slice(payload: &[u8]) -> Result<Self, LoadError> {
        let value: Value =
            serde_json::from_slice(payload).map_err(|e| LoadError::Malformed(e.to_string()))?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: Value) -> Result<Self, LoadError> {
        let Value::Array(entries) = value else {
            return Err(LoadError::NotAnArray);
        };

        let mut out = TripData::default();
        for (index, entry) in entries.into_iter().enumerate() {
            match validate_entry(entry) {
                Ok(rec) => out.push_unique(index, rec),
                Err(error) => out.quarantined.push(QuarantinedRecord { index, error }),
            }
        }

        if out.days.is_empty() {
            return Err(LoadError::NoDays {
                quarantined: out.quarantined.len(),
            });
        }
        Ok(out)
    }

    fn push_unique(&mut self, index: usize, rec: DayRecord) {
        if self.get(rec.day).is_some() {
            self.quarantined.push(QuarantinedRecord {
                index,
                error: RecordError::DuplicateDay(rec.day),
            });
        } else {
            self.days.push(rec);
        }
    }

    pub fn days(&self) -> &[DayRecord] {
        &self.days
    }

    pub fn quarantined(&self) -> &[QuarantinedRecord] {
        &self.quarantined
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn get(&self, day: DayNumber) -> Option<&DayRecord> {
        self.days.iter().find(|d| d.day == day)
    }

    /// 0-based display position of `day`.
    pub fn position(&self, day: DayNumber) -> Option<usize> {
        self.days.iter().position(|d| d.day == day)
    }

    pub fn first_day(&self) -> Option<DayNumber> {
        self.days.first().map(|d| d.day)
    }
}

fn validate_entry(entry: Value) -> Result<DayRecord, RecordError> {
    let raw: RawDay = serde_json::from_value(entry).map_err(|e| RecordError::Shape(e.to_string()))?;

    let day = raw.day.ok_or(RecordError::MissingDay)?;
    let day = DayNumber::new(day).ok_or(RecordError::ZeroDay)?;

    let (Some(lat), Some(lng)) = (raw.lat, raw.lng) else {
        return Err(RecordError::MissingCoordinate);
    };
    let coordinate = Coordinate::new(lat, lng);
    if !coordinate.is_in_range() {
        return Err(RecordError::CoordinateOutOfRange);
    }

    Ok(DayRecord {
        day,
        title: non_blank(raw.title),
        place: non_blank(raw.place),
        narrative: raw.narrative.unwrap_or_default(),
        agenda: raw.agenda.unwrap_or_default(),
        travel: raw.travel,
        wake: non_blank(raw.wake),
        sleep: non_blank(raw.sleep),
        coordinate,
        photo_caption: non_blank(raw.photo),
    })
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}
