use formats::TripData;
use scene::{DayWording, MarkerRegistry};
use serde::Serialize;

/// What `/api/itinerary/summary` reports about the itinerary on disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItinerarySummary {
    pub days: usize,
    pub markers: usize,
    pub first_day: Option<u32>,
    pub last_day: Option<u32>,
    pub quarantined: Vec<QuarantineNote>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuarantineNote {
    pub index: usize,
    pub reason: String,
}

impl ItinerarySummary {
    pub fn of(trip: &TripData) -> Self {
        let registry = MarkerRegistry::build(trip.days(), &DayWording::default());
        Self {
            days: trip.len(),
            markers: registry.len(),
            first_day: trip.days().first().map(|d| d.day.get()),
            last_day: trip.days().last().map(|d| d.day.get()),
            quarantined: trip
                .quarantined()
                .iter()
                .map(|q| QuarantineNote {
                    index: q.index,
                    reason: q.error.to_string(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ItinerarySummary;
    use formats::TripData;
    use pretty_assertions::assert_eq;

    #[test]
    fn counts_days_markers_and_skips() {
        let trip = TripData::from_json_str(
            r#"[
                {"day": 1, "jour": "Las Vegas", "lat": 36.17, "lng": -115.14},
                {"day": 2, "jour": "Las Vegas", "lat": 36.17, "lng": -115.14},
                {"day": 3, "lat": 37.3, "lng": -113.0},
                {"day": 4, "lat": "north"}
            ]"#,
        )
        .unwrap();
        let summary = ItinerarySummary::of(&trip);
        assert_eq!(summary.days, 3);
        assert_eq!(summary.markers, 2);
        assert_eq!(summary.first_day, Some(1));
        assert_eq!(summary.last_day, Some(3));
        assert_eq!(summary.quarantined.len(), 1);
        assert_eq!(summary.quarantined[0].index, 3);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["markers"], 2);
    }
}
