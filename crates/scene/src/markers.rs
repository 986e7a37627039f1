use std::collections::HashMap;

use foundation::geo::{Coordinate, CoordinateKey};
use foundation::handles::Handle;
use foundation::ids::DayNumber;
use formats::DayRecord;
use runtime::EventBus;

use crate::config::DayWording;
use crate::surface::{MapSurface, MarkerPopup, MarkerStyle};

/// Handle of one visual map marker.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub Handle);

impl MarkerId {
    pub fn index(&self) -> u32 {
        self.0.index()
    }
}

/// One marker per unique coordinate, owning every day located there.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerEntry {
    id: MarkerId,
    key: CoordinateKey,
    days: Vec<DayNumber>,
    display_name: String,
    label: String,
    style: MarkerStyle,
}

impl MarkerEntry {
    pub fn id(&self) -> MarkerId {
        self.id
    }

    pub fn key(&self) -> CoordinateKey {
        self.key
    }

    pub fn coordinate(&self) -> Coordinate {
        self.key.coordinate()
    }

    /// Owning days in first-seen order, without duplicates.
    pub fn days(&self) -> &[DayNumber] {
        &self.days
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn style(&self) -> MarkerStyle {
        self.style
    }

    pub fn popup(&self) -> MarkerPopup {
        MarkerPopup {
            heading: self.display_name.clone(),
            label: self.label.clone(),
        }
    }
}

/// Coordinate-deduplicated marker set.
///
/// Ordering contract:
/// - Entries are stored in the order their coordinate was first seen, and
///   `MarkerId::index()` is that position.
/// - A day resolves to a marker only through its owning entry.
///
/// At most one entry is [`MarkerStyle::Active`] at any time.
#[derive(Debug, Clone, Default)]
pub struct MarkerRegistry {
    generation: u32,
    entries: Vec<MarkerEntry>,
    by_key: HashMap<CoordinateKey, usize>,
    by_day: HashMap<DayNumber, usize>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry from days in input order.
    pub fn build(days: &[DayRecord], wording: &DayWording) -> Self {
        Self::build_generation(0, days, wording)
    }

    /// Rebuilds from a reloaded day list. Handles from `self` never compare
    /// equal to handles of the result.
    pub fn rebuild(&self, days: &[DayRecord], wording: &DayWording) -> Self {
        Self::build_generation(self.generation.wrapping_add(1), days, wording)
    }

    fn build_generation(generation: u32, days: &[DayRecord], wording: &DayWording) -> Self {
        let mut reg = MarkerRegistry {
            generation,
            ..Self::default()
        };

        for rec in days {
            // A repeated day stays with the marker that first claimed it.
            if reg.by_day.contains_key(&rec.day) {
                continue;
            }
            let key = rec.coordinate.key();
            match reg.by_key.get(&key).copied() {
                Some(idx) => {
                    let entry = &mut reg.entries[idx];
                    entry.days.push(rec.day);
                    entry.label = wording.label(&entry.days);
                    reg.by_day.insert(rec.day, idx);
                }
                None => {
                    let idx = reg.entries.len();
                    let display_name = rec
                        .title()
                        .map(str::to_string)
                        .unwrap_or_else(|| wording.fallback_title(rec.day));
                    reg.entries.push(MarkerEntry {
                        id: MarkerId(Handle::new(idx as u32, generation)),
                        key,
                        days: vec![rec.day],
                        display_name,
                        label: wording.label(&[rec.day]),
                        style: MarkerStyle::Default,
                    });
                    reg.by_key.insert(key, idx);
                    reg.by_day.insert(rec.day, idx);
                }
            }
        }

        reg
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[MarkerEntry] {
        &self.entries
    }

    pub fn entry(&self, id: MarkerId) -> Option<&MarkerEntry> {
        if id.0.generation() != self.generation {
            return None;
        }
        self.entries.get(id.index() as usize)
    }

    pub fn entry_for_day(&self, day: DayNumber) -> Option<&MarkerEntry> {
        self.by_day.get(&day).map(|&idx| &self.entries[idx])
    }

    pub fn marker_for_day(&self, day: DayNumber) -> Option<MarkerId> {
        self.entry_for_day(day).map(MarkerEntry::id)
    }

    pub fn entry_at(&self, at: Coordinate) -> Option<&MarkerEntry> {
        self.by_key.get(&at.key()).map(|&idx| &self.entries[idx])
    }

    pub fn active_marker(&self) -> Option<MarkerId> {
        self.entries
            .iter()
            .find(|e| e.style == MarkerStyle::Active)
            .map(MarkerEntry::id)
    }

    /// Adds one visual marker per entry to `map`.
    pub fn materialize<M: MapSurface + ?Sized>(&self, map: &mut M) {
        for e in &self.entries {
            map.add_marker(e.id, e.coordinate(), &e.popup());
            if e.style == MarkerStyle::Active {
                map.set_marker_style(e.id, MarkerStyle::Active);
            }
        }
    }

    pub fn reset_all_to_inactive<M: MapSurface + ?Sized>(&mut self, map: &mut M) {
        for e in &mut self.entries {
            e.style = MarkerStyle::Default;
            map.set_marker_style(e.id, MarkerStyle::Default);
        }
    }

    /// Resets every marker, then marks the owner of `day` active.
    ///
    /// A day without a marker is a data problem, not a failure: it is logged
    /// and nothing changes.
    pub fn activate<M: MapSurface + ?Sized>(
        &mut self,
        day: DayNumber,
        map: &mut M,
        bus: &mut EventBus,
    ) -> Option<MarkerId> {
        let Some(&idx) = self.by_day.get(&day) else {
            bus.warn("lookup_miss", format!("no marker owns day {day}"));
            return None;
        };
        self.reset_all_to_inactive(map);
        let entry = &mut self.entries[idx];
        entry.style = MarkerStyle::Active;
        map.set_marker_style(entry.id, MarkerStyle::Active);
        Some(entry.id)
    }
}

#[cfg(test)]
mod tests {
    use super::MarkerRegistry;
    use crate::config::DayWording;
    use crate::recording::{Cmd, RecordingView};
    use crate::surface::MarkerStyle;
    use foundation::geo::Coordinate;
    use foundation::ids::DayNumber;
    use formats::DayRecord;
    use pretty_assertions::assert_eq;
    use runtime::EventBus;

    fn d(n: u32) -> DayNumber {
        DayNumber::new(n).unwrap()
    }

    fn rec(n: u32, lat: f64, lng: f64) -> DayRecord {
        DayRecord::new(d(n), Coordinate::new(lat, lng)).with_title(format!("Stop {n}"))
    }

    #[test]
    fn merges_days_sharing_a_coordinate() {
        let days = vec![rec(1, 10.0, 10.0), rec(2, 10.0, 10.0), rec(3, 20.0, 20.0)];
        let reg = MarkerRegistry::build(&days, &DayWording::default());

        assert_eq!(reg.len(), 2);
        let first = &reg.entries()[0];
        assert_eq!(first.days(), &[d(1), d(2)]);
        assert_eq!(first.label(), "Days 1, 2");
        assert_eq!(first.display_name(), "Stop 1");
        assert_eq!(reg.entries()[1].label(), "Day 3");

        assert_eq!(reg.marker_for_day(d(1)), reg.marker_for_day(d(2)));
        assert_ne!(reg.marker_for_day(d(1)), reg.marker_for_day(d(3)));
    }

    #[test]
    fn every_day_has_exactly_one_owner() {
        let days: Vec<DayRecord> = (1..=16)
            .map(|n| rec(n, f64::from(n % 5), f64::from(n % 3)))
            .collect();
        let reg = MarkerRegistry::build(&days, &DayWording::default());
        for r in &days {
            let owners = reg
                .entries()
                .iter()
                .filter(|e| e.days().contains(&r.day))
                .count();
            assert_eq!(owners, 1, "day {}", r.day);
            let id = reg.marker_for_day(r.day).expect("owned");
            assert_eq!(reg.entry(id).map(|e| e.coordinate()), Some(r.coordinate));
        }
    }

    #[test]
    fn duplicate_rows_do_not_duplicate_days() {
        let days = vec![
            rec(3, 1.0, 1.0),
            rec(7, 1.0, 1.0),
            rec(3, 1.0, 1.0),
            rec(3, 5.0, 5.0),
        ];
        let reg = MarkerRegistry::build(&days, &DayWording::default());
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.entries()[0].days(), &[d(3), d(7)]);
        assert_eq!(reg.entries()[0].label(), "Days 3, 7");
    }

    #[test]
    fn repeated_day_at_another_known_coordinate_keeps_first_owner() {
        let days = vec![rec(3, 1.0, 1.0), rec(4, 2.0, 2.0), rec(3, 2.0, 2.0)];
        let reg = MarkerRegistry::build(&days, &DayWording::default());
        assert_eq!(reg.entries()[0].days(), &[d(3)]);
        assert_eq!(reg.entries()[1].days(), &[d(4)]);
        assert_eq!(reg.entries()[1].label(), "Day 4");
    }

    #[test]
    fn untitled_day_gets_a_synthesized_name() {
        let days = vec![DayRecord::new(d(5), Coordinate::new(0.0, 0.0))];
        let reg = MarkerRegistry::build(&days, &DayWording::default());
        assert_eq!(reg.entries()[0].display_name(), "Day 5");
    }

    #[test]
    fn activate_leaves_a_single_active_marker() {
        let days = vec![rec(1, 10.0, 10.0), rec(2, 10.0, 10.0), rec(3, 20.0, 20.0)];
        let mut reg = MarkerRegistry::build(&days, &DayWording::default());
        let mut view = RecordingView::default();
        let mut bus = EventBus::new();
        reg.materialize(&mut view);

        let a = reg.activate(d(1), &mut view, &mut bus);
        let b = reg.activate(d(2), &mut view, &mut bus);
        assert_eq!(a, b);
        let c = reg.activate(d(3), &mut view, &mut bus).expect("marker");
        assert_eq!(reg.active_marker(), Some(c));
        assert_eq!(
            reg.entries()
                .iter()
                .filter(|e| e.style() == MarkerStyle::Active)
                .count(),
            1
        );
        assert_eq!(view.active_markers(), vec![c]);
    }

    #[test]
    fn activate_unknown_day_is_logged_no_op() {
        let days = vec![rec(1, 10.0, 10.0)];
        let mut reg = MarkerRegistry::build(&days, &DayWording::default());
        let mut view = RecordingView::default();
        let mut bus = EventBus::new();
        let m = reg.activate(d(1), &mut view, &mut bus);
        view.take_commands();

        assert_eq!(reg.activate(d(9), &mut view, &mut bus), None);
        assert_eq!(bus.count_kind("lookup_miss"), 1);
        assert_eq!(reg.active_marker(), m);
        assert_eq!(view.take_commands(), Vec::<Cmd>::new());
    }

    #[test]
    fn rebuilt_registry_rejects_old_handles() {
        let days = vec![rec(1, 10.0, 10.0)];
        let reg = MarkerRegistry::build(&days, &DayWording::default());
        let old = reg.marker_for_day(d(1)).expect("marker");
        let next = reg.rebuild(&days, &DayWording::default());
        assert_eq!(next.entry(old), None);
        assert!(next.marker_for_day(d(1)).is_some());
    }

    #[test]
    fn entry_at_uses_exact_key() {
        let days = vec![rec(1, 36.1699, -115.1398)];
        let reg = MarkerRegistry::build(&days, &DayWording::default());
        assert!(reg.entry_at(Coordinate::new(36.1699, -115.1398)).is_some());
        assert!(reg.entry_at(Coordinate::new(36.16990001, -115.1398)).is_none());
    }
}
