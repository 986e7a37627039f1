use foundation::ids::DayNumber;
use foundation::time::Millis;
use formats::{LoadError, RouteGeometry, RouteGeometryError, TripData};
use runtime::{DeferredId, DeferredQueue, Event, EventBus, Metrics};

use crate::config::ViewerConfig;
use crate::detail::{PhotoAttempt, render, render_breadcrumb};
use crate::markers::{MarkerEntry, MarkerId, MarkerRegistry};
use crate::selection::SelectionState;
use crate::surface::{NavEntry, TransitionId, TripView};

/// Result of a selection request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The day is now shown. `marker` is `None` only if no marker owns it.
    Shown { marker: Option<MarkerId> },
    /// Re-select of the active day with `toggle_on_reselect` enabled.
    Collapsed,
    /// Unknown day (or nothing loaded yet); nothing changed.
    Ignored,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct PendingReveal {
    transition: TransitionId,
    marker: MarkerId,
    /// Fallback timer, armed only when the map cannot report completion.
    timer: Option<DeferredId>,
}

/// Owns the loaded trip, the marker registry and the selection, and is the
/// only writer of the view.
///
/// Selecting a day always runs in this order: navigation highlight, detail
/// panel, marker activation, viewport transition. The popup of the new
/// marker opens only once that transition has settled, either when the map
/// reports it via [`TripController::transition_finished`] or when the
/// fallback timer fires in [`TripController::tick`]. A newer selection
/// cancels any reveal still pending.
pub struct TripController<V: TripView> {
    config: ViewerConfig,
    view: V,
    trip: TripData,
    registry: MarkerRegistry,
    selection: SelectionState,
    photo: PhotoAttempt,
    lightbox: bool,
    pending: Option<PendingReveal>,
    timers: DeferredQueue<TransitionId>,
    next_transition: u64,
    clock: Millis,
    load_error: Option<LoadError>,
    bus: EventBus,
    metrics: Metrics,
}

impl<V: TripView> TripController<V> {
    pub fn new(config: ViewerConfig, view: V) -> Self {
        Self {
            config,
            view,
            trip: TripData::default(),
            registry: MarkerRegistry::new(),
            selection: SelectionState::new(),
            photo: PhotoAttempt::Primary,
            lightbox: false,
            pending: None,
            timers: DeferredQueue::new(),
            next_transition: 0,
            clock: Millis(0),
            load_error: None,
            bus: EventBus::new(),
            metrics: Metrics::new(),
        }
    }

    /// Installs the outcome of the itinerary fetch.
    ///
    /// On success the markers and navigation are built and the first day is
    /// shown, which is returned. On failure the error replaces the content
    /// area and the trip stays empty.
    pub fn load(&mut self, result: Result<TripData, LoadError>) -> Option<DayNumber> {
        match result {
            Ok(trip) => {
                self.load_error = None;
                self.install(trip);
                let first = self.trip.first_day()?;
                match self.select(first) {
                    SelectOutcome::Shown { .. } => Some(first),
                    _ => None,
                }
            }
            Err(err) => {
                self.metrics.inc("load_error");
                self.bus.error("load", format!("itinerary load failed: {err}"));
                self.install(TripData::default());
                self.view.show_error(&err.to_string());
                self.load_error = Some(err);
                None
            }
        }
    }

    fn install(&mut self, trip: TripData) {
        self.cancel_pending_reveal();
        self.selection.reset();
        self.photo = PhotoAttempt::Primary;

        for q in trip.quarantined() {
            self.bus.warn(
                "quarantine",
                format!("itinerary record #{} skipped: {}", q.index, q.error),
            );
        }

        self.registry = self.registry.rebuild(trip.days(), &self.config.wording);
        self.view.clear_markers();
        self.registry.materialize(&mut self.view);

        let entries: Vec<NavEntry> = trip
            .days()
            .iter()
            .map(|d| NavEntry {
                day: d.day,
                label: d
                    .title()
                    .map(str::to_string)
                    .unwrap_or_else(|| self.config.wording.fallback_title(d.day)),
            })
            .collect();
        self.view.populate(&entries);

        self.metrics.set_gauge("days", trip.len() as i64);
        self.metrics.set_gauge("markers", self.registry.len() as i64);
        if !trip.is_empty() {
            self.bus.info(
                "load",
                format!(
                    "loaded {} days on {} markers ({} quarantined)",
                    trip.len(),
                    self.registry.len(),
                    trip.quarantined().len()
                ),
            );
        }
        self.trip = trip;
    }

    /// Draws the route line. Failures are logged and otherwise ignored.
    ///
    /// The viewport is fitted to the route only while no day is selected, so
    /// it never fights a selection's transition.
    pub fn load_route(&mut self, result: Result<RouteGeometry, RouteGeometryError>) {
        match result {
            Ok(route) => {
                self.view.draw_route(&route.lines);
                if self.selection.active_day().is_none()
                    && let Some(bounds) = route.bounds()
                {
                    self.view.fit_bounds(bounds);
                }
                self.bus.info(
                    "route",
                    format!(
                        "route drawn: {} lines, {} points ({} point features dropped)",
                        route.lines.len(),
                        route.point_count(),
                        route.discarded_points
                    ),
                );
            }
            Err(err) => {
                self.metrics.inc("route_error");
                self.bus.warn("route", format!("route not drawn: {err}"));
            }
        }
    }

    pub fn select(&mut self, day: DayNumber) -> SelectOutcome {
        self.metrics.inc("select");
        let Some(position) = self.trip.position(day) else {
            self.metrics.inc("lookup_miss");
            self.bus.warn(
                "lookup_miss",
                format!("day {day} is not in the loaded itinerary"),
            );
            return SelectOutcome::Ignored;
        };

        if self.config.toggle_on_reselect
            && self.selection.is_expanded()
            && self.selection.active_day() == Some(day)
        {
            self.collapse(day);
            return SelectOutcome::Collapsed;
        }

        self.cancel_pending_reveal();
        self.close_lightbox();

        if let Some(prev) = self.selection.active_day()
            && prev != day
        {
            self.view.set_selected(prev, false);
        }
        self.view.set_selected(day, true);
        self.view.scroll_into_view(day);

        let record = &self.trip.days()[position];
        let mut panel = render(record, &self.config);
        panel.breadcrumb = Some(render_breadcrumb(
            record,
            self.trip.len(),
            &self.config.wording,
        ));
        self.view.clear();
        self.view.show(&panel);
        self.photo = PhotoAttempt::Primary;

        let marker = self.registry.activate(day, &mut self.view, &mut self.bus);
        if let Some(marker) = marker {
            let at = self
                .registry
                .entry(marker)
                .map(MarkerEntry::coordinate)
                .unwrap_or(record.coordinate);
            self.view.close_popups();
            let transition = self.next_transition_id();
            self.view
                .fly_to(transition, at, self.config.focus_zoom, self.config.transition);

            let timer = if self.view.reports_transition_end() {
                None
            } else {
                let due = self
                    .clock
                    .saturating_add(self.config.transition + self.config.reveal_grace);
                Some(self.timers.schedule(due, transition))
            };
            self.pending = Some(PendingReveal {
                transition,
                marker,
                timer,
            });
        }

        self.selection.show(day);
        self.bus.debug("select", format!("showing day {day}"));
        SelectOutcome::Shown { marker }
    }

    /// Marker click. Selects the first owning day; clicking the marker of
    /// the shown day cycles through the other days sharing it.
    pub fn marker_clicked(&mut self, marker: MarkerId) -> SelectOutcome {
        let Some(entry) = self.registry.entry(marker) else {
            self.metrics.inc("lookup_miss");
            self.bus
                .warn("lookup_miss", format!("unknown marker #{}", marker.index()));
            return SelectOutcome::Ignored;
        };
        let days = entry.days();
        let Some(&first) = days.first() else {
            return SelectOutcome::Ignored;
        };

        let current = if self.selection.is_expanded() {
            self.selection
                .active_day()
                .and_then(|a| days.iter().position(|d| *d == a))
        } else {
            None
        };
        let target = match current {
            Some(i) if days.len() > 1 => days[(i + 1) % days.len()],
            _ => first,
        };
        self.select(target)
    }

    /// Completion signal of a fly-to started by this controller.
    pub fn transition_finished(&mut self, transition: TransitionId) {
        match self.pending {
            Some(p) if p.transition == transition => {
                self.pending = None;
                if let Some(timer) = p.timer {
                    self.timers.cancel(timer);
                }
                self.view.close_popups();
                self.view.open_popup(p.marker);
                self.metrics.inc("reveal");
            }
            _ => {
                self.metrics.inc("stale_transition");
                self.bus.debug(
                    "transition",
                    format!("ignoring superseded transition {}", transition.0),
                );
            }
        }
    }

    /// Advances the host clock and fires due fallback reveals.
    pub fn tick(&mut self, now: Millis) {
        self.clock = self.clock.max(now);
        for (_, transition) in self.timers.take_due(self.clock) {
            self.transition_finished(transition);
        }
    }

    /// The shown photo of `day` failed to load: fall back to the next file.
    pub fn photo_failed(&mut self, day: DayNumber) {
        if !self.selection.is_expanded() || self.selection.active_day() != Some(day) {
            self.bus
                .debug("asset", format!("ignoring photo failure of hidden day {day}"));
            return;
        }
        if self.photo == PhotoAttempt::Unavailable {
            return;
        }
        let Some(record) = self.trip.get(day) else {
            return;
        };

        let photo = render(record, &self.config).photo;
        self.photo = self.photo.after_failure();
        match photo.src(self.photo) {
            Some(src) => self
                .bus
                .warn("asset", format!("photo of day {day} failed, trying {src}")),
            None => self
                .bus
                .warn("asset", format!("no photo available for day {day}")),
        }
        self.view.set_photo(day, photo.src(self.photo), &photo.alt);
    }

    /// Photo click: enlarges the candidate currently displayed for `day`.
    /// Returns false when the day is hidden or no photo could be loaded.
    pub fn photo_clicked(&mut self, day: DayNumber) -> bool {
        if !self.selection.is_expanded() || self.selection.active_day() != Some(day) {
            return false;
        }
        let Some(record) = self.trip.get(day) else {
            return false;
        };
        let photo = render(record, &self.config).photo;
        let Some(src) = photo.src(self.photo) else {
            return false;
        };
        self.view.open_lightbox(src, &photo.alt);
        self.lightbox = true;
        self.metrics.inc("lightbox");
        true
    }

    pub fn close_lightbox(&mut self) {
        if std::mem::take(&mut self.lightbox) {
            self.view.close_lightbox();
        }
    }

    pub fn lightbox_open(&self) -> bool {
        self.lightbox
    }

    fn collapse(&mut self, day: DayNumber) {
        self.cancel_pending_reveal();
        self.close_lightbox();
        self.view.set_selected(day, false);
        self.view.clear();
        self.registry.reset_all_to_inactive(&mut self.view);
        self.view.close_popups();
        self.selection.collapse();
        self.bus.debug("select", format!("collapsed day {day}"));
    }

    fn cancel_pending_reveal(&mut self) {
        if let Some(p) = self.pending.take() {
            if let Some(timer) = p.timer {
                self.timers.cancel(timer);
            }
            self.metrics.inc("reveal_superseded");
        }
    }

    fn next_transition_id(&mut self) -> TransitionId {
        let id = TransitionId(self.next_transition);
        self.next_transition = self.next_transition.wrapping_add(1);
        id
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn trip(&self) -> &TripData {
        &self.trip
    }

    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    pub fn active_day(&self) -> Option<DayNumber> {
        self.selection.active_day()
    }

    /// Marker of the active day, derived from the selection.
    pub fn active_marker(&self) -> Option<MarkerId> {
        if !self.selection.is_expanded() {
            return None;
        }
        self.registry.marker_for_day(self.selection.active_day()?)
    }

    pub fn has_pending_reveal(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline the host should arm a native timer for, if any.
    pub fn next_timer_due(&self) -> Option<Millis> {
        self.timers.next_due()
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        self.load_error.as_ref()
    }

    pub fn diagnostics(&self) -> &EventBus {
        &self.bus
    }

    pub fn drain_diagnostics(&mut self) -> Vec<Event> {
        self.bus.drain()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::{SelectOutcome, TripController};
    use crate::config::ViewerConfig;
    use crate::recording::{Cmd, RecordingView};
    use crate::surface::MarkerStyle;
    use foundation::geo::Coordinate;
    use foundation::ids::DayNumber;
    use foundation::time::Millis;
    use formats::{DayRecord, RouteGeometry, RouteGeometryError, TripData};
    use pretty_assertions::assert_eq;

    fn d(n: u32) -> DayNumber {
        DayNumber::new(n).unwrap()
    }

    fn rec(n: u32, lat: f64, lng: f64) -> DayRecord {
        DayRecord::new(d(n), Coordinate::new(lat, lng)).with_title(format!("Stop {n}"))
    }

    fn three_days() -> TripData {
        TripData::from_records(vec![
            rec(1, 10.0, 10.0),
            rec(2, 10.0, 10.0),
            rec(3, 20.0, 20.0),
        ])
    }

    fn loaded(view: RecordingView, config: ViewerConfig) -> TripController<RecordingView> {
        let mut c = TripController::new(config, view);
        assert_eq!(c.load(Ok(three_days())), Some(d(1)));
        c.view_mut().take_commands();
        c
    }

    #[test]
    fn merged_marker_is_shared_by_its_days() {
        let mut c = loaded(RecordingView::with_transition_events(), ViewerConfig::default());
        assert_eq!(c.registry().len(), 2);
        let first = &c.registry().entries()[0];
        assert_eq!(first.days(), &[d(1), d(2)]);
        assert_eq!(first.label(), "Days 1, 2");

        let m1 = c.active_marker();
        assert!(m1.is_some());
        let SelectOutcome::Shown { marker: m2 } = c.select(d(2)) else {
            panic!("day 2 should be shown");
        };
        assert_eq!(m1, m2);
        assert_eq!(c.active_day(), Some(d(2)));
    }

    #[test]
    fn select_runs_steps_in_order() {
        let mut c = loaded(RecordingView::with_transition_events(), ViewerConfig::default());
        let m1 = c.registry().marker_for_day(d(1)).unwrap();
        let m3 = c.registry().marker_for_day(d(3)).unwrap();

        c.select(d(3));
        let t = c.view().last_transition().expect("fly_to issued");
        assert_eq!(
            c.view_mut().take_commands(),
            vec![
                Cmd::NavSelected(d(1), false),
                Cmd::NavSelected(d(3), true),
                Cmd::ScrollTo(d(3)),
                Cmd::DetailClear,
                Cmd::DetailShow(d(3), "Stop 3".to_string()),
                Cmd::Style(m1, MarkerStyle::Default),
                Cmd::Style(m3, MarkerStyle::Default),
                Cmd::Style(m3, MarkerStyle::Active),
                Cmd::ClosePopups,
                Cmd::FlyTo(t, Coordinate::new(20.0, 20.0)),
            ]
        );
        assert!(c.has_pending_reveal());

        c.transition_finished(t);
        assert_eq!(
            c.view_mut().take_commands(),
            vec![Cmd::ClosePopups, Cmd::OpenPopup(m3)]
        );
        assert!(!c.has_pending_reveal());
        assert_eq!(c.metrics().counter("reveal"), 1);
    }

    #[test]
    fn absent_day_is_a_logged_no_op() {
        let mut c = loaded(RecordingView::with_transition_events(), ViewerConfig::default());
        let before = c.active_marker();
        assert_eq!(c.select(d(42)), SelectOutcome::Ignored);
        assert_eq!(c.active_day(), Some(d(1)));
        assert_eq!(c.active_marker(), before);
        assert_eq!(c.view_mut().take_commands(), Vec::<Cmd>::new());
        assert_eq!(c.diagnostics().count_kind("lookup_miss"), 1);
    }

    #[test]
    fn select_before_load_is_ignored() {
        let mut c = TripController::new(ViewerConfig::default(), RecordingView::default());
        assert_eq!(c.select(d(1)), SelectOutcome::Ignored);
        assert_eq!(c.active_day(), None);
    }

    #[test]
    fn superseded_transition_does_not_open_a_popup() {
        let mut c = TripController::new(
            ViewerConfig::default(),
            RecordingView::with_transition_events(),
        );
        c.load(Ok(three_days()));
        let first = c.view().last_transition();
        c.select(d(3));
        let t3 = c.view().last_transition().unwrap();
        assert_ne!(first, Some(t3));
        c.view_mut().take_commands();

        // The first selection's animation reports late.
        c.transition_finished(first.unwrap());
        assert_eq!(c.view_mut().take_commands(), Vec::<Cmd>::new());
        assert_eq!(c.metrics().counter("stale_transition"), 1);

        c.transition_finished(t3);
        let m3 = c.registry().marker_for_day(d(3)).unwrap();
        assert_eq!(
            c.view_mut().take_commands(),
            vec![Cmd::ClosePopups, Cmd::OpenPopup(m3)]
        );
    }

    #[test]
    fn fallback_timer_reveals_after_nominal_duration() {
        let mut c = loaded(RecordingView::default(), ViewerConfig::default());
        assert_eq!(c.next_timer_due(), Some(Millis(1050)));

        c.tick(Millis(1000));
        assert_eq!(c.view_mut().take_commands(), Vec::<Cmd>::new());

        c.tick(Millis(1050));
        let m1 = c.registry().marker_for_day(d(1)).unwrap();
        assert_eq!(
            c.view_mut().take_commands(),
            vec![Cmd::ClosePopups, Cmd::OpenPopup(m1)]
        );
        assert_eq!(c.next_timer_due(), None);
    }

    #[test]
    fn new_selection_cancels_pending_fallback() {
        let mut c = loaded(RecordingView::default(), ViewerConfig::default());
        c.tick(Millis(500));
        c.select(d(3));
        assert_eq!(c.next_timer_due(), Some(Millis(1550)));
        c.view_mut().take_commands();

        c.tick(Millis(1100));
        assert_eq!(c.view_mut().take_commands(), Vec::<Cmd>::new());

        c.tick(Millis(1600));
        let m3 = c.registry().marker_for_day(d(3)).unwrap();
        assert_eq!(
            c.view_mut().take_commands(),
            vec![Cmd::ClosePopups, Cmd::OpenPopup(m3)]
        );
        assert_eq!(c.metrics().counter("reveal"), 1);
        assert_eq!(c.metrics().counter("reveal_superseded"), 1);
    }

    #[test]
    fn reselect_reshows_by_default() {
        let mut c = loaded(RecordingView::with_transition_events(), ViewerConfig::default());
        assert!(matches!(c.select(d(1)), SelectOutcome::Shown { .. }));
        assert!(c.selection().is_expanded());
        assert_eq!(c.view().selected_nav(), vec![d(1)]);
    }

    #[test]
    fn reselect_toggles_when_configured() {
        let config = ViewerConfig {
            toggle_on_reselect: true,
            ..ViewerConfig::default()
        };
        let mut c = loaded(RecordingView::with_transition_events(), config);

        assert_eq!(c.select(d(1)), SelectOutcome::Collapsed);
        assert_eq!(c.active_day(), Some(d(1)));
        assert_eq!(c.active_marker(), None);
        assert!(c.view().active_markers().is_empty());
        assert!(c.view().selected_nav().is_empty());
        assert!(c.view().shown.is_none());
        assert!(!c.has_pending_reveal());

        assert!(matches!(c.select(d(1)), SelectOutcome::Shown { .. }));
        assert_eq!(c.view().selected_nav(), vec![d(1)]);
        assert_eq!(c.view().active_markers().len(), 1);
    }

    #[test]
    fn marker_click_cycles_shared_days() {
        let mut c = loaded(RecordingView::with_transition_events(), ViewerConfig::default());
        let shared = c.registry().marker_for_day(d(1)).unwrap();
        let single = c.registry().marker_for_day(d(3)).unwrap();

        c.marker_clicked(shared);
        assert_eq!(c.active_day(), Some(d(2)));
        c.marker_clicked(shared);
        assert_eq!(c.active_day(), Some(d(1)));
        c.marker_clicked(single);
        assert_eq!(c.active_day(), Some(d(3)));
        c.marker_clicked(shared);
        assert_eq!(c.active_day(), Some(d(1)));
    }

    #[test]
    fn never_two_active_markers_across_many_selections() {
        // RecordingView asserts the invariant on every style change.
        let mut c = loaded(RecordingView::with_transition_events(), ViewerConfig::default());
        for n in [3, 1, 2, 3, 3, 1, 9, 2] {
            c.select(d(n));
            assert!(c.view().active_markers().len() <= 1);
            let expected: Vec<_> = c.active_marker().into_iter().collect();
            assert_eq!(c.view().active_markers(), expected);
        }
    }

    #[test]
    fn malformed_feed_shows_error_and_empty_trip() {
        let mut c = TripController::new(ViewerConfig::default(), RecordingView::default());
        let result = TripData::from_json_str("[{\"day\": 1, \"lat\": ");
        assert_eq!(c.load(result), None);

        let cmds = c.view_mut().take_commands();
        assert!(matches!(cmds.last(), Some(Cmd::Error(msg)) if msg.contains("not valid JSON")));
        assert!(c.trip().is_empty());
        assert!(c.registry().is_empty());
        assert!(c.load_error().is_some());
        assert_eq!(c.select(d(1)), SelectOutcome::Ignored);
        assert_eq!(c.diagnostics().count_kind("load"), 1);
    }

    #[test]
    fn reload_rebuilds_markers_and_resets_selection() {
        let mut c = loaded(RecordingView::with_transition_events(), ViewerConfig::default());
        let old = c.registry().marker_for_day(d(1)).unwrap();

        let next = TripData::from_records(vec![rec(7, 1.0, 1.0)]);
        assert_eq!(c.load(Ok(next)), Some(d(7)));
        assert_eq!(c.registry().entry(old), None);
        assert_eq!(c.active_day(), Some(d(7)));
        assert_eq!(c.select(d(1)), SelectOutcome::Ignored);
    }

    #[test]
    fn photo_failures_walk_the_fallback_chain() {
        let mut c = loaded(RecordingView::with_transition_events(), ViewerConfig::default());
        c.photo_failed(d(1));
        c.photo_failed(d(1));
        c.photo_failed(d(1));
        c.photo_failed(d(3));
        assert_eq!(
            c.view_mut().take_commands(),
            vec![
                Cmd::Photo(d(1), Some("day-1.png".to_string())),
                Cmd::Photo(d(1), None),
            ]
        );
        assert_eq!(c.diagnostics().count_kind("asset"), 3);
    }

    #[test]
    fn photo_click_enlarges_the_displayed_candidate() {
        let mut c = loaded(RecordingView::with_transition_events(), ViewerConfig::default());
        assert!(c.photo_clicked(d(1)));
        assert_eq!(
            c.view_mut().take_commands(),
            vec![Cmd::LightboxOpen("day-1.jpg".to_string())]
        );
        c.close_lightbox();
        c.close_lightbox();
        assert_eq!(c.view_mut().take_commands(), vec![Cmd::LightboxClose]);

        c.photo_failed(d(1));
        c.view_mut().take_commands();
        assert!(c.photo_clicked(d(1)));
        assert_eq!(
            c.view_mut().take_commands(),
            vec![Cmd::LightboxOpen("day-1.png".to_string())]
        );
        assert!(c.lightbox_open());

        c.select(d(3));
        assert!(!c.lightbox_open());
        assert_eq!(c.view_mut().take_commands().first(), Some(&Cmd::LightboxClose));

        c.photo_failed(d(3));
        c.photo_failed(d(3));
        c.view_mut().take_commands();
        assert!(!c.photo_clicked(d(3)));
        assert!(!c.photo_clicked(d(1)));
        assert_eq!(c.view_mut().take_commands(), Vec::<Cmd>::new());
        assert_eq!(c.metrics().counter("lightbox"), 2);
    }

    #[test]
    fn route_failure_is_non_fatal() {
        let mut c = loaded(RecordingView::with_transition_events(), ViewerConfig::default());
        c.load_route(Err(RouteGeometryError::NoLines));
        assert_eq!(c.view_mut().take_commands(), Vec::<Cmd>::new());
        assert_eq!(c.metrics().counter("route_error"), 1);
        assert_eq!(c.active_day(), Some(d(1)));
    }

    #[test]
    fn route_fits_viewport_only_while_idle() {
        let route = RouteGeometry {
            lines: vec![vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)]],
            ..RouteGeometry::default()
        };

        let mut idle = TripController::new(ViewerConfig::default(), RecordingView::default());
        idle.load_route(Ok(route.clone()));
        assert_eq!(
            idle.view_mut().take_commands(),
            vec![Cmd::DrawRoute(1), Cmd::FitBounds]
        );

        let mut busy = loaded(RecordingView::with_transition_events(), ViewerConfig::default());
        busy.load_route(Ok(route));
        assert_eq!(busy.view_mut().take_commands(), vec![Cmd::DrawRoute(1)]);
    }

    #[test]
    fn quarantined_records_are_logged() {
        let trip = TripData::from_json_str(
            r#"[{"day": 1, "lat": 1.0, "lng": 1.0}, {"day": 2}]"#,
        )
        .expect("load");
        let mut c = TripController::new(ViewerConfig::default(), RecordingView::default());
        c.load(Ok(trip));
        assert_eq!(c.diagnostics().count_kind("quarantine"), 1);
        assert_eq!(c.metrics().gauge("days"), Some(1));
    }

    #[test]
    fn breadcrumb_is_attached() {
        let c = loaded(RecordingView::with_transition_events(), ViewerConfig::default());
        let panel = c.view().shown.clone().expect("panel");
        assert_eq!(panel.breadcrumb.as_deref(), Some("Day 1 of 3 - Stop 1"));
    }

    #[test]
    fn breadcrumb_uses_day_numbers_with_gaps() {
        let trip = TripData::from_records(vec![rec(5, 1.0, 1.0), rec(9, 2.0, 2.0)]);
        let view = RecordingView::with_transition_events();
        let mut c = TripController::new(ViewerConfig::default(), view);
        assert_eq!(c.load(Ok(trip)), Some(d(5)));
        let first = c.view().shown.clone().expect("panel");
        assert_eq!(first.breadcrumb.as_deref(), Some("Day 5 of 2 - Stop 5"));

        c.select(d(9));
        let second = c.view().shown.clone().expect("panel");
        assert_eq!(second.breadcrumb.as_deref(), Some("Day 9 of 2 - Stop 9"));
    }
}
