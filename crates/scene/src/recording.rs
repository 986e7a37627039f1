//! In-memory [`TripView`](crate::surface::TripView) used by unit tests.

use std::collections::BTreeMap;
use std::time::Duration;

use foundation::bounds::GeoBounds;
use foundation::geo::Coordinate;
use foundation::ids::DayNumber;

use crate::detail::DetailPanel;
use crate::markers::MarkerId;
use crate::surface::{
    DetailSurface, MapSurface, MarkerPopup, MarkerStyle, NavEntry, NavSurface, TransitionId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    ClearMarkers,
    AddMarker(MarkerId, String),
    Style(MarkerId, MarkerStyle),
    ClosePopups,
    OpenPopup(MarkerId),
    FlyTo(TransitionId, Coordinate),
    DrawRoute(usize),
    FitBounds,
    Populate(Vec<DayNumber>),
    NavSelected(DayNumber, bool),
    ScrollTo(DayNumber),
    DetailClear,
    DetailShow(DayNumber, String),
    Photo(DayNumber, Option<String>),
    Error(String),
    LightboxOpen(String),
    LightboxClose,
}

#[derive(Debug, Default)]
pub struct RecordingView {
    pub commands: Vec<Cmd>,
    pub reports_transition_end: bool,
    styles: BTreeMap<MarkerId, MarkerStyle>,
    selected_nav: BTreeMap<DayNumber, bool>,
    pub shown: Option<DetailPanel>,
}

impl RecordingView {
    pub fn with_transition_events() -> Self {
        Self {
            reports_transition_end: true,
            ..Self::default()
        }
    }

    pub fn take_commands(&mut self) -> Vec<Cmd> {
        std::mem::take(&mut self.commands)
    }

    pub fn active_markers(&self) -> Vec<MarkerId> {
        self.styles
            .iter()
            .filter(|(_, s)| **s == MarkerStyle::Active)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn selected_nav(&self) -> Vec<DayNumber> {
        self.selected_nav
            .iter()
            .filter(|(_, s)| **s)
            .map(|(d, _)| *d)
            .collect()
    }

    pub fn last_transition(&self) -> Option<TransitionId> {
        self.commands.iter().rev().find_map(|c| match c {
            Cmd::FlyTo(t, _) => Some(*t),
            _ => None,
        })
    }
}

impl MapSurface for RecordingView {
    fn clear_markers(&mut self) {
        self.styles.clear();
        self.commands.push(Cmd::ClearMarkers);
    }

    fn add_marker(&mut self, marker: MarkerId, _at: Coordinate, popup: &MarkerPopup) {
        self.styles.insert(marker, MarkerStyle::Default);
        self.commands.push(Cmd::AddMarker(marker, popup.label.clone()));
    }

    fn set_marker_style(&mut self, marker: MarkerId, style: MarkerStyle) {
        self.styles.insert(marker, style);
        assert!(
            self.active_markers().len() <= 1,
            "two markers active at once: {:?}",
            self.active_markers()
        );
        self.commands.push(Cmd::Style(marker, style));
    }

    fn close_popups(&mut self) {
        self.commands.push(Cmd::ClosePopups);
    }

    fn open_popup(&mut self, marker: MarkerId) {
        self.commands.push(Cmd::OpenPopup(marker));
    }

    fn fly_to(&mut self, transition: TransitionId, at: Coordinate, _zoom: f64, _d: Duration) {
        self.commands.push(Cmd::FlyTo(transition, at));
    }

    fn draw_route(&mut self, lines: &[Vec<Coordinate>]) {
        self.commands.push(Cmd::DrawRoute(lines.len()));
    }

    fn fit_bounds(&mut self, _bounds: GeoBounds) {
        self.commands.push(Cmd::FitBounds);
    }

    fn reports_transition_end(&self) -> bool {
        self.reports_transition_end
    }
}

impl NavSurface for RecordingView {
    fn populate(&mut self, entries: &[NavEntry]) {
        self.selected_nav = entries.iter().map(|e| (e.day, false)).collect();
        self.commands
            .push(Cmd::Populate(entries.iter().map(|e| e.day).collect()));
    }

    fn set_selected(&mut self, day: DayNumber, selected: bool) {
        self.selected_nav.insert(day, selected);
        self.commands.push(Cmd::NavSelected(day, selected));
    }

    fn scroll_into_view(&mut self, day: DayNumber) {
        self.commands.push(Cmd::ScrollTo(day));
    }
}

impl DetailSurface for RecordingView {
    fn clear(&mut self) {
        self.shown = None;
        self.commands.push(Cmd::DetailClear);
    }

    fn show(&mut self, panel: &DetailPanel) {
        self.shown = Some(panel.clone());
        self.commands
            .push(Cmd::DetailShow(panel.day, panel.title.clone()));
    }

    fn set_photo(&mut self, day: DayNumber, src: Option<&str>, _alt: &str) {
        self.commands.push(Cmd::Photo(day, src.map(str::to_string)));
    }

    fn show_error(&mut self, message: &str) {
        self.shown = None;
        self.commands.push(Cmd::Error(message.to_string()));
    }

    fn open_lightbox(&mut self, src: &str, _alt: &str) {
        self.commands.push(Cmd::LightboxOpen(src.to_string()));
    }

    fn close_lightbox(&mut self) {
        self.commands.push(Cmd::LightboxClose);
    }
}
