//! Seams between the viewer core and whatever draws it.
//!
//! The browser host implements these with DOM nodes and Leaflet; tests use an
//! in-memory recorder. Only [`crate::TripController`] calls into them, so the
//! map and the panels have a single writer.

use std::time::Duration;

use foundation::bounds::GeoBounds;
use foundation::geo::Coordinate;
use foundation::ids::DayNumber;

use crate::detail::DetailPanel;
use crate::markers::MarkerId;

/// Visual state of a map marker.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MarkerStyle {
    Default,
    Active,
}

/// Token of one fly-to animation. Completion signals carry it back so stale
/// animations can be told apart from the current one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransitionId(pub u64);

/// Content of a marker's popup and hover tooltip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPopup {
    pub heading: String,
    /// Day label, also used as the tooltip text.
    pub label: String,
}

/// One navigation control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub day: DayNumber,
    pub label: String,
}

pub trait MapSurface {
    fn clear_markers(&mut self);
    fn add_marker(&mut self, marker: MarkerId, at: Coordinate, popup: &MarkerPopup);
    fn set_marker_style(&mut self, marker: MarkerId, style: MarkerStyle);
    fn close_popups(&mut self);
    fn open_popup(&mut self, marker: MarkerId);
    /// Starts an animated pan/zoom. If [`MapSurface::reports_transition_end`]
    /// is true the host must later call
    /// [`crate::TripController::transition_finished`] with `transition`.
    fn fly_to(&mut self, transition: TransitionId, at: Coordinate, zoom: f64, duration: Duration);
    fn draw_route(&mut self, lines: &[Vec<Coordinate>]);
    fn fit_bounds(&mut self, bounds: GeoBounds);

    fn reports_transition_end(&self) -> bool {
        false
    }
}

pub trait NavSurface {
    fn populate(&mut self, entries: &[NavEntry]);
    fn set_selected(&mut self, day: DayNumber, selected: bool);
    fn scroll_into_view(&mut self, day: DayNumber);
}

pub trait DetailSurface {
    fn clear(&mut self);
    fn show(&mut self, panel: &DetailPanel);
    /// Swaps the photo of the shown panel; `None` means "no image available".
    fn set_photo(&mut self, day: DayNumber, src: Option<&str>, alt: &str);
    /// Replaces the content area with a user-visible error.
    fn show_error(&mut self, message: &str);
    /// Full-size overlay of a photo.
    fn open_lightbox(&mut self, src: &str, alt: &str);
    fn close_lightbox(&mut self);
}

/// Everything the controller drives.
pub trait TripView: MapSurface + NavSurface + DetailSurface {}

impl<T: MapSurface + NavSurface + DetailSurface> TripView for T {}
