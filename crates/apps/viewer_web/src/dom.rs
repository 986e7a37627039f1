use std::collections::HashMap;
use std::time::Duration;

use foundation::bounds::GeoBounds;
use foundation::geo::Coordinate;
use foundation::ids::DayNumber;
use formats::AgendaItem;
use js_sys::Array;
use scene::{
    DetailPanel, DetailSurface, MapSurface, MarkerId, MarkerPopup, MarkerStyle,
    NavEntry, NavSurface, TransitionId,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlImageElement};

use crate::config::HostConfig;
use crate::leaflet::{self, lat_lng, marker_icon, options};

const PHOTO_ID: &str = "day-photo";
/// Agenda rows keep their feed order, so they render as an ordered list.
const AGENDA_TAG: &str = "ol";

/// Browser rendition of the trip view: Leaflet for the map, plain DOM for
/// the navigation list and the detail panel.
///
/// Event handlers only capture plain values (a day, a marker) and go through
/// [`crate::dispatch`], so they never touch the view directly.
pub struct DomView {
    document: Document,
    map: Option<leaflet::Map>,
    nav: Option<Element>,
    detail: Option<Element>,
    markers: HashMap<MarkerId, leaflet::Marker>,
    route: Option<leaflet::Layer>,
    in_flight: Option<TransitionId>,
    route_color: String,
    route_weight: f64,
    marker_handlers: Vec<Closure<dyn FnMut()>>,
    nav_handlers: Vec<Closure<dyn FnMut()>>,
    photo_handler: Option<Closure<dyn FnMut()>>,
    photo_click: Option<Closure<dyn FnMut()>>,
    lightbox: Option<Element>,
    lightbox_image: Option<HtmlImageElement>,
    _lightbox_close: Option<Closure<dyn FnMut()>>,
    _move_end: Option<Closure<dyn FnMut()>>,
}

impl DomView {
    pub fn new(document: Document, config: &HostConfig) -> Self {
        let map = init_map(config);
        let move_end = map.as_ref().map(|m| {
            let handler = Closure::<dyn FnMut()>::new(|| {
                crate::dispatch(|c| {
                    if let Some(t) = c.view_mut().in_flight.take() {
                        c.transition_finished(t);
                    }
                });
            });
            m.on("moveend", handler.as_ref().unchecked_ref());
            handler
        });

        let lightbox = document.get_element_by_id(&config.lightbox_element);
        let lightbox_image = document
            .get_element_by_id(&config.lightbox_image)
            .and_then(|el| el.dyn_into::<HtmlImageElement>().ok());
        let lightbox_close = lightbox.as_ref().map(|overlay| {
            let handler = Closure::<dyn FnMut()>::new(|| {
                crate::dispatch(|c| c.close_lightbox());
            });
            if let Some(el) = overlay.dyn_ref::<web_sys::HtmlElement>() {
                el.set_onclick(Some(handler.as_ref().unchecked_ref()));
            }
            handler
        });

        Self {
            nav: document.get_element_by_id(&config.nav_element),
            detail: document.get_element_by_id(&config.detail_element),
            document,
            map,
            markers: HashMap::new(),
            route: None,
            in_flight: None,
            route_color: config.route_color.clone(),
            route_weight: config.route_weight,
            marker_handlers: Vec::new(),
            nav_handlers: Vec::new(),
            photo_handler: None,
            photo_click: None,
            lightbox,
            lightbox_image,
            _lightbox_close: lightbox_close,
            _move_end: move_end,
        }
    }

    fn nav_button(&self, day: DayNumber) -> Option<Element> {
        let nav = self.nav.as_ref()?;
        nav.query_selector(&format!(".day-button[data-day=\"{day}\"]"))
            .ok()
            .flatten()
    }

    fn element(&self, tag: &str, class: &str, text: &str) -> Result<Element, JsValue> {
        let el = self.document.create_element(tag)?;
        if !class.is_empty() {
            el.set_class_name(class);
        }
        if !text.is_empty() {
            el.set_text_content(Some(text));
        }
        Ok(el)
    }

    fn build_panel(&mut self, panel: &DetailPanel) -> Result<Element, JsValue> {
        let root = self.element("article", "day-detail", "")?;

        if let Some(crumb) = &panel.breadcrumb {
            root.append_child(&self.element("p", "breadcrumb", crumb)?.into())?;
        }
        root.append_child(&self.element("h2", "day-title", &panel.title)?.into())?;

        let facts = self.element("dl", "day-facts", "")?;
        for (label, value) in [
            ("Wake up", panel.wake.as_deref()),
            ("Sleep", panel.sleep.as_deref()),
            ("Travel", panel.travel.as_deref()),
        ] {
            if let Some(value) = value {
                facts.append_child(&self.element("dt", "", label)?.into())?;
                facts.append_child(&self.element("dd", "", value)?.into())?;
            }
        }
        root.append_child(&facts)?;

        if !panel.narrative.is_empty() {
            root.append_child(&self.element("p", "narrative", &panel.narrative)?.into())?;
        }

        if !panel.agenda.is_empty() {
            let list = self.element(AGENDA_TAG, "agenda", "")?;
            for item in &panel.agenda {
                let li = self.element("li", "", "")?;
                match item {
                    AgendaItem::Timed { time, activity } => {
                        li.append_child(&self.element("span", "agenda-time", time)?.into())?;
                        li.append_child(&self.element("span", "agenda-activity", activity)?.into())?;
                    }
                    AgendaItem::Plain(text) => li.set_text_content(Some(text)),
                }
                list.append_child(&li)?;
            }
            root.append_child(&list)?;
        }

        let figure = self.element("figure", "day-photo", "")?;
        let img: HtmlImageElement = self.document.create_element("img")?.dyn_into()?;
        img.set_id(PHOTO_ID);
        img.set_alt(&panel.photo.alt);
        self.watch_photo(&img, panel.day);
        img.set_src(&panel.photo.primary);
        figure.append_child(&img)?;
        figure.append_child(&self.element("figcaption", "", &panel.photo.alt)?.into())?;
        root.append_child(&figure)?;

        Ok(root)
    }

    fn watch_photo(&mut self, img: &HtmlImageElement, day: DayNumber) {
        let handler = Closure::<dyn FnMut()>::new(move || {
            crate::dispatch(move |c| c.photo_failed(day));
        });
        img.set_onerror(Some(handler.as_ref().unchecked_ref()));
        self.photo_handler = Some(handler);

        let click = Closure::<dyn FnMut()>::new(move || {
            crate::dispatch(move |c| {
                c.photo_clicked(day);
            });
        });
        img.set_onclick(Some(click.as_ref().unchecked_ref()));
        self.photo_click = Some(click);
    }

    fn photo_element(&self) -> Option<Element> {
        self.detail.as_ref()?.query_selector(&format!("#{PHOTO_ID}")).ok().flatten()
    }
}

impl MapSurface for DomView {
    fn clear_markers(&mut self) {
        for marker in self.markers.values() {
            marker.remove();
        }
        self.markers.clear();
        self.marker_handlers.clear();
    }

    fn add_marker(&mut self, id: MarkerId, at: Coordinate, popup: &MarkerPopup) {
        let Some(map) = &self.map else {
            return;
        };
        let marker = leaflet::marker(
            &lat_lng(at.lat, at.lng),
            &options(&[("icon", marker_icon(false))]),
        );
        let html = format!(
            "<div class=\"marker-popup\"><h3>{}</h3><p>{}</p></div>",
            escape_html(&popup.heading),
            escape_html(&popup.label)
        );
        marker.bind_popup(&html, &options(&[("className", "custom-popup".into())]));
        marker.bind_tooltip(
            &popup.label,
            &options(&[("direction", "top".into()), ("sticky", true.into())]),
        );

        let handler = Closure::<dyn FnMut()>::new(move || {
            crate::dispatch(move |c| {
                c.marker_clicked(id);
            });
        });
        marker.on_marker("click", handler.as_ref().unchecked_ref());
        marker.add_to(map);

        self.marker_handlers.push(handler);
        self.markers.insert(id, marker);
    }

    fn set_marker_style(&mut self, id: MarkerId, style: MarkerStyle) {
        if let Some(marker) = self.markers.get(&id) {
            marker.set_icon(&marker_icon(style == MarkerStyle::Active));
        }
    }

    fn close_popups(&mut self) {
        if let Some(map) = &self.map {
            map.close_popup();
        }
    }

    fn open_popup(&mut self, id: MarkerId) {
        if let Some(marker) = self.markers.get(&id) {
            marker.open_popup();
        }
    }

    fn fly_to(&mut self, transition: TransitionId, at: Coordinate, zoom: f64, duration: Duration) {
        let Some(map) = &self.map else {
            return;
        };
        self.in_flight = Some(transition);
        map.fly_to(
            &lat_lng(at.lat, at.lng),
            zoom,
            &options(&[("duration", JsValue::from_f64(duration.as_secs_f64()))]),
        );
    }

    fn draw_route(&mut self, lines: &[Vec<Coordinate>]) {
        let Some(map) = &self.map else {
            return;
        };
        if let Some(old) = self.route.take() {
            old.remove();
        }
        let latlngs: Array = lines
            .iter()
            .map(|line| {
                line.iter()
                    .map(|c| lat_lng(c.lat, c.lng))
                    .collect::<Array>()
            })
            .collect();
        let layer = leaflet::polyline(
            &latlngs,
            &options(&[
                ("color", JsValue::from_str(&self.route_color)),
                ("weight", JsValue::from_f64(self.route_weight)),
            ]),
        );
        layer.add_to(map);
        self.route = Some(layer);
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) {
        if let Some(map) = &self.map {
            let sw = lat_lng(bounds.south_west.lat, bounds.south_west.lng);
            let ne = lat_lng(bounds.north_east.lat, bounds.north_east.lng);
            map.fit_bounds(&Array::of2(&sw, &ne));
        }
    }

    fn reports_transition_end(&self) -> bool {
        self.map.is_some()
    }
}

impl NavSurface for DomView {
    fn populate(&mut self, entries: &[NavEntry]) {
        let Some(nav) = self.nav.clone() else {
            return;
        };
        nav.set_inner_html("");
        self.nav_handlers.clear();

        for entry in entries {
            let button = match self.element("button", "day-button", &entry.label) {
                Ok(b) => b,
                Err(err) => {
                    crate::console_error(&format!("nav button: {err:?}"));
                    continue;
                }
            };
            let _ = button.set_attribute("data-day", &entry.day.to_string());
            let _ = button.set_attribute("type", "button");

            let day = entry.day;
            let handler = Closure::<dyn FnMut()>::new(move || {
                crate::dispatch(move |c| {
                    c.select(day);
                });
            });
            if let Some(el) = button.dyn_ref::<web_sys::HtmlElement>() {
                el.set_onclick(Some(handler.as_ref().unchecked_ref()));
            }
            let _ = nav.append_child(&button);
            self.nav_handlers.push(handler);
        }
    }

    fn set_selected(&mut self, day: DayNumber, selected: bool) {
        if let Some(button) = self.nav_button(day) {
            let _ = button.class_list().toggle_with_force("active", selected);
        }
    }

    fn scroll_into_view(&mut self, day: DayNumber) {
        if let Some(button) = self.nav_button(day) {
            button.scroll_into_view();
        }
    }
}

impl DetailSurface for DomView {
    fn clear(&mut self) {
        if let Some(detail) = &self.detail {
            detail.set_inner_html("");
        }
        self.photo_handler = None;
        self.photo_click = None;
    }

    fn show(&mut self, panel: &DetailPanel) {
        let Some(detail) = self.detail.clone() else {
            return;
        };
        match self.build_panel(panel) {
            Ok(el) => {
                let _ = detail.append_child(&el);
            }
            Err(err) => crate::console_error(&format!("detail panel: {err:?}")),
        }
    }

    fn set_photo(&mut self, day: DayNumber, src: Option<&str>, alt: &str) {
        let Some(photo) = self.photo_element() else {
            return;
        };
        match src {
            Some(src) => {
                if let Some(img) = photo.dyn_ref::<HtmlImageElement>() {
                    img.set_src(src);
                }
            }
            None => {
                let Ok(placeholder) = self.element("div", "photo-unavailable", "No image available")
                else {
                    return;
                };
                let _ = placeholder.set_attribute("aria-label", alt);
                let _ = placeholder.set_attribute("data-day", &day.to_string());
                let _ = photo.replace_with_with_node_1(&placeholder);
                self.photo_handler = None;
                self.photo_click = None;
            }
        }
    }

    fn show_error(&mut self, message: &str) {
        let Some(detail) = self.detail.clone() else {
            return;
        };
        detail.set_inner_html("");
        if let Ok(box_) = self.element("div", "load-error", "") {
            if let Ok(head) = self.element("strong", "", "Could not load the itinerary") {
                let _ = box_.append_child(&head);
            }
            if let Ok(body) = self.element("p", "", message) {
                let _ = box_.append_child(&body);
            }
            let _ = detail.append_child(&box_);
        }
    }

    fn open_lightbox(&mut self, src: &str, alt: &str) {
        let (Some(overlay), Some(img)) = (&self.lightbox, &self.lightbox_image) else {
            crate::console_error("lightbox markup is missing from the page");
            return;
        };
        img.set_src(src);
        img.set_alt(alt);
        let _ = overlay.class_list().add_1("active");
    }

    fn close_lightbox(&mut self) {
        if let Some(overlay) = &self.lightbox {
            let _ = overlay.class_list().remove_1("active");
        }
    }
}

fn init_map(config: &HostConfig) -> Option<leaflet::Map> {
    let map = match leaflet::map(&config.map_element) {
        Ok(map) => map,
        Err(err) => {
            crate::console_error(&format!("map unavailable: {err:?}"));
            return None;
        }
    };
    let [lat, lng] = config.initial_center;
    map.set_view(&lat_lng(lat, lng), config.initial_zoom);
    leaflet::tile_layer(
        &config.tile_url,
        &options(&[("attribution", JsValue::from_str(&config.tile_attribution))]),
    )
    .add_to(&map);
    Some(map)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{AGENDA_TAG, escape_html};

    #[test]
    fn agenda_is_an_ordered_list() {
        assert_eq!(AGENDA_TAG, "ol");
    }

    #[test]
    fn popup_text_is_escaped() {
        assert_eq!(
            escape_html("Bryce <Canyon> & \"Zion\""),
            "Bryce &lt;Canyon&gt; &amp; &quot;Zion&quot;"
        );
    }
}
