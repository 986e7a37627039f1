//! Bindings to the global Leaflet `L` namespace.
//!
//! Only the calls the viewer makes are bound. Constructors that fail when
//! the script did not load are marked `catch`.

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    pub type Map;

    #[wasm_bindgen(catch, js_namespace = L, js_name = map)]
    pub fn map(element_id: &str) -> Result<Map, JsValue>;

    #[wasm_bindgen(method, js_name = setView)]
    pub fn set_view(this: &Map, center: &JsValue, zoom: f64) -> Map;

    #[wasm_bindgen(method, js_name = flyTo)]
    pub fn fly_to(this: &Map, center: &JsValue, zoom: f64, options: &JsValue) -> Map;

    #[wasm_bindgen(method, js_name = fitBounds)]
    pub fn fit_bounds(this: &Map, bounds: &JsValue) -> Map;

    #[wasm_bindgen(method, js_name = closePopup)]
    pub fn close_popup(this: &Map) -> Map;

    #[wasm_bindgen(method, js_name = on)]
    pub fn on(this: &Map, event: &str, handler: &js_sys::Function) -> Map;

    pub type Layer;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &Layer, map: &Map) -> Layer;

    #[wasm_bindgen(method)]
    pub fn remove(this: &Layer) -> Layer;

    #[wasm_bindgen(extends = Layer)]
    pub type Marker;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    pub fn marker(at: &JsValue, options: &JsValue) -> Marker;

    #[wasm_bindgen(method, js_name = setIcon)]
    pub fn set_icon(this: &Marker, icon: &JsValue) -> Marker;

    #[wasm_bindgen(method, js_name = bindPopup)]
    pub fn bind_popup(this: &Marker, html: &str, options: &JsValue) -> Marker;

    #[wasm_bindgen(method, js_name = bindTooltip)]
    pub fn bind_tooltip(this: &Marker, text: &str, options: &JsValue) -> Marker;

    #[wasm_bindgen(method, js_name = openPopup)]
    pub fn open_popup(this: &Marker) -> Marker;

    #[wasm_bindgen(method, js_name = on)]
    pub fn on_marker(this: &Marker, event: &str, handler: &js_sys::Function) -> Marker;

    #[wasm_bindgen(js_namespace = L, js_name = divIcon)]
    pub fn div_icon(options: &JsValue) -> JsValue;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    pub fn tile_layer(url_template: &str, options: &JsValue) -> Layer;

    #[wasm_bindgen(js_namespace = L, js_name = polyline)]
    pub fn polyline(latlngs: &JsValue, options: &JsValue) -> Layer;
}

/// `[lat, lng]` array.
pub fn lat_lng(lat: f64, lng: f64) -> JsValue {
    Array::of2(&JsValue::from_f64(lat), &JsValue::from_f64(lng)).into()
}

/// Plain options object from key/value pairs.
pub fn options(pairs: &[(&str, JsValue)]) -> JsValue {
    let obj = Object::new();
    for (key, value) in pairs {
        let _ = Reflect::set(&obj, &JsValue::from_str(key), value);
    }
    obj.into()
}

pub fn marker_icon(active: bool) -> JsValue {
    let class = if active { "marker-active" } else { "marker-default" };
    div_icon(&options(&[
        ("className", JsValue::from_str(class)),
        (
            "html",
            JsValue::from_str(&format!("<div class=\"{class}\"></div>")),
        ),
        ("iconSize", Array::of2(&JsValue::from_f64(24.0), &JsValue::from_f64(24.0)).into()),
        ("iconAnchor", Array::of2(&JsValue::from_f64(12.0), &JsValue::from_f64(12.0)).into()),
    ]))
}
