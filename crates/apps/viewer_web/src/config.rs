use std::time::Duration;

use scene::{PhotoConvention, ViewerConfig};
use serde::Deserialize;

/// Page-level settings, passed to [`crate::boot`] as JSON. Every field is
/// optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostConfig {
    pub itinerary_url: String,
    /// GeoJSON or KML route drawn under the markers.
    pub route_url: Option<String>,
    pub fetch_timeout_ms: u32,
    pub map_element: String,
    pub nav_element: String,
    pub detail_element: String,
    /// Photo overlay and the `<img>` inside it.
    pub lightbox_element: String,
    pub lightbox_image: String,
    pub tile_url: String,
    pub tile_attribution: String,
    pub initial_center: [f64; 2],
    pub initial_zoom: f64,
    pub focus_zoom: f64,
    pub transition_ms: u64,
    pub toggle_on_reselect: bool,
    /// Directory prefix of day photos.
    pub photo_base: String,
    pub photo_prefix: String,
    pub route_color: String,
    pub route_weight: f64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            itinerary_url: "./itinerary.json".to_string(),
            route_url: None,
            fetch_timeout_ms: 10_000,
            map_element: "map-container".to_string(),
            nav_element: "days-nav".to_string(),
            detail_element: "day-content".to_string(),
            lightbox_element: "lightbox".to_string(),
            lightbox_image: "lightbox-img".to_string(),
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            tile_attribution: "&copy; OpenStreetMap contributors".to_string(),
            initial_center: [36.17, -115.90],
            initial_zoom: 4.0,
            focus_zoom: 10.0,
            transition_ms: 1000,
            toggle_on_reselect: false,
            photo_base: "images/".to_string(),
            photo_prefix: "day-".to_string(),
            route_color: "#2563eb".to_string(),
            route_weight: 3.0,
        }
    }
}

impl HostConfig {
    /// Parses the page's JSON settings; blank input means defaults.
    pub fn from_json(json: &str) -> Result<Self, String> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(|e| format!("invalid viewer settings: {e}"))
    }

    pub fn viewer_config(&self) -> ViewerConfig {
        let defaults = ViewerConfig::default();
        ViewerConfig {
            toggle_on_reselect: self.toggle_on_reselect,
            focus_zoom: self.focus_zoom,
            transition: Duration::from_millis(self.transition_ms),
            photos: PhotoConvention {
                base: self.photo_base.clone(),
                prefix: self.photo_prefix.clone(),
                ..defaults.photos.clone()
            },
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HostConfig;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn blank_settings_use_defaults() {
        assert_eq!(HostConfig::from_json("  "), Ok(HostConfig::default()));
    }

    #[test]
    fn partial_settings_keep_other_defaults() {
        let cfg = HostConfig::from_json(
            r#"{"routeUrl": "route.kml", "toggleOnReselect": true, "transitionMs": 400}"#,
        )
        .expect("parse");
        assert_eq!(cfg.route_url.as_deref(), Some("route.kml"));
        assert_eq!(cfg.itinerary_url, "./itinerary.json");
        assert_eq!(cfg.lightbox_element, "lightbox");

        let viewer = cfg.viewer_config();
        assert!(viewer.toggle_on_reselect);
        assert_eq!(viewer.transition, Duration::from_millis(400));
        assert_eq!(viewer.photos.base, "images/");
        assert_eq!(viewer.photos.secondary_ext, "png");
    }

    #[test]
    fn malformed_settings_are_reported() {
        let err = HostConfig::from_json("{").unwrap_err();
        assert!(err.starts_with("invalid viewer settings"));
    }
}
