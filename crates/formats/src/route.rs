use foundation::bounds::GeoBounds;
use foundation::geo::Coordinate;
use foundation::math::path_length_m;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde_json::Value;

/// Polyline geometry of the overall trip route.
///
/// Point features are dropped on parse: day markers come from the itinerary,
/// not from the route file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteGeometry {
    pub lines: Vec<Vec<Coordinate>>,
    /// Point/MultiPoint members that were discarded.
    pub discarded_points: usize,
    /// Features with geometry this parser does not draw (polygons).
    pub ignored_features: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteGeometryError {
    /// The route file could not be retrieved.
    Fetch(String),
    Json(String),
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
    Xml(String),
    InvalidCoordinates(String),
    NoLines,
}

impl std::fmt::Display for RouteGeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteGeometryError::Fetch(msg) => write!(f, "route file unavailable: {msg}"),
            RouteGeometryError::Json(msg) => write!(f, "route JSON parse error: {msg}"),
            RouteGeometryError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            RouteGeometryError::InvalidFeature { index, reason } => {
                write!(f, "invalid route feature at index {index}: {reason}")
            }
            RouteGeometryError::Xml(msg) => write!(f, "route KML parse error: {msg}"),
            RouteGeometryError::InvalidCoordinates(tuple) => {
                write!(f, "invalid KML coordinate tuple: {tuple:?}")
            }
            RouteGeometryError::NoLines => write!(f, "route contains no line geometry"),
        }
    }
}

impl std::error::Error for RouteGeometryError {}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RouteFormat {
    GeoJson,
    Kml,
}

impl RouteFormat {
    /// Guesses the format from a path or URL extension.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let (_, ext) = path.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        match ext.as_str() {
            "kml" => Some(RouteFormat::Kml),
            "json" | "geojson" => Some(RouteFormat::GeoJson),
            _ => None,
        }
    }
}

impl RouteGeometry {
    pub fn parse(payload: &str, format: RouteFormat) -> Result<Self, RouteGeometryError> {
        match format {
            RouteFormat::GeoJson => Self::from_geojson_str(payload),
            RouteFormat::Kml => Self::from_kml_str(payload),
        }
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, RouteGeometryError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| RouteGeometryError::Json(e.to_string()))?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, RouteGeometryError> {
        let obj = value
            .as_object()
            .ok_or(RouteGeometryError::NotAFeatureCollection)?;
        if obj.get("type").and_then(|v| v.as_str()) != Some("FeatureCollection") {
            return Err(RouteGeometryError::NotAFeatureCollection);
        }
        let features = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(RouteGeometryError::NotAFeatureCollection)?;

        let mut route = RouteGeometry::default();
        for (index, feat) in features.iter().enumerate() {
            let feat_obj = feat
                .as_object()
                .ok_or_else(|| RouteGeometryError::InvalidFeature {
                    index,
                    reason: "feature must be an object".to_string(),
                })?;
            match feat_obj.get("geometry") {
                None | Some(Value::Null) => continue,
                Some(geometry) => route
                    .add_geojson_geometry(geometry)
                    .map_err(|reason| RouteGeometryError::InvalidFeature { index, reason })?,
            }
        }

        route.require_lines()
    }

    pub fn from_kml_str(payload: &str) -> Result<Self, RouteGeometryError> {
        let mut reader = Reader::from_str(payload);
        reader.config_mut().trim_text(true);

        #[derive(Copy, Clone, PartialEq)]
        enum Owner {
            None,
            Line,
            Point,
            Other,
        }

        let mut route = RouteGeometry::default();
        let mut owner = Owner::None;
        let mut in_coordinates = false;
        let mut text = String::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"LineString" => owner = Owner::Line,
                    b"Point" => owner = Owner::Point,
                    b"Polygon" => {
                        owner = Owner::Other;
                        route.ignored_features += 1;
                    }
                    b"coordinates" => {
                        in_coordinates = true;
                        text.clear();
                    }
                    _ => {}
                },
                Ok(Event::Text(t)) if in_coordinates => {
                    text.push_str(&String::from_utf8_lossy(&t));
                }
                Ok(Event::CData(c)) if in_coordinates => {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"coordinates" => {
                        in_coordinates = false;
                        let points = parse_kml_coordinates(&text)?;
                        match owner {
                            Owner::Line if points.len() >= 2 => route.lines.push(points),
                            Owner::Point => route.discarded_points += points.len(),
                            _ => {}
                        }
                    }
                    b"LineString" | b"Point" | b"Polygon" => owner = Owner::None,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(RouteGeometryError::Xml(e.to_string())),
            }
        }

        route.require_lines()
    }

    pub fn point_count(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }

    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::enclosing(self.lines.iter().flatten().copied())
    }

    pub fn total_length_m(&self) -> f64 {
        self.lines.iter().map(|l| path_length_m(l)).sum()
    }

    fn require_lines(self) -> Result<Self, RouteGeometryError> {
        if self.lines.is_empty() {
            Err(RouteGeometryError::NoLines)
        } else {
            Ok(self)
        }
    }

    fn add_geojson_geometry(&mut self, value: &Value) -> Result<(), String> {
        let obj = value
            .as_object()
            .ok_or("geometry must be an object".to_string())?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or("geometry missing type".to_string())?;

        if ty == "GeometryCollection" {
            let members = obj
                .get("geometries")
                .and_then(|v| v.as_array())
                .ok_or("GeometryCollection missing geometries".to_string())?;
            for member in members {
                self.add_geojson_geometry(member)?;
            }
            return Ok(());
        }

        let coords = obj
            .get("coordinates")
            .ok_or("geometry missing coordinates".to_string())?;

        match ty {
            "Point" => self.discarded_points += 1,
            "MultiPoint" => self.discarded_points += array(coords, "MultiPoint")?.len(),
            "LineString" => self.lines.push(parse_positions(coords)?),
            "MultiLineString" => {
                for line in array(coords, "MultiLineString")? {
                    self.lines.push(parse_positions(line)?);
                }
            }
            "Polygon" | "MultiPolygon" => self.ignored_features += 1,
            other => return Err(format!("unsupported geometry type: {other}")),
        }
        Ok(())
    }
}

fn array<'a>(v: &'a Value, what: &str) -> Result<&'a Vec<Value>, String> {
    v.as_array()
        .ok_or_else(|| format!("{what} coordinates must be an array"))
}

/// GeoJSON positions are `[lon, lat, (alt)]`.
fn parse_position(v: &Value) -> Result<Coordinate, String> {
    let arr = v
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lng = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok(Coordinate::new(lat, lng))
}

fn parse_positions(v: &Value) -> Result<Vec<Coordinate>, String> {
    array(v, "LineString")?.iter().map(parse_position).collect()
}

/// KML coordinates are whitespace separated `lon,lat[,alt]` tuples.
fn parse_kml_coordinates(text: &str) -> Result<Vec<Coordinate>, RouteGeometryError> {
    text.split_whitespace()
        .map(|tuple| {
            let mut parts = tuple.split(',');
            let lng = parts.next().and_then(|s| s.trim().parse::<f64>().ok());
            let lat = parts.next().and_then(|s| s.trim().parse::<f64>().ok());
            match (lat, lng) {
                (Some(lat), Some(lng)) => Ok(Coordinate::new(lat, lng)),
                _ => Err(RouteGeometryError::InvalidCoordinates(tuple.to_string())),
            }
        })
        .collect()
}
