use serde::{Deserialize, Serialize};

/// Geographic position in degrees (WGS84).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180].
    pub fn is_in_range(&self) -> bool {
        self.is_finite() && (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn key(&self) -> CoordinateKey {
        CoordinateKey::from(*self)
    }
}

/// Bit-exact equality key for a [`Coordinate`].
///
/// Two coordinates share a key only if both components have identical bit
/// patterns. No rounding or tolerance is applied, so `0.0` and `-0.0` are
/// distinct keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordinateKey {
    lat_bits: u64,
    lng_bits: u64,
}

impl CoordinateKey {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(f64::from_bits(self.lat_bits), f64::from_bits(self.lng_bits))
    }
}

impl From<Coordinate> for CoordinateKey {
    fn from(c: Coordinate) -> Self {
        Self {
            lat_bits: c.lat.to_bits(),
            lng_bits: c.lng.to_bits(),
        }
    }
}
