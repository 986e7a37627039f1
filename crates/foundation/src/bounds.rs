use crate::geo::Coordinate;

/// Lat/lng bounding box, used to fit the map viewport to the route.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl GeoBounds {
    pub fn from_point(c: Coordinate) -> Self {
        GeoBounds {
            south_west: c,
            north_east: c,
        }
    }

    /// Bounds enclosing every point, or `None` for an empty iterator.
    ///
    /// Does not handle routes crossing the antimeridian.
    pub fn enclosing(points: impl IntoIterator<Item = Coordinate>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut b = GeoBounds::from_point(first);
        for p in iter {
            b.extend(p);
        }
        Some(b)
    }

    pub fn extend(&mut self, c: Coordinate) {
        self.south_west.lat = self.south_west.lat.min(c.lat);
        self.south_west.lng = self.south_west.lng.min(c.lng);
        self.north_east.lat = self.north_east.lat.max(c.lat);
        self.north_east.lng = self.north_east.lng.max(c.lng);
    }

    pub fn union(&self, other: &GeoBounds) -> GeoBounds {
        let mut out = *self;
        out.extend(other.south_west);
        out.extend(other.north_east);
        out
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south_west.lat + self.north_east.lat) * 0.5,
            (self.south_west.lng + self.north_east.lng) * 0.5,
        )
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&c.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&c.lng)
    }
}
