use crate::geo::Coordinate;

/// Mean Earth radius (meters), IUGG.
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle distance between two coordinates (haversine, spherical Earth).
pub fn great_circle_distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng * 0.5).sin().powi(2);
    2.0 * EARTH_MEAN_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Length of a polyline, summing great-circle legs.
pub fn path_length_m(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|w| great_circle_distance_m(w[0], w[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::{EARTH_MEAN_RADIUS_M, great_circle_distance_m, path_length_m};
    use crate::geo::Coordinate;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn same_point_is_zero() {
        let p = Coordinate::new(36.17, -115.9);
        assert_close(great_circle_distance_m(p, p), 0.0, 1e-9);
    }

    #[test]
    fn quarter_meridian() {
        let d = great_circle_distance_m(Coordinate::new(0.0, 0.0), Coordinate::new(90.0, 0.0));
        assert_close(d, EARTH_MEAN_RADIUS_M * std::f64::consts::FRAC_PI_2, 1e-6);
    }

    #[test]
    fn las_vegas_to_los_angeles() {
        let lv = Coordinate::new(36.1699, -115.1398);
        let la = Coordinate::new(34.0522, -118.2437);
        let km = great_circle_distance_m(lv, la) / 1000.0;
        assert!((360.0..380.0).contains(&km), "got {km} km");
    }

    #[test]
    fn path_length_sums_legs() {
        let pts = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(0.0, 2.0),
        ];
        let one = great_circle_distance_m(pts[0], pts[1]);
        assert_close(path_length_m(&pts), 2.0 * one, 1e-6);
        assert_eq!(path_length_m(&pts[..1]), 0.0);
    }
}
