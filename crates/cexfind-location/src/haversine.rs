//! Great-circle distance between two coordinates.

pub const EARTH_RADIUS_MILES: f64 = 3958.0;
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Haversine distance from `p` to `q`, returned as `(miles, kilometres)`.
///
/// Inputs must be finite; NaN coordinates produce NaN distances.
#[must_use]
pub fn haversine_distance(p: Coordinate, q: Coordinate) -> (f64, f64) {
    let lat1 = p.latitude.to_radians();
    let lon1 = p.longitude.to_radians();
    let lat2 = q.latitude.to_radians();
    let lon2 = q.longitude.to_radians();

    let half_dlat = ((lat2 - lat1) / 2.0).sin();
    let half_dlon = ((lon2 - lon1) / 2.0).sin();

    let a = half_dlat * half_dlat + lat1.cos() * lat2.cos() * half_dlon * half_dlon;
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    (c * EARTH_RADIUS_MILES, c * EARTH_RADIUS_KM)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: Coordinate = Coordinate {
        latitude: 51.5074,
        longitude: -0.1278,
    };
    const PARIS: Coordinate = Coordinate {
        latitude: 48.8566,
        longitude: 2.3522,
    };

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_distance(LONDON, LONDON), (0.0, 0.0));
    }

    #[test]
    fn distance_is_symmetric() {
        let (mi_ab, km_ab) = haversine_distance(LONDON, PARIS);
        let (mi_ba, km_ba) = haversine_distance(PARIS, LONDON);
        assert!((mi_ab - mi_ba).abs() < 1e-9);
        assert!((km_ab - km_ba).abs() < 1e-9);
    }

    #[test]
    fn london_to_paris_matches_known_distance() {
        let (mi, km) = haversine_distance(LONDON, PARIS);
        assert!((km - 343.5).abs() < 1.0, "got {km} km");
        assert!((mi - 213.4).abs() < 1.0, "got {mi} mi");
    }

    #[test]
    fn miles_and_km_share_the_same_arc() {
        let leeds = Coordinate::new(53.7915, -1.5322);
        let havant = Coordinate::new(50.852_325, -0.982_041);
        let (mi, km) = haversine_distance(leeds, havant);
        assert!((mi / EARTH_RADIUS_MILES - km / EARTH_RADIUS_KM).abs() < 1e-12);
    }
}
