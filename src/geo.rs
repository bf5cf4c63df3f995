use time::OffsetDateTime;

use crate::point::Coord;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculates the great circle distance between two coordinates using the haversine formula.
///
/// The Earth is treated as a sphere, which is plenty for deciding whether two photos
/// were taken within a few tens of kilometres of each other.
///
/// References:
/// - R.W. Sinnott, "Virtues of the Haversine", Sky and Telescope, vol. 68, no. 2, 1984, p. 159
/// - https://en.wikipedia.org/wiki/Haversine_formula
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    // a = sin²(Δφ/2) + cos φ1 ⋅ cos φ2 ⋅ sin²(Δλ/2)
    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);

    // c = 2 ⋅ atan2(√a, √(1−a))
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

pub fn distance_km(a: Coord, b: Coord) -> f64 {
    haversine_km(a.lat, a.lon, b.lat, b.lon)
}

/// Absolute time difference in fractional hours.
pub fn hours_between(t1: OffsetDateTime, t2: OffsetDateTime) -> f64 {
    (t2 - t1).abs().as_seconds_f64() / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;
    use time::macros::datetime;

    #[test]
    fn test_haversine_km() {
        // Two points in San Francisco, roughly 1.4km apart
        let distance = haversine_km(37.7749, -122.4194, 37.7849, -122.4094);
        assert!(
            (distance - 1.4).abs() < 0.1,
            "Expected ~1.4km, got {}",
            distance
        );
    }

    #[test]
    fn test_distance_identity() {
        let a = Coord::new(48.8566, 2.3522);
        assert_eq!(distance_km(a, a), 0.0);
    }

    #[test]
    fn test_distance_symmetry() {
        let pairs = [
            (Coord::new(0.0, 0.0), Coord::new(5.0, 5.0)),
            (Coord::new(48.8566, 2.3522), Coord::new(51.5074, -0.1278)),
            (Coord::new(-33.8688, 151.2093), Coord::new(40.7128, -74.0060)),
            (Coord::new(89.9, 179.9), Coord::new(-89.9, -179.9)),
        ];

        for (a, b) in pairs {
            assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_distance_triangle_inequality() {
        let paris = Coord::new(48.8566, 2.3522);
        let london = Coord::new(51.5074, -0.1278);
        let berlin = Coord::new(52.5200, 13.4050);

        let direct = distance_km(paris, berlin);
        let via_london = distance_km(paris, london) + distance_km(london, berlin);
        assert!(direct <= via_london + 1e-9);
    }

    #[test]
    fn test_distance_paris_london() {
        let d = distance_km(Coord::new(48.8566, 2.3522), Coord::new(51.5074, -0.1278));
        assert!((d - 343.5).abs() < 2.0, "Expected ~343km, got {}", d);
    }

    #[test]
    fn test_hours_between_is_never_negative() {
        let t1 = datetime!(2024-05-01 10:00 UTC);
        let t2 = t1 + Duration::minutes(90);

        assert_eq!(hours_between(t1, t2), 1.5);
        assert_eq!(hours_between(t2, t1), 1.5);
        assert_eq!(hours_between(t1, t1), 0.0);
    }
}
