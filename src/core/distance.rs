/// Earth's radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// Inputs are degrees and are not range-checked: any finite input yields a
/// finite, non-negative result, including antipodal points and the poles.
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1.0 near antipodes
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Distance from London to Paris (approximately 344 km)
        let london_lat = 51.5074;
        let london_lon = -0.1278;
        let paris_lat = 48.8566;
        let paris_lon = 2.3522;

        let distance = haversine_distance(london_lat, london_lon, paris_lat, paris_lon);
        assert!((distance - 344.0).abs() < 10.0, "Distance should be ~344km, got {}", distance);
    }

    #[test]
    fn test_identical_points() {
        assert_eq!(haversine_distance(-23.55, -46.60, -23.55, -46.60), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let there = haversine_distance(-23.55, -46.60, -22.9068, -43.1729);
        let back = haversine_distance(-22.9068, -43.1729, -23.55, -46.60);
        assert_eq!(there, back);
    }

    #[test]
    fn test_antipodal_points() {
        let distance = haversine_distance(0.0, 0.0, 0.0, 180.0);
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((distance - half_circumference).abs() < 1e-6);
    }

    #[test]
    fn test_pole_to_pole() {
        let distance = haversine_distance(90.0, 0.0, -90.0, 0.0);
        assert!(distance.is_finite());
        assert!((distance - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_input_is_finite() {
        let distance = haversine_distance(200.0, 400.0, -95.0, -720.0);
        assert!(distance.is_finite());
        assert!(distance >= 0.0);
    }
}
