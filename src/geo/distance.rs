// src/geo/distance.rs
//! Great-circle distance and nearby-marker search

use super::marker::{Marker, NearbyResult};

/// Mean Earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two (lat, lon) points in degrees
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = ((d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Distance between two markers in kilometres
pub fn distance_between(a: &Marker, b: &Marker) -> f64 {
    haversine_km(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Markers within `radius_km` of `markers[reference]`, nearest first.
///
/// The reference marker is excluded by position, so a duplicate entry at the
/// same coordinates is still reported (at distance zero). An out-of-range
/// reference yields an empty list.
pub fn nearby(markers: &[Marker], reference: usize, radius_km: f64) -> Vec<NearbyResult> {
    let Some(origin) = markers.get(reference) else {
        return Vec::new();
    };

    let mut results: Vec<NearbyResult> = markers
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != reference)
        .map(|(index, marker)| NearbyResult {
            index,
            marker: marker.clone(),
            distance_km: distance_between(origin, marker),
        })
        .filter(|r| r.distance_km <= radius_km)
        .collect();

    results.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn marker(name: &str, lat: f64, lon: f64) -> Marker {
        Marker::new(name, lat, lon).unwrap()
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(14.5547, 121.0244)]
    #[case(-33.8688, 151.2093)]
    #[case(89.9, -179.9)]
    fn test_distance_to_self_is_zero(#[case] lat: f64, #[case] lon: f64) {
        assert_eq!(haversine_km(lat, lon, lat, lon), 0.0);
    }

    #[rstest]
    #[case((14.5547, 121.0244), (10.3308, 123.9055))]
    #[case((51.5074, -0.1278), (40.7128, -74.0060))]
    #[case((-90.0, 0.0), (90.0, 0.0))]
    fn test_distance_is_symmetric(#[case] a: (f64, f64), #[case] b: (f64, f64)) {
        let ab = haversine_km(a.0, a.1, b.0, b.1);
        let ba = haversine_km(b.0, b.1, a.0, a.1);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.195).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_london_to_new_york() {
        let d = haversine_km(51.5074, -0.1278, 40.7128, -74.0060);
        assert!((d - 5570.2).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_antipodal_points() {
        let d = haversine_km(0.0, 0.0, 0.0, 180.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_nearby_excludes_reference_and_respects_radius() {
        let markers = vec![
            marker("Origin", 14.5547, 121.0244),
            marker("Close", 14.5605, 121.0227),
            marker("Medium", 14.5509, 121.0503),
            marker("Far", 10.3308, 123.9055),
        ];

        let results = nearby(&markers, 0, 5.0);

        assert!(results.iter().all(|r| r.index != 0));
        assert!(results.iter().all(|r| r.distance_km <= 5.0));
        let names: Vec<&str> = results.iter().map(|r| r.marker.name.as_str()).collect();
        assert_eq!(names, vec!["Close", "Medium"]);
    }

    #[test]
    fn test_nearby_sorted_ascending() {
        let markers = vec![
            marker("Origin", 0.0, 0.0),
            marker("C", 0.0, 0.03),
            marker("A", 0.0, 0.01),
            marker("B", 0.0, 0.02),
        ];

        let results = nearby(&markers, 0, 10.0);

        assert!(results
            .windows(2)
            .all(|w| w[0].distance_km <= w[1].distance_km));
        assert_eq!(results[0].marker.name, "A");
    }

    #[test]
    fn test_nearby_keeps_duplicate_of_reference() {
        let markers = vec![marker("Twin", 1.0, 1.0), marker("Twin", 1.0, 1.0)];

        let results = nearby(&markers, 0, 1.0);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].index, 1);
        assert_eq!(results[0].distance_km, 0.0);
    }

    #[test]
    fn test_nearby_unknown_reference_is_empty() {
        let markers = vec![marker("Only", 1.0, 1.0)];
        assert!(nearby(&markers, 5, 100.0).is_empty());
    }
}
