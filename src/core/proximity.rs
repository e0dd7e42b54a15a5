use crate::core::distance::haversine_distance;
use crate::models::Report;

/// Strategy for reducing a candidate set to the reports within a radius
///
/// `HaversineFilter` scans every candidate. An index-backed implementation can
/// be swapped in behind this trait without touching callers.
pub trait ProximityFilter: Send + Sync {
    /// Whether a single report lies within `radius_km` of `origin`
    fn contains(&self, origin: (f64, f64), radius_km: f64, report: &Report) -> bool;

    /// Return the candidates within `radius_km` of `origin`, in input order
    fn retain_within(&self, origin: (f64, f64), radius_km: f64, candidates: &[Report]) -> Vec<Report> {
        candidates
            .iter()
            .filter(|report| self.contains(origin, radius_km, report))
            .cloned()
            .collect()
    }
}

/// Brute-force great-circle filter
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineFilter;

impl ProximityFilter for HaversineFilter {
    fn contains(&self, origin: (f64, f64), radius_km: f64, report: &Report) -> bool {
        is_within_radius(origin.0, origin.1, radius_km, report)
    }

    fn retain_within(&self, origin: (f64, f64), radius_km: f64, candidates: &[Report]) -> Vec<Report> {
        find_nearby(origin.0, origin.1, radius_km, candidates)
    }
}

/// Check whether a report lies within `radius_km` of a reference point
#[inline]
pub fn is_within_radius(ref_lat: f64, ref_lon: f64, radius_km: f64, report: &Report) -> bool {
    haversine_distance(ref_lat, ref_lon, report.latitude, report.longitude) <= radius_km
}

/// Keep every candidate within `radius_km` of the reference point
///
/// Ordering of the input is preserved. Report state is not inspected: callers
/// decide which states are eligible when they fetch the candidates.
pub fn find_nearby(ref_lat: f64, ref_lon: f64, radius_km: f64, candidates: &[Report]) -> Vec<Report> {
    candidates
        .iter()
        .filter(|report| is_within_radius(ref_lat, ref_lon, radius_km, report))
        .cloned()
        .collect()
}
