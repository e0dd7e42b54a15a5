// Core algorithm exports
pub mod distance;
pub mod matcher;
pub mod proximity;
pub mod scoring;

pub use distance::{haversine_distance, EARTH_RADIUS_KM};
pub use matcher::{find_matches, MatchResult, Matcher, DEFAULT_MATCH_THRESHOLD};
pub use proximity::{find_nearby, is_within_radius, HaversineFilter, ProximityFilter};
pub use scoring::{count_coincidences, COMPARED_ATTRIBUTES};
