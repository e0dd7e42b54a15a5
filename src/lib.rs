//! Pet Match - proximity and matching service for the lost-and-found pet registry
//!
//! Finds open reports near a point and scores found-pet reports against a
//! user's lost-pet reports. Reports live in an external store reached through
//! the `ReportStore` trait.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{find_matches, find_nearby, haversine_distance, Matcher, ProximityFilter};
pub use models::{NewReport, Report, ReportState, ReportUpdate, Size, Species};
pub use services::{Registry, RegistryError, ReportStore, StoreError};
