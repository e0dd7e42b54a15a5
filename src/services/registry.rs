use std::sync::Arc;
use thiserror::Error;
use validator::Validate;

use crate::core::{HaversineFilter, Matcher, ProximityFilter};
use crate::models::{CreateReportRequest, NewReport, Report, ReportState, ReportUpdate};
use crate::services::store::{ReportStore, StoreError};

/// Errors surfaced by registry operations
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to retrieve reports: {0}")]
    Retrieval(#[from] StoreError),

    #[error("Invalid report: {0}")]
    InvalidReport(String),

    #[error("Report {id} is already {state}")]
    InvalidTransition { id: String, state: ReportState },
}

/// Orchestrates store lookups with the proximity filter and the matcher
///
/// Store failures are returned unchanged as `RegistryError::Retrieval`; nothing
/// here retries.
#[derive(Clone)]
pub struct Registry {
    store: Arc<dyn ReportStore>,
    proximity: Arc<dyn ProximityFilter>,
    matcher: Matcher,
    enforce_match_radius: bool,
}

impl Registry {
    pub fn new(store: Arc<dyn ReportStore>, matcher: Matcher) -> Self {
        Self {
            store,
            proximity: Arc::new(HaversineFilter),
            matcher,
            enforce_match_radius: false,
        }
    }

    /// Replace the brute-force proximity filter
    pub fn with_proximity_filter(mut self, proximity: Arc<dyn ProximityFilter>) -> Self {
        self.proximity = proximity;
        self
    }

    /// Restrict matches to found reports within the requested radius of one of
    /// the owner's loss reports
    pub fn with_match_radius_enforced(mut self, enforce: bool) -> Self {
        self.enforce_match_radius = enforce;
        self
    }

    pub fn store(&self) -> &Arc<dyn ReportStore> {
        &self.store
    }

    /// Open reports within `radius_km` of the reference point, newest first
    pub async fn get_nearby(
        &self,
        ref_lat: f64,
        ref_lon: f64,
        radius_km: f64,
    ) -> Result<Vec<Report>, RegistryError> {
        let candidates = self.store.list_by_states(&ReportState::open()).await?;
        let nearby = self
            .proximity
            .retain_within((ref_lat, ref_lon), radius_km, &candidates);

        tracing::debug!(
            "{} of {} open reports within {}km of ({}, {})",
            nearby.len(),
            candidates.len(),
            radius_km,
            ref_lat,
            ref_lon
        );

        Ok(nearby)
    }

    /// Found reports from other users that probably match the owner's lost pets
    ///
    /// `radius_km` only narrows the result when match radius enforcement is
    /// enabled; otherwise candidates are scored on attributes alone.
    pub async fn get_matches(
        &self,
        owner_id: &str,
        radius_km: f64,
    ) -> Result<Vec<Report>, RegistryError> {
        let losses: Vec<Report> = self
            .store
            .list_by_owner(owner_id)
            .await?
            .into_iter()
            .filter(|r| r.state == ReportState::Lost)
            .collect();

        if losses.is_empty() {
            tracing::debug!("Owner {} has no lost reports, skipping match query", owner_id);
            return Ok(Vec::new());
        }

        let candidates = self
            .store
            .list_by_state_excluding_owner(ReportState::Found, owner_id)
            .await?;

        let result = self.matcher.find_matches(&losses, &candidates);

        let matches = if self.enforce_match_radius {
            self.within_radius_of_any(&losses, radius_km, result.matches)
        } else {
            tracing::debug!("Match radius {}km accepted but not enforced", radius_km);
            result.matches
        };

        tracing::info!(
            "Found {} matches for owner {} ({} lost reports, {} candidates)",
            matches.len(),
            owner_id,
            losses.len(),
            result.total_candidates
        );

        Ok(matches)
    }

    fn within_radius_of_any(&self, losses: &[Report], radius_km: f64, matches: Vec<Report>) -> Vec<Report> {
        matches
            .into_iter()
            .filter(|candidate| {
                losses
                    .iter()
                    .any(|loss| self.proximity.contains(loss.coordinates(), radius_km, candidate))
            })
            .collect()
    }

    /// Validate and register a new report
    pub async fn create_report(
        &self,
        owner_id: &str,
        report: NewReport,
    ) -> Result<Report, RegistryError> {
        let request = CreateReportRequest::from_parts(owner_id, report);
        request
            .validate()
            .map_err(|e| RegistryError::InvalidReport(e.to_string()))?;

        let (owner_id, report) = request.into_parts();
        let created = self.store.create(&owner_id, &report).await?;

        tracing::info!(
            "Registered {} report {} for owner {}",
            created.state,
            created.id,
            owner_id
        );

        Ok(created)
    }

    pub async fn get_report(&self, id: &str) -> Result<Option<Report>, RegistryError> {
        Ok(self.store.get_by_id(id).await?)
    }

    pub async fn list_owner_reports(&self, owner_id: &str) -> Result<Vec<Report>, RegistryError> {
        Ok(self.store.list_by_owner(owner_id).await?)
    }

    /// Apply owner edits; `Ok(None)` when the report does not exist
    pub async fn update_report(
        &self,
        id: &str,
        update: ReportUpdate,
    ) -> Result<Option<Report>, RegistryError> {
        if matches!(update.fur_color.as_deref(), Some(color) if color.trim().is_empty()) {
            return Err(RegistryError::InvalidReport("fur color cannot be empty".into()));
        }

        if update.is_empty() {
            return self.get_report(id).await;
        }

        Ok(self.store.update(id, &update).await?)
    }

    /// Archive an open report; `Ok(None)` when the report does not exist
    pub async fn archive_report(&self, id: &str) -> Result<Option<Report>, RegistryError> {
        let Some(report) = self.store.get_by_id(id).await? else {
            return Ok(None);
        };

        if !report.state.is_open() {
            return Err(RegistryError::InvalidTransition {
                id: report.id,
                state: report.state,
            });
        }

        let archived = self.store.archive(id).await?;
        tracing::info!("Archived report {}", id);

        Ok(archived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Size, Species};
    use crate::services::MemoryReportStore;

    fn new_report(state: ReportState, lat: f64, lon: f64) -> NewReport {
        NewReport {
            state,
            species: Species::Dog,
            breed: Some("Labrador".to_string()),
            size: Size::Medium,
            fur_color: "Brown".to_string(),
            eye_color: None,
            notes: None,
            image_url: None,
            latitude: lat,
            longitude: lon,
            last_seen_at: None,
        }
    }

    fn create_registry() -> Registry {
        Registry::new(Arc::new(MemoryReportStore::new()), Matcher::default())
    }

    #[tokio::test]
    async fn test_create_rejects_unacquired_location() {
        let registry = create_registry();

        let err = registry
            .create_report("u1", new_report(ReportState::Lost, 0.0, 0.0))
            .await
            .unwrap_err();

        assert!(matches!(err, RegistryError::InvalidReport(_)));
    }

    #[tokio::test]
    async fn test_archive_twice_is_invalid_transition() {
        let registry = create_registry();
        let created = registry
            .create_report("u1", new_report(ReportState::Found, -23.55, -46.60))
            .await
            .unwrap();

        let archived = registry.archive_report(&created.id).await.unwrap().unwrap();
        assert_eq!(archived.state, ReportState::Archived);

        let err = registry.archive_report(&created.id).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_archive_missing_is_none() {
        assert!(create_registry().archive_report("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_rejects_blank_fur_color() {
        let registry = create_registry();
        let update = ReportUpdate {
            fur_color: Some("  ".to_string()),
            ..Default::default()
        };

        let err = registry.update_report("any", update).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidReport(_)));
    }

    #[tokio::test]
    async fn test_match_radius_enforced() {
        let registry = create_registry().with_match_radius_enforced(true);
        registry
            .create_report("me", new_report(ReportState::Lost, -23.55, -46.60))
            .await
            .unwrap();
        let near = registry
            .create_report("them", new_report(ReportState::Found, -23.55, -46.62))
            .await
            .unwrap();
        registry
            .create_report("them", new_report(ReportState::Found, -22.90, -43.17))
            .await
            .unwrap();

        let matches = registry.get_matches("me", 10.0).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, near.id);
    }

    #[tokio::test]
    async fn test_match_radius_not_enforced_by_default() {
        let registry = create_registry();
        registry
            .create_report("me", new_report(ReportState::Lost, -23.55, -46.60))
            .await
            .unwrap();
        registry
            .create_report("them", new_report(ReportState::Found, -22.90, -43.17))
            .await
            .unwrap();

        assert_eq!(registry.get_matches("me", 1.0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_match_radius_keeps_candidates_sharing_an_id_by_position() {
        let fixture = |owner: &str, state: ReportState, lat: f64, lon: f64| {
            let draft = new_report(state, lat, lon);
            let now = chrono::Utc::now();
            Report {
                id: "dup".to_string(),
                owner_id: owner.to_string(),
                state: draft.state,
                species: draft.species,
                breed: draft.breed,
                size: draft.size,
                fur_color: draft.fur_color,
                eye_color: None,
                notes: None,
                image_url: None,
                latitude: draft.latitude,
                longitude: draft.longitude,
                last_seen_at: None,
                archived_at: None,
                created_at: now,
                updated_at: now,
            }
        };
        let store = MemoryReportStore::with_reports(vec![
            fixture("me", ReportState::Lost, -23.55, -46.60),
            fixture("them", ReportState::Found, -22.90, -43.17),
            fixture("them", ReportState::Found, -23.55, -46.62),
        ]);
        let registry = Registry::new(Arc::new(store), Matcher::default()).with_match_radius_enforced(true);

        let matches = registry.get_matches("me", 10.0).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].longitude, -46.62);
    }
}
