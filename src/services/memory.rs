use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{NewReport, Report, ReportState, ReportUpdate};
use crate::services::store::{ReportStore, StoreError};

/// In-process report store
///
/// Backs tests and local runs with `store.backend = "memory"`. Listings are
/// newest first; reports created in the same instant keep reverse insertion order.
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    reports: RwLock<Vec<Report>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing reports (e.g. fixtures with fixed timestamps)
    pub fn with_reports(reports: Vec<Report>) -> Self {
        Self {
            reports: RwLock::new(reports),
        }
    }

    async fn list_where<F>(&self, predicate: F) -> Vec<Report>
    where
        F: Fn(&Report) -> bool,
    {
        let reports = self.reports.read().await;
        let mut listed: Vec<Report> = reports
            .iter()
            .rev()
            .filter(|report| predicate(report))
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        listed
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn list_by_states(&self, states: &[ReportState]) -> Result<Vec<Report>, StoreError> {
        Ok(self.list_where(|r| states.contains(&r.state)).await)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Report>, StoreError> {
        Ok(self.list_where(|r| r.owner_id == owner_id).await)
    }

    async fn list_by_state_excluding_owner(
        &self,
        state: ReportState,
        owner_id: &str,
    ) -> Result<Vec<Report>, StoreError> {
        Ok(self
            .list_where(|r| r.state == state && r.owner_id != owner_id)
            .await)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Report>, StoreError> {
        let reports = self.reports.read().await;
        Ok(reports.iter().find(|r| r.id == id).cloned())
    }

    async fn update(&self, id: &str, update: &ReportUpdate) -> Result<Option<Report>, StoreError> {
        let mut reports = self.reports.write().await;
        let Some(report) = reports.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };

        update.apply_to(report);
        report.updated_at = Utc::now();

        Ok(Some(report.clone()))
    }

    async fn archive(&self, id: &str) -> Result<Option<Report>, StoreError> {
        let mut reports = self.reports.write().await;
        let Some(report) = reports.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };

        let now = Utc::now();
        report.state = ReportState::Archived;
        report.archived_at = Some(now);
        report.updated_at = now;

        Ok(Some(report.clone()))
    }

    async fn create(&self, owner_id: &str, new_report: &NewReport) -> Result<Report, StoreError> {
        let now = Utc::now();
        let report = Report {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            state: new_report.state,
            species: new_report.species,
            breed: new_report.breed.clone(),
            size: new_report.size,
            fur_color: new_report.fur_color.clone(),
            eye_color: new_report.eye_color.clone(),
            notes: new_report.notes.clone(),
            image_url: new_report.image_url.clone(),
            latitude: new_report.latitude,
            longitude: new_report.longitude,
            last_seen_at: new_report.last_seen_at.clone(),
            archived_at: None,
            created_at: now,
            updated_at: now,
        };

        self.reports.write().await.push(report.clone());
        tracing::debug!("Created report {} for owner {}", report.id, owner_id);

        Ok(report)
    }
}
