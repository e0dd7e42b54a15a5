use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewReport, Report, ReportState, ReportUpdate};

/// Errors that can occur when talking to a report store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::InvalidResponse(err.to_string())
    }
}

/// Persistence boundary for pet reports
///
/// Every listing is ordered by `created_at`, newest first. Lookups of a single
/// report return `Ok(None)` when it does not exist.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Reports whose state is any of `states`
    async fn list_by_states(&self, states: &[ReportState]) -> Result<Vec<Report>, StoreError>;

    /// Every report created by `owner_id`, whatever its state
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Report>, StoreError>;

    /// Reports in `state` created by anyone except `owner_id`
    async fn list_by_state_excluding_owner(
        &self,
        state: ReportState,
        owner_id: &str,
    ) -> Result<Vec<Report>, StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Report>, StoreError>;

    async fn update(&self, id: &str, update: &ReportUpdate) -> Result<Option<Report>, StoreError>;

    /// Move a report to `Archived` and stamp `archived_at`
    async fn archive(&self, id: &str) -> Result<Option<Report>, StoreError>;

    async fn create(&self, owner_id: &str, report: &NewReport) -> Result<Report, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
