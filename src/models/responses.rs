use serde::{Deserialize, Serialize};
use crate::models::domain::Report;

/// Response carrying a list of reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsResponse {
    pub reports: Vec<Report>,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
}

impl From<Vec<Report>> for ReportsResponse {
    fn from(reports: Vec<Report>) -> Self {
        Self {
            total_results: reports.len(),
            reports,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
