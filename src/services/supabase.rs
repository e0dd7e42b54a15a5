use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;

use crate::models::{NewReport, Report, ReportState, ReportUpdate};
use crate::services::store::{ReportStore, StoreError};

/// Client for the hosted report store's REST endpoint
///
/// Talks PostgREST: rows of the `registros` table are filtered with
/// `column=op.value` query parameters and written back with
/// `Prefer: return=representation` so the stored row comes back in the response.
pub struct SupabaseReportStore {
    base_url: String,
    api_key: String,
    table: String,
    client: Client,
}

impl SupabaseReportStore {
    /// Create a new store client
    pub fn new(
        base_url: String,
        api_key: String,
        table: String,
        timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            table,
            client,
        })
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            self.table
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Run a filtered `select=*` query, newest first
    async fn select(&self, filters: &[(&str, String)]) -> Result<Vec<Report>, StoreError> {
        let mut params: Vec<(&str, String)> = vec![("select", "*".to_string())];
        params.extend(filters.iter().cloned());
        params.push(("order", "created_at.desc".to_string()));

        let url = format!("{}?{}", self.table_url(), encode_query(&params));
        tracing::debug!("Querying reports: {}", url);

        let response = self.authorize(self.client.get(&url)).send().await?;
        let rows = read_rows(response, "query reports").await?;

        tracing::debug!("Store returned {} reports", rows.len());
        Ok(rows)
    }

    /// PATCH the row with `id` and return its new representation
    async fn patch(&self, id: &str, body: &Value) -> Result<Option<Report>, StoreError> {
        let url = format!(
            "{}?{}",
            self.table_url(),
            encode_query(&[("id", format!("eq.{}", id))])
        );

        let response = self
            .authorize(self.client.patch(&url))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        let mut rows = read_rows(response, "update report").await?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }
}

#[async_trait]
impl ReportStore for SupabaseReportStore {
    async fn list_by_states(&self, states: &[ReportState]) -> Result<Vec<Report>, StoreError> {
        let labels = states
            .iter()
            .map(ReportState::as_str)
            .collect::<Vec<_>>()
            .join(",");

        self.select(&[("estado", format!("in.({})", labels))]).await
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Report>, StoreError> {
        self.select(&[("usuario_id", format!("eq.{}", owner_id))]).await
    }

    async fn list_by_state_excluding_owner(
        &self,
        state: ReportState,
        owner_id: &str,
    ) -> Result<Vec<Report>, StoreError> {
        self.select(&[
            ("estado", format!("eq.{}", state.as_str())),
            ("usuario_id", format!("neq.{}", owner_id)),
        ])
        .await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Report>, StoreError> {
        let mut rows = self.select(&[("id", format!("eq.{}", id))]).await?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    async fn update(&self, id: &str, update: &ReportUpdate) -> Result<Option<Report>, StoreError> {
        let body = serde_json::to_value(update)?;
        self.patch(id, &body).await
    }

    async fn archive(&self, id: &str) -> Result<Option<Report>, StoreError> {
        let body = serde_json::json!({
            "estado": ReportState::Archived,
            "arquivado_em": Utc::now(),
        });
        self.patch(id, &body).await
    }

    async fn create(&self, owner_id: &str, report: &NewReport) -> Result<Report, StoreError> {
        let mut payload = serde_json::to_value(report)?;
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("usuario_id".to_string(), Value::String(owner_id.to_string()));
        }

        let response = self
            .authorize(self.client.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(&payload)
            .send()
            .await?;

        let mut rows = read_rows(response, "create report").await?;
        if rows.is_empty() {
            return Err(StoreError::InvalidResponse(
                "Store did not return the created report".into(),
            ));
        }

        let created = rows.remove(0);
        tracing::debug!("Created report {} for owner {}", created.id, owner_id);
        Ok(created)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        let url = format!("{}?select=id&limit=1", self.table_url());
        let response = self.authorize(self.client.get(&url)).send().await?;
        Ok(response.status().is_success())
    }
}

/// Percent-encode query parameters, leaving PostgREST operators readable
fn encode_query(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Check the status and decode a JSON array of rows
async fn read_rows(response: Response, action: &str) -> Result<Vec<Report>, StoreError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read body".to_string());
        tracing::error!("Failed to {}: {} - {}", action, status, body);
        return Err(StoreError::ApiError {
            status: status.as_u16(),
            message: format!("Failed to {}: {}", action, body),
        });
    }

    let json: Value = response.json().await?;
    let rows = json
        .as_array()
        .ok_or_else(|| StoreError::InvalidResponse("Expected an array of rows".into()))?;

    rows.iter()
        .map(|row| {
            serde_json::from_value(row.clone()).map_err(|e| {
                StoreError::InvalidResponse(format!("Failed to parse report: {}", e))
            })
        })
        .collect()
}
