use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::str::FromStr;
use std::time::Duration;

use crate::models::{NewReport, Report, ReportState, ReportUpdate, UnknownLabel};
use crate::services::store::{ReportStore, StoreError};

const REPORT_COLUMNS: &str = r#"
    id::text AS id, usuario_id, estado, especie, raca, tamanho, cor_pelagem,
    cor_olhos, observacoes, imagem_url, latitude, longitude, last_seen_at,
    arquivado_em, created_at, updated_at
"#;

/// PostgreSQL-backed report store
///
/// Reads and writes the same `registros` table the hosted store exposes, for
/// deployments that reach the database directly.
pub struct PostgresReportStore {
    pool: PgPool,
}

impl PostgresReportStore {
    /// Create a new store from a connection string and run pending migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL report store");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    async fn fetch_reports(
        &self,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> Result<Vec<Report>, StoreError> {
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(report_from_row).collect()
    }
}

#[async_trait]
impl ReportStore for PostgresReportStore {
    async fn list_by_states(&self, states: &[ReportState]) -> Result<Vec<Report>, StoreError> {
        let labels: Vec<String> = states.iter().map(|s| s.as_str().to_string()).collect();
        let sql = format!(
            "SELECT {} FROM registros WHERE estado = ANY($1) ORDER BY created_at DESC",
            REPORT_COLUMNS
        );

        self.fetch_reports(sqlx::query(&sql).bind(labels)).await
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Report>, StoreError> {
        let sql = format!(
            "SELECT {} FROM registros WHERE usuario_id = $1 ORDER BY created_at DESC",
            REPORT_COLUMNS
        );

        let reports = self.fetch_reports(sqlx::query(&sql).bind(owner_id)).await?;
        tracing::debug!("Owner {} has {} reports", owner_id, reports.len());
        Ok(reports)
    }

    async fn list_by_state_excluding_owner(
        &self,
        state: ReportState,
        owner_id: &str,
    ) -> Result<Vec<Report>, StoreError> {
        let sql = format!(
            "SELECT {} FROM registros WHERE estado = $1 AND usuario_id <> $2 ORDER BY created_at DESC",
            REPORT_COLUMNS
        );

        self.fetch_reports(sqlx::query(&sql).bind(state.as_str()).bind(owner_id))
            .await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Report>, StoreError> {
        let sql = format!("SELECT {} FROM registros WHERE id::text = $1", REPORT_COLUMNS);

        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(report_from_row).transpose()
    }

    async fn update(&self, id: &str, update: &ReportUpdate) -> Result<Option<Report>, StoreError> {
        let sql = format!(
            r#"
            UPDATE registros SET
                raca = COALESCE($2, raca),
                tamanho = COALESCE($3, tamanho),
                cor_pelagem = COALESCE($4, cor_pelagem),
                cor_olhos = COALESCE($5, cor_olhos),
                observacoes = COALESCE($6, observacoes),
                imagem_url = COALESCE($7, imagem_url),
                last_seen_at = COALESCE($8, last_seen_at),
                updated_at = NOW()
            WHERE id::text = $1
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .bind(update.breed.as_deref())
            .bind(update.size.map(|s| s.as_str()))
            .bind(update.fur_color.as_deref())
            .bind(update.eye_color.as_deref())
            .bind(update.notes.as_deref())
            .bind(update.image_url.as_deref())
            .bind(update.last_seen_at.as_deref())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(report_from_row).transpose()
    }

    async fn archive(&self, id: &str) -> Result<Option<Report>, StoreError> {
        let sql = format!(
            r#"
            UPDATE registros
            SET estado = $2, arquivado_em = NOW(), updated_at = NOW()
            WHERE id::text = $1
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .bind(ReportState::Archived.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(report_from_row).transpose()
    }

    async fn create(&self, owner_id: &str, report: &NewReport) -> Result<Report, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO registros (
                usuario_id, estado, especie, raca, tamanho, cor_pelagem, cor_olhos,
                observacoes, imagem_url, latitude, longitude, last_seen_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(owner_id)
            .bind(report.state.as_str())
            .bind(report.species.as_str())
            .bind(report.breed.as_deref())
            .bind(report.size.as_str())
            .bind(&report.fur_color)
            .bind(report.eye_color.as_deref())
            .bind(report.notes.as_deref())
            .bind(report.image_url.as_deref())
            .bind(report.latitude)
            .bind(report.longitude)
            .bind(report.last_seen_at.as_deref())
            .fetch_one(&self.pool)
            .await?;

        let created = report_from_row(&row)?;
        tracing::debug!("Created report {} for owner {}", created.id, owner_id);
        Ok(created)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Parse a stored enum label such as `ENCONTRADO` or `GATO`
fn parse_label<T>(raw: &str) -> Result<T, StoreError>
where
    T: FromStr<Err = UnknownLabel>,
{
    raw.parse()
        .map_err(|e: UnknownLabel| StoreError::InvalidResponse(e.to_string()))
}

fn report_from_row(row: &PgRow) -> Result<Report, StoreError> {
    Ok(Report {
        id: row.try_get("id")?,
        owner_id: row.try_get("usuario_id")?,
        state: parse_label(row.try_get::<&str, _>("estado")?)?,
        species: parse_label(row.try_get::<&str, _>("especie")?)?,
        breed: row.try_get("raca")?,
        size: parse_label(row.try_get::<&str, _>("tamanho")?)?,
        fur_color: row.try_get("cor_pelagem")?,
        eye_color: row.try_get("cor_olhos")?,
        notes: row.try_get("observacoes")?,
        image_url: row.try_get("imagem_url")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        last_seen_at: row.try_get("last_seen_at")?,
        archived_at: row.try_get("arquivado_em")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Size, Species};

    #[test]
    fn test_parse_stored_labels() {
        assert_eq!(parse_label::<ReportState>("ENCONTRADO").unwrap(), ReportState::Found);
        assert_eq!(parse_label::<Species>("GATO").unwrap(), Species::Cat);
        assert_eq!(parse_label::<Size>("medio").unwrap(), Size::Medium);
    }

    #[test]
    fn test_unknown_label_is_invalid_response() {
        let err = parse_label::<Species>("DRAGAO").unwrap_err();
        assert!(matches!(err, StoreError::InvalidResponse(_)));
    }

    fn new_report(state: ReportState) -> NewReport {
        NewReport {
            state,
            species: Species::Dog,
            breed: None,
            size: Size::Large,
            fur_color: "Preto".to_string(),
            eye_color: None,
            notes: None,
            image_url: None,
            latitude: -23.55,
            longitude: -46.60,
            last_seen_at: None,
        }
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_listing_queries() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PostgresReportStore::new(&url, 2, 1).await.unwrap();
        let me = uuid::Uuid::new_v4().to_string();
        let other = uuid::Uuid::new_v4().to_string();

        let older = store.create(&me, &new_report(ReportState::Lost)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let newer = store.create(&me, &new_report(ReportState::Lost)).await.unwrap();
        store.create(&me, &new_report(ReportState::Found)).await.unwrap();
        let theirs = store.create(&other, &new_report(ReportState::Found)).await.unwrap();

        let owned = store.list_by_owner(&me).await.unwrap();
        assert_eq!(owned.len(), 3);
        let lost_ids: Vec<_> = owned
            .iter()
            .filter(|r| r.state == ReportState::Lost)
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(lost_ids, vec![newer.id.clone(), older.id.clone()]);

        let found = store
            .list_by_state_excluding_owner(ReportState::Found, &me)
            .await
            .unwrap();
        assert!(found.iter().all(|r| r.owner_id != me && r.state == ReportState::Found));
        assert!(found.iter().any(|r| r.id == theirs.id));

        store.archive(&older.id).await.unwrap();
        let open = store.list_by_states(&ReportState::open()).await.unwrap();
        assert!(open.iter().all(|r| r.state.is_open()));
        assert!(!open.iter().any(|r| r.id == older.id));
        assert!(open.iter().any(|r| r.id == newer.id));
    }
}
