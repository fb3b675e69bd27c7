//! PostgreSQL pool setup and the store adapter behind the pipeline traits.

use anyhow::Context;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use wastewatch_core::config::PostgresConfig;
use wastewatch_core::{PeriodRange, Recipient, Result, WasteError, WasteLogEntry};
use wastewatch_pipeline::{RecipientDirectory, WasteLogStore};

/// Create a PostgreSQL connection pool and run migrations.
///
/// Both steps are required; the engine has nothing to work on without them.
pub async fn init_pg_pool(config: &PostgresConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await
        .with_context(|| format!("failed to connect to PostgreSQL at {}", config.host))?;
    info!(host = %config.host, database = %config.database, "PostgreSQL connected");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;
    info!("Database migrations applied successfully");

    Ok(pool)
}

#[derive(sqlx::FromRow)]
struct WasteLogRow {
    recipient_id: String,
    amount: Decimal,
    recorded_at: DateTime<Utc>,
}

impl From<WasteLogRow> for WasteLogEntry {
    fn from(row: WasteLogRow) -> Self {
        Self {
            recipient_id: row.recipient_id,
            amount: row.amount,
            recorded_at: row.recorded_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RecipientRow {
    recipient_id: String,
    display_name: String,
    contact_address: Option<String>,
}

/// Reads waste logs and recipients from PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_error(e: sqlx::Error) -> WasteError {
    WasteError::store(e)
}

#[async_trait::async_trait]
impl WasteLogStore for PgStore {
    async fn query(&self, range: &PeriodRange, kind: &str) -> Result<Vec<WasteLogEntry>> {
        let rows = sqlx::query_as::<_, WasteLogRow>(
            "SELECT w.recipient_id, w.amount, w.recorded_at \
             FROM waste_logs w \
             JOIN recipients r ON r.recipient_id = w.recipient_id \
             WHERE w.recorded_at >= $1 AND w.recorded_at < $2 AND r.kind = $3",
        )
        .bind(range.start)
        .bind(range.end)
        .bind(kind)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(WasteLogEntry::from).collect())
    }

    async fn history(&self, recipient_id: &str) -> Result<Vec<WasteLogEntry>> {
        let rows = sqlx::query_as::<_, WasteLogRow>(
            "SELECT recipient_id, amount, recorded_at \
             FROM waste_logs \
             WHERE recipient_id = $1 \
             ORDER BY recorded_at DESC, id DESC",
        )
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(WasteLogEntry::from).collect())
    }
}

#[async_trait::async_trait]
impl RecipientDirectory for PgStore {
    async fn lookup(&self, recipient_id: &str) -> Result<Option<Recipient>> {
        let row = sqlx::query_as::<_, RecipientRow>(
            "SELECT recipient_id, display_name, contact_address \
             FROM recipients WHERE recipient_id = $1",
        )
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(|r| Recipient {
            recipient_id: r.recipient_id,
            display_name: r.display_name,
            contact_address: r.contact_address.unwrap_or_default(),
        }))
    }
}
