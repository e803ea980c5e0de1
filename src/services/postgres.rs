use crate::models::domain::features_from_value;
use crate::models::{CandidateQuery, Property};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Columns selected for a property, normalised to the types `PropertyRow` expects
const PROPERTY_COLUMNS: &str = r#"
    id::text AS id,
    title,
    property_type,
    listing_type,
    status,
    price::float8 AS price,
    city,
    state,
    bedrooms::int4 AS bedrooms,
    bathrooms::int4 AS bathrooms,
    area::float8 AS area,
    features,
    images,
    created_at
"#;

/// Raw `properties` row
#[derive(Debug, sqlx::FromRow)]
struct PropertyRow {
    id: String,
    title: Option<String>,
    property_type: Option<String>,
    listing_type: Option<String>,
    status: Option<String>,
    price: Option<f64>,
    city: Option<String>,
    state: Option<String>,
    bedrooms: Option<i32>,
    bathrooms: Option<i32>,
    area: Option<f64>,
    features: Option<serde_json::Value>,
    images: Option<Vec<String>>,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<PropertyRow> for Property {
    fn from(row: PropertyRow) -> Self {
        Property {
            id: row.id,
            title: row.title,
            property_type: row.property_type.map(Into::into),
            listing_type: row.listing_type.map(Into::into),
            status: row.status.map(Into::into),
            price: row.price,
            city: row.city,
            state: row.state,
            // Negative counts are data errors; treat them as unknown
            bedrooms: row.bedrooms.and_then(|v| u32::try_from(v).ok()),
            bathrooms: row.bathrooms.and_then(|v| u32::try_from(v).ok()),
            area: row.area,
            features: row.features.map(features_from_value).unwrap_or_default(),
            images: row.images.unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL client reading listings straight from the `properties` table
///
/// Used when the service runs next to the backend database instead of going
/// through its REST layer.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
        run_migrations: bool,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        let client = Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await?;

        if run_migrations {
            sqlx::migrate!("./migrations").run(&client.pool).await?;
            tracing::info!("Database migrations applied");
        }

        Ok(client)
    }

    /// Get a single property by id
    pub async fn get_property(&self, property_id: &str) -> Result<Property, PostgresError> {
        let query = format!(
            "SELECT {} FROM properties WHERE id::text = $1",
            PROPERTY_COLUMNS
        );

        let row: Option<PropertyRow> = sqlx::query_as(&query)
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Property::from)
            .ok_or_else(|| PostgresError::NotFound(format!("Property {} not found", property_id)))
    }

    /// Query the candidate pool described by `query`
    ///
    /// Newest listings first, so the bounded pool favours fresh inventory.
    pub async fn query_candidates(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<Property>, PostgresError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM properties
            WHERE id::text <> $1
              AND lower(status) = $2
              AND ($3::text IS NULL OR lower(listing_type) = $3)
            ORDER BY created_at DESC NULLS LAST
            LIMIT $4
            "#,
            PROPERTY_COLUMNS
        );

        let rows: Vec<PropertyRow> = sqlx::query_as(&sql)
            .bind(&query.exclude_id)
            .bind(query.status.as_str())
            .bind(query.listing_type.as_ref().map(|t| t.as_str()))
            .bind(i64::try_from(query.limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Queried {} candidates for {}", rows.len(), query.exclude_id);

        Ok(rows.into_iter().map(Property::from).collect())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
