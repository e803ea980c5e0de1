use crate::config::{StoreBackend, StoreSettings};
use crate::models::{CandidateQuery, Property};
use crate::services::postgres::{PostgresClient, PostgresError};
use crate::services::rest::{RestClient, RestError};
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the property store, independent of backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Property not found: {0}")]
    NotFound(String),

    #[error("Store misconfigured: {0}")]
    Misconfigured(String),

    #[error(transparent)]
    Rest(RestError),

    #[error(transparent)]
    Postgres(PostgresError),
}

impl From<RestError> for StoreError {
    fn from(err: RestError) -> Self {
        match err {
            RestError::NotFound(msg) => StoreError::NotFound(msg),
            other => StoreError::Rest(other),
        }
    }
}

impl From<PostgresError> for StoreError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::NotFound(msg) => StoreError::NotFound(msg),
            other => StoreError::Postgres(other),
        }
    }
}

/// Read-only access to property listings
pub enum PropertyStore {
    Rest(RestClient),
    Postgres(PostgresClient),
}

impl PropertyStore {
    /// Build the configured backend
    pub async fn from_settings(settings: &StoreSettings) -> Result<Self, StoreError> {
        match settings.backend {
            StoreBackend::Rest => {
                let rest = settings.rest.as_ref().ok_or_else(|| {
                    StoreError::Misconfigured("store.rest section is required".into())
                })?;

                let client = RestClient::new(
                    rest.endpoint.clone(),
                    rest.api_key.clone(),
                    rest.table.clone(),
                    Duration::from_secs(rest.timeout_secs.unwrap_or(10)),
                )?;

                Ok(PropertyStore::Rest(client))
            }
            StoreBackend::Postgres => {
                let db = settings.postgres.as_ref().ok_or_else(|| {
                    StoreError::Misconfigured("store.postgres section is required".into())
                })?;

                let client = PostgresClient::from_settings(
                    &db.url,
                    db.max_connections,
                    db.min_connections,
                    db.acquire_timeout_secs,
                    db.idle_timeout_secs,
                    db.run_migrations,
                )
                .await?;

                Ok(PropertyStore::Postgres(client))
            }
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            PropertyStore::Rest(_) => "rest",
            PropertyStore::Postgres(_) => "postgres",
        }
    }

    /// Resolve a property id to its record
    pub async fn get_property(&self, property_id: &str) -> Result<Property, StoreError> {
        match self {
            PropertyStore::Rest(client) => Ok(client.get_property(property_id).await?),
            PropertyStore::Postgres(client) => Ok(client.get_property(property_id).await?),
        }
    }

    /// Fetch the bounded candidate pool described by `query`
    pub async fn query_candidates(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<Property>, StoreError> {
        match self {
            PropertyStore::Rest(client) => Ok(client.query_candidates(query).await?),
            PropertyStore::Postgres(client) => Ok(client.query_candidates(query).await?),
        }
    }

    pub async fn health_check(&self) -> bool {
        let result = match self {
            PropertyStore::Rest(client) => client.health_check().await.map_err(StoreError::from),
            PropertyStore::Postgres(client) => {
                client.health_check().await.map_err(StoreError::from)
            }
        };

        match result {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!("Store health check failed: {}", e);
                false
            }
        }
    }
}
