use crate::models::{CandidateQuery, Property};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with the backend REST API
#[derive(Debug, Error)]
pub enum RestError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rejected by backend: {0}")]
    BadRequest(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Client for the managed backend's PostgREST-style table API
///
/// Handles all communication with the listings table including:
/// - Fetching a single property by id
/// - Querying the candidate pool for a target property
pub struct RestClient {
    base_url: String,
    api_key: String,
    table: String,
    client: Client,
}

impl RestClient {
    /// Create a new REST client
    pub fn new(
        base_url: String,
        api_key: String,
        table: String,
        timeout: Duration,
    ) -> Result<Self, RestError> {
        let client = Client::builder().timeout(timeout).build()?;

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

    /// Run a GET against the table and return the row array
    async fn fetch_rows(&self, query: &[(&str, String)]) -> Result<Vec<Value>, RestError> {
        let url = self.table_url();

        let response = self
            .client
            .get(&url)
            .query(query)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RestError::Unauthorized);
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());

            // PostgREST rejects filter values it cannot cast (e.g. a non-uuid id)
            if status == StatusCode::BAD_REQUEST {
                tracing::debug!("Backend rejected query on {}: {}", self.table, body);
                return Err(RestError::BadRequest(body));
            }

            tracing::error!("Backend query on {} failed: {} - {}", self.table, status, body);
            return Err(RestError::ApiError(format!("{} returned {}", self.table, status)));
        }

        match response.json::<Value>().await? {
            Value::Array(rows) => Ok(rows),
            _ => Err(RestError::InvalidResponse("Expected an array of rows".into())),
        }
    }

    /// Get a single property by id
    pub async fn get_property(&self, property_id: &str) -> Result<Property, RestError> {
        tracing::debug!("Fetching property: {}", property_id);

        let rows = self
            .fetch_rows(&[
                ("select", "*".to_string()),
                ("id", format!("eq.{}", property_id)),
                ("limit", "1".to_string()),
            ])
            .await
            .map_err(|e| match e {
                // An id the backend cannot parse cannot name a stored property
                RestError::BadRequest(_) => {
                    RestError::NotFound(format!("Property {} not found", property_id))
                }
                other => other,
            })?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| RestError::NotFound(format!("Property {} not found", property_id)))?;

        serde_json::from_value(row)
            .map_err(|e| RestError::InvalidResponse(format!("Failed to parse property: {}", e)))
    }

    /// Query the candidate pool described by `query`
    ///
    /// Rows that do not parse as a property are skipped rather than failing
    /// the whole pool.
    pub async fn query_candidates(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<Property>, RestError> {
        let mut params = vec![
            ("select", "*".to_string()),
            ("id", format!("neq.{}", query.exclude_id)),
            ("status", format!("ilike.{}", query.status)),
        ];

        if let Some(listing_type) = &query.listing_type {
            params.push(("listing_type", format!("ilike.{}", listing_type)));
        }

        params.push(("order", "created_at.desc.nullslast".to_string()));
        params.push(("limit", query.limit.to_string()));

        let rows = self.fetch_rows(&params).await?;
        let total = rows.len();

        let properties: Vec<Property> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<Property>(row) {
                Ok(property) => Some(property),
                Err(e) => {
                    tracing::warn!("Skipping unparsable property row: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Queried {} candidates ({} rows)", properties.len(), total);

        Ok(properties)
    }

    /// Check that the table is reachable with the configured key
    pub async fn health_check(&self) -> Result<bool, RestError> {
        self.fetch_rows(&[("select", "id".to_string()), ("limit", "1".to_string())])
            .await
            .map(|_| true)
    }
}
