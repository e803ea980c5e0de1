use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request for properties similar to a given listing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendationRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "property_id", rename = "propertyId")]
    pub property_id: String,
    #[validate(range(min = 1, max = 50))]
    #[serde(default)]
    pub limit: Option<u16>,
}

/// Query string for `GET /properties/{id}/similar`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SimilarQuery {
    #[validate(range(min = 1, max = 50))]
    #[serde(default)]
    pub limit: Option<u16>,
}
