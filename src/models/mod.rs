// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Property, PropertyType, ListingType, ListingStatus, ScoredCandidate, CandidateQuery, ScoringWeights};
pub use requests::{RecommendationRequest, SimilarQuery};
pub use responses::{RecommendationsResponse, HealthResponse, ErrorResponse, InvalidateResponse};
