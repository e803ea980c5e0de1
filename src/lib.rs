//! Estate Match - similar-property recommendations for the Estate marketplace
//!
//! This library provides the similarity scorer behind the "properties you may
//! also like" strip: given a listing and a pool of candidate listings, it ranks
//! the candidates by weighted feature similarity and explains each match.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{Recommender, RecommendationResult, score_candidate, match_percentage};
pub use models::{Property, PropertyType, ListingType, ListingStatus, ScoredCandidate, ScoringWeights, RecommendationRequest, RecommendationsResponse};
