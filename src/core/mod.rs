// Core algorithm exports
pub mod filters;
pub mod reasons;
pub mod recommender;
pub mod scoring;

pub use filters::matches_query_constraints;
pub use reasons::feature_label;
pub use recommender::{Recommender, RecommendationResult, DEFAULT_LIMIT, DEFAULT_MIN_SCORE};
pub use scoring::{score_candidate, match_percentage};
