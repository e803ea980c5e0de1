use crate::models::{Property, ScoredCandidate, ScoringWeights};
use crate::core::scoring::{match_percentage, score_candidate};

/// Candidates scoring at or below this are never recommended
pub const DEFAULT_MIN_SCORE: f64 = 10.0;

/// Number of recommendations returned when the caller gives no limit
pub const DEFAULT_LIMIT: usize = 6;

/// Result of a recommendation run
#[derive(Debug)]
pub struct RecommendationResult {
    pub recommendations: Vec<ScoredCandidate>,
    pub total_candidates: usize,
}

/// Ranks a candidate pool by similarity to a target property
///
/// # Pipeline Stages
/// 1. Drop the target itself from the pool
/// 2. Score every remaining candidate
/// 3. Drop candidates at or below the minimum score
/// 4. Stable sort by descending score and truncate
///
/// Pure and synchronous: the same inputs always give the same output.
#[derive(Debug, Clone, Copy)]
pub struct Recommender {
    weights: ScoringWeights,
    min_score: f64,
}

impl Recommender {
    pub fn new(weights: ScoringWeights, min_score: f64) -> Self {
        Self { weights, min_score }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default(), DEFAULT_MIN_SCORE)
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    /// Find the properties most similar to `target`
    ///
    /// # Arguments
    /// * `target` - The reference listing
    /// * `candidates` - Candidate pool, in the order the store returned it
    /// * `limit` - Maximum number of recommendations to return
    ///
    /// # Returns
    /// RecommendationResult with candidates sorted by descending score;
    /// equal scores keep their pool order
    pub fn recommend(
        &self,
        target: &Property,
        candidates: Vec<Property>,
        limit: usize,
    ) -> RecommendationResult {
        let total_candidates = candidates.len();

        let mut recommendations: Vec<ScoredCandidate> = candidates
            .into_iter()
            .filter(|candidate| candidate.id != target.id)
            .filter_map(|candidate| {
                let (score, reasons) = score_candidate(target, &candidate, &self.weights);

                if score > self.min_score {
                    Some(ScoredCandidate {
                        property: candidate,
                        score,
                        match_percentage: match_percentage(score),
                        reasons,
                    })
                } else {
                    None
                }
            })
            .collect();

        // sort_by is stable, so ties keep pool order
        recommendations.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        recommendations.truncate(limit);

        RecommendationResult {
            recommendations,
            total_candidates,
        }
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
