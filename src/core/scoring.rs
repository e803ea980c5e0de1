use crate::core::reasons::{
    feature_label, SAME_BATHROOMS, SAME_BEDROOMS, SAME_CITY, SAME_STATE, SAME_TYPE,
    SIMILAR_BEDROOMS, SIMILAR_PRICE, SIMILAR_SIZE,
};
use crate::models::{Property, ScoringWeights};

/// Points per shared amenity before the feature cap applies
const POINTS_PER_SHARED_FEATURE: f64 = 2.0;

/// Price difference (percent of target price) below which "Similar price" is attached
const SIMILAR_PRICE_PCT: f64 = 15.0;

/// Area difference (percent of target area) below which "Similar size" is attached
const SIMILAR_AREA_PCT: f64 = 10.0;

/// Area points lost per unit of relative area difference
const AREA_DECAY: f64 = 50.0;

/// Shared amenities listed by name in the reasons
const MAX_FEATURE_REASONS: usize = 3;

/// Calculate a similarity score for a candidate against the target property
///
/// Scoring formula (default weights, 100 points total):
/// score =
///     type_score         # 25 if same property type
///   + location_score     # 20 same city, 10 same state
///   + price_score        # 20 minus one point per percent of price difference
///   + bedroom_score      # 10 equal, 5 off by one
///   + bathroom_score     # 5 equal
///   + area_score         # 10 minus 50 x relative area difference
///   + feature_score      # 2 per shared amenity, capped at 10
///
/// Any factor whose inputs are missing on either side contributes zero.
pub fn score_candidate(
    target: &Property,
    candidate: &Property,
    weights: &ScoringWeights,
) -> (f64, Vec<String>) {
    let mut reasons = Vec::new();
    let mut score = 0.0;

    score += type_score(target, candidate, weights, &mut reasons);
    score += location_score(target, candidate, weights, &mut reasons);
    score += price_score(target, candidate, weights, &mut reasons);
    score += bedroom_score(target, candidate, weights, &mut reasons);
    score += bathroom_score(target, candidate, weights, &mut reasons);
    score += area_score(target, candidate, weights, &mut reasons);
    score += feature_score(target, candidate, weights, &mut reasons);

    (score.max(0.0), reasons)
}

/// Normalise a raw score into a 0-100 display percentage
#[inline]
pub fn match_percentage(score: f64) -> u8 {
    (100.0 * (score / 100.0).clamp(0.0, 1.0)).round() as u8
}

#[inline]
fn type_score(
    target: &Property,
    candidate: &Property,
    weights: &ScoringWeights,
    reasons: &mut Vec<String>,
) -> f64 {
    match (&target.property_type, &candidate.property_type) {
        (Some(a), Some(b)) if a == b => {
            reasons.push(SAME_TYPE.to_string());
            weights.property_type
        }
        _ => 0.0,
    }
}

#[inline]
fn location_score(
    target: &Property,
    candidate: &Property,
    weights: &ScoringWeights,
    reasons: &mut Vec<String>,
) -> f64 {
    if same_text(target.city_name(), candidate.city_name()) {
        reasons.push(SAME_CITY.to_string());
        return weights.same_city;
    }

    if same_text(target.state_name(), candidate.state_name()) {
        reasons.push(SAME_STATE.to_string());
        return weights.same_state;
    }

    0.0
}

#[inline]
fn price_score(
    target: &Property,
    candidate: &Property,
    weights: &ScoringWeights,
    reasons: &mut Vec<String>,
) -> f64 {
    let (Some(target_price), Some(candidate_price)) = (target.price_value(), candidate.price_value())
    else {
        return 0.0;
    };

    let diff_pct = 100.0 * (candidate_price - target_price).abs() / target_price;
    if diff_pct < SIMILAR_PRICE_PCT {
        reasons.push(SIMILAR_PRICE.to_string());
    }

    weights.price - diff_pct.min(weights.price)
}

#[inline]
fn bedroom_score(
    target: &Property,
    candidate: &Property,
    weights: &ScoringWeights,
    reasons: &mut Vec<String>,
) -> f64 {
    let (Some(a), Some(b)) = (target.bedrooms, candidate.bedrooms) else {
        return 0.0;
    };

    match a.abs_diff(b) {
        0 => {
            reasons.push(SAME_BEDROOMS.to_string());
            weights.bedrooms
        }
        1 => {
            reasons.push(SIMILAR_BEDROOMS.to_string());
            weights.bedrooms / 2.0
        }
        _ => 0.0,
    }
}

#[inline]
fn bathroom_score(
    target: &Property,
    candidate: &Property,
    weights: &ScoringWeights,
    reasons: &mut Vec<String>,
) -> f64 {
    match (target.bathrooms, candidate.bathrooms) {
        (Some(a), Some(b)) if a == b => {
            reasons.push(SAME_BATHROOMS.to_string());
            weights.bathrooms
        }
        _ => 0.0,
    }
}

#[inline]
fn area_score(
    target: &Property,
    candidate: &Property,
    weights: &ScoringWeights,
    reasons: &mut Vec<String>,
) -> f64 {
    let (Some(target_area), Some(candidate_area)) = (target.area_value(), candidate.area_value())
    else {
        return 0.0;
    };

    let relative_diff = (candidate_area - target_area).abs() / target_area;
    if relative_diff * 100.0 < SIMILAR_AREA_PCT {
        reasons.push(SIMILAR_SIZE.to_string());
    }

    (weights.area - AREA_DECAY * relative_diff).max(0.0)
}

#[inline]
fn feature_score(
    target: &Property,
    candidate: &Property,
    weights: &ScoringWeights,
    reasons: &mut Vec<String>,
) -> f64 {
    let shared: Vec<&str> = target
        .enabled_features()
        .filter(|key| candidate.features.get(*key).copied().unwrap_or(false))
        .collect();

    reasons.extend(
        shared
            .iter()
            .take(MAX_FEATURE_REASONS)
            .map(|key| feature_label(key).to_string()),
    );

    (POINTS_PER_SHARED_FEATURE * shared.len() as f64).min(weights.features)
}

/// Case-insensitive comparison of two present values
#[inline]
fn same_text(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.to_lowercase() == b.to_lowercase(),
        _ => false,
    }
}
