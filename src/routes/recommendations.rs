use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use tracing::Instrument;
use validator::Validate;
use crate::config::RecommendationSettings;
use crate::core::{matches_query_constraints, Recommender};
use crate::models::{
    CandidateQuery, ErrorResponse, HealthResponse, InvalidateResponse, RecommendationRequest,
    RecommendationsResponse, SimilarQuery,
};
use crate::services::{CacheKey, CacheManager, PropertyStore, StoreError};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PropertyStore>,
    pub cache: Option<Arc<CacheManager>>,
    pub recommender: Recommender,
    pub settings: RecommendationSettings,
}

/// Configure all recommendation-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommendations", web::post().to(recommend))
        .route("/recommendations/{property_id}", web::delete().to(invalidate))
        .route("/properties/{property_id}/similar", web::get().to(similar_properties));
}

fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status.as_u16(),
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await;

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: state.store.backend_name().to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Recommend similar properties
///
/// POST /api/v1/recommendations
///
/// Request body:
/// ```json
/// {
///   "propertyId": "string",
///   "limit": 6
/// }
/// ```
async fn recommend(
    state: web::Data<AppState>,
    req: web::Json<RecommendationRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommendation request: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let property_id = req.property_id.trim();
    if property_id.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", "propertyId is required");
    }

    let limit = state.settings.effective_limit(req.limit);
    recommend_for(&state, property_id, limit).await
}

/// Recommend similar properties via query string
///
/// GET /api/v1/properties/{property_id}/similar?limit=6
async fn similar_properties(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<SimilarQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let property_id = path.into_inner();
    let property_id = property_id.trim();
    if property_id.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", "propertyId is required");
    }

    let limit = state.settings.effective_limit(query.limit);
    recommend_for(&state, property_id, limit).await
}

/// Shared pipeline: cache, resolve target, fetch pool, score
async fn recommend_for(state: &AppState, property_id: &str, limit: usize) -> HttpResponse {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("recommend", %request_id, property_id, limit);

    async move {
        let cache_key = CacheKey::recommendations(property_id, limit);

        if let Some(cache) = &state.cache {
            if let Ok(cached) = cache.get::<RecommendationsResponse>(&cache_key).await {
                tracing::debug!("Serving cached recommendations");
                return HttpResponse::Ok().json(cached);
            }
        }

        let target = match state.store.get_property(property_id).await {
            Ok(property) => property,
            Err(StoreError::NotFound(message)) => {
                tracing::info!("Target property not found");
                return error_response(StatusCode::NOT_FOUND, "Property not found", message);
            }
            Err(e) => {
                tracing::error!("Failed to fetch property: {}", e);
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch property",
                    e.to_string(),
                );
            }
        };

        let query = CandidateQuery::for_target(&target, state.settings.candidate_pool_size);

        let candidates = match state.store.query_candidates(&query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::error!("Failed to query candidates: {}", e);
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to query candidates",
                    e.to_string(),
                );
            }
        };

        let candidates: Vec<_> = candidates
            .into_iter()
            .filter(|candidate| matches_query_constraints(candidate, &query))
            .collect();

        tracing::debug!("Scoring {} candidates", candidates.len());

        let result = state.recommender.recommend(&target, candidates, limit);

        let response = RecommendationsResponse {
            recommendations: result.recommendations,
            total_candidates: result.total_candidates,
        };

        if let Some(cache) = &state.cache {
            if let Err(e) = cache.set(&cache_key, &response).await {
                tracing::warn!("Failed to cache recommendations: {}", e);
            }
        }

        tracing::info!(
            "Returning {} recommendations (from {} candidates)",
            response.recommendations.len(),
            response.total_candidates
        );

        HttpResponse::Ok().json(response)
    }
    .instrument(span)
    .await
}

/// Drop cached recommendations after a listing changes
///
/// DELETE /api/v1/recommendations/{property_id}
async fn invalidate(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let property_id = path.into_inner().trim().to_string();
    if property_id.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", "propertyId is required");
    }

    let invalidated = match &state.cache {
        Some(cache) => match cache.invalidate_property(&property_id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to invalidate cache for {}: {}", property_id, e);
                false
            }
        },
        None => false,
    };

    HttpResponse::Ok().json(InvalidateResponse {
        property_id,
        invalidated,
    })
}
