// Integration tests for Estate Match
//
// Drive the HTTP surface end to end against a mocked REST backend.

use actix_web::{http::StatusCode, test, web, App};
use estate_match::config::RecommendationSettings;
use estate_match::core::Recommender;
use estate_match::routes::{self, AppState};
use estate_match::services::{CacheManager, PropertyStore, RestClient};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn create_state(base_url: String, cache: Option<Arc<CacheManager>>) -> AppState {
    let client = RestClient::new(
        base_url,
        "test_key".to_string(),
        "properties".to_string(),
        Duration::from_secs(5),
    )
    .unwrap();

    AppState {
        store: Arc::new(PropertyStore::Rest(client)),
        cache,
        recommender: Recommender::default(),
        settings: RecommendationSettings::default(),
    }
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
                .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
                .configure(routes::configure_routes),
        )
        .await
    };
}

fn target_row() -> Value {
    json!({
        "id": "t1",
        "title": "Four bedroom villa",
        "property_type": "villa",
        "listing_type": "sale",
        "status": "active",
        "price": 1_000_000,
        "city": "Lekki",
        "state": "Lagos",
        "bedrooms": 4,
        "bathrooms": 3,
        "area": 300,
        "features": { "pool": true, "garage": true, "gym": false }
    })
}

fn candidate_rows() -> Value {
    json!([
        {
            "id": "c1",
            "property_type": "house",
            "listing_type": "sale",
            "status": "active",
            "city": "lekki",
            "bedrooms": 4
        },
        {
            "id": "c2",
            "property_type": "villa",
            "listing_type": "sale",
            "status": "active",
            "price": 1_000_000,
            "city": "Lekki",
            "state": "Lagos",
            "bedrooms": 4,
            "bathrooms": 3,
            "area": 300,
            "features": { "pool": true, "garage": true }
        },
        {
            "id": "c3",
            "property_type": "apartment",
            "listing_type": "sale",
            "status": "active",
            "city": "Wuse",
            "state": "FCT",
            "bedrooms": 1
        },
        {
            "id": "c4",
            "property_type": "villa",
            "listing_type": "rent",
            "status": "active",
            "price": 1_000_000,
            "city": "Lekki",
            "bedrooms": 4
        }
    ])
}

async fn mock_target(server: &mut ServerGuard, body: Value) -> Mock {
    server
        .mock("GET", "/rest/v1/properties")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.t1".into()))
        .match_header("apikey", "test_key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

async fn mock_candidates(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", "/rest/v1/properties")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("id".into(), "neq.t1".into()),
            Matcher::UrlEncoded("status".into(), "ilike.active".into()),
            Matcher::UrlEncoded("listing_type".into(), "ilike.sale".into()),
            Matcher::UrlEncoded("limit".into(), "50".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(candidate_rows().to_string())
        .create_async()
        .await
}

#[actix_web::test]
async fn test_recommendations_ranked_by_similarity() {
    let mut server = mockito::Server::new_async().await;
    let _target = mock_target(&mut server, json!([target_row()])).await;
    let _candidates = mock_candidates(&mut server).await;

    let app = init_app!(create_state(server.url(), None));

    let req = test::TestRequest::post()
        .uri("/api/v1/recommendations")
        .set_json(json!({ "propertyId": "t1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let recommendations = body["recommendations"].as_array().unwrap();

    // c3 falls under the threshold and c4 is a rental
    let ids: Vec<&str> = recommendations
        .iter()
        .map(|r| r["property"]["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["c2", "c1"]);

    assert_eq!(recommendations[0]["score"].as_f64().unwrap(), 94.0);
    assert_eq!(recommendations[0]["matchPercentage"], 94);
    assert_eq!(recommendations[1]["matchPercentage"], 30);
    assert_eq!(body["totalCandidates"], 3);

    let reasons = recommendations[0]["reasons"].as_array().unwrap();
    assert!(reasons.contains(&json!("Same type")));
    assert!(reasons.contains(&json!("Pool")));
}

#[actix_web::test]
async fn test_recommendations_respect_limit() {
    let mut server = mockito::Server::new_async().await;
    let _target = mock_target(&mut server, json!([target_row()])).await;
    let _candidates = mock_candidates(&mut server).await;

    let app = init_app!(create_state(server.url(), None));

    let req = test::TestRequest::post()
        .uri("/api/v1/recommendations")
        .set_json(json!({ "property_id": "t1", "limit": 1 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0]["property"]["id"], "c2");
}

#[actix_web::test]
async fn test_similar_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let _target = mock_target(&mut server, json!([target_row()])).await;
    let _candidates = mock_candidates(&mut server).await;

    let app = init_app!(create_state(server.url(), None));

    let req = test::TestRequest::get()
        .uri("/api/v1/properties/t1/similar?limit=6")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn test_unknown_property_returns_404() {
    let mut server = mockito::Server::new_async().await;
    let _target = mock_target(&mut server, json!([])).await;

    let app = init_app!(create_state(server.url(), None));

    let req = test::TestRequest::post()
        .uri("/api/v1/recommendations")
        .set_json(json!({ "propertyId": "t1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Property not found");
    assert_eq!(body["status_code"], 404);
}

async fn mock_pool(server: &mut ServerGuard, rows: Value) -> Mock {
    server
        .mock("GET", "/rest/v1/properties")
        .match_query(Matcher::UrlEncoded("id".into(), "neq.t1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(rows.to_string())
        .create_async()
        .await
}

#[actix_web::test]
async fn test_candidates_with_bad_fields_are_still_ranked() {
    let mut server = mockito::Server::new_async().await;
    let target = json!({
        "id": "t1",
        "property_type": "villa",
        "listing_type": "sale",
        "status": "active",
        "city": "Lekki",
        "bedrooms": 4
    });
    let _target = mock_target(&mut server, json!([target])).await;
    let _pool = mock_pool(
        &mut server,
        json!([
            {
                "id": "c1",
                "property_type": "villa",
                "listing_type": "sale",
                "status": "active",
                "city": "Lekki",
                "bedrooms": 4,
                "bathrooms": 2.5
            },
            {
                "id": "c2",
                "property_type": "villa",
                "listing_type": "sale",
                "status": "Active",
                "city": "Lekki",
                "bedrooms": -1,
                "price": "on request"
            }
        ]),
    )
    .await;

    let app = init_app!(create_state(server.url(), None));

    let req = test::TestRequest::post()
        .uri("/api/v1/recommendations")
        .set_json(json!({ "propertyId": "t1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let recommendations = body["recommendations"].as_array().unwrap();

    // Only the unreadable factor goes unscored: c1 keeps type + city + bedrooms
    assert_eq!(body["totalCandidates"], 2);
    assert_eq!(recommendations.len(), 2);
    assert_eq!(recommendations[0]["property"]["id"], "c1");
    assert_eq!(recommendations[0]["score"].as_f64().unwrap(), 55.0);
    assert_eq!(recommendations[1]["property"]["id"], "c2");
    assert_eq!(recommendations[1]["score"].as_f64().unwrap(), 45.0);
}

#[actix_web::test]
async fn test_target_with_bad_field_is_still_served() {
    let mut server = mockito::Server::new_async().await;
    let target = json!({
        "id": "t1",
        "property_type": "villa",
        "listing_type": "sale",
        "status": "active",
        "city": "Lekki",
        "bedrooms": 4,
        "bathrooms": 2.5
    });
    let _target = mock_target(&mut server, json!([target])).await;
    let _pool = mock_pool(
        &mut server,
        json!([{
            "id": "c1",
            "property_type": "villa",
            "listing_type": "sale",
            "status": "active",
            "city": "Lekki",
            "bedrooms": 4,
            "bathrooms": 2
        }]),
    )
    .await;

    let app = init_app!(create_state(server.url(), None));

    let req = test::TestRequest::post()
        .uri("/api/v1/recommendations")
        .set_json(json!({ "propertyId": "t1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["recommendations"][0]["score"].as_f64().unwrap(), 55.0);
}

#[actix_web::test]
async fn test_id_rejected_by_backend_returns_404() {
    let mut server = mockito::Server::new_async().await;
    let _target = server
        .mock("GET", "/rest/v1/properties")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.nope".into()))
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "code": "22P02",
                "message": "invalid input syntax for type uuid: \"nope\""
            })
            .to_string(),
        )
        .create_async()
        .await;

    let app = init_app!(create_state(server.url(), None));

    let req = test::TestRequest::post()
        .uri("/api/v1/recommendations")
        .set_json(json!({ "propertyId": "nope" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Property not found");
}

#[actix_web::test]
async fn test_backend_failure_returns_500() {
    let mut server = mockito::Server::new_async().await;
    let _target = server
        .mock("GET", "/rest/v1/properties")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.t1".into()))
        .with_status(503)
        .create_async()
        .await;

    let app = init_app!(create_state(server.url(), None));

    let req = test::TestRequest::post()
        .uri("/api/v1/recommendations")
        .set_json(json!({ "propertyId": "t1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn test_malformed_requests_return_400() {
    let server = mockito::Server::new_async().await;
    let app = init_app!(create_state(server.url(), None));

    let bodies = [
        "{not json".to_string(),
        json!({ "limit": 3 }).to_string(),
        json!({ "propertyId": "" }).to_string(),
        json!({ "propertyId": "   " }).to_string(),
        json!({ "propertyId": "t1", "limit": 0 }).to_string(),
        json!({ "propertyId": "t1", "limit": 500 }).to_string(),
    ];

    for body in bodies {
        let req = test::TestRequest::post()
            .uri("/api/v1/recommendations")
            .insert_header(("content-type", "application/json"))
            .set_payload(body.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {}", body);
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/properties/t1/similar?limit=many")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_cached_until_invalidated() {
    let mut server = mockito::Server::new_async().await;
    let target = server
        .mock("GET", "/rest/v1/properties")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.t1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([target_row()]).to_string())
        .expect(2)
        .create_async()
        .await;
    let _candidates = mock_candidates(&mut server).await;

    let cache = Arc::new(CacheManager::in_memory(100, 60));
    let app = init_app!(create_state(server.url(), Some(cache)));

    let recommend = || {
        test::TestRequest::post()
            .uri("/api/v1/recommendations")
            .set_json(json!({ "propertyId": "t1" }))
            .to_request()
    };

    let first: Value = test::call_and_read_body_json(&app, recommend()).await;
    let second: Value = test::call_and_read_body_json(&app, recommend()).await;
    assert_eq!(first, second);

    let req = test::TestRequest::delete()
        .uri("/api/v1/recommendations/t1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["propertyId"], "t1");
    assert_eq!(body["invalidated"], true);

    let third: Value = test::call_and_read_body_json(&app, recommend()).await;
    assert_eq!(first, third);

    target.assert_async().await;
}

#[actix_web::test]
async fn test_invalidate_trims_property_id() {
    let mut server = mockito::Server::new_async().await;
    let target = server
        .mock("GET", "/rest/v1/properties")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.t1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([target_row()]).to_string())
        .expect(2)
        .create_async()
        .await;
    let _candidates = mock_candidates(&mut server).await;

    let cache = Arc::new(CacheManager::in_memory(100, 60));
    let app = init_app!(create_state(server.url(), Some(cache)));

    let recommend = || {
        test::TestRequest::post()
            .uri("/api/v1/recommendations")
            .set_json(json!({ "propertyId": " t1 " }))
            .to_request()
    };

    let _: Value = test::call_and_read_body_json(&app, recommend()).await;

    let req = test::TestRequest::delete()
        .uri("/api/v1/recommendations/%20t1%20")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["propertyId"], "t1");

    let _: Value = test::call_and_read_body_json(&app, recommend()).await;

    target.assert_async().await;
}

#[actix_web::test]
async fn test_invalidate_without_cache() {
    let server = mockito::Server::new_async().await;
    let app = init_app!(create_state(server.url(), None));

    let req = test::TestRequest::delete()
        .uri("/api/v1/recommendations/t1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["invalidated"], false);
}

#[actix_web::test]
async fn test_health_check() {
    let mut server = mockito::Server::new_async().await;
    let _health = server
        .mock("GET", "/rest/v1/properties")
        .match_query(Matcher::UrlEncoded("select".into(), "id".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let app = init_app!(create_state(server.url(), None));

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "rest");
}

#[actix_web::test]
async fn test_health_check_degraded() {
    let mut server = mockito::Server::new_async().await;
    let _health = server
        .mock("GET", "/rest/v1/properties")
        .match_query(Matcher::UrlEncoded("select".into(), "id".into()))
        .with_status(401)
        .create_async()
        .await;

    let app = init_app!(create_state(server.url(), None));

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "degraded");
}
