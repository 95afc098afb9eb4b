//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_id, get};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_check_returns_ok_with_json(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
    assert_eq!(
        json["catalog"],
        json!({ "franchises": 0, "movies": 0, "characters": 0 })
    );
}

// ---------------------------------------------------------------------------
// Test: GET /health reports catalog sizes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_check_counts_catalog_rows(pool: PgPool) {
    create_id(&pool, "/api/v1/franchises", json!({ "name": "Pixar" })).await;
    create_id(&pool, "/api/v1/movies", json!({ "title": "Up" })).await;
    create_id(&pool, "/api/v1/movies", json!({ "title": "Coco" })).await;

    let response = get(common::build_test_app(pool), "/health").await;

    let json = body_json(response).await;
    assert_eq!(json["catalog"]["franchises"], 1);
    assert_eq!(json["catalog"]["movies"], 2);
    assert_eq!(json["catalog"]["characters"], 0);
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_route_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: Responses carry a request id
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn response_has_request_id_header(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert!(response.headers().contains_key("x-request-id"));
}
