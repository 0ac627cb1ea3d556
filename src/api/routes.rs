//! HTTP API route definitions.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{evaluate, health, normalize, prometheus, AppState};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/metrics", get(prometheus))
        // Engine endpoints
        .route("/api/v1/evaluate", post(evaluate))
        .route("/api/v1/normalize", post(normalize))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = create_router(AppState::default());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn evaluate_endpoint_returns_allocation() {
        let app = create_router(AppState::default());
        let body = r#"{"market": {"outcomes": [
            {"label": "Home", "odd": 2.10, "bookmaker": "A"},
            {"label": "Away", "odd": 2.05, "bookmaker": "B"}
        ]}}"#;

        let response = app.oneshot(post_json("/api/v1/evaluate", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["is_surebet"], Value::Bool(true));
        assert_eq!(json["profit"], Value::String("3.73".to_string()));
        assert_eq!(json["allocation"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn evaluate_endpoint_rejects_bad_stake() {
        let app = create_router(AppState::default());
        let body = r#"{"market": {"outcomes": []}, "total_stake": "-1"}"#;

        let response = app.oneshot(post_json("/api/v1/evaluate", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn evaluate_endpoint_reports_rejection_as_data() {
        let app = create_router(AppState::default());
        let body = r#"{"market": {"outcomes": [{"label": "Solo", "odd": 2.0, "bookmaker": "A"}]}}"#;

        let response = app.oneshot(post_json("/api/v1/evaluate", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["is_surebet"], Value::Bool(false));
        assert_eq!(json["rejection"], "unsupported_market_size");
    }

    #[tokio::test]
    async fn normalize_endpoint_converts_american() {
        let app = create_router(AppState::default());

        let response = app
            .oneshot(post_json("/api/v1/normalize", r#"{"odd": "-125"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["format"], "american");
        assert!((json["decimal"].as_f64().unwrap() - 1.8).abs() < 1e-9);
        assert_eq!(json["notations"]["fractional"], "4/5");
    }

    #[tokio::test]
    async fn normalize_endpoint_rejects_garbage() {
        let app = create_router(AppState::default());

        let response = app
            .oneshot(post_json("/api/v1/normalize", r#"{"odd": "evens"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn metrics_endpoint_is_404_without_recorder() {
        let app = create_router(AppState::default());

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
