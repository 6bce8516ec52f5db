// src/api/mod.rs

pub mod handler;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::models::AppState;
use handler::{
    create_session_handler, get_avg_product_votes_handler, get_votes_handler, health_handler,
    missing_product_handler, upsert_vote_handler,
};

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/session", post(create_session_handler))
        .route("/v1/votes", post(upsert_vote_handler).get(get_votes_handler))
        .route("/v1/votes/", get(missing_product_handler))
        .route("/v1/votes/{product_id}", get(get_avg_product_votes_handler));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, Store};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app_with_store(store: Arc<MemoryStore>) -> Router {
        router(Arc::new(AppState::new(store)))
    }

    fn app() -> Router {
        app_with_store(Arc::new(MemoryStore::new()))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, set_cookie, body)
    }

    fn vote_request(session_id: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::post("/api/v1/votes").header(header::CONTENT_TYPE, "application/json");
        if let Some(id) = session_id {
            builder = builder.header(header::COOKIE, format!("session_id={id}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_votes_request(session_id: Option<&str>) -> Request<Body> {
        let mut builder = Request::get("/api/v1/votes");
        if let Some(id) = session_id {
            builder = builder.header(header::COOKIE, format!("session_id={id}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn create_session(app: &Router) -> String {
        let request = Request::post("/api/v1/session").body(Body::empty()).unwrap();
        let (status, set_cookie, _) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);

        let set_cookie = set_cookie.expect("session cookie");
        assert!(set_cookie.contains("Secure"));
        assert!(set_cookie.contains("Expires="));

        set_cookie
            .split(';')
            .next()
            .and_then(|pair| pair.strip_prefix("session_id="))
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::get("/api/health").body(Body::empty()).unwrap();
        let (status, _, body) = send(&app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_session_cookie_expires_with_session() {
        let store = Arc::new(MemoryStore::new());
        let app = app_with_store(store.clone());

        let request = Request::post("/api/v1/session").body(Body::empty()).unwrap();
        let (status, set_cookie, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);

        let set_cookie = set_cookie.unwrap();
        let session_id = set_cookie
            .split(';')
            .next()
            .and_then(|pair| pair.strip_prefix("session_id="))
            .unwrap();
        let expires = set_cookie
            .split(';')
            .map(str::trim)
            .find_map(|attr| attr.strip_prefix("Expires="))
            .unwrap();

        let session = store.get_session(session_id).await.unwrap().unwrap();
        let expected = session.expire_at.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        assert_eq!(expires, expected);
    }

    #[tokio::test]
    async fn test_vote_scenario() {
        let app = app();
        let session_id = create_session(&app).await;

        let (status, _, body) = send(
            &app,
            vote_request(Some(&session_id), r#"{"product_id":"pizza","score":4}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 4);

        let (status, _, body) = send(
            &app,
            vote_request(Some(&session_id), r#"{"product_id":"pizza","score":2}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"session_id": session_id, "product_id": "pizza", "score": 2})
        );

        let (status, _, body) = send(&app, get_votes_request(Some(&session_id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{"session_id": session_id, "product_id": "pizza", "score": 2}])
        );

        let request = Request::get("/api/v1/votes/pizza").body(Body::empty()).unwrap();
        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"avg": 2.0, "vote_count": 1, "product_id": "pizza"}));
    }

    #[tokio::test]
    async fn test_get_votes_empty_list() {
        let app = app();
        let session_id = create_session(&app).await;

        let (status, _, body) = send(&app, get_votes_request(Some(&session_id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_missing_cookie_unauthorized() {
        let app = app();

        let (status, _, _) = send(&app, get_votes_request(None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _, _) = send(&app, vote_request(None, r#"{"product_id":"pizza","score":3}"#)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_session_unauthorized() {
        let app = app();

        let (status, _, body) = send(
            &app,
            vote_request(Some("not-a-session"), r#"{"product_id":"pizza","score":3}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "invalid session"}));

        let (status, _, body) = send(&app, get_votes_request(Some("not-a-session"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "invalid session"}));
    }

    #[tokio::test]
    async fn test_expired_session_unauthorized() {
        let store = Arc::new(MemoryStore::new());
        store
            .store_session("stale", Utc::now() - Duration::minutes(1))
            .await
            .unwrap();
        let app = app_with_store(store);

        let (status, _, body) = send(
            &app,
            vote_request(Some("stale"), r#"{"product_id":"pizza","score":3}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "invalid session"}));
    }

    #[tokio::test]
    async fn test_score_out_of_range_rejected() {
        let app = app();
        let session_id = create_session(&app).await;

        for (score, tag) in [(0, "min"), (6, "max")] {
            let payload = format!(r#"{{"product_id":"pizza","score":{score}}}"#);
            let (status, _, body) = send(&app, vote_request(Some(&session_id), &payload)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                body,
                json!([{"error": true, "failed_field": "score", "tag": tag, "value": score}])
            );
        }

        for score in [1, 5] {
            let payload = format!(r#"{{"product_id":"pizza","score":{score}}}"#);
            let (status, _, _) = send(&app, vote_request(Some(&session_id), &payload)).await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_empty_product_id_rejected_on_vote() {
        let app = app();
        let session_id = create_session(&app).await;

        let (status, _, body) = send(
            &app,
            vote_request(Some(&session_id), r#"{"product_id":"","score":3}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body[0]["failed_field"], "product_id");
    }

    #[tokio::test]
    async fn test_malformed_body_rejected() {
        let app = app();
        let session_id = create_session(&app).await;

        let (status, _, body) = send(&app, vote_request(Some(&session_id), "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "malformed payload"}));

        let (status, _, _) = send(
            &app,
            vote_request(Some(&session_id), r#"{"product_id":"pizza","score":"five"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_average_errors() {
        let app = app();

        let request = Request::get("/api/v1/votes/").body(Body::empty()).unwrap();
        let (status, _, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let request = Request::get("/api/v1/votes/ramen").body(Body::empty()).unwrap();
        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "no votes found for product ramen"}));
    }

    #[tokio::test]
    async fn test_average_across_sessions() {
        let app = app();

        for score in [5, 4, 2] {
            let session_id = create_session(&app).await;
            let payload = format!(r#"{{"product_id":"taco","score":{score}}}"#);
            let (status, _, _) = send(&app, vote_request(Some(&session_id), &payload)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let request = Request::get("/api/v1/votes/taco").body(Body::empty()).unwrap();
        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["vote_count"], 3);
        assert!((body["avg"].as_f64().unwrap() - 11.0 / 3.0).abs() < 1e-9);
    }
}
