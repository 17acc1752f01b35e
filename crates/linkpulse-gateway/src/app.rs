use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{
    create_short_link_handler, health_handler, overall_stats_handler, redirect_handler,
    short_link_stats_handler, topic_stats_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .nest(
                "/api",
                Router::new()
                    .route("/shorten", post(create_short_link_handler))
                    .route("/analytics/overall", get(overall_stats_handler))
                    .route("/analytics/topic/{topic}", get(topic_stats_handler))
                    .route("/analytics/{alias}", get(short_link_stats_handler))
                    .route("/{alias}", get(redirect_handler)),
            )
            .with_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GatewayConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use linkpulse_cache::MokaDestinationCache;
    use linkpulse_storage::InMemoryStore;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const BASE_URL: &str = "http://lp.test/api";

    fn router() -> Router {
        let store = Arc::new(InMemoryStore::new());
        let state = AppState::new(
            store.clone(),
            store,
            Arc::new(MokaDestinationCache::new()),
            GatewayConfig::builder().base_url(BASE_URL).build(),
        );
        App::router(state)
    }

    fn shorten(owner: Option<&str>, body: Value) -> Request<Body> {
        let mut request =
            Request::post("/api/shorten").header(header::CONTENT_TYPE, "application/json");
        if let Some(owner) = owner {
            request = request.header("x-owner-id", owner);
        }
        request.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, owner: Option<&str>) -> Request<Body> {
        let mut request = Request::get(uri).header("x-forwarded-for", "1.1.1.1");
        if let Some(owner) = owner {
            request = request.header("x-owner-id", owner);
        }
        request.body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = router().oneshot(get("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn shorten_then_redirect() {
        let app = router();

        let response = app
            .clone()
            .oneshot(shorten(
                Some("U1"),
                json!({ "longUrl": "https://example.com", "customAlias": "test123" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["shortUrl"], "http://lp.test/api/test123");
        assert_eq!(body["alias"], "test123");
        assert!(body["createdAt"].is_string());

        let response = app.oneshot(get("/api/test123", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://example.com"
        );
    }

    #[tokio::test]
    async fn shorten_requires_owner() {
        let response = router()
            .oneshot(shorten(None, json!({ "longUrl": "https://example.com" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn shorten_rejects_bad_input() {
        let app = router();

        let response = app
            .clone()
            .oneshot(shorten(Some("U1"), json!({ "longUrl": "not a url" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());

        let response = app
            .clone()
            .oneshot(shorten(
                Some("U1"),
                json!({ "longUrl": "https://example.com", "customAlias": "a!" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(shorten(
                Some("U1"),
                json!({ "longUrl": "https://example.com", "topic": "marketing" }),
            ))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn destination_with_newline_is_rejected_before_redirect() {
        let app = router();

        let response = app
            .clone()
            .oneshot(shorten(
                Some("U1"),
                json!({ "longUrl": "https://example.com/a\nb", "customAlias": "nl1234" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app.oneshot(get("/api/nl1234", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_alias_conflicts() {
        let app = router();
        let body = json!({ "longUrl": "https://example.com", "customAlias": "taken1" });

        let first = app.clone().oneshot(shorten(Some("U1"), body.clone())).await.unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app.oneshot(shorten(Some("U2"), body)).await.unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_alias_is_not_found() {
        let app = router();

        let response = app.clone().oneshot(get("/api/missing1", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await, json!({ "error": "URL not found" }));

        // too short to ever be created
        let response = app.oneshot(get("/api/ab", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn analytics_reflect_redirects() {
        let app = router();
        app.clone()
            .oneshot(shorten(
                Some("U1"),
                json!({
                    "longUrl": "https://example.com",
                    "customAlias": "stats01",
                    "topic": "retention"
                }),
            ))
            .await
            .unwrap();
        for _ in 0..3 {
            app.clone().oneshot(get("/api/stats01", None)).await.unwrap();
        }

        let response = app
            .clone()
            .oneshot(get("/api/analytics/stats01", Some("U1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["totalClicks"], 3);
        assert_eq!(body["uniqueUsers"], 1);
        assert_eq!(body["clicksByDate"][0]["count"], 3);

        let response = app
            .clone()
            .oneshot(get("/api/analytics/topic/retention", Some("U1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["totalClicks"], 3);
        assert_eq!(body["urls"][0]["shortUrl"], "http://lp.test/api/stats01");

        let response = app
            .oneshot(get("/api/analytics/overall", Some("U1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["totalUrls"], 1);
        assert_eq!(body["totalClicks"], 3);
    }

    #[tokio::test]
    async fn analytics_are_scoped_to_owner() {
        let app = router();
        app.clone()
            .oneshot(shorten(
                Some("U1"),
                json!({ "longUrl": "https://example.com", "customAlias": "mine01" }),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(get("/api/analytics/mine01", Some("U2")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(get("/api/analytics/mine01", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_topic_is_bad_request() {
        let response = router()
            .oneshot(get("/api/analytics/topic/marketing", Some("U1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
