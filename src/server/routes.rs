//! Route table for the Sakhi backend API.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use super::state::AppState;
use super::{conversations, knowledge_hub, stories};

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/knowledge-hub", get(knowledge_hub::list_items))
        .route("/api/knowledge-hub/", get(knowledge_hub::list_items))
        .route("/api/knowledge-hub/{slug}", get(knowledge_hub::get_item))
        .route("/stories", get(stories::list_published))
        .route("/stories/", get(stories::list_published))
        .route("/stories/draft", post(stories::create_draft))
        .route("/stories/consent", post(stories::record_consent))
        .route("/stories/upload", post(stories::upload_photo))
        .route("/stories/{id}", get(stories::get_story))
        .route("/stories/{id}/status", put(stories::update_status))
        .route(
            "/api/conversations/{user_id}/messages",
            post(conversations::append_message),
        )
        .route(
            "/api/conversations/{user_id}/history",
            get(conversations::get_history),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "sakhi-backend",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppConfig;
    use crate::conversation::CONVERSATION_TABLE;
    use crate::db::{InMemoryStore, Operation};
    use crate::knowledge_hub::KNOWLEDGE_HUB_TABLE;
    use crate::stories::types::tests::sample_story;

    const ADMIN: &str = "test-admin";

    fn test_config() -> AppConfig {
        AppConfig::from_lookup(|key| match key {
            "SUPABASE_URL" => Some("https://example.supabase.co".to_string()),
            "SUPABASE_SERVICE_ROLE_KEY" => Some("dummy-key".to_string()),
            "ADMIN_TOKEN" => Some(ADMIN.to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn app() -> (Arc<InMemoryStore>, Router) {
        let store = Arc::new(InMemoryStore::new());
        let state = AppState::with_store(store.clone(), &test_config());
        (store, create_router(state))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, value)
    }

    fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (_store, app) = app();
        let (status, body) = send(&app, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_append_and_read_history() {
        let (_store, app) = app();

        let (status, row) = send(
            &app,
            json_request(
                "POST",
                "/api/conversations/u-1/messages",
                &json!({"text": "Is walking safe?", "role": "user"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(row["language"], "en");
        assert!(row.get("chat_id").is_none());

        let (status, row) = send(
            &app,
            json_request(
                "POST",
                "/api/conversations/u-1/messages",
                &json!({
                    "text": "Yes, gentle walks help.",
                    "role": "sakhi",
                    "youtube_link": "https://youtube.com/watch?v=abc",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(row["chat_id"].as_str().is_some());
        assert_eq!(row["youtube_link"], "https://youtube.com/watch?v=abc");

        let (status, history) =
            send(&app, get_request("/api/conversations/u-1/history?limit=1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history.as_array().map(Vec::len), Some(1));

        let (_, empty) = send(&app, get_request("/api/conversations/nobody/history")).await;
        assert_eq!(empty, json!([]));
    }

    #[tokio::test]
    async fn test_database_failure_maps_to_bad_gateway() {
        let (store, app) = app();
        store.fail_on(Operation::Insert, true);

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/conversations/u-1/messages",
                &json!({"text": "hi", "role": "user"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["detail"].as_str().is_some());
        assert!(store.rows(CONVERSATION_TABLE).await.is_empty());
    }

    #[tokio::test]
    async fn test_knowledge_hub_routes() {
        let (store, app) = app();
        store
            .seed(
                KNOWLEDGE_HUB_TABLE,
                vec![json!({"id": 1, "slug": "diet", "title": "Diet", "title_te": "ఆహారం",
                            "content": "Eat well", "life_stage_id": 2,
                            "published_at": "2025-01-01T00:00:00Z"})],
            )
            .await;

        let (status, items) =
            send(&app, get_request("/api/knowledge-hub/?lifeStage=2&lang=te")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(items[0]["title"], "ఆహారం");

        let (status, item) = send(&app, get_request("/api/knowledge-hub/diet")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(item["title"], "Diet");
        assert_eq!(item["read_time_minutes"], 5);

        let (status, body) = send(&app, get_request("/api/knowledge-hub/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Knowledge Hub item not found");
    }

    #[tokio::test]
    async fn test_story_lifecycle_with_admin_token() {
        let (_store, app) = app();
        let draft = serde_json::to_value(sample_story()).unwrap();

        let (status, created) = send(&app, json_request("POST", "/stories/draft", &draft)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "pending");
        let id = created["id"].as_str().unwrap().to_string();

        let (status, consented) = send(
            &app,
            json_request("POST", "/stories/consent", &json!({"id": id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(consented["consent"], true);

        let uri = format!("/stories/{id}/status");
        let body = json!({"status": "published"});

        let (status, _) = send(&app, json_request("PUT", &uri, &body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let mut wrong = json_request("PUT", &uri, &body);
        wrong
            .headers_mut()
            .insert("x-admin-token", "nope".parse().unwrap());
        let (status, detail) = send(&app, wrong).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(detail["detail"], "Unauthorized");

        let mut authorized = json_request("PUT", &uri, &body);
        authorized
            .headers_mut()
            .insert("x-admin-token", ADMIN.parse().unwrap());
        let (status, published) = send(&app, authorized).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(published["status"], "published");

        let (status, listed) = send(&app, get_request("/stories/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().map(Vec::len), Some(1));

        let (status, _) = send(&app, get_request(&format!("/stories/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_story_and_missing_story() {
        let (_store, app) = app();
        let mut draft = serde_json::to_value(sample_story()).unwrap();
        draft["name"] = Value::Null;

        let (status, body) = send(&app, json_request("POST", "/stories/draft", &draft)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"], "name is required when share_type is named");

        let uri = format!("/stories/{}", uuid::Uuid::new_v4());
        let (status, body) = send(&app, get_request(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Story not found");
    }

    #[tokio::test]
    async fn test_upload_photo() {
        let (_store, app) = app();
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"photo\"; filename=\"baby shower.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\n\
             fake-bytes\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/stories/upload")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::CREATED);
        let url = body["photo_url"].as_str().unwrap();
        assert!(url.starts_with("https://example-bucket.s3.amazonaws.com/uploads/"));
        assert!(url.ends_with("-baby-shower.jpg"));
    }

    #[tokio::test]
    async fn test_unknown_role_is_rejected_as_json() {
        let (store, app) = app();

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/conversations/u/messages",
                &json!({"text": "hi", "role": "bot"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("unknown variant"));
        assert!(store.rows(CONVERSATION_TABLE).await.is_empty());
    }

    #[tokio::test]
    async fn test_incomplete_draft_is_rejected_as_json() {
        let (_store, app) = app();

        let (status, body) = send(
            &app,
            json_request("POST", "/stories/draft", &json!({"share_type": "anonymous"})),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("city"));
    }

    #[tokio::test]
    async fn test_malformed_story_id_is_unprocessable() {
        let (_store, app) = app();

        let (status, body) = send(&app, get_request("/stories/not-a-uuid")).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_bad_query_and_content_type_are_unprocessable() {
        let (_store, app) = app();

        let (status, body) =
            send(&app, get_request("/api/knowledge-hub/?lifeStage=early")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().is_some());

        let request = Request::builder()
            .method("POST")
            .uri("/stories/consent")
            .body(Body::from("id=1"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().is_some());

        let request = Request::builder()
            .method("POST")
            .uri("/stories/upload")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().is_some());
    }
}
