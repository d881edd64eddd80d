pub mod scenario_search;
pub mod server;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use scenario_search_backend::search::{FieldIssue, StoreError, ValidationError};

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<T>,
}

/// Handler failures / 接口错误
#[derive(Debug)]
pub enum ApiError {
    /// Bad input, one issue per field → 400
    Validation(ValidationError),
    /// Corpus could not be queried → 503
    Store(StoreError),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(err) => {
                tracing::debug!("Rejected query: {}", err.summary().replace('\n', "; "));
                let body: ApiResponse<Vec<FieldIssue>> = ApiResponse {
                    code: 400,
                    message: err.summary(),
                    errors: Some(err.issues),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::Store(err) => {
                tracing::error!("Corpus query failed: {}", err);
                let body: ApiResponse<()> = ApiResponse {
                    code: 503,
                    message: err.to_string(),
                    errors: None,
                };
                (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
            }
        }
    }
}

/// All routes / 路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(server::health_check))
        .route("/api/scenario-search/search", get(scenario_search::search))
        .route("/api/scenario-search/count", get(scenario_search::count))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use scenario_search_backend::models::{DialogueLine, SpeakerGroup};
    use scenario_search_backend::search::{
        CorpusStore, LineFilter, MemoryCorpus, SearchEngine,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app_with(store: Arc<dyn CorpusStore>) -> Router {
        let state = AppState::load(SearchEngine::new(store)).await.unwrap();
        router(Arc::new(state))
    }

    async fn example_app() -> Router {
        app_with(Arc::new(MemoryCorpus::from_pairs(&[
            ("A", "hello world"),
            ("B", "hello there"),
            ("A", "goodbye"),
            ("結城 友奈", "勇者部五箇条"),
            ("大赦", "勇者様"),
        ])))
        .await
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Option<String>, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let has_more = resp
            .headers()
            .get(scenario_search::HAS_MORE_HEADER)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, has_more, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_search_all_speakers() {
        let (status, has_more, body) =
            get_json(example_app().await, "/api/scenario-search/search?keyword=hello").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(has_more.as_deref(), Some("false"));
        assert_eq!(
            body,
            json!([
                {"speaker": "A", "text": "hello world"},
                {"speaker": "B", "text": "hello there"}
            ])
        );
    }

    #[tokio::test]
    async fn test_search_named_speaker() {
        let (status, _, body) = get_json(
            example_app().await,
            "/api/scenario-search/search?keyword=hello&speaker=A",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"speaker": "A", "text": "hello world"}]));
    }

    #[tokio::test]
    async fn test_search_other_speakers() {
        let (status, _, body) = get_json(
            example_app().await,
            "/api/scenario-search/search?keyword=%E5%8B%87%E8%80%85&speaker=__other__",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"speaker": "大赦", "text": "勇者様"}]));
    }

    #[tokio::test]
    async fn test_search_pagination_header() {
        let (status, has_more, body) = get_json(
            example_app().await,
            "/api/scenario-search/search?keyword=&page=1&pageSize=2",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(has_more.as_deref(), Some("true"));
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (_, has_more, body) = get_json(
            example_app().await,
            "/api/scenario-search/search?keyword=&page=3&page_size=2",
        )
        .await;
        assert_eq!(has_more.as_deref(), Some("false"));
        assert_eq!(body, json!([{"speaker": "大赦", "text": "勇者様"}]));
    }

    #[tokio::test]
    async fn test_unknown_speaker_is_client_error() {
        let (status, _, body) = get_json(
            example_app().await,
            "/api/scenario-search/search?keyword=hello&speaker=Nonexistent%20Person",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
        assert_eq!(body["errors"][0]["field"], "speaker");
        assert_eq!(body["errors"][0]["kind"], "unknown_speaker");
    }

    #[tokio::test]
    async fn test_every_invalid_field_reported() {
        let (status, _, body) = get_json(
            example_app().await,
            "/api/scenario-search/search?speaker=Nobody&page=0&pageSize=101",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["speaker", "page", "pageSize"]);
        assert_eq!(body["message"].as_str().unwrap().lines().count(), 3);
    }

    #[tokio::test]
    async fn test_repeated_keys_are_field_errors() {
        for (uri, field) in [
            ("/api/scenario-search/search?page=1&page=2", "page"),
            ("/api/scenario-search/search?pageSize=5&page_size=6", "pageSize"),
            ("/api/scenario-search/search?keyword=a&keyword=b", "keyword"),
            ("/api/scenario-search/count?speaker=A&speaker=B", "speaker"),
        ] {
            let (status, _, body) = get_json(example_app().await, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["code"], 400, "{}", uri);
            assert_eq!(body["errors"][0]["field"], field, "{}", uri);
            assert_eq!(body["errors"][0]["kind"], "invalid", "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_unknown_query_keys_ignored() {
        let (status, _, body) = get_json(
            example_app().await,
            "/api/scenario-search/search?keyword=hello&page_size=1&utm=x",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_count_ignores_speaker() {
        let (status, _, body) = get_json(
            example_app().await,
            "/api/scenario-search/count?keyword=hello&speaker=B",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {"speaker": "A", "count": 1},
                {"speaker": "B", "count": 1}
            ])
        );
    }

    #[tokio::test]
    async fn test_count_shares_validation() {
        let (status, _, body) = get_json(
            example_app().await,
            "/api/scenario-search/count?keyword=hello&pageSize=0",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "pageSize");
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _, body) = get_json(example_app().await, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["build_time"].as_str().unwrap().ends_with('Z'));
    }

    /// Serves distinct_speakers, fails every query afterwards
    struct FlakyStore;

    #[async_trait::async_trait]
    impl CorpusStore for FlakyStore {
        async fn find_many(&self, _: &LineFilter, _: u64, _: u64) -> Result<Vec<DialogueLine>, StoreError> {
            Err(StoreError::Unavailable("disk I/O error".into()))
        }

        async fn group_count(&self, _: &LineFilter) -> Result<Vec<SpeakerGroup>, StoreError> {
            Err(StoreError::Unavailable("disk I/O error".into()))
        }

        async fn distinct_speakers(&self) -> Result<Vec<String>, StoreError> {
            Ok(vec!["A".to_string()])
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_server_error() {
        let (status, _, body) =
            get_json(app_with(Arc::new(FlakyStore)).await, "/api/scenario-search/search?keyword=x").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], 503);

        let (status, _, _) =
            get_json(app_with(Arc::new(FlakyStore)).await, "/api/scenario-search/count?keyword=x").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
