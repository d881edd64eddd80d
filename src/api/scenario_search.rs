use axum::{
    extract::{Query, State},
    http::HeaderValue,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::ApiError;
use crate::state::AppState;
use scenario_search_backend::search::{normalize, RawSearchParams};

/// Response header telling whether a next page exists / 是否还有下一页
pub const HAS_MORE_HEADER: &str = "x-has-more";

/// GET /api/scenario-search/search - 台词搜索
///
/// Query pairs are taken raw so a repeated key becomes a field issue
/// instead of an extractor rejection.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let params = RawSearchParams::from_pairs(pairs);
    let query = normalize(&params, &state.speakers)?;
    let page = state.engine.search(&query).await?;

    let has_more = HeaderValue::from_static(if page.has_more { "true" } else { "false" });
    let mut resp = Json(page.lines).into_response();
    resp.headers_mut().insert(HAS_MORE_HEADER, has_more);
    Ok(resp)
}

/// GET /api/scenario-search/count - 按角色统计
///
/// Validates the same parameters as search, then uses only the keyword.
pub async fn count(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let params = RawSearchParams::from_pairs(pairs);
    let query = normalize(&params, &state.speakers)?;
    let counts = state.engine.count_by_speaker(&query.keyword).await?;
    Ok(Json(counts).into_response())
}
