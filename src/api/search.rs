use axum::{Json, Router, extract::State, routing::get};
use axum_extra::extract::Query;
use serde::Deserialize;

use crate::{content::Article, error::Result, state::AppState, storage::Store};

/// 配置搜索接口，挂载在 `/api` 下。
///
/// - `GET /search?q=`：按标题或正文搜索，最多返回 10 篇
pub fn setup_route<S: Store>() -> Router<AppState<S>> {
    Router::new().route("/search", get(search::<S>))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    q: String,
}

/// 搜索文章，查询为空时返回空列表
async fn search<S: Store>(
    Query(params): Query<SearchParams>,
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Article>>> {
    let results = state.articles().search(&params.q).await?;
    Ok(Json(results))
}
