use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use ft_core::{ArticleFilter, ArticleQuery, ArticleRecord, ArticleStub, Category, SourceId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

/// A stored article as served over HTTP.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    #[serde(flatten)]
    pub article: ArticleRecord,
    pub reading_time: u32,
}

impl From<ArticleRecord> for ArticleView {
    fn from(article: ArticleRecord) -> Self {
        Self {
            reading_time: article.reading_time(),
            article,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub id: SourceId,
    pub name: &'static str,
    pub listing_url: String,
    pub category: Category,
}

pub async fn list_sources(State(state): State<Arc<AppState>>) -> Json<Vec<SourceInfo>> {
    let registry = state.manager.registry();
    let sources = registry
        .sources()
        .into_iter()
        .map(|source| SourceInfo {
            id: source,
            name: source.display_name(),
            listing_url: registry
                .get(source)
                .map(|s| s.listing_url().to_string())
                .unwrap_or_default(),
            category: source.category(),
        })
        .collect();
    Json(sources)
}

pub async fn get_news(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
) -> ApiResult<Json<Vec<ArticleStub>>> {
    fetch_news(&state, &source).await.map(Json)
}

pub async fn get_fourfourtwo_news(
    State(state): State<Arc<AppState>>,
    Path(league): Path<String>,
) -> ApiResult<Json<Vec<ArticleStub>>> {
    fetch_news(&state, &format!("fourfourtwo-{}", league)).await.map(Json)
}

async fn fetch_news(state: &AppState, source: &str) -> ApiResult<Vec<ArticleStub>> {
    let source: SourceId = source.parse()?;
    let stubs = state.manager.fetch_listing(source).await?;
    state.set_listing(source, stubs.clone()).await;
    Ok(stubs)
}

#[derive(Debug, Default, Deserialize)]
pub struct ScrapeRequest {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResponse {
    pub source: SourceId,
    pub total_found: usize,
    pub scraped: usize,
    pub articles: Vec<ArticleView>,
}

/// Ingests the most recent listing of `source`. A missing or malformed
/// body means default options.
pub async fn scrape_source(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
    body: Option<Json<ScrapeRequest>>,
) -> ApiResult<Response> {
    let source: SourceId = source.parse()?;
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let limit = request.limit.unwrap_or(state.manager.config().default_limit);

    let stubs = state.listing(source).await;
    if stubs.is_empty() || limit == 0 {
        return Ok(Json(json!({
            "message": "No articles found. Try calling the basic endpoint first to populate articles.",
            "hint": format!("Call GET /api/news/{} first, then try scraping again.", source),
            "source": source,
            "totalFound": 0,
            "scraped": 0,
            "articles": [],
        }))
        .into_response());
    }

    info!(source = %source, available = stubs.len(), limit, "Scrape requested");
    let report = state.manager.ingest(&stubs, source, limit).await;
    let response = ScrapeResponse {
        source,
        total_found: report.requested,
        scraped: report.stored,
        articles: report.articles.into_iter().map(ArticleView::from).collect(),
    };
    Ok(Json(response).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct ArticlesParams {
    pub source: Option<String>,
    pub category: Option<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct ArticlesPage {
    pub articles: Vec<ArticleView>,
    pub pagination: Pagination,
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ArticlesParams>,
) -> ApiResult<Json<ArticlesPage>> {
    let source = params
        .source
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<SourceId>)
        .transpose()?;
    let category = params
        .category
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(|c| {
            c.parse::<Category>()
                .map_err(|_| ApiError::BadRequest(format!("Invalid category: {}", c)))
        })
        .transpose()?;

    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let page = params.page.unwrap_or(1).max(1);
    let filter = ArticleFilter {
        source,
        category,
        ..Default::default()
    };
    let query = ArticleQuery {
        filter: filter.clone(),
        limit,
        offset: (page - 1).saturating_mul(limit),
        include_content: false,
    };

    let storage = state.storage();
    let articles = storage.list_articles(&query).await?;
    let total = storage.count_articles(&filter).await?;

    Ok(Json(ArticlesPage {
        articles: articles.into_iter().map(ArticleView::from).collect(),
        pagination: Pagination {
            page,
            limit,
            total,
            total_pages: total.div_ceil(u64::from(limit)),
        },
    }))
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ArticleView>> {
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid article id: {}", id)))?;
    let article = state
        .storage()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))?;
    Ok(Json(ArticleView::from(article)))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let storage = state.storage();
    let since = Utc::now() - Duration::hours(24);
    let counts = async {
        let total = storage.count_articles(&ArticleFilter::default()).await?;
        let recent = storage
            .count_articles(&ArticleFilter {
                scraped_since: Some(since),
                ..Default::default()
            })
            .await?;
        Ok::<_, ft_core::Error>((total, recent))
    };

    match counts.await {
        Ok((total, recent)) => Json(json!({
            "status": "OK",
            "database": format!("{} connected", storage.name()),
            "totalArticles": total,
            "articlesLast24h": recent,
            "timestamp": Utc::now().to_rfc3339(),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            let body: Value = json!({
                "status": "Error",
                "database": format!("{} connection failed", storage.name()),
                "error": e.to_string(),
                "timestamp": Utc::now().to_rfc3339(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
