use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::models::{FindPropertiesResponse, ImportResponse, SuggestResponse};
use crate::search::{
    IndexStats, PropertyFilter, SearchError, SearchIndexKind, SearchRequest, SortDirection, SortSpec,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Query string shared by the property search endpoints
#[derive(Debug, Default, Deserialize, Validate)]
pub struct FindQuery {
    #[serde(rename = "SortColumn", alias = "sortColumn")]
    pub sort_column: Option<String>,
    #[serde(rename = "SortDirection", alias = "sortDirection")]
    pub sort_direction: Option<String>,
    #[validate(length(max = 100))]
    pub town: Option<String>,
    #[validate(length(max = 100))]
    pub county: Option<String>,
    #[validate(length(max = 100))]
    pub locality: Option<String>,
    #[validate(length(max = 100))]
    pub district: Option<String>,
}

impl FindQuery {
    fn filter(&self) -> PropertyFilter {
        PropertyFilter {
            town: self.town.clone(),
            county: self.county.clone(),
            locality: self.locality.clone(),
            district: self.district.clone(),
        }
    }

    fn sort(&self) -> Result<SortSpec> {
        let direction = match self.sort_direction.as_deref().map(str::trim) {
            None | Some("") => SortDirection::default(),
            Some(raw) => SortDirection::from_str(raw).map_err(|_| {
                AppError::Validation(format!("Unknown sort direction '{}'", raw))
            })?,
        };
        Ok(SortSpec {
            column: self.sort_column.clone(),
            direction,
        })
    }
}

/// Free-text property search
pub async fn find_properties(
    State(state): State<AppState>,
    Path((text, page)): Path<(String, usize)>,
    Query(query): Query<FindQuery>,
) -> Result<Json<FindPropertiesResponse>> {
    run_find(&state, text, page, query).await
}

/// Property search matching everything
pub async fn find_all_properties(
    State(state): State<AppState>,
    Path(page): Path<usize>,
    Query(query): Query<FindQuery>,
) -> Result<Json<FindPropertiesResponse>> {
    run_find(&state, String::new(), page, query).await
}

async fn run_find(
    state: &AppState,
    text: String,
    page: usize,
    query: FindQuery,
) -> Result<Json<FindPropertiesResponse>> {
    query.validate()?;

    let request = SearchRequest::new(text)
        .with_filter(query.filter())
        .with_sort(query.sort()?)
        .with_page(page);

    let response = state.search.find_properties(&request).await?;
    Ok(Json(response))
}

/// Properties near a postcode, nearest first
pub async fn find_by_postcode(
    State(state): State<AppState>,
    Path((postcode, distance, page)): Path<(String, f64, usize)>,
    Query(query): Query<FindQuery>,
) -> Result<Json<FindPropertiesResponse>> {
    query.validate()?;

    let response = state
        .search
        .find_by_postcode(&postcode, distance, page, &query.filter())
        .await?;
    Ok(Json(response))
}

/// Completions for a partial query
pub async fn suggest(
    State(state): State<AppState>,
    Path(text): Path<String>,
) -> Result<Json<SuggestResponse>> {
    let suggestions = state.search.suggest(&text).await?;
    Ok(Json(SuggestResponse { suggestions }))
}

/// Document count and indexer progress
pub async fn index_stats(
    State(state): State<AppState>,
    Path(index): Path<String>,
) -> Result<Json<IndexStats>> {
    let kind = parse_index(&index)?;
    let stats = state.indexes.get_stats(state.targets.get(kind)).await?;
    Ok(Json(stats))
}

/// Upload a JSON array of records and start the indexer
pub async fn import_documents(
    State(state): State<AppState>,
    Path(index): Path<String>,
    Json(records): Json<serde_json::Value>,
) -> Result<Json<ImportResponse>> {
    let kind = parse_index(&index)?;
    let documents = state.importer.import_json(kind, records).await?;
    Ok(Json(ImportResponse { documents }))
}

fn parse_index(index: &str) -> Result<SearchIndexKind> {
    SearchIndexKind::from_str(index)
        .map_err(|_| SearchError::UnknownIndex(index.to_string()).into())
}

/// Prometheus metrics endpoint
///
/// Returns metrics in Prometheus text exposition format
pub async fn metrics() -> (StatusCode, String) {
    let metrics = crate::metrics::gather_metrics();
    (StatusCode::OK, metrics)
}
