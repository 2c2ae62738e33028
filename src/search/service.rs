//! Query execution against the property index

use crate::geo::{normalize_postcode, PostcodeResolver};
use crate::metrics;
use crate::models::FindPropertiesResponse;
use crate::search::client::SearchBackend;
use crate::search::error::{SearchError, SearchResult};
use crate::search::mapper::map_response;
use crate::search::query::{GeoSearch, PropertyFilter, QueryBuilder, SearchRequest};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs property, postcode and suggestion queries
#[derive(Clone)]
pub struct PropertySearchService {
    backend: Arc<dyn SearchBackend>,
    resolver: Arc<dyn PostcodeResolver>,
    index_name: String,
    builder: QueryBuilder,
}

impl PropertySearchService {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        resolver: Arc<dyn PostcodeResolver>,
        index_name: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            resolver,
            index_name: index_name.into(),
            builder: QueryBuilder::new(),
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Free-text search with filters, sort and paging
    pub async fn find_properties(
        &self,
        request: &SearchRequest,
    ) -> SearchResult<FindPropertiesResponse> {
        metrics::record_query("find");
        let parameters = self.builder.build(request);
        debug!(
            index = %self.index_name,
            search = %parameters.search,
            filter = ?parameters.filter,
            orderby = ?parameters.orderby,
            skip = parameters.skip,
            "Executing property search"
        );

        let raw = self.backend.search(&self.index_name, &parameters).await?;
        Ok(map_response(raw, request.page))
    }

    /// Properties within `distance_km` of a postcode, nearest first.
    ///
    /// An unknown postcode yields an empty first page without querying the index.
    pub async fn find_by_postcode(
        &self,
        postcode: &str,
        distance_km: f64,
        page: usize,
        filter: &PropertyFilter,
    ) -> SearchResult<FindPropertiesResponse> {
        metrics::record_query("postcode");
        if !distance_km.is_finite() || distance_km < 0.0 {
            return Err(SearchError::InvalidRequest(format!(
                "Distance must be a non-negative number of kilometres, got {}",
                distance_km
            )));
        }

        let postcode = normalize_postcode(postcode);
        let Some(point) = self.resolver.resolve(&postcode).await? else {
            info!(postcode = %postcode, "Postcode not found, returning empty result");
            return Ok(FindPropertiesResponse::empty(0));
        };

        let parameters = self.builder.build_geo(
            GeoSearch {
                point,
                max_km: distance_km,
            },
            filter,
            page,
        );
        debug!(
            index = %self.index_name,
            postcode = %postcode,
            filter = ?parameters.filter,
            skip = parameters.skip,
            "Executing postcode search"
        );

        let raw = self.backend.search(&self.index_name, &parameters).await?;
        Ok(map_response(raw, page))
    }

    /// Up to ten distinct completions for a partial query
    pub async fn suggest(&self, text: &str) -> SearchResult<Vec<String>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        metrics::record_query("suggest");
        let parameters = self.builder.build_suggest(text);
        let raw = self.backend.suggest(&self.index_name, &parameters).await?;

        let mut seen = HashSet::new();
        Ok(raw
            .value
            .into_iter()
            .map(|hit| hit.text)
            .filter(|text| seen.insert(text.clone()))
            .take(parameters.top)
            .collect())
    }
}
