//! Property search on top of a managed search service
//!
//! The service does the full-text matching, faceting and ranking. This module
//! owns everything around it:
//!
//! - **Index lifecycle**: index, blob datasource and indexer creation and reset
//! - **Query building**: free text, typed filters, sort, paging, facets
//! - **Execution & mapping**: raw hits reshaped into [`PropertyResult`](crate::models::PropertyResult)s
//! - **Suggestions**: completions from the index suggester
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │         PropertySearchService / IndexManager     │
//! ├─────────────────────────────────────────────────┤
//! │  - find_properties()   - find_by_postcode()     │
//! │  - suggest()           - initialize()/stats     │
//! └─────────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────────┐
//! │     QueryBuilder + FilterExpr (OData rendering)  │
//! └─────────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────────┐
//! │   SearchBackend (AzureSearchClient over REST)    │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use property_search::geo::InMemoryPostcodeResolver;
//! use property_search::search::{
//!     AzureSearchClient, PropertyFilter, PropertySearchService, SearchConfig, SearchRequest,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SearchConfig::builder()
//!         .endpoint("https://my-service.search.windows.net")
//!         .api_key("secret")
//!         .build();
//!     let backend = Arc::new(AzureSearchClient::new(&config)?);
//!     let search = PropertySearchService::new(
//!         backend,
//!         Arc::new(InMemoryPostcodeResolver::new()),
//!         config.properties_index.clone(),
//!     );
//!
//!     let request = SearchRequest::new("high street")
//!         .with_filter(PropertyFilter::default().with_town("leeds"));
//!     let response = search.find_properties(&request).await?;
//!     println!("Found {:?} transactions", response.total_transactions);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod document;
mod error;
mod filter;
mod index;
mod mapper;
mod query;
mod service;

pub use client::{
    AzureSearchClient, FacetValue, IndexerExecutionResult, IndexerStatus, RawSearchResults,
    RawSuggestResults, SearchBackend, SuggestHit,
};
pub use config::{SearchConfig, SearchConfigBuilder};
pub use document::{
    build_postcode_index, build_property_index, fields, FieldType, GeographyPoint,
    IndexDefinition, IndexField, PostcodeDocument, SearchIndexKind, SearchableProperty,
    Suggester, SUGGESTER_NAME,
};
pub use error::{SearchError, SearchResult};
pub use filter::{Direction, FilterExpr, OrderClause};
pub use index::{
    blob_connection_string, DataSourceDefinition, IndexInitOutcome, IndexManager, IndexMode,
    IndexStats, IndexStatus, IndexTarget, IndexTargets, IndexerDefinition,
};
pub use mapper::{map_facets, map_property, map_response};
pub use query::{
    GeoSearch, PropertyFilter, QueryBuilder, SearchParameters, SearchRequest, SortColumn,
    SortDirection, SortSpec, SuggestParameters, FACET_FIELDS, PAGE_SIZE, SUGGESTION_COUNT,
};
pub use service::PropertySearchService;
