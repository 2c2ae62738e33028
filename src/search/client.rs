//! Typed client for the managed search service REST API

use crate::metrics;
use crate::search::config::SearchConfig;
use crate::search::document::{IndexDefinition, SearchableProperty};
use crate::search::error::{SearchError, SearchResult};
use crate::search::index::{DataSourceDefinition, IndexerDefinition};
use crate::search::query::{SearchParameters, SuggestParameters};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// One facet bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetValue {
    /// String, number or date depending on the field type
    pub value: serde_json::Value,
    #[serde(default)]
    pub count: Option<u64>,
}

/// Raw document search response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSearchResults {
    #[serde(rename = "@odata.count", default)]
    pub count: Option<u64>,
    #[serde(rename = "@search.facets", default)]
    pub facets: HashMap<String, Vec<FacetValue>>,
    #[serde(default)]
    pub value: Vec<SearchableProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestHit {
    #[serde(rename = "@search.text")]
    pub text: String,
}

/// Raw suggest response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSuggestResults {
    #[serde(default)]
    pub value: Vec<SuggestHit>,
}

/// Outcome of the most recent indexer execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerExecutionResult {
    /// `inProgress`, `success`, `transientFailure`, `reset`
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub items_processed: u64,
    #[serde(default)]
    pub items_failed: u64,
}

impl IndexerExecutionResult {
    pub fn is_in_progress(&self) -> bool {
        self.status.eq_ignore_ascii_case("inProgress")
    }
}

/// Indexer status document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub last_result: Option<IndexerExecutionResult>,
}

/// Operations this application needs from the search service
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn index_exists(&self, index: &str) -> SearchResult<bool>;

    async fn create_index(&self, definition: &IndexDefinition) -> SearchResult<()>;

    /// Deleting a missing index is not an error
    async fn delete_index(&self, index: &str) -> SearchResult<()>;

    async fn create_datasource(&self, definition: &DataSourceDefinition) -> SearchResult<()>;

    async fn delete_datasource(&self, name: &str) -> SearchResult<()>;

    async fn create_indexer(&self, definition: &IndexerDefinition) -> SearchResult<()>;

    async fn delete_indexer(&self, name: &str) -> SearchResult<()>;

    /// Start an indexer run now instead of waiting for its schedule
    async fn run_indexer(&self, name: &str) -> SearchResult<()>;

    async fn indexer_status(&self, name: &str) -> SearchResult<IndexerStatus>;

    async fn search(
        &self,
        index: &str,
        parameters: &SearchParameters,
    ) -> SearchResult<RawSearchResults>;

    async fn suggest(
        &self,
        index: &str,
        parameters: &SuggestParameters,
    ) -> SearchResult<RawSuggestResults>;

    async fn document_count(&self, index: &str) -> SearchResult<u64>;

    /// Fetch one document by key, `None` when absent
    async fn lookup(&self, index: &str, key: &str) -> SearchResult<Option<serde_json::Value>>;
}

/// REST implementation of [`SearchBackend`].
///
/// Owns one connection pool for the process; build it once and share it.
#[derive(Clone)]
pub struct AzureSearchClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    api_version: String,
}

impl AzureSearchClient {
    pub fn new(config: &SearchConfig) -> SearchResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                SearchError::InvalidConfiguration(format!("Failed to create HTTP client: {}", e))
            })?;

        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            SearchError::InvalidConfiguration(format!(
                "Invalid search endpoint '{}': {}",
                config.endpoint, e
            ))
        })?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> SearchResult<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                SearchError::InvalidConfiguration(format!(
                    "Search endpoint cannot be a base: {}",
                    self.endpoint
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> SearchResult<RequestBuilder> {
        Ok(self
            .client
            .request(method, self.url(segments)?)
            .header("api-key", &self.api_key))
    }

    async fn execute(&self, request: RequestBuilder, operation: &str) -> SearchResult<Response> {
        let start = Instant::now();
        let result = request.send().await;
        metrics::observe_upstream("search", operation, start, result.is_ok());
        let response = result?;
        debug!(operation = operation, status = response.status().as_u16(), "Search call");
        Ok(response)
    }

    async fn expect_success(response: Response, operation: &str) -> SearchResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SearchError::Service {
            operation: operation.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn put_definition<T: Serialize + Sync>(
        &self,
        segments: &[&str],
        definition: &T,
        operation: &str,
    ) -> SearchResult<()> {
        let request = self.request(Method::PUT, segments)?.json(definition);
        let response = self.execute(request, operation).await?;
        Self::expect_success(response, operation).await?;
        Ok(())
    }

    async fn delete_if_exists(&self, segments: &[&str], operation: &str) -> SearchResult<()> {
        let request = self.request(Method::DELETE, segments)?;
        let response = self.execute(request, operation).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::expect_success(response, operation).await?;
        Ok(())
    }
}

#[async_trait]
impl SearchBackend for AzureSearchClient {
    async fn index_exists(&self, index: &str) -> SearchResult<bool> {
        let request = self.request(Method::GET, &["indexes", index])?;
        let response = self.execute(request, "get_index").await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::expect_success(response, "get_index").await?;
        Ok(true)
    }

    async fn create_index(&self, definition: &IndexDefinition) -> SearchResult<()> {
        self.put_definition(&["indexes", definition.name.as_str()], definition, "create_index")
            .await
    }

    async fn delete_index(&self, index: &str) -> SearchResult<()> {
        self.delete_if_exists(&["indexes", index], "delete_index")
            .await
    }

    async fn create_datasource(&self, definition: &DataSourceDefinition) -> SearchResult<()> {
        self.put_definition(
            &["datasources", definition.name.as_str()],
            definition,
            "create_datasource",
        )
        .await
    }

    async fn delete_datasource(&self, name: &str) -> SearchResult<()> {
        self.delete_if_exists(&["datasources", name], "delete_datasource")
            .await
    }

    async fn create_indexer(&self, definition: &IndexerDefinition) -> SearchResult<()> {
        self.put_definition(&["indexers", definition.name.as_str()], definition, "create_indexer")
            .await
    }

    async fn delete_indexer(&self, name: &str) -> SearchResult<()> {
        self.delete_if_exists(&["indexers", name], "delete_indexer")
            .await
    }

    async fn run_indexer(&self, name: &str) -> SearchResult<()> {
        let request = self
            .request(Method::POST, &["indexers", name, "run"])?
            .header("Content-Length", "0");
        let response = self.execute(request, "run_indexer").await?;
        Self::expect_success(response, "run_indexer").await?;
        Ok(())
    }

    async fn indexer_status(&self, name: &str) -> SearchResult<IndexerStatus> {
        let request = self.request(Method::GET, &["indexers", name, "status"])?;
        let response = self.execute(request, "indexer_status").await?;
        Ok(Self::expect_success(response, "indexer_status")
            .await?
            .json()
            .await?)
    }

    async fn search(
        &self,
        index: &str,
        parameters: &SearchParameters,
    ) -> SearchResult<RawSearchResults> {
        let request = self
            .request(Method::POST, &["indexes", index, "docs", "search"])?
            .json(parameters);
        let response = self.execute(request, "search").await?;
        Ok(Self::expect_success(response, "search").await?.json().await?)
    }

    async fn suggest(
        &self,
        index: &str,
        parameters: &SuggestParameters,
    ) -> SearchResult<RawSuggestResults> {
        let request = self
            .request(Method::POST, &["indexes", index, "docs", "suggest"])?
            .json(parameters);
        let response = self.execute(request, "suggest").await?;
        Ok(Self::expect_success(response, "suggest").await?.json().await?)
    }

    async fn document_count(&self, index: &str) -> SearchResult<u64> {
        let request = self.request(Method::GET, &["indexes", index, "docs", "$count"])?;
        let response = self.execute(request, "count").await?;
        let body = Self::expect_success(response, "count").await?.text().await?;
        parse_count(&body)
    }

    async fn lookup(&self, index: &str, key: &str) -> SearchResult<Option<serde_json::Value>> {
        let request = self.request(Method::GET, &["indexes", index, "docs", key])?;
        let response = self.execute(request, "lookup").await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(
            Self::expect_success(response, "lookup").await?.json().await?,
        ))
    }
}

/// `$count` answers with a bare integer, sometimes behind a byte-order mark
fn parse_count(body: &str) -> SearchResult<u64> {
    body.trim_start_matches('\u{feff}')
        .trim()
        .parse()
        .map_err(|e| SearchError::InvalidResponse(format!("Invalid document count '{}': {}", body, e)))
}
