//! In-memory fakes for the search service and blob storage
//!
//! The fakes record every call so tests can assert on what would have been
//! sent upstream, including that nothing was sent at all.

#![allow(dead_code)]

use async_trait::async_trait;
use property_search::geo::{GeoPoint, InMemoryPostcodeResolver};
use property_search::ingest::ImportService;
use property_search::search::{
    DataSourceDefinition, IndexDefinition, IndexManager, IndexTargets, IndexerDefinition,
    IndexerStatus, PropertySearchService, RawSearchResults, RawSuggestResults, SearchBackend,
    SearchConfig, SearchError, SearchParameters, SearchResult, SuggestParameters,
};
use property_search::config::StorageConfig;
use property_search::storage::{BlobStore, StorageError, StorageResult};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct BackendState {
    indexes: HashMap<String, IndexDefinition>,
    datasources: HashMap<String, DataSourceDefinition>,
    indexers: HashMap<String, IndexerDefinition>,
    documents: HashMap<(String, String), serde_json::Value>,
    calls: Vec<String>,
    searches: Vec<(String, SearchParameters)>,
    suggestions: Vec<(String, SuggestParameters)>,
    indexer_runs: Vec<String>,
    search_response: RawSearchResults,
    suggest_response: RawSuggestResults,
    indexer_status: IndexerStatus,
    document_count: u64,
}

/// Search service fake holding definitions and canned responses
#[derive(Default)]
pub struct FakeSearchBackend {
    state: Mutex<BackendState>,
}

impl FakeSearchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_response(self, response: serde_json::Value) -> Self {
        self.state.lock().unwrap().search_response =
            serde_json::from_value(response).expect("valid search response");
        self
    }

    pub fn with_suggestions(self, texts: &[&str]) -> Self {
        let value = texts
            .iter()
            .map(|t| serde_json::json!({ "@search.text": t }))
            .collect::<Vec<_>>();
        self.state.lock().unwrap().suggest_response =
            serde_json::from_value(serde_json::json!({ "value": value })).expect("valid suggestions");
        self
    }

    pub fn with_indexer_status(self, status: serde_json::Value) -> Self {
        self.state.lock().unwrap().indexer_status =
            serde_json::from_value(status).expect("valid indexer status");
        self
    }

    pub fn with_document_count(self, count: u64) -> Self {
        self.state.lock().unwrap().document_count = count;
        self
    }

    pub fn with_index(self, name: &str) -> Self {
        self.state.lock().unwrap().indexes.insert(
            name.to_string(),
            IndexDefinition {
                name: name.to_string(),
                fields: Vec::new(),
                suggesters: Vec::new(),
            },
        );
        self
    }

    pub fn with_document(self, index: &str, key: &str, document: serde_json::Value) -> Self {
        self.state
            .lock()
            .unwrap()
            .documents
            .insert((index.to_string(), key.to_string()), document);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn searches(&self) -> Vec<(String, SearchParameters)> {
        self.state.lock().unwrap().searches.clone()
    }

    pub fn suggest_calls(&self) -> Vec<(String, SuggestParameters)> {
        self.state.lock().unwrap().suggestions.clone()
    }

    pub fn indexer_runs(&self) -> Vec<String> {
        self.state.lock().unwrap().indexer_runs.clone()
    }

    pub fn index(&self, name: &str) -> Option<IndexDefinition> {
        self.state.lock().unwrap().indexes.get(name).cloned()
    }

    pub fn datasource(&self, name: &str) -> Option<DataSourceDefinition> {
        self.state.lock().unwrap().datasources.get(name).cloned()
    }

    pub fn indexer(&self, name: &str) -> Option<IndexerDefinition> {
        self.state.lock().unwrap().indexers.get(name).cloned()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl SearchBackend for FakeSearchBackend {
    async fn index_exists(&self, index: &str) -> SearchResult<bool> {
        self.record(format!("index_exists:{}", index));
        Ok(self.state.lock().unwrap().indexes.contains_key(index))
    }

    async fn create_index(&self, definition: &IndexDefinition) -> SearchResult<()> {
        self.record(format!("create_index:{}", definition.name));
        self.state
            .lock()
            .unwrap()
            .indexes
            .insert(definition.name.clone(), definition.clone());
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> SearchResult<()> {
        self.record(format!("delete_index:{}", index));
        self.state.lock().unwrap().indexes.remove(index);
        Ok(())
    }

    async fn create_datasource(&self, definition: &DataSourceDefinition) -> SearchResult<()> {
        self.record(format!("create_datasource:{}", definition.name));
        self.state
            .lock()
            .unwrap()
            .datasources
            .insert(definition.name.clone(), definition.clone());
        Ok(())
    }

    async fn delete_datasource(&self, name: &str) -> SearchResult<()> {
        self.record(format!("delete_datasource:{}", name));
        self.state.lock().unwrap().datasources.remove(name);
        Ok(())
    }

    async fn create_indexer(&self, definition: &IndexerDefinition) -> SearchResult<()> {
        self.record(format!("create_indexer:{}", definition.name));
        self.state
            .lock()
            .unwrap()
            .indexers
            .insert(definition.name.clone(), definition.clone());
        Ok(())
    }

    async fn delete_indexer(&self, name: &str) -> SearchResult<()> {
        self.record(format!("delete_indexer:{}", name));
        self.state.lock().unwrap().indexers.remove(name);
        Ok(())
    }

    async fn run_indexer(&self, name: &str) -> SearchResult<()> {
        self.record(format!("run_indexer:{}", name));
        self.state.lock().unwrap().indexer_runs.push(name.to_string());
        Ok(())
    }

    async fn indexer_status(&self, name: &str) -> SearchResult<IndexerStatus> {
        self.record(format!("indexer_status:{}", name));
        Ok(self.state.lock().unwrap().indexer_status.clone())
    }

    async fn search(
        &self,
        index: &str,
        parameters: &SearchParameters,
    ) -> SearchResult<RawSearchResults> {
        self.record(format!("search:{}", index));
        let mut state = self.state.lock().unwrap();
        state.searches.push((index.to_string(), parameters.clone()));
        Ok(state.search_response.clone())
    }

    async fn suggest(
        &self,
        index: &str,
        parameters: &SuggestParameters,
    ) -> SearchResult<RawSuggestResults> {
        self.record(format!("suggest:{}", index));
        let mut state = self.state.lock().unwrap();
        state.suggestions.push((index.to_string(), parameters.clone()));
        Ok(state.suggest_response.clone())
    }

    async fn document_count(&self, index: &str) -> SearchResult<u64> {
        self.record(format!("document_count:{}", index));
        Ok(self.state.lock().unwrap().document_count)
    }

    async fn lookup(&self, index: &str, key: &str) -> SearchResult<Option<serde_json::Value>> {
        self.record(format!("lookup:{}:{}", index, key));
        Ok(self
            .state
            .lock()
            .unwrap()
            .documents
            .get(&(index.to_string(), key.to_string()))
            .cloned())
    }
}

/// Backend whose every call fails the way the service reports errors
pub struct FailingSearchBackend;

fn service_error(operation: &str) -> SearchError {
    SearchError::Service {
        operation: operation.to_string(),
        status: 503,
        body: "{\"error\":{\"message\":\"Service unavailable\"}}".to_string(),
    }
}

#[async_trait]
impl SearchBackend for FailingSearchBackend {
    async fn index_exists(&self, _index: &str) -> SearchResult<bool> {
        Err(service_error("get_index"))
    }
    async fn create_index(&self, _definition: &IndexDefinition) -> SearchResult<()> {
        Err(service_error("create_index"))
    }
    async fn delete_index(&self, _index: &str) -> SearchResult<()> {
        Err(service_error("delete_index"))
    }
    async fn create_datasource(&self, _definition: &DataSourceDefinition) -> SearchResult<()> {
        Err(service_error("create_datasource"))
    }
    async fn delete_datasource(&self, _name: &str) -> SearchResult<()> {
        Err(service_error("delete_datasource"))
    }
    async fn create_indexer(&self, _definition: &IndexerDefinition) -> SearchResult<()> {
        Err(service_error("create_indexer"))
    }
    async fn delete_indexer(&self, _name: &str) -> SearchResult<()> {
        Err(service_error("delete_indexer"))
    }
    async fn run_indexer(&self, _name: &str) -> SearchResult<()> {
        Err(service_error("run_indexer"))
    }
    async fn indexer_status(&self, _name: &str) -> SearchResult<IndexerStatus> {
        Err(service_error("indexer_status"))
    }
    async fn search(
        &self,
        _index: &str,
        _parameters: &SearchParameters,
    ) -> SearchResult<RawSearchResults> {
        Err(service_error("search"))
    }
    async fn suggest(
        &self,
        _index: &str,
        _parameters: &SuggestParameters,
    ) -> SearchResult<RawSuggestResults> {
        Err(service_error("suggest"))
    }
    async fn document_count(&self, _index: &str) -> SearchResult<u64> {
        Err(service_error("document_count"))
    }
    async fn lookup(&self, _index: &str, _key: &str) -> SearchResult<Option<serde_json::Value>> {
        Err(service_error("lookup"))
    }
}

/// Blob containers held in memory
#[derive(Default)]
pub struct FakeBlobStore {
    containers: Mutex<HashMap<String, BTreeMap<String, Vec<u8>>>>,
    failing_deletes: Mutex<HashSet<String>>,
}

impl FakeBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(self, container: &str, name: &str, body: &[u8]) -> Self {
        self.containers
            .lock()
            .unwrap()
            .entry(container.to_string())
            .or_default()
            .insert(name.to_string(), body.to_vec());
        self
    }

    /// Make deleting this blob fail
    pub fn failing_delete(self, name: &str) -> Self {
        self.failing_deletes.lock().unwrap().insert(name.to_string());
        self
    }

    pub fn has_container(&self, container: &str) -> bool {
        self.containers.lock().unwrap().contains_key(container)
    }

    pub fn blob_names(&self, container: &str) -> Vec<String> {
        self.containers
            .lock()
            .unwrap()
            .get(container)
            .map(|blobs| blobs.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn blob_json(&self, container: &str, name: &str) -> serde_json::Value {
        let containers = self.containers.lock().unwrap();
        let body = &containers[container][name];
        serde_json::from_slice(body).expect("blob holds JSON")
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn container_exists(&self, container: &str) -> StorageResult<bool> {
        Ok(self.has_container(container))
    }

    async fn create_container(&self, container: &str) -> StorageResult<()> {
        self.containers
            .lock()
            .unwrap()
            .entry(container.to_string())
            .or_default();
        Ok(())
    }

    async fn list_blobs(&self, container: &str) -> StorageResult<Vec<String>> {
        Ok(self.blob_names(container))
    }

    async fn delete_blob(&self, container: &str, name: &str) -> StorageResult<()> {
        if self.failing_deletes.lock().unwrap().contains(name) {
            return Err(StorageError::Service {
                operation: "delete_blob".to_string(),
                status: 403,
                body: "AuthorizationFailure".to_string(),
            });
        }
        if let Some(blobs) = self.containers.lock().unwrap().get_mut(container) {
            blobs.remove(name);
        }
        Ok(())
    }

    async fn put_blob(
        &self,
        container: &str,
        name: &str,
        body: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<()> {
        self.containers
            .lock()
            .unwrap()
            .entry(container.to_string())
            .or_default()
            .insert(name.to_string(), body);
        Ok(())
    }
}

pub fn storage_config() -> StorageConfig {
    StorageConfig {
        account_url: "https://acct.blob.core.windows.net".to_string(),
        sas_token: "sv=2021&sig=abc".to_string(),
        properties_container: "property-data".to_string(),
        postcodes_container: "postcode-data".to_string(),
        timeout_secs: 5,
    }
}

pub fn targets() -> IndexTargets {
    IndexTargets::from_config(&SearchConfig::default(), &storage_config())
}

pub fn resolver() -> InMemoryPostcodeResolver {
    InMemoryPostcodeResolver::new()
        .with_postcode("SW1A 1AA", GeoPoint::new(51.501, -0.1416))
        .with_postcode("LS1 4AP", GeoPoint::new(53.7997, -1.5492))
}

pub fn index_manager(backend: Arc<FakeSearchBackend>, blobs: Arc<FakeBlobStore>) -> IndexManager {
    IndexManager::new(backend, blobs, "BlobEndpoint=x;SharedAccessSignature=y", "PT5M")
}

pub fn search_service(backend: Arc<FakeSearchBackend>) -> PropertySearchService {
    PropertySearchService::new(backend, Arc::new(resolver()), "properties")
}

pub fn import_service(backend: Arc<FakeSearchBackend>, blobs: Arc<FakeBlobStore>, batch_size: usize) -> ImportService {
    ImportService::new(backend, blobs, Arc::new(resolver()), targets(), batch_size)
}

/// A search response with one fully populated hit and one bare hit
pub fn sample_search_response() -> serde_json::Value {
    serde_json::json!({
        "@odata.count": 42,
        "@search.facets": {
            "TownCity": [{"value": "LONDON", "count": 40}, {"value": "WESTMINSTER", "count": 2}],
            "County": [{"value": "GREATER LONDON", "count": 42}],
            "Price": [{"value": 1250000, "count": 1}]
        },
        "value": [
            {
                "TransactionId": "{A}",
                "Price": 1250000,
                "DateOfTransfer": "2018-11-30T00:00:00Z",
                "PostCode": "SW1A 1AA",
                "PropertyType": "F",
                "Build": "N",
                "Contract": "L",
                "Building": "FLAT 1, 10",
                "Street": "DOWNING STREET",
                "TownCity": "LONDON",
                "District": "CITY OF WESTMINSTER",
                "County": "GREATER LONDON",
                "Geo": {"type": "Point", "coordinates": [-0.1416, 51.501]}
            },
            {
                "TransactionId": "{B}"
            }
        ]
    })
}
