//! Search index lifecycle: index, blob datasource and indexer

use crate::config::StorageConfig;
use crate::search::client::SearchBackend;
use crate::search::config::SearchConfig;
use crate::search::document::SearchIndexKind;
use crate::search::error::SearchResult;
use crate::storage::{clear_container, ensure_container, BlobStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// How [`IndexManager::initialize`] treats an existing index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexMode {
    /// Build only when the index is absent
    CreateIfMissing,
    /// Tear everything down, empty the container and rebuild
    ForceReset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexInitOutcome {
    AlreadyPresent,
    Created { blobs_removed: usize },
}

/// Indexer progress as seen by clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IndexStatus {
    Idle,
    Indexing { percent: u8 },
}

/// Index statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Documents currently searchable
    pub document_count: u64,

    pub status: IndexStatus,
}

/// Everything the service holds for one index kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTarget {
    pub kind: SearchIndexKind,
    pub index_name: String,
    pub container: String,
}

impl IndexTarget {
    pub fn datasource_name(&self) -> String {
        format!("{}-datasource", self.index_name)
    }

    pub fn indexer_name(&self) -> String {
        format!("{}-indexer", self.index_name)
    }
}

/// The property and postcode targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTargets {
    pub properties: IndexTarget,
    pub postcodes: IndexTarget,
}

impl IndexTargets {
    pub fn from_config(search: &SearchConfig, storage: &StorageConfig) -> Self {
        Self {
            properties: IndexTarget {
                kind: SearchIndexKind::Properties,
                index_name: search.properties_index.clone(),
                container: storage.properties_container.clone(),
            },
            postcodes: IndexTarget {
                kind: SearchIndexKind::Postcodes,
                index_name: search.postcodes_index.clone(),
                container: storage.postcodes_container.clone(),
            },
        }
    }

    pub fn get(&self, kind: SearchIndexKind) -> &IndexTarget {
        match kind {
            SearchIndexKind::Properties => &self.properties,
            SearchIndexKind::Postcodes => &self.postcodes,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexTarget> {
        [&self.properties, &self.postcodes].into_iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceCredentials {
    pub connection_string: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataContainer {
    pub name: String,
}

/// Blob container datasource definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub credentials: DataSourceCredentials,
    pub container: DataContainer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexingSchedule {
    pub interval: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerConfiguration {
    pub parsing_mode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexingParameters {
    pub configuration: IndexerConfiguration,
}

/// Indexer definition pulling JSON-array blobs into an index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerDefinition {
    pub name: String,
    pub data_source_name: String,
    pub target_index_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<IndexingSchedule>,
    pub parameters: IndexingParameters,
}

/// Connection string the indexer uses to read the containers
pub fn blob_connection_string(storage: &StorageConfig) -> String {
    format!(
        "BlobEndpoint={}/;SharedAccessSignature={}",
        storage.account_url.trim_end_matches('/'),
        storage.sas_token.trim_start_matches('?')
    )
}

/// Creates, resets and inspects indexes together with their datasource and indexer.
///
/// Resets are not coordinated; callers must not run two at once for the same target.
pub struct IndexManager {
    backend: Arc<dyn SearchBackend>,
    blobs: Arc<dyn BlobStore>,
    connection_string: String,
    indexer_interval: String,
}

impl IndexManager {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        blobs: Arc<dyn BlobStore>,
        connection_string: impl Into<String>,
        indexer_interval: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            blobs,
            connection_string: connection_string.into(),
            indexer_interval: indexer_interval.into(),
        }
    }

    /// Build the target's index, datasource and indexer when absent, or
    /// unconditionally with [`IndexMode::ForceReset`].
    pub async fn initialize(
        &self,
        target: &IndexTarget,
        mode: IndexMode,
    ) -> SearchResult<IndexInitOutcome> {
        if mode == IndexMode::CreateIfMissing && self.backend.index_exists(&target.index_name).await? {
            info!(index = %target.index_name, "Index already present");
            return Ok(IndexInitOutcome::AlreadyPresent);
        }

        info!(index = %target.index_name, mode = ?mode, "Rebuilding index");
        let blobs_removed = self.reset(target).await?;
        Ok(IndexInitOutcome::Created { blobs_removed })
    }

    async fn reset(&self, target: &IndexTarget) -> SearchResult<usize> {
        let indexer_name = target.indexer_name();
        let datasource_name = target.datasource_name();

        self.backend.delete_indexer(&indexer_name).await?;
        self.backend.delete_datasource(&datasource_name).await?;
        self.backend.delete_index(&target.index_name).await?;

        ensure_container(self.blobs.as_ref(), &target.container).await?;
        let blobs_removed = clear_container(self.blobs.as_ref(), &target.container).await?;

        self.backend
            .create_index(&target.kind.definition(&target.index_name))
            .await?;
        self.backend
            .create_datasource(&self.datasource_definition(target))
            .await?;
        self.backend
            .create_indexer(&self.indexer_definition(target))
            .await?;

        info!(
            index = %target.index_name,
            datasource = %datasource_name,
            indexer = %indexer_name,
            blobs_removed = blobs_removed,
            "Index created"
        );
        Ok(blobs_removed)
    }

    pub fn datasource_definition(&self, target: &IndexTarget) -> DataSourceDefinition {
        DataSourceDefinition {
            name: target.datasource_name(),
            kind: "azureblob".to_string(),
            credentials: DataSourceCredentials {
                connection_string: self.connection_string.clone(),
            },
            container: DataContainer {
                name: target.container.clone(),
            },
        }
    }

    pub fn indexer_definition(&self, target: &IndexTarget) -> IndexerDefinition {
        IndexerDefinition {
            name: target.indexer_name(),
            data_source_name: target.datasource_name(),
            target_index_name: target.index_name.clone(),
            schedule: Some(IndexingSchedule {
                interval: self.indexer_interval.clone(),
            }),
            parameters: IndexingParameters {
                configuration: IndexerConfiguration {
                    parsing_mode: "jsonArray".to_string(),
                },
            },
        }
    }

    /// Document count plus indexer progress.
    ///
    /// Progress is measured against the number of source blobs, capped at 100.
    pub async fn get_stats(&self, target: &IndexTarget) -> SearchResult<IndexStats> {
        let document_count = self.backend.document_count(&target.index_name).await?;
        let indexer = self.backend.indexer_status(&target.indexer_name()).await?;

        let status = match indexer.last_result {
            Some(ref run) if run.is_in_progress() => {
                let total = self.blobs.list_blobs(&target.container).await?.len() as u64;
                IndexStatus::Indexing {
                    percent: progress_percent(run.items_processed, total),
                }
            }
            _ => IndexStatus::Idle,
        };

        Ok(IndexStats {
            document_count,
            status,
        })
    }
}

fn progress_percent(processed: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    (processed.saturating_mul(100) / total).min(100) as u8
}
