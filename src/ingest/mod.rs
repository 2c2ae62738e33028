//! Blob-backed import pipeline.
//!
//! Records are validated, converted to index documents, written to the index's
//! blob container as JSON-array blobs and picked up by the indexer, which is
//! triggered right after the upload instead of waiting for its schedule.

use crate::geo::{normalize_postcode, postcode_key, GeoPoint, PostcodeResolver};
use crate::metrics;
use crate::models::{BuildType, ContractType, PostcodeRecord, PropertyTransaction, PropertyType};
use crate::search::{
    GeographyPoint, IndexTarget, IndexTargets, PostcodeDocument, SearchBackend, SearchError,
    SearchIndexKind, SearchResult, SearchableProperty,
};
use crate::storage::{ensure_container, BlobStore};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Writes documents for the indexer to pick up
pub struct ImportService {
    backend: Arc<dyn SearchBackend>,
    blobs: Arc<dyn BlobStore>,
    resolver: Arc<dyn PostcodeResolver>,
    targets: IndexTargets,
    batch_size: usize,
}

impl ImportService {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        blobs: Arc<dyn BlobStore>,
        resolver: Arc<dyn PostcodeResolver>,
        targets: IndexTargets,
        batch_size: usize,
    ) -> Self {
        Self {
            backend,
            blobs,
            resolver,
            targets,
            batch_size: batch_size.max(1),
        }
    }

    /// Import a JSON array of records of the kind's record type
    pub async fn import_json(
        &self,
        kind: SearchIndexKind,
        records: serde_json::Value,
    ) -> SearchResult<usize> {
        match kind {
            SearchIndexKind::Properties => {
                let records: Vec<PropertyTransaction> = parse_records(records)?;
                self.import_properties(records).await
            }
            SearchIndexKind::Postcodes => {
                let records: Vec<PostcodeRecord> = parse_records(records)?;
                self.import_postcodes(records).await
            }
        }
    }

    /// Enrich transactions with their postcode coordinate and upload them
    pub async fn import_properties(&self, records: Vec<PropertyTransaction>) -> SearchResult<usize> {
        validate_all(&records)?;
        if let Some(i) = records
            .iter()
            .position(|r| document_key(&r.transaction_id).is_empty())
        {
            return Err(SearchError::InvalidRequest(format!(
                "Record {}: transaction_id has no usable key characters",
                i
            )));
        }

        let mut points: HashMap<String, Option<GeoPoint>> = HashMap::new();
        let mut documents = Vec::with_capacity(records.len());
        for record in records {
            let key = postcode_key(&record.postcode);
            let point = match points.get(&key) {
                Some(point) => *point,
                None => {
                    let point = self.resolver.resolve(&record.postcode).await?;
                    if point.is_none() {
                        debug!(postcode = %record.postcode, "No coordinate for postcode");
                    }
                    points.insert(key, point);
                    point
                }
            };
            documents.push(to_searchable(record, point));
        }

        self.upload(&self.targets.properties, &documents).await
    }

    pub async fn import_postcodes(&self, records: Vec<PostcodeRecord>) -> SearchResult<usize> {
        validate_all(&records)?;

        let documents: Vec<PostcodeDocument> = records
            .into_iter()
            .map(|record| PostcodeDocument {
                post_code: postcode_key(&record.postcode),
                geo: Some(GeographyPoint::from(GeoPoint::new(
                    record.latitude,
                    record.longitude,
                ))),
            })
            .collect();

        self.upload(&self.targets.postcodes, &documents).await
    }

    async fn upload<T: Serialize>(&self, target: &IndexTarget, documents: &[T]) -> SearchResult<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        ensure_container(self.blobs.as_ref(), &target.container).await?;

        for batch in documents.chunks(self.batch_size) {
            let name = format!("{}-{}.json", target.kind, Uuid::new_v4());
            let body = serde_json::to_vec(batch)?;
            self.blobs
                .put_blob(&target.container, &name, body, JSON_CONTENT_TYPE)
                .await?;
            debug!(container = %target.container, blob = %name, documents = batch.len(), "Uploaded batch");
        }

        self.backend.run_indexer(&target.indexer_name()).await?;

        metrics::record_documents_imported(&target.index_name, documents.len());
        info!(
            index = %target.index_name,
            documents = documents.len(),
            blobs = documents.len().div_ceil(self.batch_size),
            "Import uploaded, indexer started"
        );
        Ok(documents.len())
    }
}

fn parse_records<T: serde::de::DeserializeOwned>(records: serde_json::Value) -> SearchResult<Vec<T>> {
    if !records.is_array() {
        return Err(SearchError::InvalidRequest(
            "Import body must be a JSON array".to_string(),
        ));
    }
    serde_json::from_value(records)
        .map_err(|e| SearchError::InvalidRequest(format!("Invalid import record: {}", e)))
}

fn validate_all<T: Validate>(records: &[T]) -> SearchResult<()> {
    for (i, record) in records.iter().enumerate() {
        record
            .validate()
            .map_err(|e| SearchError::InvalidRequest(format!("Record {}: {}", i, e)))?;
    }
    Ok(())
}

fn upper(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
}

/// Index key for a transaction id. Keys may only hold letters, digits, `_`,
/// `-` and `=`, so anything else (the braces around GUID ids) is dropped.
pub fn document_key(id: &str) -> String {
    id.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '='))
        .collect()
}

/// Convert a transaction to its index document. Filterable text is stored
/// upper case; codes are normalised to their single-letter form.
pub fn to_searchable(record: PropertyTransaction, point: Option<GeoPoint>) -> SearchableProperty {
    let building = record.building().map(|b| b.to_uppercase());
    SearchableProperty {
        transaction_id: document_key(&record.transaction_id),
        price: Some(record.price),
        date_of_transfer: Some(record.date_of_transfer),
        post_code: Some(normalize_postcode(&record.postcode)),
        property_type: Some(
            PropertyType::from_code(record.property_type.as_deref())
                .code()
                .to_string(),
        ),
        build: Some(BuildType::from_code(record.new_build.as_deref()).code().to_string()),
        contract: Some(ContractType::from_code(record.tenure.as_deref()).code().to_string()),
        building,
        street: upper(record.street),
        locality: upper(record.locality),
        town_city: upper(record.town),
        district: upper(record.district),
        county: upper(record.county),
        geo: point.map(GeographyPoint::from),
    }
}
