//! Blob container access over the storage REST API

use crate::config::StorageConfig;
use crate::metrics;
use crate::storage::error::{StorageError, StorageResult};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const STORAGE_API_VERSION: &str = "2021-08-06";

lazy_static! {
    static ref BLOB_NAME: Regex =
        Regex::new(r"<Blob>\s*<Name([^>]*)>([^<]*)</Name>").expect("valid blob name pattern");
    static ref NEXT_MARKER: Regex =
        Regex::new(r"<NextMarker>([^<]+)</NextMarker>").expect("valid marker pattern");
    static ref XML_ENTITY: Regex =
        Regex::new(r"&(#[xX][0-9A-Fa-f]+|#[0-9]+|lt|gt|quot|apos|amp);").expect("valid entity pattern");
}

/// Container-level blob operations used by the index lifecycle and import
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn container_exists(&self, container: &str) -> StorageResult<bool>;

    async fn create_container(&self, container: &str) -> StorageResult<()>;

    /// Names of every blob in the container
    async fn list_blobs(&self, container: &str) -> StorageResult<Vec<String>>;

    async fn delete_blob(&self, container: &str, name: &str) -> StorageResult<()>;

    async fn put_blob(
        &self,
        container: &str,
        name: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()>;
}

/// Create the container if it does not exist yet
pub async fn ensure_container(store: &dyn BlobStore, container: &str) -> StorageResult<()> {
    if !store.container_exists(container).await? {
        info!(container = %container, "Creating blob container");
        store.create_container(container).await?;
    }
    Ok(())
}

/// Delete every blob in the container, returning how many were removed.
///
/// Deletes run concurrently; the first failure fails the whole call.
pub async fn clear_container(store: &dyn BlobStore, container: &str) -> StorageResult<usize> {
    let names = store.list_blobs(container).await?;
    let count = names.len();

    futures::future::try_join_all(names.iter().map(|name| store.delete_blob(container, name)))
        .await?;

    info!(container = %container, deleted = count, "Cleared blob container");
    Ok(count)
}

/// Blob store speaking the storage REST API, authorised by a SAS token
#[derive(Clone)]
pub struct AzureBlobStore {
    client: Client,
    account_url: Url,
    sas_token: String,
}

impl AzureBlobStore {
    pub fn new(config: &StorageConfig) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                StorageError::InvalidConfiguration(format!("Failed to create HTTP client: {}", e))
            })?;

        let account_url = Url::parse(&config.account_url).map_err(|e| {
            StorageError::InvalidConfiguration(format!(
                "Invalid account url '{}': {}",
                config.account_url, e
            ))
        })?;

        Ok(Self {
            client,
            account_url,
            sas_token: config.sas_token.trim_start_matches('?').to_string(),
        })
    }

    fn url(&self, segments: &[&str], params: &[(&str, &str)]) -> StorageResult<Url> {
        let mut url = self.account_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                StorageError::InvalidConfiguration(format!(
                    "Account url cannot be a base: {}",
                    self.account_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        // The SAS token is already encoded; append it verbatim
        if !self.sas_token.is_empty() {
            let query = match url.query() {
                Some(existing) if !existing.is_empty() => {
                    format!("{}&{}", existing, self.sas_token)
                }
                _ => self.sas_token.clone(),
            };
            url.set_query(Some(&query));
        }

        Ok(url)
    }

    async fn execute(&self, request: RequestBuilder, operation: &str) -> StorageResult<Response> {
        let start = Instant::now();
        let result = request
            .header("x-ms-version", STORAGE_API_VERSION)
            .send()
            .await;
        metrics::observe_upstream("storage", operation, start, result.is_ok());
        Ok(result?)
    }

    async fn expect_success(response: Response, operation: &str) -> StorageResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Service {
            operation: operation.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    async fn container_exists(&self, container: &str) -> StorageResult<bool> {
        let url = self.url(&[container], &[("restype", "container")])?;
        let response = self
            .execute(self.client.get(url), "get_container_properties")
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::expect_success(response, "get_container_properties").await?;
        Ok(true)
    }

    async fn create_container(&self, container: &str) -> StorageResult<()> {
        let url = self.url(&[container], &[("restype", "container")])?;
        let response = self
            .execute(self.client.put(url).header("Content-Length", "0"), "create_container")
            .await?;

        // 409: already exists
        if response.status() == StatusCode::CONFLICT {
            return Ok(());
        }
        Self::expect_success(response, "create_container").await?;
        Ok(())
    }

    async fn list_blobs(&self, container: &str) -> StorageResult<Vec<String>> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut params = vec![("restype", "container"), ("comp", "list")];
            if let Some(ref m) = marker {
                params.push(("marker", m.as_str()));
            }
            let url = self.url(&[container], &params)?;

            let response = self.execute(self.client.get(url), "list_blobs").await?;
            let body = Self::expect_success(response, "list_blobs")
                .await?
                .text()
                .await?;

            let page = parse_blob_listing(&body);
            debug!(container = %container, page_size = page.names.len(), "Listed blob page");
            names.extend(page.names);

            match page.next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        Ok(names)
    }

    async fn delete_blob(&self, container: &str, name: &str) -> StorageResult<()> {
        let url = self.url(&[container, name], &[])?;
        let response = self.execute(self.client.delete(url), "delete_blob").await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::expect_success(response, "delete_blob").await?;
        Ok(())
    }

    async fn put_blob(
        &self,
        container: &str,
        name: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()> {
        let url = self.url(&[container, name], &[])?;
        let request = self
            .client
            .put(url)
            .header("x-ms-blob-type", "BlockBlob")
            .header("Content-Type", content_type)
            .body(body);

        let response = self.execute(request, "put_blob").await?;
        Self::expect_success(response, "put_blob").await?;
        Ok(())
    }
}

/// One page of a container listing
#[derive(Debug, Default, PartialEq)]
struct BlobListing {
    names: Vec<String>,
    next_marker: Option<String>,
}

fn parse_blob_listing(xml: &str) -> BlobListing {
    let names = BLOB_NAME
        .captures_iter(xml)
        .map(|c| {
            let name = unescape_xml(&c[2]);
            if c[1].contains(r#"Encoded="true""#) {
                // names with XML-invalid characters come back percent-encoded
                let decoded = urlencoding::decode(&name).map(|d| d.into_owned()).ok();
                decoded.unwrap_or(name)
            } else {
                name
            }
        })
        .collect();

    let next_marker = NEXT_MARKER
        .captures(xml)
        .map(|c| unescape_xml(&c[1]))
        .filter(|m| !m.is_empty());

    BlobListing { names, next_marker }
}

fn unescape_xml(text: &str) -> String {
    XML_ENTITY
        .replace_all(text, |c: &regex::Captures| {
            let entity = &c[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => {
                    let code = match entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => entity[1..].parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            match decoded {
                Some(ch) => ch.to_string(),
                None => c[0].to_string(),
            }
        })
        .into_owned()
}
