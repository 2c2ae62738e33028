//! Blob storage backing the indexer datasources.
//!
//! Source documents for each index live as JSON-array blobs in a container. The
//! indexer pulls them into the search index on its schedule or on demand.

mod blob;
mod error;

pub use blob::{clear_container, ensure_container, AzureBlobStore, BlobStore};
pub use error::{StorageError, StorageResult};
