//! Property sales search service.
//!
//! Serves free-text, filtered, sorted and paged queries over property
//! transactions held in a managed search index, plus postcode radius search,
//! completions, index statistics and blob-backed import.

pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod ingest;
pub mod metrics;
pub mod models;
pub mod search;
pub mod storage;

pub use error::{AppError, Result};
