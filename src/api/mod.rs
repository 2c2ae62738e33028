pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::ingest::ImportService;
use crate::search::{IndexManager, IndexTargets, PropertySearchService};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<PropertySearchService>,
    pub indexes: Arc<IndexManager>,
    pub importer: Arc<ImportService>,
    pub targets: Arc<IndexTargets>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        search: Arc<PropertySearchService>,
        indexes: Arc<IndexManager>,
        importer: Arc<ImportService>,
        targets: IndexTargets,
    ) -> Self {
        Self {
            search,
            indexes,
            importer,
            targets: Arc::new(targets),
            started_at: Instant::now(),
        }
    }
}
