//! Geographic coordinates and postcode resolution.
//!
//! Postcode search needs a coordinate for the requested postcode. Resolution is
//! an injected capability ([`PostcodeResolver`]) so the query path never knows
//! where coordinates come from:
//!
//! - [`SearchIndexPostcodeResolver`] looks the postcode up by key in the postcode index
//! - [`InMemoryPostcodeResolver`] serves a fixed table (fixtures, tests)

use crate::search::{PostcodeDocument, SearchBackend, SearchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A WGS84 coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Canonical display form: upper case, surrounding whitespace trimmed, inner
/// whitespace collapsed to a single space.
pub fn normalize_postcode(postcode: &str) -> String {
    postcode
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Document key form: upper case with all whitespace removed.
///
/// Index keys may not contain spaces, so `"sw1a 1aa"` becomes `"SW1A1AA"`.
pub fn postcode_key(postcode: &str) -> String {
    postcode
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Resolves a postcode to a coordinate
#[async_trait]
pub trait PostcodeResolver: Send + Sync {
    /// `Ok(None)` when the postcode is unknown
    async fn resolve(&self, postcode: &str) -> SearchResult<Option<GeoPoint>>;
}

/// Fixed postcode table held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryPostcodeResolver {
    points: HashMap<String, GeoPoint>,
}

impl InMemoryPostcodeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_postcode(mut self, postcode: &str, point: GeoPoint) -> Self {
        self.insert(postcode, point);
        self
    }

    pub fn insert(&mut self, postcode: &str, point: GeoPoint) {
        self.points.insert(postcode_key(postcode), point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[async_trait]
impl PostcodeResolver for InMemoryPostcodeResolver {
    async fn resolve(&self, postcode: &str) -> SearchResult<Option<GeoPoint>> {
        Ok(self.points.get(&postcode_key(postcode)).copied())
    }
}

/// Looks postcodes up by document key in the postcode index
pub struct SearchIndexPostcodeResolver {
    backend: Arc<dyn SearchBackend>,
    index_name: String,
}

impl SearchIndexPostcodeResolver {
    pub fn new(backend: Arc<dyn SearchBackend>, index_name: impl Into<String>) -> Self {
        Self {
            backend,
            index_name: index_name.into(),
        }
    }
}

#[async_trait]
impl PostcodeResolver for SearchIndexPostcodeResolver {
    async fn resolve(&self, postcode: &str) -> SearchResult<Option<GeoPoint>> {
        let key = postcode_key(postcode);
        if key.is_empty() {
            return Ok(None);
        }

        let Some(raw) = self.backend.lookup(&self.index_name, &key).await? else {
            tracing::debug!(postcode = %key, "Postcode not found in index");
            return Ok(None);
        };

        let document: PostcodeDocument = serde_json::from_value(raw)?;
        Ok(document.geo.map(GeoPoint::from))
    }
}
