use super::property::PropertyResult;
use serde::{Deserialize, Serialize};

/// Facet values for the current result set, one list per facet field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facets {
    pub towns: Vec<String>,
    pub localities: Vec<String>,
    pub districts: Vec<String>,
    pub counties: Vec<String>,
    pub prices: Vec<String>,
}

impl Facets {
    pub fn is_empty(&self) -> bool {
        self.towns.is_empty()
            && self.localities.is_empty()
            && self.districts.is_empty()
            && self.counties.is_empty()
            && self.prices.is_empty()
    }
}

/// One page of property results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindPropertiesResponse {
    pub results: Vec<PropertyResult>,

    /// Total matches across all pages, when the service reported it
    pub total_transactions: Option<u64>,

    /// Zero-based page index
    pub page: usize,

    pub facets: Facets,
}

impl FindPropertiesResponse {
    /// No results, no count, no facets
    pub fn empty(page: usize) -> Self {
        Self {
            results: Vec::new(),
            total_transactions: None,
            page,
            facets: Facets::default(),
        }
    }
}

/// Suggestions for a partial query, in service order with duplicates removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<String>,
}

/// Outcome of an import call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResponse {
    pub documents: usize,
}
