//! Search query building

use crate::geo::GeoPoint;
use crate::search::document::{fields, SUGGESTER_NAME};
use crate::search::filter::{render_order_by, Direction, FilterExpr, OrderClause};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};

/// Results per page
pub const PAGE_SIZE: usize = 20;

/// Maximum suggestions returned for a partial query
pub const SUGGESTION_COUNT: usize = 10;

/// Facets requested with every property query
pub const FACET_FIELDS: [&str; 5] = [
    fields::TOWN_CITY,
    fields::LOCALITY,
    fields::DISTRICT,
    fields::COUNTY,
    fields::PRICE,
];

/// Logical sort columns offered to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SortColumn {
    Street,
    Town,
    Postcode,
    Date,
    Price,
}

impl SortColumn {
    /// Index fields to order by, in tie-break order
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            SortColumn::Street => &[fields::STREET, fields::BUILDING],
            SortColumn::Town => &[fields::TOWN_CITY],
            SortColumn::Postcode => &[fields::POST_CODE],
            SortColumn::Date => &[fields::DATE_OF_TRANSFER],
            SortColumn::Price => &[fields::PRICE],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SortDirection {
    #[default]
    #[strum(serialize = "Ascending", serialize = "asc")]
    #[serde(alias = "asc", alias = "ascending")]
    Ascending,
    #[strum(serialize = "Descending", serialize = "desc")]
    #[serde(alias = "desc", alias = "descending")]
    Descending,
}

impl From<SortDirection> for Direction {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Ascending => Direction::Asc,
            SortDirection::Descending => Direction::Desc,
        }
    }
}

/// Requested ordering. The column is kept as free text; names that are not a
/// [`SortColumn`] leave the service's default order in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: Option<String>,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn by(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: Some(column.into()),
            direction,
        }
    }

    /// Ordering clauses; empty when no recognised column was asked for
    pub fn order_clauses(&self) -> Vec<OrderClause> {
        let Some(column) = self
            .column
            .as_deref()
            .and_then(|c| SortColumn::from_str(c.trim()).ok())
        else {
            return Vec::new();
        };

        column
            .fields()
            .iter()
            .copied()
            .map(|field| OrderClause::field(field, self.direction.into()))
            .collect()
    }
}

/// Column equality filters. Absent or blank values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyFilter {
    pub town: Option<String>,
    pub county: Option<String>,
    pub locality: Option<String>,
    pub district: Option<String>,
}

impl PropertyFilter {
    pub fn with_town(mut self, town: impl Into<String>) -> Self {
        self.town = Some(town.into());
        self
    }

    pub fn with_county(mut self, county: impl Into<String>) -> Self {
        self.county = Some(county.into());
        self
    }

    pub fn with_locality(mut self, locality: impl Into<String>) -> Self {
        self.locality = Some(locality.into());
        self
    }

    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }

    /// One case-insensitive equality clause per present value
    pub fn clauses(&self) -> Vec<FilterExpr> {
        [
            (fields::TOWN_CITY, &self.town),
            (fields::COUNTY, &self.county),
            (fields::LOCALITY, &self.locality),
            (fields::DISTRICT, &self.district),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| FilterExpr::eq_ignore_case(field, v))
        })
        .collect()
    }

    /// AND of all present clauses, `None` when nothing is set
    pub fn to_expr(&self) -> Option<FilterExpr> {
        FilterExpr::all(self.clauses())
    }
}

/// Radius search around a resolved coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoSearch {
    pub point: GeoPoint,
    pub max_km: f64,
}

/// One user query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free text; empty matches everything
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub filter: PropertyFilter,

    #[serde(default)]
    pub sort: SortSpec,

    /// Zero-based page index
    #[serde(default)]
    pub page: usize,
}

impl SearchRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: PropertyFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }
}

/// Body of a document search call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParameters {
    pub search: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orderby: Option<String>,
    pub skip: usize,
    pub top: usize,
    pub count: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<String>,
}

/// Body of a suggest call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestParameters {
    pub search: String,
    pub suggester_name: String,
    pub top: usize,
}

/// Turns domain requests into service call parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder;

impl QueryBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Free-text search with column filters and sort
    pub fn build(&self, request: &SearchRequest) -> SearchParameters {
        let orderby = render_order_by(&request.sort.order_clauses());
        let filter = request.filter.to_expr().map(|expr| expr.to_string());

        self.parameters(search_text(&request.text), filter, orderby, request.page)
    }

    /// Radius search: distance filter AND column filters, nearest first
    pub fn build_geo(
        &self,
        geo: GeoSearch,
        filter: &PropertyFilter,
        page: usize,
    ) -> SearchParameters {
        let distance = FilterExpr::geo_within(fields::GEO, geo.point, geo.max_km);
        let expr = FilterExpr::all(std::iter::once(distance).chain(filter.clauses()));
        let orderby = render_order_by(&[OrderClause::nearest_first(fields::GEO, geo.point)]);

        self.parameters(
            "*".to_string(),
            expr.map(|e| e.to_string()),
            orderby,
            page,
        )
    }

    pub fn build_suggest(&self, text: &str) -> SuggestParameters {
        SuggestParameters {
            search: text.trim().to_string(),
            suggester_name: SUGGESTER_NAME.to_string(),
            top: SUGGESTION_COUNT,
        }
    }

    fn parameters(
        &self,
        search: String,
        filter: Option<String>,
        orderby: Option<String>,
        page: usize,
    ) -> SearchParameters {
        SearchParameters {
            search,
            filter,
            orderby,
            skip: page * PAGE_SIZE,
            top: PAGE_SIZE,
            count: true,
            facets: FACET_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Prefix-match the text; blank text matches all documents
pub fn search_text(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        "*".to_string()
    } else {
        format!("{}*", text)
    }
}
