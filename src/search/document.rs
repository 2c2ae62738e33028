//! Index schemas and the documents stored in them

use crate::geo::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Field names of the property transaction index
pub mod fields {
    pub const TRANSACTION_ID: &str = "TransactionId";
    pub const PRICE: &str = "Price";
    pub const DATE_OF_TRANSFER: &str = "DateOfTransfer";
    pub const POST_CODE: &str = "PostCode";
    pub const PROPERTY_TYPE: &str = "PropertyType";
    pub const BUILD: &str = "Build";
    pub const CONTRACT: &str = "Contract";
    pub const BUILDING: &str = "Building";
    pub const STREET: &str = "Street";
    pub const LOCALITY: &str = "Locality";
    pub const TOWN_CITY: &str = "TownCity";
    pub const DISTRICT: &str = "District";
    pub const COUNTY: &str = "County";
    pub const GEO: &str = "Geo";
}

/// Name of the suggester built over the address text fields
pub const SUGGESTER_NAME: &str = "suggester";

/// Fields the suggester completes over
pub const SUGGESTER_FIELDS: [&str; 5] = [
    fields::STREET,
    fields::LOCALITY,
    fields::TOWN_CITY,
    fields::DISTRICT,
    fields::COUNTY,
];

/// The indexes this application owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SearchIndexKind {
    Properties,
    Postcodes,
}

/// Data type of an index field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "Edm.String")]
    String,
    #[serde(rename = "Edm.Int32")]
    Int32,
    #[serde(rename = "Edm.DateTimeOffset")]
    DateTimeOffset,
    #[serde(rename = "Edm.GeographyPoint")]
    GeographyPoint,
}

/// One field of an index definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub key: bool,
    pub retrievable: bool,
    pub searchable: bool,
    pub filterable: bool,
    pub sortable: bool,
    pub facetable: bool,
}

impl IndexField {
    fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            key: false,
            retrievable: true,
            searchable: false,
            filterable: false,
            sortable: false,
            facetable: false,
        }
    }

    fn key(mut self) -> Self {
        self.key = true;
        self.filterable = true;
        self
    }

    fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    fn facetable(mut self) -> Self {
        self.facetable = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggester {
    pub name: String,
    pub search_mode: String,
    pub source_fields: Vec<String>,
}

/// Complete index definition as accepted by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDefinition {
    pub name: String,
    pub fields: Vec<IndexField>,
    #[serde(default)]
    pub suggesters: Vec<Suggester>,
}

impl IndexDefinition {
    pub fn field(&self, name: &str) -> Option<&IndexField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Build the property transaction index definition
pub fn build_property_index(name: &str) -> IndexDefinition {
    use fields::*;

    let text = |n: &str| IndexField::new(n, FieldType::String);

    IndexDefinition {
        name: name.to_string(),
        fields: vec![
            text(TRANSACTION_ID).key(),
            IndexField::new(PRICE, FieldType::Int32)
                .filterable()
                .sortable()
                .facetable(),
            IndexField::new(DATE_OF_TRANSFER, FieldType::DateTimeOffset)
                .filterable()
                .sortable(),
            text(POST_CODE).searchable().filterable().sortable(),
            text(PROPERTY_TYPE).filterable().facetable(),
            text(BUILD).filterable().facetable(),
            text(CONTRACT).filterable().facetable(),
            text(BUILDING).searchable().sortable(),
            text(STREET).searchable().filterable().sortable(),
            text(LOCALITY).searchable().filterable().sortable().facetable(),
            text(TOWN_CITY).searchable().filterable().sortable().facetable(),
            text(DISTRICT).searchable().filterable().sortable().facetable(),
            text(COUNTY).searchable().filterable().sortable().facetable(),
            IndexField::new(GEO, FieldType::GeographyPoint)
                .filterable()
                .sortable(),
        ],
        suggesters: vec![Suggester {
            name: SUGGESTER_NAME.to_string(),
            search_mode: "analyzingInfixMatching".to_string(),
            source_fields: SUGGESTER_FIELDS.iter().map(|f| f.to_string()).collect(),
        }],
    }
}

/// Build the postcode lookup index definition
pub fn build_postcode_index(name: &str) -> IndexDefinition {
    IndexDefinition {
        name: name.to_string(),
        fields: vec![
            IndexField::new(fields::POST_CODE, FieldType::String).key(),
            IndexField::new(fields::GEO, FieldType::GeographyPoint).filterable(),
        ],
        suggesters: Vec::new(),
    }
}

impl SearchIndexKind {
    pub fn definition(&self, name: &str) -> IndexDefinition {
        match self {
            SearchIndexKind::Properties => build_property_index(name),
            SearchIndexKind::Postcodes => build_postcode_index(name),
        }
    }
}

/// GeoJSON point as stored in a `Edm.GeographyPoint` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographyPoint {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

impl From<GeoPoint> for GeographyPoint {
    fn from(point: GeoPoint) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [point.longitude, point.latitude],
        }
    }
}

impl From<GeographyPoint> for GeoPoint {
    fn from(point: GeographyPoint) -> Self {
        GeoPoint::new(point.coordinates[1], point.coordinates[0])
    }
}

/// A flattened property transaction as held in the property index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchableProperty {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub price: Option<i32>,
    #[serde(default)]
    pub date_of_transfer: Option<DateTime<Utc>>,
    #[serde(default)]
    pub post_code: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub build: Option<String>,
    #[serde(default)]
    pub contract: Option<String>,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub town_city: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub geo: Option<GeographyPoint>,
}

/// A postcode and its coordinate, keyed by the compact postcode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PostcodeDocument {
    pub post_code: String,
    #[serde(default)]
    pub geo: Option<GeographyPoint>,
}
