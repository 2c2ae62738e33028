//! Reshapes raw service hits into client-facing results

use crate::geo::GeoPoint;
use crate::models::{
    Address, BuildDetails, BuildType, ContractType, Facets, FindPropertiesResponse,
    PropertyResult, PropertyType,
};
use crate::search::client::{FacetValue, RawSearchResults};
use crate::search::document::{fields, SearchableProperty};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Map one indexed document. Null price becomes 0, null date the minimum
/// representable date, other missing mandatory strings the empty string.
pub fn map_property(doc: SearchableProperty) -> PropertyResult {
    PropertyResult {
        build_details: BuildDetails {
            property_type: PropertyType::from_code(doc.property_type.as_deref()),
            build: BuildType::from_code(doc.build.as_deref()),
            contract: ContractType::from_code(doc.contract.as_deref()),
        },
        address: Address {
            building: doc.building.unwrap_or_default(),
            street: doc.street,
            locality: doc.locality,
            town_city: doc.town_city.unwrap_or_default(),
            district: doc.district.unwrap_or_default(),
            county: doc.county.unwrap_or_default(),
            post_code: doc.post_code,
            geo: doc.geo.map(GeoPoint::from),
        },
        price: doc.price.unwrap_or(0),
        date_of_transfer: doc.date_of_transfer.unwrap_or(DateTime::<Utc>::MIN_UTC),
    }
}

pub fn map_facets(raw: &HashMap<String, Vec<FacetValue>>) -> Facets {
    let values = |field: &str| -> Vec<String> {
        raw.get(field)
            .map(|buckets| buckets.iter().filter_map(facet_text).collect())
            .unwrap_or_default()
    };

    Facets {
        towns: values(fields::TOWN_CITY),
        localities: values(fields::LOCALITY),
        districts: values(fields::DISTRICT),
        counties: values(fields::COUNTY),
        prices: values(fields::PRICE),
    }
}

fn facet_text(bucket: &FacetValue) -> Option<String> {
    match &bucket.value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub fn map_response(raw: RawSearchResults, page: usize) -> FindPropertiesResponse {
    let facets = map_facets(&raw.facets);
    FindPropertiesResponse {
        results: raw.value.into_iter().map(map_property).collect(),
        total_transactions: raw.count,
        page,
        facets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::document::GeographyPoint;
    use serde_json::json;

    #[test]
    fn test_null_price_and_date_get_defaults() {
        let result = map_property(SearchableProperty {
            transaction_id: "t1".to_string(),
            ..Default::default()
        });

        assert_eq!(result.price, 0);
        assert_eq!(result.date_of_transfer, DateTime::<Utc>::MIN_UTC);
        assert_eq!(result.address.town_city, "");
        assert_eq!(result.address.street, None);
        assert_eq!(result.address.geo, None);
        assert_eq!(result.build_details.property_type, PropertyType::Other);
        assert_eq!(result.build_details.build, BuildType::OldStock);
        assert_eq!(result.build_details.contract, ContractType::Freehold);
    }

    #[test]
    fn test_full_document_maps_through() {
        let result = map_property(SearchableProperty {
            transaction_id: "t2".to_string(),
            price: Some(325_000),
            post_code: Some("BS1 4DJ".to_string()),
            property_type: Some("T".to_string()),
            build: Some("Y".to_string()),
            contract: Some("L".to_string()),
            building: Some("12".to_string()),
            street: Some("KING STREET".to_string()),
            town_city: Some("BRISTOL".to_string()),
            geo: Some(GeographyPoint::from(GeoPoint::new(51.45, -2.59))),
            ..Default::default()
        });

        assert_eq!(result.price, 325_000);
        assert_eq!(result.build_details.property_type, PropertyType::Terraced);
        assert_eq!(result.build_details.build, BuildType::NewBuild);
        assert_eq!(result.build_details.contract, ContractType::Leasehold);
        assert_eq!(result.address.street.as_deref(), Some("KING STREET"));
        assert_eq!(result.address.geo, Some(GeoPoint::new(51.45, -2.59)));
    }

    #[test]
    fn test_facets_and_missing_count() {
        let raw: RawSearchResults = serde_json::from_value(json!({
            "@search.facets": {
                "TownCity": [{"value": "LEEDS", "count": 4}, {"value": "YORK", "count": 1}],
                "Price": [{"value": 150000, "count": 2}]
            },
            "value": []
        }))
        .unwrap();

        let response = map_response(raw, 2);
        assert_eq!(response.total_transactions, None);
        assert_eq!(response.page, 2);
        assert_eq!(response.facets.towns, vec!["LEEDS", "YORK"]);
        assert_eq!(response.facets.prices, vec!["150000"]);
        assert!(response.facets.counties.is_empty());
    }
}
