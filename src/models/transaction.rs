use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A price-paid record as supplied for import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PropertyTransaction {
    /// Unique transaction identifier, source of the document key
    #[validate(length(min = 1, max = 128))]
    pub transaction_id: String,

    #[validate(range(min = 0))]
    pub price: i32,

    pub date_of_transfer: DateTime<Utc>,

    #[validate(length(min = 1, max = 16))]
    pub postcode: String,

    /// One-letter dwelling code (D, S, T, F, O)
    #[serde(default)]
    pub property_type: Option<String>,

    /// `Y` for a new build
    #[serde(default)]
    pub new_build: Option<String>,

    /// `F` freehold, `L` leasehold
    #[serde(default)]
    pub tenure: Option<String>,

    /// Primary addressable object name (house number or name)
    #[serde(default)]
    pub paon: Option<String>,

    /// Secondary addressable object name (flat, unit)
    #[serde(default)]
    pub saon: Option<String>,

    #[serde(default)]
    pub street: Option<String>,

    #[serde(default)]
    pub locality: Option<String>,

    #[serde(default)]
    pub town: Option<String>,

    #[serde(default)]
    pub district: Option<String>,

    #[serde(default)]
    pub county: Option<String>,
}

impl PropertyTransaction {
    /// Building designation: SAON and PAON joined, blank parts dropped
    pub fn building(&self) -> Option<String> {
        let parts: Vec<&str> = [self.saon.as_deref(), self.paon.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// A postcode centroid as supplied for import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PostcodeRecord {
    #[validate(length(min = 1, max = 16))]
    pub postcode: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PropertyTransaction {
        serde_json::from_value(serde_json::json!({
            "transaction_id": "{A1}",
            "price": 250000,
            "date_of_transfer": "2019-06-14T00:00:00Z",
            "postcode": "SW1A 1AA",
            "paon": "10",
            "saon": "FLAT 2"
        }))
        .unwrap()
    }

    #[test]
    fn test_optional_columns_default() {
        let record = record();
        assert_eq!(record.street, None);
        assert_eq!(record.property_type, None);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_building_joins_saon_and_paon() {
        assert_eq!(record().building().as_deref(), Some("FLAT 2, 10"));

        let mut bare = record();
        bare.saon = Some("  ".to_string());
        bare.paon = None;
        assert_eq!(bare.building(), None);
    }

    #[test]
    fn test_validation_rejects_empty_keys() {
        let mut missing_id = record();
        missing_id.transaction_id = String::new();
        assert!(missing_id.validate().is_err());

        let bad_postcode = PostcodeRecord {
            postcode: String::new(),
            latitude: 51.5,
            longitude: -0.1,
        };
        assert!(bad_postcode.validate().is_err());

        let bad_latitude = PostcodeRecord {
            postcode: "SW1A 1AA".to_string(),
            latitude: 91.0,
            longitude: -0.1,
        };
        assert!(bad_latitude.validate().is_err());
    }
}
