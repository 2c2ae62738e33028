use crate::geo::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Kind of dwelling, stored in the index as a one-letter code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum PropertyType {
    #[strum(serialize = "D", serialize = "Detached")]
    Detached,
    #[strum(serialize = "S", serialize = "SemiDetached")]
    SemiDetached,
    #[strum(serialize = "T", serialize = "Terraced")]
    Terraced,
    #[strum(serialize = "F", serialize = "FlatsMaisonettes")]
    FlatsMaisonettes,
    #[strum(serialize = "O", serialize = "Other")]
    Other,
}

impl PropertyType {
    /// Unknown or missing codes fall back to [`PropertyType::Other`]
    pub fn from_code(code: Option<&str>) -> Self {
        code.and_then(|c| c.trim().parse().ok())
            .unwrap_or(PropertyType::Other)
    }

    pub fn code(&self) -> &'static str {
        match self {
            PropertyType::Detached => "D",
            PropertyType::SemiDetached => "S",
            PropertyType::Terraced => "T",
            PropertyType::FlatsMaisonettes => "F",
            PropertyType::Other => "O",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum BuildType {
    #[strum(serialize = "Y", serialize = "NewBuild")]
    NewBuild,
    #[strum(serialize = "N", serialize = "OldStock")]
    OldStock,
}

impl BuildType {
    pub fn from_code(code: Option<&str>) -> Self {
        code.and_then(|c| c.trim().parse().ok())
            .unwrap_or(BuildType::OldStock)
    }

    pub fn code(&self) -> &'static str {
        match self {
            BuildType::NewBuild => "Y",
            BuildType::OldStock => "N",
        }
    }
}

/// Tenure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum ContractType {
    #[strum(serialize = "F", serialize = "Freehold")]
    Freehold,
    #[strum(serialize = "L", serialize = "Leasehold")]
    Leasehold,
}

impl ContractType {
    pub fn from_code(code: Option<&str>) -> Self {
        code.and_then(|c| c.trim().parse().ok())
            .unwrap_or(ContractType::Freehold)
    }

    pub fn code(&self) -> &'static str {
        match self {
            ContractType::Freehold => "F",
            ContractType::Leasehold => "L",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildDetails {
    pub property_type: PropertyType,
    pub build: BuildType,
    pub contract: ContractType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub building: String,
    pub street: Option<String>,
    pub locality: Option<String>,
    pub town_city: String,
    pub district: String,
    pub county: String,
    pub post_code: Option<String>,
    pub geo: Option<GeoPoint>,
}

/// One property transaction as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyResult {
    pub build_details: BuildDetails,
    pub address: Address,
    pub price: i32,
    pub date_of_transfer: DateTime<Utc>,
}
