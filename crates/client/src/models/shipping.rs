//! Carrier lookup results.

use serde::{Deserialize, Serialize};

/// A city served by the carrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    /// Carrier reference (UUID string) used in follow-up lookups.
    pub reference: String,
    /// Display name.
    pub name: String,
    /// Region, if the carrier reports one.
    pub area: Option<String>,
}

impl City {
    /// Name with the region appended, e.g. "Бровари (Київська)".
    #[must_use]
    pub fn label(&self) -> String {
        match &self.area {
            Some(area) => format!("{} ({area})", self.name),
            None => self.name.clone(),
        }
    }
}

/// A carrier branch office (parcel department) inside a city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Carrier reference (UUID string).
    pub reference: String,
    /// Branch number as printed on the sign.
    pub number: String,
    /// Full description including the street address.
    pub description: String,
    /// Reference of the city the branch belongs to.
    pub city_reference: String,
}
