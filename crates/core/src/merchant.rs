use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MerchantId(pub i64);

impl fmt::Display for MerchantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationId(pub i64);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    pub id: Option<MerchantId>,
    pub name: String,
}

impl Merchant {
    pub fn new(name: &str) -> Self {
        Merchant { id: None, name: name.to_string() }
    }
}

/// One physical site of a merchant, as stored in the catalog.
///
/// The coordinate columns are nullable in the store, so both halves are kept
/// optional here and checked by the ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantLocation {
    pub id: LocationId,
    pub merchant_id: MerchantId,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: String,
}

impl MerchantLocation {
    /// Both halves of the coordinate, or `None` if either is missing.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }
}
