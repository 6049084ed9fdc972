use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use thiserror::Error;

use crate::geo::Coordinate;
use crate::merchant::{LocationId, MerchantId, MerchantLocation};

/// Raised when the query point or a catalog entry cannot be measured.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankError {
    #[error("Invalid query coordinate: {0}")]
    InvalidQuery(Coordinate),
    #[error("Merchant location {0} has no coordinate")]
    MissingCoordinate(LocationId),
    #[error("Merchant location {0} has an out-of-range coordinate: {1}")]
    InvalidCoordinate(LocationId, Coordinate),
}

/// A catalog location paired with its distance from the query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedLocation {
    pub location: MerchantLocation,
    pub distance_miles: f64,
}

impl RankedLocation {
    pub fn merchant_id(&self) -> MerchantId {
        self.location.merchant_id
    }
}

/// Rank every catalog location by distance from `query`, keeping only the
/// nearest location of each merchant.
///
/// Ties keep catalog order. Any location without a usable coordinate fails
/// the whole call.
pub fn rank(
    query: Coordinate,
    catalog: &[MerchantLocation],
) -> Result<Vec<RankedLocation>, RankError> {
    if !query.is_valid() {
        return Err(RankError::InvalidQuery(query));
    }

    let mut measured = catalog
        .iter()
        .map(|loc| {
            let coord = loc.coordinate().ok_or(RankError::MissingCoordinate(loc.id))?;
            if !coord.is_valid() {
                return Err(RankError::InvalidCoordinate(loc.id, coord));
            }
            Ok(RankedLocation {
                location: loc.clone(),
                distance_miles: query.distance_to(&coord),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    measured.sort_by(|a, b| {
        a.distance_miles
            .partial_cmp(&b.distance_miles)
            .unwrap_or(Ordering::Equal)
    });

    let mut seen = HashSet::new();
    let nearest_per_merchant = measured
        .into_iter()
        .filter(|r| seen.insert(r.merchant_id()))
        .collect();

    Ok(nearest_per_merchant)
}
