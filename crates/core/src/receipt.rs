use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::geo::Coordinate;
use crate::merchant::{MerchantId, MerchantLocation};
use crate::ranking::{rank, RankError, RankedLocation};
use crate::transaction::Transaction;

/// Whatever could be read from a receipt photo. Every field is independent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptMetadata {
    pub coordinate: Option<Coordinate>,
    pub captured_at: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub source_path: PathBuf,
}

impl ReceiptMetadata {
    pub fn empty(source_path: impl Into<PathBuf>) -> Self {
        ReceiptMetadata {
            coordinate: None,
            captured_at: None,
            description: None,
            source_path: source_path.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.coordinate.is_none() && self.captured_at.is_none() && self.description.is_none()
    }

    pub fn file_name(&self) -> Option<String> {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }
}

/// A transaction pre-filled from a receipt, waiting for the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftTransaction {
    pub description: Option<String>,
    pub merchant_id: Option<MerchantId>,
    pub date: Option<NaiveDate>,
    pub source_file_name: Option<String>,
    pub coordinate: Option<Coordinate>,
}

impl DraftTransaction {
    /// Turn the draft into an unsaved transaction, filling the gaps the
    /// receipt could not answer.
    pub fn into_transaction(self, fallback_date: NaiveDate) -> Transaction {
        Transaction {
            id: None,
            date: self.date.unwrap_or(fallback_date),
            description: self.description.unwrap_or_default(),
            merchant_id: self.merchant_id,
            account_id: None,
            receipt_file_name: self.source_file_name,
            coordinate: self.coordinate,
            amounts: Vec::new(),
        }
    }
}

/// Reconciler output: the draft plus merchants ordered nearest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    pub draft: DraftTransaction,
    pub candidates: Vec<MerchantId>,
    pub ranked: Vec<RankedLocation>,
}

impl Reconciliation {
    /// Distance to the closest merchant, if any was ranked.
    pub fn nearest_distance(&self) -> Option<f64> {
        self.ranked.first().map(|r| r.distance_miles)
    }
}

/// Build a draft transaction for `metadata` against a catalog snapshot.
///
/// A merchant is assigned only when the nearest ranked location lies within
/// `radius_miles` (inclusive). The candidate list is always the full ranked
/// order so a front end can offer the likely match first.
pub fn reconcile(
    metadata: &ReceiptMetadata,
    radius_miles: f64,
    catalog: &[MerchantLocation],
) -> Result<Reconciliation, RankError> {
    let ranked = match metadata.coordinate {
        Some(coord) => rank(coord, catalog)?,
        None => Vec::new(),
    };

    let merchant_id = ranked
        .first()
        .filter(|nearest| nearest.distance_miles <= radius_miles)
        .map(RankedLocation::merchant_id);

    let draft = DraftTransaction {
        description: metadata.description.clone(),
        merchant_id,
        date: metadata.captured_at.map(|t| t.date()),
        source_file_name: metadata.file_name(),
        coordinate: metadata.coordinate,
    };

    let candidates = ranked.iter().map(RankedLocation::merchant_id).collect();

    Ok(Reconciliation { draft, candidates, ranked })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::distance;
    use crate::merchant::LocationId;

    const LAT: f64 = 35.782024;
    const LON: f64 = -78.633039;

    fn loc(id: i64, merchant: i64, lat: f64, lon: f64) -> MerchantLocation {
        MerchantLocation {
            id: LocationId(id),
            merchant_id: MerchantId(merchant),
            latitude: Some(lat),
            longitude: Some(lon),
            description: String::new(),
        }
    }

    fn metadata_at(coord: Option<Coordinate>) -> ReceiptMetadata {
        ReceiptMetadata {
            coordinate: coord,
            captured_at: NaiveDate::from_ymd_opt(2024, 3, 15)
                .and_then(|d| d.and_hms_opt(12, 30, 45)),
            description: Some("Lunch".into()),
            source_path: PathBuf::from("/inbox/IMG_0042.jpg"),
        }
    }

    #[test]
    fn assigns_merchant_within_radius() {
        let catalog = vec![loc(1, 7, LAT + 0.001, LON), loc(2, 8, 35.775151, -78.612522)];
        let r = reconcile(&metadata_at(Some(Coordinate::new(LAT, LON))), 0.2, &catalog).unwrap();

        assert_eq!(r.draft.merchant_id, Some(MerchantId(7)));
        assert_eq!(r.candidates, vec![MerchantId(7), MerchantId(8)]);
    }

    #[test]
    fn leaves_merchant_unset_beyond_radius() {
        let catalog = vec![loc(2, 8, 35.775151, -78.612522)];
        let r = reconcile(&metadata_at(Some(Coordinate::new(LAT, LON))), 0.2, &catalog).unwrap();

        assert_eq!(r.draft.merchant_id, None);
        // Still offered as a candidate.
        assert_eq!(r.candidates, vec![MerchantId(8)]);
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let catalog = vec![loc(1, 3, 35.775151, -78.612522)];
        let exact = distance(LAT, LON, 35.775151, -78.612522);
        let meta = metadata_at(Some(Coordinate::new(LAT, LON)));

        let at = reconcile(&meta, exact, &catalog).unwrap();
        assert_eq!(at.draft.merchant_id, Some(MerchantId(3)));

        let below = reconcile(&meta, exact - 1e-9, &catalog).unwrap();
        assert_eq!(below.draft.merchant_id, None);
    }

    #[test]
    fn no_coordinate_means_no_candidates() {
        let catalog = vec![loc(1, 3, LAT, LON)];
        let r = reconcile(&metadata_at(None), 0.2, &catalog).unwrap();

        assert_eq!(r.draft.merchant_id, None);
        assert!(r.candidates.is_empty());
        assert_eq!(r.nearest_distance(), None);
    }

    #[test]
    fn copies_metadata_fields() {
        let r = reconcile(&metadata_at(None), 0.2, &[]).unwrap();

        assert_eq!(r.draft.description.as_deref(), Some("Lunch"));
        assert_eq!(r.draft.date, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(r.draft.source_file_name.as_deref(), Some("IMG_0042.jpg"));
        assert_eq!(r.draft.coordinate, None);
    }

    #[test]
    fn unset_fields_stay_unset() {
        let meta = ReceiptMetadata::empty("/inbox/blank.png");
        let r = reconcile(&meta, 0.2, &[]).unwrap();

        assert_eq!(r.draft.description, None);
        assert_eq!(r.draft.date, None);
        assert_eq!(r.draft.source_file_name.as_deref(), Some("blank.png"));
    }

    #[test]
    fn malformed_coordinate_propagates() {
        let catalog = vec![loc(1, 3, LAT, LON)];
        let meta = metadata_at(Some(Coordinate::new(-100.0, LON)));
        assert!(matches!(
            reconcile(&meta, 0.2, &catalog),
            Err(RankError::InvalidQuery(_))
        ));
    }

    #[test]
    fn draft_into_transaction_uses_fallback_date() {
        let draft = DraftTransaction {
            description: None,
            merchant_id: Some(MerchantId(2)),
            date: None,
            source_file_name: Some("r.jpg".into()),
            coordinate: None,
        };
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let tx = draft.into_transaction(today);

        assert_eq!(tx.id, None);
        assert_eq!(tx.date, today);
        assert_eq!(tx.description, "");
        assert_eq!(tx.merchant_id, Some(MerchantId(2)));
        assert_eq!(tx.receipt_file_name.as_deref(), Some("r.jpg"));
    }

    #[test]
    fn empty_metadata_reports_empty() {
        assert!(ReceiptMetadata::empty("x.jpg").is_empty());
        assert!(!metadata_at(None).is_empty());
    }
}
