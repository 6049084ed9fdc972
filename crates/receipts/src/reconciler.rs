use thiserror::Error;

use tally_core::{Coordinate, Merchant, MerchantId, RankError, RankedLocation, ReceiptMetadata, Reconciliation};
use tally_storage::{get_all_merchant_locations, get_merchant_by_id, DbPool, StorageError};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Failed to read merchant catalog: {0}")]
    Storage(#[from] StorageError),
    #[error("Merchant catalog is inconsistent: {0}")]
    Rank(#[from] RankError),
}

/// Reconciles receipts against the merchant catalog held in the store.
///
/// The catalog is read on every call, so edits made between receipts are
/// always seen.
pub struct ReceiptReconciler<'a> {
    pool: &'a DbPool,
    radius_miles: f64,
}

impl<'a> ReceiptReconciler<'a> {
    pub fn new(pool: &'a DbPool, radius_miles: f64) -> Self {
        Self { pool, radius_miles }
    }

    pub fn radius_miles(&self) -> f64 {
        self.radius_miles
    }

    pub async fn reconcile(&self, metadata: &ReceiptMetadata) -> Result<Reconciliation, ReconcileError> {
        // Without a coordinate there is nothing to rank, so skip the query.
        let catalog = match metadata.coordinate {
            Some(_) => get_all_merchant_locations(self.pool).await?,
            None => Vec::new(),
        };

        let reconciliation = tally_core::reconcile(metadata, self.radius_miles, &catalog)?;

        match (reconciliation.draft.merchant_id, reconciliation.nearest_distance()) {
            (Some(merchant), Some(miles)) => {
                tracing::info!("Matched merchant {merchant} at {miles:.3} mi");
            }
            (None, Some(miles)) => {
                tracing::debug!(
                    "Nearest merchant is {miles:.3} mi away, beyond {} mi",
                    self.radius_miles
                );
            }
            _ => {}
        }

        Ok(reconciliation)
    }

    /// Every merchant ranked by distance from `query`.
    pub async fn nearby(&self, query: Coordinate) -> Result<Vec<RankedLocation>, ReconcileError> {
        let catalog = get_all_merchant_locations(self.pool).await?;
        Ok(tally_core::rank(query, &catalog)?)
    }

    /// Look up candidate merchants in order, for labelling a picker.
    pub async fn candidate_merchants(&self, ids: &[MerchantId]) -> Result<Vec<Merchant>, ReconcileError> {
        let mut merchants = Vec::with_capacity(ids.len());
        for id in ids {
            match get_merchant_by_id(self.pool, *id).await? {
                Some(m) => merchants.push(m),
                None => tracing::warn!("Ranked merchant {id} no longer exists"),
            }
        }
        Ok(merchants)
    }
}
