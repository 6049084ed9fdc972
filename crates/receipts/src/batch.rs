use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use tally_core::{Merchant, ReceiptMetadata, Reconciliation, Transaction, TransactionId};
use tally_storage::{delete_transaction, upsert_transaction, DbPool, StorageError};

use crate::intake::list_importable;
use crate::metadata::ReceiptExtractor;
use crate::mover::{MoveError, ReceiptMover};
use crate::reconciler::{ReceiptReconciler, ReconcileError};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error("Failed to save transaction: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Move(#[from] MoveError),
}

/// Everything the front end needs to review one receipt.
pub struct ReceiptReview<'a> {
    pub path: &'a Path,
    pub metadata: &'a ReceiptMetadata,
    pub reconciliation: &'a Reconciliation,
    /// Candidate merchants, nearest first.
    pub candidates: &'a [Merchant],
}

/// The user's answer for one receipt.
#[derive(Debug, Clone)]
pub enum Confirmation {
    /// Save this transaction and file the photo.
    Accept(Transaction),
    /// Leave the photo where it is and move on.
    Skip,
    /// Stop the batch here.
    Cancel,
}

/// The confirmation step of a batch import, usually backed by a UI.
pub trait ConfirmReceipt {
    fn confirm(&mut self, review: &ReceiptReview<'_>) -> Confirmation;
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub imported: Vec<(PathBuf, TransactionId)>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
    pub cancelled: bool,
}

enum FileOutcome {
    Imported(PathBuf, TransactionId),
    Skipped,
    Cancelled,
}

/// Walks an import folder one receipt at a time.
pub struct BatchImporter<'a> {
    pool: &'a DbPool,
    extractor: ReceiptExtractor,
    reconciler: ReceiptReconciler<'a>,
    mover: ReceiptMover,
}

impl<'a> BatchImporter<'a> {
    pub fn new(pool: &'a DbPool, storage_dir: PathBuf, radius_miles: f64) -> io::Result<Self> {
        let extractor = ReceiptExtractor::new(storage_dir.clone())?;
        Ok(Self {
            pool,
            extractor,
            reconciler: ReceiptReconciler::new(pool, radius_miles),
            mover: ReceiptMover::new(storage_dir),
        })
    }

    /// Import every receipt photo in `folder`, in name order.
    ///
    /// A failing file is recorded and the batch moves on. `Cancel` stops
    /// immediately; receipts already imported stay imported.
    pub async fn run<C: ConfirmReceipt>(&self, folder: &Path, confirmer: &mut C) -> BatchReport {
        let files = list_importable(folder);
        tracing::info!("Importing {} receipt(s) from {}", files.len(), folder.display());

        let mut report = BatchReport::default();
        for path in files {
            match self.process_file(&path, confirmer).await {
                Ok(FileOutcome::Imported(dest, id)) => report.imported.push((dest, id)),
                Ok(FileOutcome::Skipped) => {
                    tracing::debug!("Skipped {}", path.display());
                    report.skipped.push(path);
                }
                Ok(FileOutcome::Cancelled) => {
                    tracing::info!("Import cancelled at {}", path.display());
                    report.cancelled = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("Failed to import {}: {e}", path.display());
                    report.failed.push((path, e.to_string()));
                }
            }
        }
        report
    }

    async fn process_file<C: ConfirmReceipt>(
        &self,
        path: &Path,
        confirmer: &mut C,
    ) -> Result<FileOutcome, ImportError> {
        let metadata = self.extractor.extract(path);
        let reconciliation = self.reconciler.reconcile(&metadata).await?;
        let candidates = self
            .reconciler
            .candidate_merchants(&reconciliation.candidates)
            .await?;

        let review = ReceiptReview {
            path,
            metadata: &metadata,
            reconciliation: &reconciliation,
            candidates: &candidates,
        };

        let mut tx = match confirmer.confirm(&review) {
            Confirmation::Accept(tx) => tx,
            Confirmation::Skip => return Ok(FileOutcome::Skipped),
            Confirmation::Cancel => return Ok(FileOutcome::Cancelled),
        };

        if tx.receipt_file_name.is_none() {
            tx.receipt_file_name = metadata.file_name();
        }

        // Saved first so a clash rename can update the stored file name.
        let is_new = !tx.is_persisted();
        let id = upsert_transaction(self.pool, &mut tx).await?;
        match self.mover.move_into_storage(self.pool, path, &mut tx).await {
            Ok(dest) => Ok(FileOutcome::Imported(dest, id)),
            Err(e) => {
                // The photo stays in the inbox, so its row goes too.
                if is_new {
                    if let Err(undo) = delete_transaction(self.pool, id).await {
                        tracing::warn!("Failed to remove transaction {id} after a failed move: {undo}");
                    }
                }
                Err(e.into())
            }
        }
    }
}
