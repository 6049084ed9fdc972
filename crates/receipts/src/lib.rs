pub mod batch;
pub mod intake;
pub mod metadata;
pub mod mover;
pub mod reconciler;

#[cfg(test)]
pub(crate) mod fixtures;

pub use batch::{BatchImporter, BatchReport, ConfirmReceipt, Confirmation, ImportError, ReceiptReview};
pub use intake::{is_importable, list_importable, IMPORTABLE_EXTENSIONS};
pub use metadata::{extract, ReceiptExtractor, EXIF_DATETIME_FORMAT};
pub use mover::{free_destination, MoveError, ReceiptMover};
pub use reconciler::{ReceiptReconciler, ReconcileError};
