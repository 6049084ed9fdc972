use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use tally_core::Transaction;
use tally_storage::{upsert_transaction, DbPool, StorageError};

#[derive(Debug, Error)]
pub enum MoveError {
    #[error("Receipt file does not exist: {0}")]
    SourceMissing(PathBuf),
    #[error("Receipt path has no file name: {0}")]
    NoFileName(PathBuf),
    #[error("'{original}' must be stored as '{renamed}', but its transaction has not been saved yet")]
    UnpersistedTransaction { original: String, renamed: String },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to record renamed receipt: {0}")]
    Storage(#[from] StorageError),
}

/// Moves confirmed receipt photos into the permanent receipt folder.
pub struct ReceiptMover {
    storage_dir: PathBuf,
}

impl ReceiptMover {
    pub fn new(storage_dir: PathBuf) -> Self {
        Self { storage_dir }
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Move `source` into storage and return where it landed.
    ///
    /// A name clash gets a `_N` suffix, which requires the transaction to
    /// already have an id. Whenever the stored name differs from the
    /// transaction's file name, the name is updated, and saved if the
    /// transaction is persisted, before the file moves. A failed save leaves
    /// `tx` as it was.
    pub async fn move_into_storage(
        &self,
        pool: &DbPool,
        source: &Path,
        tx: &mut Transaction,
    ) -> Result<PathBuf, MoveError> {
        let is_file = tokio::fs::metadata(source)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(MoveError::SourceMissing(source.to_path_buf()));
        }

        let original = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| MoveError::NoFileName(source.to_path_buf()))?;

        tokio::fs::create_dir_all(&self.storage_dir).await?;
        let (dest, stored_name) = free_destination(&self.storage_dir, &original).await?;

        let renamed = stored_name != original;
        if renamed && !tx.is_persisted() {
            return Err(MoveError::UnpersistedTransaction {
                original,
                renamed: stored_name,
            });
        }

        if tx.receipt_file_name.as_deref() != Some(stored_name.as_str()) {
            let previous = tx.receipt_file_name.replace(stored_name.clone());
            if tx.is_persisted() {
                if let Err(e) = upsert_transaction(pool, tx).await {
                    tx.receipt_file_name = previous;
                    return Err(e.into());
                }
            }
        }
        if renamed {
            tracing::info!("Receipt '{original}' renamed to '{stored_name}' to avoid a clash");
        }

        relocate(source, &dest).await?;
        tracing::info!("Moved receipt {} -> {}", source.display(), dest.display());
        Ok(dest)
    }
}

/// First path in `dir` for `file_name` that is not taken, trying
/// `name.ext`, `name_1.ext`, `name_2.ext`, ...
pub async fn free_destination(dir: &Path, file_name: &str) -> io::Result<(PathBuf, String)> {
    let candidate = dir.join(file_name);
    if !tokio::fs::try_exists(&candidate).await? {
        return Ok((candidate, file_name.to_string()));
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = name.extension().map(|e| e.to_string_lossy().into_owned());

    let mut n = 1u32;
    loop {
        let numbered = match &ext {
            Some(ext) => format!("{stem}_{n}.{ext}"),
            None => format!("{stem}_{n}"),
        };
        let candidate = dir.join(&numbered);
        if !tokio::fs::try_exists(&candidate).await? {
            return Ok((candidate, numbered));
        }
        n += 1;
    }
}

/// Rename, or copy then delete when the target is on another device.
async fn relocate(source: &Path, dest: &Path) -> io::Result<()> {
    match tokio::fs::rename(source, dest).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            tracing::debug!("Cross-device move, copying {}", source.display());
            tokio::fs::copy(source, dest).await?;
            tokio::fs::remove_file(source).await
        }
        Err(e) => Err(e),
    }
}

fn is_cross_device(err: &io::Error) -> bool {
    #[cfg(unix)]
    const EXDEV: i32 = 18;
    #[cfg(windows)]
    const EXDEV: i32 = 17; // ERROR_NOT_SAME_DEVICE
    #[cfg(not(any(unix, windows)))]
    const EXDEV: i32 = -1;

    err.raw_os_error() == Some(EXDEV)
}
