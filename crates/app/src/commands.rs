use anyhow::{bail, Context, Result};
use std::io;
use std::path::{Path, PathBuf};

use tally_core::{Coordinate, Settings};
use tally_receipts::{extract, BatchImporter, ReceiptReconciler};
use tally_storage::{get_merchant_by_id, DbPool};

use crate::confirm::TerminalConfirm;

/// Interactively import every receipt photo in `folder`.
pub async fn import(db: &DbPool, settings: &Settings, folder: Option<PathBuf>) -> Result<()> {
    let folder = match folder.or_else(|| settings.import_folder.clone()) {
        Some(folder) => folder,
        None => bail!("No folder given and no import_folder configured"),
    };

    let importer = BatchImporter::new(
        db,
        settings.receipts_storage_folder.clone(),
        settings.location_match_radius,
    )
    .with_context(|| {
        format!(
            "Failed to prepare receipt folder {}",
            settings.receipts_storage_folder.display()
        )
    })?;

    let today = chrono::Local::now().date_naive();
    let mut prompt = TerminalConfirm::new(io::stdin().lock(), io::stdout(), today);
    let report = importer.run(&folder, &mut prompt).await;

    println!(
        "\nImported {}, skipped {}, failed {}{}",
        report.imported.len(),
        report.skipped.len(),
        report.failed.len(),
        if report.cancelled { " (cancelled)" } else { "" }
    );
    for (path, reason) in &report.failed {
        println!("  {}: {reason}", path.display());
    }
    Ok(())
}

/// Print merchants ranked by distance from a point.
pub async fn nearby(db: &DbPool, settings: &Settings, latitude: f64, longitude: f64) -> Result<()> {
    let reconciler = ReceiptReconciler::new(db, settings.location_match_radius);
    let ranked = reconciler
        .nearby(Coordinate::new(latitude, longitude))
        .await
        .context("Failed to rank merchants")?;

    if ranked.is_empty() {
        println!("No merchant locations recorded.");
        return Ok(());
    }

    for entry in ranked {
        let name = get_merchant_by_id(db, entry.merchant_id())
            .await?
            .map(|m| m.name)
            .unwrap_or_else(|| format!("merchant {}", entry.merchant_id()));
        let within = if entry.distance_miles <= settings.location_match_radius { "*" } else { " " };
        println!(
            "{within} {:>8.3} mi  {name}  {}",
            entry.distance_miles, entry.location.description
        );
    }
    Ok(())
}

/// Print the metadata a receipt photo carries.
pub fn inspect(file: &Path) -> Result<()> {
    if !file.exists() {
        bail!("{} does not exist", file.display());
    }
    let meta = extract(file);
    println!("file:        {}", meta.source_path.display());
    println!(
        "location:    {}",
        meta.coordinate.map(|c| c.to_string()).unwrap_or_else(|| "-".into())
    );
    println!(
        "captured at: {}",
        meta.captured_at.map(|t| t.to_string()).unwrap_or_else(|| "-".into())
    );
    println!("description: {}", meta.description.as_deref().unwrap_or("-"));
    Ok(())
}
