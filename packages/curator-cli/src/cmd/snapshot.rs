use anyhow::Result;
use colored::Colorize;
use tracing::{info, warn};

use site_curator::{dataset, snapshot_pages};

use super::{latest_file, CategoryArgs};
use crate::config::Settings;

/// Save one page per brand of each listed product under its dataset directory.
pub async fn run(settings: &Settings, categories: &CategoryArgs, max_workers: usize) -> Result<()> {
    let products = categories.products()?;
    let loader = settings.loader();

    for (_, product) in products {
        let Some(source) = latest_file(&settings.dataset_dir, &product) else {
            warn!(product = %product, "No latest.csv, skipping");
            continue;
        };

        let rows = dataset::read_rows(&source, None)?;
        let out_dir = dataset::product_dir(&settings.dataset_dir, &product);
        info!(product = %product, rows = rows.len(), "Downloading pages");

        let report = snapshot_pages(&loader, &rows, &out_dir, max_workers).await?;
        println!(
            "{} {} ({} of {} brands saved)",
            "✓".green(),
            product.bold(),
            report.saved,
            report.brands
        );
    }

    Ok(())
}
