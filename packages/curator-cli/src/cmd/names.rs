use anyhow::{Context, Result};
use colored::Colorize;
use tracing::{info, warn};

use site_curator::dataset;
use site_curator::{CuratorConfig, ModelNamer};

use super::{latest_file, CategoryArgs};
use crate::config::Settings;

/// Refresh model names of each listed product's `latest.csv` into
/// `updated_names.csv`.
pub async fn run(
    settings: &Settings,
    categories: &CategoryArgs,
    max_workers: usize,
    instances_to_proc: Option<usize>,
) -> Result<()> {
    let products = categories.products()?;
    let (loader, oracle) = settings.loader_and_oracle(&CuratorConfig::default())?;
    let namer = ModelNamer::new(loader, oracle);

    for (_, product) in products {
        let Some(source) = latest_file(&settings.dataset_dir, &product) else {
            warn!(product = %product, "No latest.csv, skipping");
            continue;
        };

        let rows = dataset::read_rows(&source, instances_to_proc)
            .with_context(|| format!("Failed to read {}", source.display()))?;
        let before: Vec<String> = rows.iter().map(|r| r.model.clone()).collect();

        info!(product = %product, rows = rows.len(), "Refreshing model names");
        let rows = namer.refresh(rows, max_workers).await;
        let changed = rows
            .iter()
            .zip(&before)
            .filter(|(row, old)| row.model != **old)
            .count();

        let target = dataset::product_dir(&settings.dataset_dir, &product)
            .join(dataset::UPDATED_NAMES_FILE);
        dataset::write_rows(&target, &rows)
            .with_context(|| format!("Failed to write {}", target.display()))?;

        println!(
            "{} {} ({} of {} renamed)",
            "✓".green(),
            product.bold(),
            changed,
            rows.len()
        );
    }

    Ok(())
}
