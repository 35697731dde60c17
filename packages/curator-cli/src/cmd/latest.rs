use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use site_curator::dataset;

/// Create missing `latest.csv` files under `root`.
pub fn run(root: &Path) -> Result<()> {
    let created = dataset::update_latest(root)
        .with_context(|| format!("Failed to scan {}", root.display()))?;

    if created.is_empty() {
        println!("{}", "All datasets already have latest.csv".dimmed());
    }
    for path in &created {
        println!("{} {}", "created".green(), path.display());
    }
    Ok(())
}
