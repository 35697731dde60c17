use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use site_curator::dataset::{self, AuditTrail, Bump, Version};
use site_curator::{Curator, Reconciliation};

use super::{CategoryArgs, CleanArgs};
use crate::config::{curator_config, Settings};

/// Source and destination files of one cleaning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanPlan {
    pub dir: PathBuf,
    pub source: Version,
    pub target: Version,
}

impl CleanPlan {
    /// Pick the version to read and the next minor version to write.
    pub fn for_product(dir: &Path, options: &CleanArgs) -> Result<Self> {
        let Some(latest) = dataset::latest_version(dir, options.major_version)? else {
            bail!("No versioned dataset in {}", dir.display());
        };
        let source = match options.minor_version {
            Some(minor) => Version::new(latest.major, minor),
            None => latest,
        };
        let target = dataset::next_version(dir, Bump::Minor, Some(latest.major))?;

        Ok(Self {
            dir: dir.to_path_buf(),
            source,
            target,
        })
    }

    pub fn source_path(&self) -> PathBuf {
        self.dir.join(self.source.file_name())
    }

    pub fn target_path(&self) -> PathBuf {
        self.dir.join(self.target.file_name())
    }
}

/// Clean one product's dataset.
pub async fn run(settings: &Settings, product: &str, options: &CleanArgs) -> Result<()> {
    let dir = dataset::product_dir(&settings.dataset_dir, product);
    if !dir.is_dir() {
        bail!("No dataset directory for product {} ({})", product, dir.display());
    }

    let config = curator_config(options.keywords.as_deref())?;
    let curator = settings.curator(config)?;

    let result = clean_product(&curator, &dir, options).await?;
    print_summary(product, &result);
    Ok(())
}

/// Clean every product of a category list, skipping products without data.
pub async fn run_batch(
    settings: &Settings,
    categories: &CategoryArgs,
    options: &CleanArgs,
) -> Result<()> {
    let products = categories.products()?;
    info!(
        products = ?products.iter().map(|(_, p)| p.as_str()).collect::<Vec<_>>(),
        "Products to clean"
    );

    let config = curator_config(options.keywords.as_deref())?;
    let curator = settings.curator(config)?;

    for (position, product) in products {
        let dir = dataset::product_dir(&settings.dataset_dir, &product);
        if !dir.is_dir() {
            warn!(product = %product, "No dataset directory, skipping");
            continue;
        }

        info!(position, product = %product, "Cleaning product");
        match clean_product(&curator, &dir, options).await {
            Ok(result) => print_summary(&product, &result),
            Err(e) => warn!(product = %product, error = %e, "Skipping product"),
        }
    }

    Ok(())
}

async fn clean_product(
    curator: &Curator,
    dir: &Path,
    options: &CleanArgs,
) -> Result<Reconciliation> {
    let plan = CleanPlan::for_product(dir, options)?;
    let source = plan.source_path();
    let rows = dataset::read_rows(&source, options.instances_to_proc)
        .with_context(|| format!("Failed to read {}", source.display()))?;

    info!(
        source = %source.display(),
        target = %plan.target_path().display(),
        rows = rows.len(),
        "Cleaning dataset"
    );

    let mut audit = AuditTrail::create(dir, &plan.target.stem())?;
    let result = curator
        .reconciler()
        .reconcile_with_audit(rows, options.max_workers, &mut audit)
        .await?;

    let target = plan.target_path();
    dataset::write_rows(&target, &result.accepted)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    info!(
        path = %target.display(),
        accepted = %audit.accepted_path().display(),
        rejected = %audit.rejected_path().display(),
        "Cleaned dataset saved"
    );

    Ok(result)
}

fn print_summary(product: &str, result: &Reconciliation) {
    println!();
    println!("{}", format!("✓ {}", product).bright_green().bold());
    println!("  {} {}", "Accepted:".bold(), result.accepted.len().to_string().green());
    println!("  {} {}", "Rejected:".bold(), result.rejected.len().to_string().yellow());
    println!("  {} {}", "Duplicates:".bold(), result.duplicates.to_string().yellow());
    if result.failed > 0 {
        println!("  {} {}", "Failed:".bold(), result.failed.to_string().red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(major: Option<u32>, minor: Option<u32>) -> CleanArgs {
        CleanArgs {
            major_version: major,
            minor_version: minor,
            max_workers: 1,
            instances_to_proc: None,
            keywords: None,
        }
    }

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "Product,Brand,Model,URL\n").unwrap();
    }

    #[test]
    fn test_plan_reads_newest_and_bumps_minor() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "products_v1.0.csv");
        touch(dir.path(), "products_v1.1.csv");

        let plan = CleanPlan::for_product(dir.path(), &options(None, None)).unwrap();
        assert_eq!(plan.source, Version::new(1, 1));
        assert_eq!(plan.target, Version::new(1, 2));
    }

    #[test]
    fn test_plan_with_custom_versions() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "products_v1.0.csv");
        touch(dir.path(), "products_v1.1.csv");
        touch(dir.path(), "products_v2.0.csv");

        let plan = CleanPlan::for_product(dir.path(), &options(Some(1), Some(0))).unwrap();
        assert_eq!(plan.source_path(), dir.path().join("products_v1.0.csv"));
        assert_eq!(plan.target, Version::new(1, 2));
    }

    #[test]
    fn test_plan_without_versions_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CleanPlan::for_product(dir.path(), &options(None, None)).is_err());
    }
}
