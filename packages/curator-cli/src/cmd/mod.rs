pub mod clean;
pub mod latest;
pub mod names;
pub mod snapshot;

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use site_curator::dataset;

/// Options shared by single and batch cleaning runs.
#[derive(Args, Debug, Clone)]
pub struct CleanArgs {
    /// Major version to clean (defaults to the newest)
    #[arg(long)]
    pub major_version: Option<u32>,

    /// Minor version to read (defaults to the newest of the major version)
    #[arg(long)]
    pub minor_version: Option<u32>,

    /// Concurrent rows
    #[arg(long, default_value_t = 6)]
    pub max_workers: usize,

    /// Process only the first N rows
    #[arg(long)]
    pub instances_to_proc: Option<usize>,

    /// JSON file replacing the keyword lists
    #[arg(long)]
    pub keywords: Option<PathBuf>,
}

/// Window of products taken from a category list.
#[derive(Args, Debug, Clone)]
pub struct CategoryArgs {
    /// Category list (one product per line, `#` headers)
    #[arg(long)]
    pub cat_file_path: PathBuf,

    /// Position of the first product to process
    #[arg(long, default_value_t = 0)]
    pub start_prod: usize,

    /// Number of products to process (defaults to all remaining)
    #[arg(long)]
    pub num_prods: Option<usize>,
}

impl CategoryArgs {
    /// Products selected by the window, in list order.
    pub fn products(&self) -> Result<Vec<(usize, String)>> {
        dataset::read_categories(&self.cat_file_path, self.start_prod, self.num_prods)
            .with_context(|| {
                format!(
                    "Failed to read category list {}",
                    self.cat_file_path.display()
                )
            })
    }
}

/// `latest.csv` of a product, if its dataset directory has one.
pub fn latest_file(root: &Path, product: &str) -> Option<PathBuf> {
    let path = dataset::product_dir(root, product).join(dataset::LATEST_FILE);
    path.exists().then_some(path)
}
