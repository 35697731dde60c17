//! Product-page dataset curation runner.
//!
//! ```text
//! curate clean --prod blender --max-workers 6
//! curate clean-batch --cat-file-path dataset/categories.md --start-prod 0 --num-prods 10
//! curate update-names --cat-file-path dataset/categories.md
//! curate snapshot --cat-file-path dataset/categories.md
//! curate update-latest
//! ```

mod cmd;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cmd::{CategoryArgs, CleanArgs};
use crate::config::Settings;

#[derive(Parser)]
#[command(name = "curate")]
#[command(about = "Verify and recover manufacturer product-page URLs in product datasets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean one product's latest dataset version into a new minor version
    Clean {
        /// Product name (dataset directory)
        #[arg(long)]
        prod: String,

        #[command(flatten)]
        options: CleanArgs,
    },

    /// Clean every product of a category list
    CleanBatch {
        #[command(flatten)]
        categories: CategoryArgs,

        #[command(flatten)]
        options: CleanArgs,
    },

    /// Refresh model names from page titles
    UpdateNames {
        #[command(flatten)]
        categories: CategoryArgs,

        /// Concurrent rows
        #[arg(long, default_value_t = 6)]
        max_workers: usize,

        /// Process only the first N rows
        #[arg(long)]
        instances_to_proc: Option<usize>,
    },

    /// Save one page per brand for inspection
    Snapshot {
        #[command(flatten)]
        categories: CategoryArgs,

        /// Concurrent brands
        #[arg(long, default_value_t = 6)]
        max_workers: usize,
    },

    /// Create missing latest.csv files from the newest cleaned versions
    UpdateLatest {
        /// Dataset root (defaults to CURATOR_DATASET_DIR)
        #[arg(long)]
        root: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,site_curator=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();
    tracing::debug!(
        cache_dir = %settings.cache_dir.display(),
        dataset_dir = %settings.dataset_dir.display(),
        "Loaded settings"
    );

    match cli.command {
        Commands::Clean { prod, options } => cmd::clean::run(&settings, &prod, &options).await,
        Commands::CleanBatch {
            categories,
            options,
        } => cmd::clean::run_batch(&settings, &categories, &options).await,
        Commands::UpdateNames {
            categories,
            max_workers,
            instances_to_proc,
        } => cmd::names::run(&settings, &categories, max_workers, instances_to_proc).await,
        Commands::Snapshot {
            categories,
            max_workers,
        } => cmd::snapshot::run(&settings, &categories, max_workers).await,
        Commands::UpdateLatest { root } => {
            cmd::latest::run(root.as_deref().unwrap_or(settings.dataset_dir.as_path()))
        }
    }
}
