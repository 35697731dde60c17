//! Dataset files: CSV rows, versioning, audit trails and category lists.
//!
//! Layout under the dataset root:
//!
//! ```text
//! dataset/
//!   categories.md
//!   <product>/
//!     products_v1.0.csv
//!     products_v1.1.csv        # output of a cleaning run
//!     temp_products_v1.1.csv   # accepted trail
//!     dropped_products_v1.1.csv
//!     latest.csv
//!     updated_names.csv
//!     pages/  content/
//! ```

pub mod audit;
pub mod categories;
pub mod version;

pub use audit::AuditTrail;
pub use categories::read_categories;
pub use version::{latest_version, next_version, update_latest, Bump, Version};

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DatasetError, DatasetResult};
use crate::types::dataset::DatasetRecord;
use crate::types::DatasetRow;

/// Name of the copy of the current dataset consumed by later stages.
pub const LATEST_FILE: &str = "latest.csv";

/// Output of a model-name refresh.
pub const UPDATED_NAMES_FILE: &str = "updated_names.csv";

/// Column header of every dataset file.
pub const HEADER: [&str; 4] = ["Product", "Brand", "Model", "URL"];

/// Directory holding one product's dataset files.
pub fn product_dir(root: &Path, product: &str) -> PathBuf {
    root.join(product)
}

/// Read dataset rows, keeping at most `limit` of them.
pub fn read_rows(path: &Path, limit: Option<usize>) -> DatasetResult<Vec<DatasetRow>> {
    if !path.exists() {
        return Err(DatasetError::Missing {
            path: path.display().to_string(),
        });
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<DatasetRecord>().enumerate() {
        if limit.is_some_and(|limit| index >= limit) {
            break;
        }
        rows.push(record?.into_row(index));
    }

    debug!(path = %path.display(), rows = rows.len(), "Read dataset");
    Ok(rows)
}

/// Write dataset rows with a header, replacing the file.
pub fn write_rows(path: &Path, rows: &[DatasetRow]) -> DatasetResult<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| DatasetError::io(dir, e))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(HEADER)?;
    for row in rows {
        writer.serialize(row.to_record())?;
    }
    writer.flush().map_err(|e| DatasetError::io(path, e))?;

    debug!(path = %path.display(), rows = rows.len(), "Wrote dataset");
    Ok(())
}
