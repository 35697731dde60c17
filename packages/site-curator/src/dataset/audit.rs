//! Accepted and rejected audit trails of a cleaning run.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::dataset::HEADER;
use crate::error::{DatasetError, DatasetResult};
use crate::types::DatasetRow;

/// Append-only CSV trails written while a run is in progress.
///
/// Rows are written in arrival order and flushed one by one, so the trails
/// stay readable if the run is interrupted. Rows later dropped as URL
/// duplicates appear in both trails.
pub struct AuditTrail {
    accepted: csv::Writer<File>,
    rejected: csv::Writer<File>,
    accepted_path: PathBuf,
    rejected_path: PathBuf,
}

impl AuditTrail {
    /// Create `temp_<name>.csv` and `dropped_<name>.csv` in `dir`, each
    /// holding only the header.
    pub fn create(dir: &Path, name: &str) -> DatasetResult<Self> {
        std::fs::create_dir_all(dir).map_err(|e| DatasetError::io(dir, e))?;

        let accepted_path = dir.join(format!("temp_{}.csv", name));
        let rejected_path = dir.join(format!("dropped_{}.csv", name));

        Ok(Self {
            accepted: open_trail(&accepted_path)?,
            rejected: open_trail(&rejected_path)?,
            accepted_path,
            rejected_path,
        })
    }

    pub fn accepted_path(&self) -> &Path {
        &self.accepted_path
    }

    pub fn rejected_path(&self) -> &Path {
        &self.rejected_path
    }

    /// Append an accepted row (with its updated model and URL).
    pub fn record_accepted(&mut self, row: &DatasetRow) -> DatasetResult<()> {
        append(&mut self.accepted, &self.accepted_path, row)
    }

    /// Append a rejected row (with its original values).
    pub fn record_rejected(&mut self, row: &DatasetRow) -> DatasetResult<()> {
        append(&mut self.rejected, &self.rejected_path, row)
    }

    pub fn flush(&mut self) -> DatasetResult<()> {
        self.accepted
            .flush()
            .map_err(|e| DatasetError::io(&self.accepted_path, e))?;
        self.rejected
            .flush()
            .map_err(|e| DatasetError::io(&self.rejected_path, e))
    }
}

fn open_trail(path: &Path) -> DatasetResult<csv::Writer<File>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(HEADER)?;
    writer.flush().map_err(|e| DatasetError::io(path, e))?;
    Ok(writer)
}

fn append(writer: &mut csv::Writer<File>, path: &Path, row: &DatasetRow) -> DatasetResult<()> {
    writer.serialize(row.to_record())?;
    writer.flush().map_err(|e| DatasetError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trails_start_with_header_and_append() {
        let dir = tempfile::tempdir().unwrap();
        let mut audit = AuditTrail::create(dir.path(), "products_v1.1").unwrap();

        audit
            .record_accepted(&DatasetRow::new(0, "blender", "Acme", "X200", Some("https://acme.com/x200".into())))
            .unwrap();
        audit
            .record_rejected(&DatasetRow::new(1, "blender", "Zeta", "Z1", None))
            .unwrap();

        let accepted = std::fs::read_to_string(dir.path().join("temp_products_v1.1.csv")).unwrap();
        assert_eq!(
            accepted,
            "Product,Brand,Model,URL\nblender,Acme,X200,https://acme.com/x200\n"
        );

        let rejected = std::fs::read_to_string(audit.rejected_path()).unwrap();
        assert_eq!(rejected, "Product,Brand,Model,URL\nblender,Zeta,Z1,\n");
    }
}
