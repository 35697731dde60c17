//! Dataset reconciliation.
//!
//! Every row is evaluated independently with bounded concurrency. Row tasks
//! only return outcomes; the single consuming loop below applies them and
//! writes the audit trails. Accepted rows are then deduplicated by URL, and
//! every dropped duplicate is appended to the rejected trail.

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tracing::{debug, error, info};

use crate::dataset::AuditTrail;
use crate::error::Result;
use crate::pipeline::{PageClassifier, SearchResolver};
use crate::types::{ClassificationVerdict, DatasetRow, ResolutionOutcome};

/// Result of reconciling a dataset.
///
/// Every input row appears in exactly one of `accepted` or `rejected`; both
/// are ordered by original row index.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Rows with a verified product page (model and URL possibly updated)
    pub accepted: Vec<DatasetRow>,

    /// Rows without one, with their original values
    pub rejected: Vec<DatasetRow>,

    /// Accepted rows dropped because an earlier row had the same URL
    pub duplicates: usize,

    /// Rows whose evaluation failed (counted in `rejected`)
    pub failed: usize,
}

impl Reconciliation {
    /// Total number of rows accounted for.
    pub fn len(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Runs classification and search resolution over whole datasets.
#[derive(Clone)]
pub struct DatasetReconciler {
    resolver: SearchResolver,
}

impl DatasetReconciler {
    pub fn new(resolver: SearchResolver) -> Self {
        Self { resolver }
    }

    fn classifier(&self) -> &PageClassifier {
        self.resolver.classifier()
    }

    /// Reconcile rows without writing audit trails.
    pub async fn reconcile(&self, rows: Vec<DatasetRow>, concurrency: usize) -> Result<Reconciliation> {
        self.run(rows, concurrency, None).await
    }

    /// Reconcile rows, appending each result to the audit trails as it arrives.
    pub async fn reconcile_with_audit(
        &self,
        rows: Vec<DatasetRow>,
        concurrency: usize,
        audit: &mut AuditTrail,
    ) -> Result<Reconciliation> {
        self.run(rows, concurrency, Some(audit)).await
    }

    async fn run(
        &self,
        rows: Vec<DatasetRow>,
        concurrency: usize,
        mut audit: Option<&mut AuditTrail>,
    ) -> Result<Reconciliation> {
        let total = rows.len();
        info!(rows = total, concurrency, "Reconciling dataset");

        let mut results = stream::iter(rows.into_iter().map(|row| async move {
            let outcome = self.evaluate(&row).await;
            (row, outcome)
        }))
        .buffer_unordered(concurrency.max(1));

        // Accepted rows in completion order, paired with the original row.
        let mut arrivals: Vec<(DatasetRow, DatasetRow)> = Vec::new();
        let mut rejected = Vec::new();
        let mut failed = 0;

        while let Some((row, outcome)) = results.next().await {
            match outcome {
                Ok(Some(accepted)) => {
                    info!(
                        row = row.index,
                        model = %accepted.model,
                        url = accepted.url.as_deref().unwrap_or_default(),
                        "Row accepted"
                    );
                    if let Some(audit) = audit.as_deref_mut() {
                        audit.record_accepted(&accepted)?;
                    }
                    arrivals.push((row, accepted));
                }
                Ok(None) => {
                    info!(row = row.index, model = %row.model, "Row rejected");
                    if let Some(audit) = audit.as_deref_mut() {
                        audit.record_rejected(&row)?;
                    }
                    rejected.push(row);
                }
                Err(e) => {
                    error!(row = row.index, error = %e, "Row evaluation failed");
                    failed += 1;
                    if let Some(audit) = audit.as_deref_mut() {
                        audit.record_rejected(&row)?;
                    }
                    rejected.push(row);
                }
            }
        }

        let (mut accepted, duplicates) = dedup_by_url(arrivals);

        if let Some(audit) = audit {
            for row in &duplicates {
                audit.record_rejected(row)?;
            }
            audit.flush()?;
        }

        let duplicate_count = duplicates.len();
        rejected.extend(duplicates);

        accepted.sort_by_key(|r| r.index);
        rejected.sort_by_key(|r| r.index);

        info!(
            accepted = accepted.len(),
            rejected = rejected.len(),
            duplicates = duplicate_count,
            failed,
            "Reconciliation complete"
        );

        Ok(Reconciliation {
            accepted,
            rejected,
            duplicates: duplicate_count,
            failed,
        })
    }

    /// Evaluate one row. `Ok(None)` means no product page was found.
    pub async fn evaluate(&self, row: &DatasetRow) -> Result<Option<DatasetRow>> {
        let direct = self.classifier().classify_query(&row.query()).await?;

        if let (ClassificationVerdict::Product, Some(url)) = (&direct.verdict, &direct.url) {
            debug!(row = row.index, url = %url, "Existing URL verified");
            return Ok(Some(row.resolved(row.model.clone(), url.clone())));
        }

        let catalog_model = direct
            .verdict
            .catalog_model()
            .filter(|model| *model != row.model)
            .map(str::to_string);

        let mut outcome = ResolutionOutcome::not_found(row.model.clone());
        if let Some(model) = catalog_model {
            debug!(row = row.index, model = %model, "Searching catalog model first");
            outcome = self
                .resolver
                .resolve(&row.product, &row.brand, &model)
                .await?;
        }
        if !outcome.accepted {
            outcome = self
                .resolver
                .resolve(&row.product, &row.brand, &row.model)
                .await?;
        }

        Ok(match (outcome.accepted, outcome.final_url) {
            (true, Some(url)) => Some(row.resolved(outcome.final_model.replace('"', ""), url)),
            _ => None,
        })
    }
}

/// First arrival wins; later rows with the same URL come back as duplicates
/// carrying their original values.
fn dedup_by_url(arrivals: Vec<(DatasetRow, DatasetRow)>) -> (Vec<DatasetRow>, Vec<DatasetRow>) {
    let mut seen = HashSet::new();
    let mut accepted = Vec::new();
    let mut duplicates = Vec::new();

    for (original, row) in arrivals {
        let key = row.url.clone().unwrap_or_default();
        if seen.insert(key) {
            accepted.push(row);
        } else {
            debug!(row = original.index, url = ?row.url, "Duplicate URL dropped");
            duplicates.push(original);
        }
    }

    (accepted, duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(index: usize, url: &str) -> DatasetRow {
        DatasetRow::new(index, "blender", "Acme", format!("M{}", index), Some(url.into()))
    }

    #[test]
    fn test_dedup_keeps_first_arrival() {
        let arrivals = vec![
            (row(3, "a"), row(3, "https://acme.com/x")),
            (row(1, "b"), row(1, "https://acme.com/x")),
            (row(2, "c"), row(2, "https://acme.com/y")),
        ];

        let (accepted, duplicates) = dedup_by_url(arrivals);

        assert_eq!(accepted.iter().map(|r| r.index).collect::<Vec<_>>(), vec![3, 2]);
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].index, 1);
        assert_eq!(duplicates[0].url.as_deref(), Some("b"));
    }
}
