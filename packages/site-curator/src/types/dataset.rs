//! Dataset rows.

use serde::{Deserialize, Serialize};

use crate::types::query::ProductQuery;

/// One product instance of a dataset file.
///
/// `index` is the row position in the source file and identifies the row for
/// the whole run, regardless of the order in which rows finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRow {
    pub index: usize,
    pub product: String,
    pub brand: String,
    pub model: String,
    pub url: Option<String>,
}

impl DatasetRow {
    pub fn new(
        index: usize,
        product: impl Into<String>,
        brand: impl Into<String>,
        model: impl Into<String>,
        url: Option<String>,
    ) -> Self {
        Self {
            index,
            product: product.into(),
            brand: brand.into(),
            model: model.into(),
            url,
        }
    }

    /// The unit of work this row describes.
    pub fn query(&self) -> ProductQuery {
        ProductQuery {
            product: self.product.clone(),
            brand: self.brand.clone(),
            model: self.model.clone(),
            url: self.url.clone(),
        }
    }

    /// Copy of this row pointing at a verified page.
    pub fn resolved(&self, model: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            url: Some(url.into()),
            ..self.clone()
        }
    }

    pub(crate) fn to_record(&self) -> DatasetRecord {
        DatasetRecord {
            product: self.product.clone(),
            brand: self.brand.clone(),
            model: self.model.clone(),
            url: self.url.clone(),
        }
    }
}

/// On-disk CSV shape: `Product,Brand,Model,URL`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DatasetRecord {
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Brand")]
    pub brand: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "URL", default, deserialize_with = "empty_as_none")]
    pub url: Option<String>,
}

impl DatasetRecord {
    pub(crate) fn into_row(self, index: usize) -> DatasetRow {
        DatasetRow::new(index, self.product, self.brand, self.model, self.url)
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_keeps_identity() {
        let row = DatasetRow::new(4, "blender", "Acme", "X100", None);
        let resolved = row.resolved("X200", "https://acme.com/x200");
        assert_eq!(resolved.index, 4);
        assert_eq!(resolved.brand, "Acme");
        assert_eq!(resolved.model, "X200");
        assert_eq!(resolved.url.as_deref(), Some("https://acme.com/x200"));
    }
}
