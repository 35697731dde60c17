//! Classification verdicts.
//!
//! Oracle answers are parsed into these enums inside the oracle client; raw
//! verdict strings never travel further than that.

/// Final decision about a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationVerdict {
    /// Official single-product page, product available
    Product,

    /// Catalog or lineup page; carries one model name listed on it
    Catalog(String),

    /// Product page for a discontinued or missing product
    Unavailable,

    /// Anything else (including fetch failures)
    NotProduct,
}

impl ClassificationVerdict {
    /// True only for an available single-product page.
    pub fn is_product(&self) -> bool {
        matches!(self, Self::Product)
    }

    /// Model name extracted from a catalog page.
    pub fn catalog_model(&self) -> Option<&str> {
        match self {
            Self::Catalog(model) => Some(model),
            _ => None,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Catalog(_) => "catalog",
            Self::Unavailable => "unavailable",
            Self::NotProduct => "not_product",
        }
    }
}

/// A verdict together with the URL it applies to.
///
/// `url` is the canonical URL when the page was fetched, otherwise the
/// normalized input URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageClassification {
    pub url: Option<String>,
    pub verdict: ClassificationVerdict,
}

impl PageClassification {
    pub fn new(url: Option<String>, verdict: ClassificationVerdict) -> Self {
        Self { url, verdict }
    }

    pub fn not_product(url: Option<String>) -> Self {
        Self::new(url, ClassificationVerdict::NotProduct)
    }
}

/// Answer to "does this URL point to a single official product page?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlVerdict {
    Product,
    NotProduct,
    Catalog,
    /// Oracle declined to decide; treated like `Product` by the classifier
    Unsure,
}

/// Answer to "is this page text a single official product page?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageVerdict {
    Product,
    NotProduct,
    /// Not a single-product page, but it lists this model
    Catalog(String),
}

/// Answer to "what is the real model name of this page?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelNameVerdict {
    Named(String),
    /// Title and URL carry no usable model name
    Uninformative,
}
