//! Units of work and their results.

use serde::{Deserialize, Serialize};

/// A {product, brand, model} triple with an optional candidate URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Product category (e.g. "blender")
    pub product: String,

    /// Manufacturer brand name
    pub brand: String,

    /// Model name as currently known
    pub model: String,

    /// Candidate product-page URL, if any
    pub url: Option<String>,
}

impl ProductQuery {
    /// Create a query without a URL.
    pub fn new(
        product: impl Into<String>,
        brand: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            product: product.into(),
            brand: brand.into(),
            model: model.into(),
            url: None,
        }
    }

    /// Set the candidate URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A ranked search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub title: String,
    pub link: String,
}

impl SearchCandidate {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// Terminal result of resolving one product through search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionOutcome {
    /// Model name the final page was found for (may come from a catalog page)
    pub final_model: String,

    /// Verified product-page URL, `None` when nothing was accepted
    pub final_url: Option<String>,

    /// Title of the search hit that was accepted
    pub title: Option<String>,

    pub accepted: bool,
}

impl ResolutionOutcome {
    /// An accepted outcome.
    pub fn found(model: impl Into<String>, url: impl Into<String>, title: Option<String>) -> Self {
        Self {
            final_model: model.into(),
            final_url: Some(url.into()),
            title,
            accepted: true,
        }
    }

    /// A rejected outcome for the given model.
    pub fn not_found(model: impl Into<String>) -> Self {
        Self {
            final_model: model.into(),
            final_url: None,
            title: None,
            accepted: false,
        }
    }
}
