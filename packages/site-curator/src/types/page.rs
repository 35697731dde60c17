//! Page types - fetched HTML and extracted content.

use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

/// Elements whose text never reaches the reader.
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Raw result of a page fetch, before text extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedPage {
    /// URL that was asked for
    pub requested_url: String,

    /// URL after following redirects
    pub final_url: String,

    /// Raw HTML body
    pub html: String,
}

impl FetchedPage {
    pub fn new(
        requested_url: impl Into<String>,
        final_url: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            requested_url: requested_url.into(),
            final_url: final_url.into(),
            html: html.into(),
        }
    }
}

/// A loaded page ready for classification.
///
/// Scoped to a single classification call; the raw HTML is cached by the
/// loader under `canonical_url`.
#[derive(Debug, Clone)]
pub struct PageContent {
    /// Fully resolved URL (after redirects)
    pub canonical_url: String,

    /// Raw HTML
    pub raw_html: String,

    /// Visible text extracted from the HTML
    pub visible_text: String,

    /// Contents of the `<title>` element
    pub title: Option<String>,

    /// When the content was loaded (from network or cache)
    pub fetched_at: DateTime<Utc>,
}

impl PageContent {
    /// Parse HTML and extract its visible text and title.
    pub fn from_html(canonical_url: impl Into<String>, html: impl Into<String>) -> Self {
        let raw_html = html.into();
        let document = Html::parse_document(&raw_html);

        Self {
            canonical_url: canonical_url.into(),
            visible_text: visible_text(&document),
            title: title(&document),
            raw_html,
            fetched_at: Utc::now(),
        }
    }

    /// The first `n` words of the visible text, for log lines.
    pub fn preview(&self, n: usize) -> String {
        self.visible_text
            .split_whitespace()
            .take(n)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn visible_text(document: &Html) -> String {
    let mut chunks = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| INVISIBLE_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed);
        }
    }

    chunks.join(" ")
}

fn title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let title: String = document.select(&selector).next()?.text().collect();
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}
