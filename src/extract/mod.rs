//! Post extraction from rendered feed markup.
//!
//! Every pass re-parses the whole page and returns one record per post
//! fragment currently in the DOM, duplicates included.

pub mod classifier;
pub mod permalink;
pub mod selectors;

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::models::PostRecord;
use permalink::{is_post_link, resolve_permalink};
pub use selectors::{
    CompiledCounter, CompiledSelectors, CounterSelector, SelectorError, SelectorSet,
};

/// Failure to extract a single post fragment.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unresolvable permalink '{href}': {source}")]
    InvalidPermalink {
        href: String,
        #[source]
        source: url::ParseError,
    },
}

/// Turns page markup into post records.
#[derive(Debug, Clone)]
pub struct PostExtractor {
    selectors: CompiledSelectors,
    site_root: Url,
}

impl PostExtractor {
    #[must_use]
    pub fn new(selectors: CompiledSelectors, site_root: Url) -> Self {
        Self {
            selectors,
            site_root,
        }
    }

    /// Build an extractor from an uncompiled selector set.
    ///
    /// # Errors
    ///
    /// Returns an error if any selector in the set is invalid.
    pub fn from_set(set: &SelectorSet, site_root: Url) -> Result<Self, SelectorError> {
        Ok(Self::new(CompiledSelectors::compile(set)?, site_root))
    }

    /// Extract every post fragment in `html`, in document order.
    ///
    /// Fragments that fail to extract are logged and skipped.
    #[must_use]
    pub fn extract(&self, html: &str) -> Vec<PostRecord> {
        let document = Html::parse_document(html);
        let mut posts = Vec::new();
        let mut skipped = 0usize;

        for (index, fragment) in document.select(&self.selectors.post).enumerate() {
            match self.extract_post(fragment) {
                Ok(post) => posts.push(post),
                Err(e) => {
                    skipped += 1;
                    warn!(index, error = %e, "Skipping post fragment");
                }
            }
        }

        debug!(extracted = posts.len(), skipped, "Extraction pass complete");
        posts
    }

    /// Extract the fields of a single post fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if the fragment's permalink cannot be resolved.
    pub fn extract_post(&self, post: ElementRef<'_>) -> Result<PostRecord, ExtractError> {
        let sel = &self.selectors;

        Ok(PostRecord {
            text: self.post_text(post),
            likes: first_label(post, &sel.likes),
            comments: counter_label(post, &sel.comments),
            shares: counter_label(post, &sel.shares),
            timestamp: first_label(post, &sel.timestamp),
            content_type: classifier::classify(post),
            permalink: self.permalink(post)?,
        })
    }

    fn post_text(&self, post: ElementRef<'_>) -> Option<String> {
        let message: Vec<String> = post
            .select(&self.selectors.message)
            .map(|el| stripped_text(el, ""))
            .filter(|t| !t.is_empty())
            .collect();
        if !message.is_empty() {
            return Some(message.join(" "));
        }

        // Every qualifying container counts, nested ones included.
        let candidates: Vec<String> = post
            .select(&self.selectors.fallback_text)
            .map(|el| stripped_text(el, " "))
            .filter(|text| text.split_whitespace().count() >= self.selectors.min_fallback_words)
            .collect();

        let joined = candidates.join(" ");
        let joined = joined.trim();
        (!joined.is_empty()).then(|| joined.to_string())
    }

    fn permalink(&self, post: ElementRef<'_>) -> Result<Option<String>, ExtractError> {
        let Some(href) = post
            .select(&self.selectors.anchor)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| is_post_link(href, &self.selectors.permalink_patterns))
        else {
            return Ok(None);
        };

        resolve_permalink(href, &self.site_root)
            .map(Some)
            .map_err(|source| ExtractError::InvalidPermalink {
                href: href.to_string(),
                source,
            })
    }
}

/// Trimmed text nodes of an element, empty ones dropped, joined by `sep`.
fn stripped_text(element: ElementRef<'_>, sep: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

fn first_label(post: ElementRef<'_>, selector: &Selector) -> Option<String> {
    post.select(selector)
        .next()
        .map(|el| stripped_text(el, ""))
        .filter(|t| !t.is_empty())
}

/// Counter labels keep their inner whitespace ("87 comments"); only the ends
/// are trimmed.
fn counter_label(post: ElementRef<'_>, counter: &CompiledCounter) -> Option<String> {
    post.select(&counter.selector)
        .nth(counter.index)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}
