//! Structural selectors for locating posts and their fields.
//!
//! The site's markup uses generated class tokens that change between
//! deployments, so every selector is data: defaults below, overridable from a
//! TOML file without touching code.

use std::path::Path;

use scraper::Selector;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("failed to read selector file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse selector file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid CSS selector for '{field}' ({selector}): {message}")]
    Invalid {
        field: &'static str,
        selector: String,
        message: String,
    },
}

const COUNTER_SELECTOR: &str = "div > div > span > div > div > div > span > span.html-span";

/// A CSS query plus which match to take.
///
/// Comments and shares render as adjacent counters with the same DOM shape,
/// so both default to one query and differ only by index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CounterSelector {
    pub selector: String,
    #[serde(default)]
    pub index: usize,
}

impl CounterSelector {
    fn new(selector: &str, index: usize) -> Self {
        Self {
            selector: selector.to_string(),
            index,
        }
    }
}

/// Raw selector configuration, as written in a selector file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectorSet {
    /// Container of a single post.
    pub post: String,
    /// Ad-preview message containers holding the post body.
    pub message: String,
    /// Text containers used when no message container is present.
    pub fallback_text: String,
    pub likes: String,
    pub comments: CounterSelector,
    pub shares: CounterSelector,
    pub timestamp: String,
    /// Substrings identifying an anchor as the post's permalink.
    pub permalink_patterns: Vec<String>,
    /// Fallback text candidates need at least this many words.
    pub min_fallback_words: usize,
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            post: r#"div[class="x1n2onr6 x1ja2u2z"]"#.to_string(),
            message: r#"div[data-ad-preview="message"]"#.to_string(),
            fallback_text: "div.xdj266r".to_string(),
            likes: "span.xt0b8zv.x1jx94hy.xrbpyxo.xl423tq > span > span".to_string(),
            comments: CounterSelector::new(COUNTER_SELECTOR, 0),
            shares: CounterSelector::new(COUNTER_SELECTOR, 1),
            timestamp: "div.xu06os2.x1ok221b > span > div > span > span > a > span".to_string(),
            permalink_patterns: ["/posts/", "/videos/", "/reel/", "/photo/", "/story/"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            min_fallback_words: 3,
        }
    }
}

impl SelectorSet {
    /// Parse a selector set from TOML. Keys that are absent keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML for this shape.
    pub fn from_toml(source: &str) -> Result<Self, SelectorError> {
        Ok(toml::from_str(source)?)
    }

    /// Load a selector set from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, SelectorError> {
        let source = std::fs::read_to_string(path).map_err(|source| SelectorError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&source)
    }
}

/// A compiled [`CounterSelector`].
#[derive(Debug, Clone)]
pub struct CompiledCounter {
    pub selector: Selector,
    pub index: usize,
}

/// Selectors parsed once and reused for every extraction pass.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub post: Selector,
    pub message: Selector,
    pub fallback_text: Selector,
    pub likes: Selector,
    pub comments: CompiledCounter,
    pub shares: CompiledCounter,
    pub timestamp: Selector,
    pub anchor: Selector,
    pub permalink_patterns: Vec<String>,
    pub min_fallback_words: usize,
}

impl CompiledSelectors {
    /// Compile every CSS selector in the set.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::Invalid`] naming the first field whose selector
    /// does not parse.
    pub fn compile(set: &SelectorSet) -> Result<Self, SelectorError> {
        Ok(Self {
            post: parse("post", &set.post)?,
            message: parse("message", &set.message)?,
            fallback_text: parse("fallback_text", &set.fallback_text)?,
            likes: parse("likes", &set.likes)?,
            comments: CompiledCounter {
                selector: parse("comments", &set.comments.selector)?,
                index: set.comments.index,
            },
            shares: CompiledCounter {
                selector: parse("shares", &set.shares.selector)?,
                index: set.shares.index,
            },
            timestamp: parse("timestamp", &set.timestamp)?,
            anchor: parse("anchor", "a[href]")?,
            permalink_patterns: set.permalink_patterns.clone(),
            min_fallback_words: set.min_fallback_words,
        })
    }
}

fn parse(field: &'static str, selector: &str) -> Result<Selector, SelectorError> {
    Selector::parse(selector).map_err(|e| SelectorError::Invalid {
        field,
        selector: selector.to_string(),
        message: e.to_string(),
    })
}
