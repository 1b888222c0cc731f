//! Post records produced by the extractor and written by the exporter.

use serde::{Deserialize, Serialize};

/// Classification of a post's primary media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Image,
    Text,
}

/// One rendered feed post, captured at extraction time.
///
/// There is no post identifier: two records describe the same post only when
/// every field matches. The derived `Eq`/`Hash` cover all fields in
/// declaration order, which makes the record its own deduplication signature.
/// Declaration order is also the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostRecord {
    /// Concatenated visible message text.
    #[serde(rename = "post_text")]
    pub text: Option<String>,
    /// Reaction count label as rendered ("1.2K").
    pub likes: Option<String>,
    /// Comment count label as rendered.
    pub comments: Option<String>,
    /// Share count label as rendered.
    pub shares: Option<String>,
    /// Relative or absolute time label as rendered.
    #[serde(rename = "post_time")]
    pub timestamp: Option<String>,
    pub content_type: ContentType,
    /// Absolute post URL with the query string removed.
    #[serde(rename = "post_link")]
    pub permalink: Option<String>,
}

impl PostRecord {
    /// A record with no fields set.
    #[must_use]
    pub const fn empty(content_type: ContentType) -> Self {
        Self {
            text: None,
            likes: None,
            comments: None,
            shares: None,
            timestamp: None,
            content_type,
            permalink: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_covers_every_field() {
        let a = PostRecord {
            likes: Some("12".to_string()),
            ..PostRecord::empty(ContentType::Text)
        };
        let b = PostRecord {
            likes: Some("13".to_string()),
            ..PostRecord::empty(ContentType::Text)
        };
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
